//! Geo Feature Placer (`geo-place`).
//!
//! Platziert Gebäude-, Wolken- und Strahlungsdaten eines Datensatzes auf einer
//! Heightmap-Oberfläche und gibt die resultierende Szene als JSON aus.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use geo_feature_placer::app::{BuildCommand, CachedScopeResolver, CommandLog};
use geo_feature_placer::core::NodeTree;
use geo_feature_placer::{
    await_ready, CancelToken, Category, DirectoryRasterSource, HeightmapSurface, MissPolicy,
    PlacementOptions, PlacementSession, Scene, SceneBuilder, ScopeResolver, SurfaceSettings,
    TomlScopeResolver, WaitOptions,
};
use serde::Serialize;

/// Name der Oberflächen-Wurzel in der Szene.
const SURFACE_NODE_NAME: &str = "Map";

/// Geo Feature Placer
#[derive(Parser)]
#[command(name = "geo-place", version, about = "Platziert georeferenzierte Datensätze auf einer Terrain-Oberfläche")]
struct Cli {
    /// Optionen-Datei (Standard: geo_feature_placer.toml neben der Binary)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Wurzelverzeichnis der Datensätze (überschreibt die Optionen)
    #[arg(long, global = true)]
    data_root: Option<PathBuf>,

    /// Oberflächen-Beschreibung als TOML (überschreibt die Optionen)
    #[arg(long, global = true)]
    surface: Option<PathBuf>,

    /// Session bei verfehltem Raycast abbrechen statt Feature zu überspringen
    #[arg(long, global = true)]
    abort_on_miss: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Eine Kategorie eines Datensatzes platzieren
    Place {
        /// Datensatz-ID (Verzeichnis unter data_root)
        #[arg(long)]
        dataset: String,
        /// buildings | radiation | clouds
        #[arg(long)]
        category: Category,
        /// Gier-Rotation in Grad (Standard aus den Optionen)
        #[arg(long, allow_negative_numbers = true)]
        rotation: Option<f32>,
        /// Ausgabedatei für die Szene (Standard: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Vollständige Szene aufbauen (Gebäude, Wolken, Strahlung)
    Build {
        /// Datensatz-ID (Verzeichnis unter data_root)
        #[arg(long)]
        dataset: String,
        /// Ausgabedatei für die Szene (Standard: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Standard-Optionen in die Optionen-Datei schreiben
    InitConfig,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Geo Feature Placer v{} startet...", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(PlacementOptions::config_path);

    if let Commands::InitConfig = cli.command {
        return PlacementOptions::default()
            .save_to_file(&config_path)
            .with_context(|| format!("Optionen nicht schreibbar: {}", config_path.display()));
    }

    let options = resolve_options(&cli, &config_path)?;
    let scopes = TomlScopeResolver::new(&options.data_root);
    let rasters = DirectoryRasterSource::new(&options.data_root);
    let mut surface = HeightmapSurface::from_settings(&options.surface)
        .context("Oberfläche konnte nicht erstellt werden")?;
    let mut scene = Scene::new(SURFACE_NODE_NAME);
    let token = CancelToken::new();

    let (steps, out) = match cli.command {
        Commands::Place {
            dataset,
            category,
            rotation,
            out,
        } => {
            let mut steps = CommandLog::new();
            let ready = await_ready(&surface, &token, &WaitOptions::from_options(&options))?;
            steps.record(BuildCommand::AwaitSurface { polls: ready.polls });

            let scopes = CachedScopeResolver::new(&scopes);
            let scope = scopes
                .scope(&dataset)
                .and_then(|scope| scope.validate().map(|()| scope))
                .with_context(|| format!("Scope von '{}' ungültig", dataset))?;
            surface.set_center(scope.center());
            steps.record(BuildCommand::CenterMap {
                center: scope.center(),
            });

            let session = PlacementSession::new(&options, &scopes, &rasters);
            let report = session.run(
                category,
                &dataset,
                &mut scene,
                &surface,
                rotation.unwrap_or(options.rotation_degrees),
            )?;
            for warning in &report.warnings {
                log::warn!("Zeile {}: {}", warning.line, warning.message);
            }
            steps.record(BuildCommand::PlaceCategory {
                category,
                dataset,
                placed: report.placed,
                skipped: report.warnings.len(),
            });
            (steps, out)
        }
        Commands::Build { dataset, out } => {
            let mut builder = SceneBuilder::new(&options, &scopes, &rasters);
            let report = builder.build(&dataset, &mut scene, &mut surface, &token)?;
            log::info!(
                "{} Sessions, {} Features übersprungen",
                report.sessions.len(),
                builder.command_log().skipped()
            );
            (builder.command_log().clone(), out)
        }
        Commands::InitConfig => return Ok(()),
    };

    write_scene(&scene, &steps, out.as_deref())
}

/// Lädt Optionen und wendet die CLI-Überschreibungen an.
fn resolve_options(cli: &Cli, config_path: &Path) -> Result<PlacementOptions> {
    let mut options = PlacementOptions::load_from_file(config_path);

    if let Some(data_root) = &cli.data_root {
        options.data_root = data_root.clone();
    }
    if let Some(path) = &cli.surface {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Oberflächen-Datei nicht lesbar: {}", path.display()))?;
        options.surface = toml::from_str::<SurfaceSettings>(&content)
            .with_context(|| format!("Oberflächen-Datei fehlerhaft: {}", path.display()))?;
    }
    if cli.abort_on_miss {
        options.miss_policy = MissPolicy::Abort;
    }
    Ok(options)
}

/// JSON-Ausgabe: Szenen-Schnappschuss plus ausgeführte Schritte.
#[derive(Serialize)]
struct SceneDump<'a> {
    scene: Option<NodeTree>,
    steps: &'a CommandLog,
}

/// Schreibt Szene und Schritte als JSON nach `out` oder stdout.
fn write_scene(scene: &Scene, steps: &CommandLog, out: Option<&Path>) -> Result<()> {
    let dump = SceneDump {
        scene: scene.snapshot(scene.root()),
        steps,
    };
    let json = serde_json::to_string_pretty(&dump).context("Szene nicht serialisierbar")?;

    match out {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Szene nicht schreibbar: {}", path.display()))?;
            log::info!("Szene gespeichert nach: {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
