//! Zentrale Konfiguration für die Feature-Platzierung.
//!
//! `PlacementOptions` wird einmal beim Start geladen und per Referenz
//! an Sessions und Overlay-Bindungen weitergereicht.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::SurfaceSettings;

// ── Platzierung ─────────────────────────────────────────────────────

/// Basisgröße der Overlay-Prefabs in Metern (Prefab deckt 1 km ab).
pub const OVERLAY_REFERENCE_SIZE_M: f64 = 1000.0;
/// Abstand des Strahl-Starts über dem höchsten Relief (lokale Einheiten).
pub const RAY_HEIGHT: f64 = 10.0;
/// Standard-Gier-Rotation der Datensätze in Grad.
pub const DEFAULT_ROTATION_DEGREES: f32 = -3.1;

// ── Bereitschaft der Oberfläche ─────────────────────────────────────

/// Abfrage-Intervall beim Warten auf die Oberfläche.
pub const READY_POLL_INTERVAL_MS: u64 = 100;
/// Maximale Wartezeit auf die Oberfläche.
pub const READY_TIMEOUT_MS: u64 = 120_000;

// ── Prefabs ─────────────────────────────────────────────────────────

/// Prefab für Gebäude-Features.
pub const BUILDING_PREFAB: &str = "Small Building";
/// Prefab für das Strahlungs-Overlay.
pub const RADIATION_PREFAB: &str = "Radiation";
/// Prefab für das Wolken-Overlay.
pub const CLOUD_PREFAB: &str = "Cloud Miniature";

/// Verhalten, wenn der Boden-Raycast eines einzelnen Features verfehlt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissPolicy {
    /// Die ganze Session schlägt fehl
    Abort,
    /// Feature überspringen und als Warnung melden
    #[default]
    Skip,
}

/// Material-Property-Namen der Overlay-Raster.
/// Ersetzt globale Shader-Property-Lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OverlayBindings {
    /// Property für das Strahlungsraster
    pub radiation_map: String,
    /// Property für das Windraster der Wolken
    pub wind_map: String,
    /// Property für die Heightmap
    pub heightmap: String,
}

impl Default for OverlayBindings {
    fn default() -> Self {
        Self {
            radiation_map: "_RadiationMap".to_string(),
            wind_map: "_WindMap".to_string(),
            heightmap: "_Heightmap".to_string(),
        }
    }
}

/// Prefab-Namen pro Kategorie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrefabNames {
    /// Gebäude
    pub building: String,
    /// Strahlung
    pub radiation: String,
    /// Wolken
    pub cloud: String,
}

impl Default for PrefabNames {
    fn default() -> Self {
        Self {
            building: BUILDING_PREFAB.to_string(),
            radiation: RADIATION_PREFAB.to_string(),
            cloud: CLOUD_PREFAB.to_string(),
        }
    }
}

/// Alle konfigurierbaren Werte der Platzierung.
/// Wird als `geo_feature_placer.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlacementOptions {
    // ── Daten ───────────────────────────────────────────────────
    /// Wurzelverzeichnis aller Datensätze (`<data_root>/<dataset>/...`)
    pub data_root: PathBuf,

    // ── Platzierung ─────────────────────────────────────────────
    /// Basisgröße der Overlay-Prefabs in Metern
    pub reference_size_m: f64,
    /// Abstand des Strahl-Starts über dem höchsten Relief (lokale Einheiten)
    pub ray_height: f64,
    /// Gier-Rotation der Datensätze in Grad
    pub rotation_degrees: f32,
    /// Verhalten bei verfehlten Raycasts
    #[serde(default)]
    pub miss_policy: MissPolicy,

    // ── Bereitschaft ────────────────────────────────────────────
    /// Abfrage-Intervall in Millisekunden
    #[serde(default = "default_poll_interval_ms")]
    pub ready_poll_interval_ms: u64,
    /// Maximale Wartezeit in Millisekunden (`None` = unbegrenzt)
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: Option<u64>,

    // ── Darstellung ─────────────────────────────────────────────
    /// Prefab-Namen
    #[serde(default)]
    pub prefabs: PrefabNames,
    /// Overlay-Material-Properties
    #[serde(default)]
    pub overlay_bindings: OverlayBindings,

    // ── Oberfläche ──────────────────────────────────────────────
    /// Beschreibung der Terrain-Oberfläche
    #[serde(default)]
    pub surface: SurfaceSettings,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("MapData"),
            reference_size_m: OVERLAY_REFERENCE_SIZE_M,
            ray_height: RAY_HEIGHT,
            rotation_degrees: DEFAULT_ROTATION_DEGREES,
            miss_policy: MissPolicy::default(),
            ready_poll_interval_ms: READY_POLL_INTERVAL_MS,
            ready_timeout_ms: Some(READY_TIMEOUT_MS),
            prefabs: PrefabNames::default(),
            overlay_bindings: OverlayBindings::default(),
            surface: SurfaceSettings::default(),
        }
    }
}

/// Serde-Default für `ready_poll_interval_ms` (Abwärtskompatibilität).
fn default_poll_interval_ms() -> u64 {
    READY_POLL_INTERVAL_MS
}

/// Serde-Default für `ready_timeout_ms` (Abwärtskompatibilität).
fn default_ready_timeout_ms() -> Option<u64> {
    Some(READY_TIMEOUT_MS)
}

impl PlacementOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| PathBuf::from("geo_feature_placer"))
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join("geo_feature_placer.toml")
    }

    /// Verzeichnis eines Datensatzes
    pub fn dataset_dir(&self, dataset_id: &str) -> PathBuf {
        self.data_root.join(dataset_id)
    }
}
