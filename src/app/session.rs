//! Platzierungs-Session: ein Datensatz, eine Kategorie, ein Holder.
//!
//! Ablauf: Scope auflösen → alte Holder entfernen → Koordinatenrahmen →
//! Holder + Features als Bauplan → Einhängen in die Szene.
//! Schlägt eine Stufe fehl, bleibt die Kategorie ohne Holder zurück.

use super::placers::{self, FeaturePlacer, PlacementContext, PlacementWarning};
use super::raster::RasterSource;
use super::scope::ScopeResolver;
use crate::core::{
    Category, CoordinateFrame, NodeId, PlacementError, Scene, SessionError, Stage, TerrainSurface,
};
use crate::shared::PlacementOptions;

/// Ergebnis einer erfolgreichen Session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionReport {
    /// Datensatz-ID
    pub dataset: String,
    /// Kategorie
    pub category: Category,
    /// ID des neuen Holders
    pub holder: NodeId,
    /// Anzahl erzeugter Features bzw. Overlays
    pub placed: usize,
    /// Anzahl entfernter Knoten aus vorherigen Läufen
    pub removed_stale: usize,
    /// Übersprungene Features
    pub warnings: Vec<PlacementWarning>,
}

/// Führt Platzierungen mit festen Collaborators aus.
pub struct PlacementSession<'a> {
    options: &'a PlacementOptions,
    scopes: &'a dyn ScopeResolver,
    rasters: &'a dyn RasterSource,
}

impl<'a> PlacementSession<'a> {
    /// Erstellt eine Session über Optionen, Scope-Resolver und Raster-Quelle.
    pub fn new(
        options: &'a PlacementOptions,
        scopes: &'a dyn ScopeResolver,
        rasters: &'a dyn RasterSource,
    ) -> Self {
        Self {
            options,
            scopes,
            rasters,
        }
    }

    /// Platziert alle Features einer Kategorie für einen Datensatz.
    ///
    /// Vorhandene Holder der Kategorie werden vorab entfernt, auch wenn die
    /// Session danach fehlschlägt.
    pub fn run(
        &self,
        category: Category,
        dataset_id: &str,
        scene: &mut Scene,
        surface: &dyn TerrainSurface,
        rotation_degrees: f32,
    ) -> Result<SessionReport, SessionError> {
        let placer = placers::placer_for(category, self.options);
        self.run_with(placer.as_ref(), dataset_id, scene, surface, rotation_degrees)
    }

    /// Wie `run`, mit explizitem Platzierer.
    pub fn run_with(
        &self,
        placer: &dyn FeaturePlacer,
        dataset_id: &str,
        scene: &mut Scene,
        surface: &dyn TerrainSurface,
        rotation_degrees: f32,
    ) -> Result<SessionReport, SessionError> {
        let category = placer.category();
        let fail = |stage: Stage, source: PlacementError| SessionError {
            dataset: dataset_id.to_string(),
            category,
            stage,
            source,
        };

        log::info!(
            "Session gestartet: {} für '{}' (Rotation {:.2}°)",
            category,
            dataset_id,
            rotation_degrees
        );

        let scope = self
            .scopes
            .scope(dataset_id)
            .and_then(|scope| scope.validate().map(|()| scope))
            .map_err(|e| fail(Stage::ResolveScope, e))?;

        let removed_stale = remove_holders(scene, placer.holder_name());

        let frame = CoordinateFrame::build(surface, &scope, rotation_degrees)
            .map_err(|e| fail(Stage::BuildFrame, e))?;

        let dataset_dir = self.options.dataset_dir(dataset_id);
        let ctx = PlacementContext {
            dataset_id,
            dataset_dir: &dataset_dir,
            scope: &scope,
            frame: &frame,
            surface,
            rasters: self.rasters,
            options: self.options,
        };

        let mut holder = placer.create_holder(&ctx);
        let outcome = placer
            .spawn_all(&ctx, &mut holder)
            .map_err(|e| fail(e.stage, e.source))?;

        let holder_id = scene.insert_under_root(holder);

        if !outcome.warnings.is_empty() {
            log::warn!(
                "{} Features übersprungen ({} für '{}')",
                outcome.warnings.len(),
                category,
                dataset_id
            );
        }
        log::info!(
            "Session abgeschlossen: {} für '{}', {} platziert",
            category,
            dataset_id,
            outcome.placed
        );

        Ok(SessionReport {
            dataset: dataset_id.to_string(),
            category,
            holder: holder_id,
            placed: outcome.placed,
            removed_stale,
            warnings: outcome.warnings,
        })
    }
}

/// Entfernt alle Holder mit `name` unter der Wurzel. Gibt die Anzahl entfernter Knoten zurück.
fn remove_holders(scene: &mut Scene, name: &str) -> usize {
    let stale = scene.children_named(scene.root(), name);
    let removed: usize = stale.into_iter().map(|id| scene.destroy(id)).sum();
    if removed > 0 {
        log::debug!("Alter Holder '{}' entfernt ({} Knoten)", name, removed);
    }
    removed
}
