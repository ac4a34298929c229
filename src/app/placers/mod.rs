//! Trait-basierte Platzierer pro Datensatz-Kategorie.
//!
//! Jeder Platzierer implementiert `FeaturePlacer` und erzeugt reine Daten
//! (`NodeTree`). Das Einhängen in die Szene erfolgt zentral in der Session,
//! erst nachdem alle Stufen erfolgreich waren.

/// Gebäude-Platzierer: ein Feature pro Tabellenzeile.
pub mod building;
/// Overlay-Platzierer für Strahlung und Wolken.
pub mod overlay;

pub use building::BuildingPlacer;
pub use overlay::OverlayPlacer;

use std::path::Path;

use glam::DVec3;

use super::raster::RasterSource;
use crate::core::{
    Category, CoordinateFrame, DatasetScope, LocalTransform, NodeKind, NodeTree, PlacementError,
    Stage, TerrainSurface,
};
use crate::shared::PlacementOptions;

/// Alles, was ein Platzierer für eine Session braucht (nur lesend).
pub struct PlacementContext<'a> {
    /// Datensatz-ID
    pub dataset_id: &'a str,
    /// Verzeichnis des Datensatzes
    pub dataset_dir: &'a Path,
    /// Validierter Scope
    pub scope: &'a DatasetScope,
    /// Koordinatenrahmen der Session (trägt die Gier-Rotation)
    pub frame: &'a CoordinateFrame,
    /// Ziel-Oberfläche
    pub surface: &'a dyn TerrainSurface,
    /// Raster-Collaborator
    pub rasters: &'a dyn RasterSource,
    /// Konfiguration
    pub options: &'a PlacementOptions,
}

/// Übersprungenes Feature (Raycast-Fehlschlag unter `MissPolicy::Skip`).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementWarning {
    /// Zeile des Records (0-basiert)
    pub line: usize,
    /// Fehlermeldung
    pub message: String,
}

/// Fehler eines Platzierers mit der Stufe, in der er auftrat.
#[derive(Debug)]
pub struct StagedError {
    /// Stufe
    pub stage: Stage,
    /// Ursache
    pub source: PlacementError,
}

impl StagedError {
    /// Ordnet einen Fehler einer Stufe zu.
    pub fn new(stage: Stage, source: PlacementError) -> Self {
        Self { stage, source }
    }
}

/// Ergebnis von `spawn_all`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpawnOutcome {
    /// Anzahl erzeugter Knoten
    pub placed: usize,
    /// Übersprungene Features
    pub warnings: Vec<PlacementWarning>,
}

/// Schnittstelle aller Kategorie-Platzierer.
pub trait FeaturePlacer {
    /// Kategorie, die dieser Platzierer bedient
    fn category(&self) -> Category;

    /// Name des Holder-Knotens unter der Oberflächen-Wurzel
    fn holder_name(&self) -> &str {
        self.category().holder_name()
    }

    /// Leerer Holder: am Anker, um die Session-Gier gedreht, Skalierung Meter → Oberflächen-Einheiten.
    fn create_holder(&self, ctx: &PlacementContext<'_>) -> NodeTree {
        let transform = ctx.surface.transform();
        let anchor_local = transform.inverse_transform_point(ctx.frame.world_anchor());
        let units_per_meter = 1.0 / (ctx.frame.meters_per_unit() * transform.scale.x);

        NodeTree::new(
            self.holder_name(),
            LocalTransform {
                position: anchor_local,
                yaw_degrees: ctx.frame.rotation_degrees(),
                scale: DVec3::splat(units_per_meter),
            },
            NodeKind::Holder {
                pin: ctx.scope.position,
            },
        )
    }

    /// Erzeugt alle Features der Kategorie als Kinder von `holder`.
    fn spawn_all(
        &self,
        ctx: &PlacementContext<'_>,
        holder: &mut NodeTree,
    ) -> Result<SpawnOutcome, StagedError>;
}

/// Liefert den Platzierer einer Kategorie.
pub fn placer_for(category: Category, options: &PlacementOptions) -> Box<dyn FeaturePlacer> {
    match category {
        Category::Buildings => Box::new(BuildingPlacer::new(options)),
        Category::Radiation => Box::new(OverlayPlacer::radiation(options)),
        Category::Clouds => Box::new(OverlayPlacer::clouds(options)),
    }
}
