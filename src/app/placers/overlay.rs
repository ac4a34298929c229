use glam::DVec3;

use super::{FeaturePlacer, PlacementContext, SpawnOutcome, StagedError};
use crate::app::raster::RasterKind;
use crate::core::{
    distortion, Category, DatasetScope, LocalTransform, NodeKind, NodeTree, RasterBinding, Stage,
};
use crate::shared::PlacementOptions;

/// Platziert ein einzelnes, flächiges Raster-Overlay (Strahlung oder Wolken).
#[derive(Debug, Clone)]
pub struct OverlayPlacer {
    category: Category,
    prefab: String,
    reference_size_m: f64,
    /// (Material-Property, Raster-Art, Index)
    bindings: Vec<(String, RasterKind, usize)>,
}

impl OverlayPlacer {
    /// Strahlungs-Overlay: erstes Strahlungsraster plus Heightmap des Datensatzes.
    pub fn radiation(options: &PlacementOptions) -> Self {
        let names = &options.overlay_bindings;
        Self {
            category: Category::Radiation,
            prefab: options.prefabs.radiation.clone(),
            reference_size_m: options.reference_size_m,
            bindings: vec![
                (names.radiation_map.clone(), RasterKind::Radiation, 0),
                (names.heightmap.clone(), RasterKind::Heightmap, 0),
            ],
        }
    }

    /// Wolken-Overlay aus dem ersten Windraster.
    pub fn clouds(options: &PlacementOptions) -> Self {
        Self {
            category: Category::Clouds,
            prefab: options.prefabs.cloud.clone(),
            reference_size_m: options.reference_size_m,
            bindings: vec![(
                options.overlay_bindings.wind_map.clone(),
                RasterKind::Wind,
                0,
            )],
        }
    }

    /// Overlay-Skalierung: Prefab-Basisgröße auf `size.x`, X/Z um die Verzerrung gestreckt.
    pub fn overlay_scale(&self, scope: &DatasetScope) -> DVec3 {
        let d = distortion::factor(scope);
        let s = scope.size.x / self.reference_size_m;
        DVec3::new(s * d, s, s * d)
    }
}

impl FeaturePlacer for OverlayPlacer {
    fn category(&self) -> Category {
        self.category
    }

    fn spawn_all(
        &self,
        ctx: &PlacementContext<'_>,
        holder: &mut NodeTree,
    ) -> Result<SpawnOutcome, StagedError> {
        let mut bindings = Vec::with_capacity(self.bindings.len());
        for (property, kind, index) in &self.bindings {
            let raster = ctx
                .rasters
                .load_image(ctx.dataset_id, *kind, *index)
                .map_err(|e| StagedError::new(Stage::LoadRaster, e))?;
            let (width, height) = raster.dimensions();
            bindings.push(RasterBinding {
                property: property.clone(),
                source: raster.source,
                width,
                height,
            });
        }

        let scale = self.overlay_scale(ctx.scope);
        log::debug!(
            "Overlay '{}' für '{}': Skalierung ({:.4}, {:.4}, {:.4})",
            self.prefab,
            ctx.dataset_id,
            scale.x,
            scale.y,
            scale.z
        );

        holder.children.push(NodeTree::new(
            self.prefab.clone(),
            LocalTransform {
                scale,
                ..LocalTransform::default()
            },
            NodeKind::Overlay {
                prefab: self.prefab.clone(),
                lod_size: ctx.scope.size.x,
                bindings,
            },
        ));

        Ok(SpawnOutcome {
            placed: 1,
            warnings: Vec::new(),
        })
    }
}
