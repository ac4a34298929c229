use std::path::{Path, PathBuf};

use super::{FeaturePlacer, PlacementContext, PlacementWarning, SpawnOutcome, StagedError};
use crate::core::{placement, Category, LocalTransform, NodeKind, NodeTree, PlacementError, Stage};
use crate::shared::{MissPolicy, PlacementOptions};
use crate::table::{self, ColumnLayout};

/// Relativer Pfad der Gebäudetabelle im Datensatz.
pub const BUILDING_TABLE: &str = "BuildingData/buildingData.csv";

/// Platziert ein Gebäude-Feature pro Tabellenzeile.
#[derive(Debug, Clone)]
pub struct BuildingPlacer {
    prefab: String,
    ray_height: f64,
    miss_policy: MissPolicy,
}

impl BuildingPlacer {
    /// Erstellt den Platzierer aus den Optionen.
    pub fn new(options: &PlacementOptions) -> Self {
        Self {
            prefab: options.prefabs.building.clone(),
            ray_height: options.ray_height,
            miss_policy: options.miss_policy,
        }
    }

    /// Pfad der Gebäudetabelle eines Datensatz-Verzeichnisses
    pub fn table_path(dataset_dir: &Path) -> PathBuf {
        dataset_dir.join(BUILDING_TABLE)
    }
}

impl FeaturePlacer for BuildingPlacer {
    fn category(&self) -> Category {
        Category::Buildings
    }

    fn spawn_all(
        &self,
        ctx: &PlacementContext<'_>,
        holder: &mut NodeTree,
    ) -> Result<SpawnOutcome, StagedError> {
        let path = Self::table_path(ctx.dataset_dir);
        let records = table::load(&path, ColumnLayout::BUILDINGS)
            .map_err(|e| StagedError::new(Stage::LoadRecords, e))?;

        let mut outcome = SpawnOutcome::default();
        holder.children.reserve(records.len());

        for (index, record) in records.iter().enumerate() {
            let resolved =
                match placement::resolve(ctx.surface, ctx.frame, record, self.ray_height) {
                    Ok(resolved) => resolved,
                    Err(err @ PlacementError::NoSurfaceHit { .. })
                        if self.miss_policy == MissPolicy::Skip =>
                    {
                        log::warn!("Gebäude übersprungen: {}", err);
                        outcome.warnings.push(PlacementWarning {
                            line: record.line,
                            message: err.to_string(),
                        });
                        continue;
                    }
                    Err(err) => return Err(StagedError::new(Stage::PlaceFeatures, err)),
                };

            holder.children.push(NodeTree::new(
                format!("Building {index}"),
                LocalTransform {
                    position: resolved.local_position,
                    ..LocalTransform::default()
                },
                NodeKind::Feature {
                    prefab: self.prefab.clone(),
                    height: record.height,
                },
            ));
            outcome.placed += 1;
        }

        log::info!(
            "{} von {} Gebäuden platziert ({})",
            outcome.placed,
            records.len(),
            ctx.dataset_id
        );
        Ok(outcome)
    }
}
