//! Vollständiger Szenen-Aufbau für einen Datensatz.
//!
//! Reihenfolge: auf Oberfläche warten → Kartenzentrum setzen →
//! Gebäude → Wolken → Strahlung. Jeder Schritt wird im `CommandLog` vermerkt.

use thiserror::Error;

use super::command_log::{BuildCommand, CommandLog};
use super::raster::RasterSource;
use super::readiness::{await_ready, CancelToken, WaitError, WaitOptions};
use super::scope::{CachedScopeResolver, ScopeResolver};
use super::session::{PlacementSession, SessionReport};
use crate::core::{
    Category, GeoPosition, HeightmapSurface, PlacementError, Scene, SessionError, TerrainSurface,
};
use crate::shared::PlacementOptions;

/// Oberfläche, deren geographisches Zentrum verschoben werden kann.
pub trait MapSurface: TerrainSurface {
    /// Setzt das Kartenzentrum.
    fn set_center(&mut self, center: GeoPosition);
}

impl MapSurface for HeightmapSurface {
    fn set_center(&mut self, center: GeoPosition) {
        HeightmapSurface::set_center(self, center);
    }
}

/// Fehler beim Szenen-Aufbau.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Oberfläche nicht bereit oder Abbruch
    #[error(transparent)]
    Wait(#[from] WaitError),
    /// Scope vor der ersten Session nicht auflösbar oder ungültig
    #[error("dataset '{dataset}': {source}")]
    Scope {
        /// Datensatz-ID
        dataset: String,
        /// Ursprünglicher Fehler
        #[source]
        source: PlacementError,
    },
    /// Eine Session ist fehlgeschlagen
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Ergebnis eines vollständigen Aufbaus.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildReport {
    /// Gesetztes Kartenzentrum
    pub center: GeoPosition,
    /// Session-Berichte in Build-Reihenfolge
    pub sessions: Vec<SessionReport>,
}

/// Baut alle Kategorien eines Datensatzes in fester Reihenfolge auf.
pub struct SceneBuilder<'a> {
    options: &'a PlacementOptions,
    scopes: CachedScopeResolver<&'a dyn ScopeResolver>,
    rasters: &'a dyn RasterSource,
    log: CommandLog,
}

impl<'a> SceneBuilder<'a> {
    /// Erstellt einen Builder; Scopes werden für seine Lebensdauer gecacht.
    pub fn new(
        options: &'a PlacementOptions,
        scopes: &'a dyn ScopeResolver,
        rasters: &'a dyn RasterSource,
    ) -> Self {
        Self {
            options,
            scopes: CachedScopeResolver::new(scopes),
            rasters,
            log: CommandLog::new(),
        }
    }

    /// Protokoll der ausgeführten Schritte
    pub fn command_log(&self) -> &CommandLog {
        &self.log
    }

    /// Führt den vollständigen Aufbau aus.
    ///
    /// Ein Abbruch vor einer Session lässt die Szene für alle noch nicht
    /// gestarteten Kategorien unverändert.
    pub fn build<S: MapSurface>(
        &mut self,
        dataset_id: &str,
        scene: &mut Scene,
        surface: &mut S,
        token: &CancelToken,
    ) -> Result<BuildReport, BuildError> {
        let ready = await_ready(&*surface, token, &WaitOptions::from_options(self.options))?;
        self.log
            .record(BuildCommand::AwaitSurface { polls: ready.polls });

        let scope = self
            .scopes
            .scope(dataset_id)
            .and_then(|scope| scope.validate().map(|()| scope))
            .map_err(|source| BuildError::Scope {
                dataset: dataset_id.to_string(),
                source,
            })?;

        let center = scope.center();
        surface.set_center(center);
        self.log.record(BuildCommand::CenterMap { center });

        let session = PlacementSession::new(self.options, &self.scopes, self.rasters);
        let mut sessions = Vec::with_capacity(Category::BUILD_ORDER.len());
        for category in Category::BUILD_ORDER {
            if token.is_cancelled() {
                log::info!("Szenen-Aufbau vor '{}' abgebrochen", category);
                return Err(WaitError::Cancelled.into());
            }

            let report = session.run(
                category,
                dataset_id,
                scene,
                &*surface,
                self.options.rotation_degrees,
            )?;
            self.log.record(BuildCommand::PlaceCategory {
                category,
                dataset: dataset_id.to_string(),
                placed: report.placed,
                skipped: report.warnings.len(),
            });
            sessions.push(report);
        }

        log::info!(
            "Szene für '{}' aufgebaut: {} Knoten",
            dataset_id,
            scene.len()
        );
        Ok(BuildReport { center, sessions })
    }
}
