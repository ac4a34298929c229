//! Geo Feature Placer Library.
//! Platziert georeferenzierte Tabellen- und Rasterdaten auf einer Terrain-Oberfläche.

pub mod app;
pub mod core;
pub mod shared;
pub mod table;

pub use app::{
    await_ready, BuildError, BuildReport, CancelToken, DirectoryRasterSource, FeaturePlacer,
    MapSurface, PlacementSession, RasterSource, SceneBuilder, ScopeResolver, SessionReport,
    TomlScopeResolver, WaitError, WaitOptions,
};
pub use core::{
    Category, CoordinateFrame, DatasetScope, FeatureRecord, GeoPosition, GeoSize,
    HeightmapSurface, PlacementError, Scene, SessionError, Stage, SurfaceSettings, TerrainSurface,
};
pub use shared::{MissPolicy, PlacementOptions};
