//! Application-Layer: Collaborators, Platzierer, Sessions und Szenen-Aufbau.

pub mod builder;
pub mod command_log;
/// Kategorie-Platzierer (Gebäude, Overlays) hinter dem `FeaturePlacer`-Trait.
pub mod placers;
pub mod raster;
pub mod readiness;
pub mod scope;
pub mod session;

pub use builder::{BuildError, BuildReport, MapSurface, SceneBuilder};
pub use command_log::{BuildCommand, CommandLog};
pub use placers::{FeaturePlacer, PlacementContext, PlacementWarning, SpawnOutcome, StagedError};
pub use raster::{DirectoryRasterSource, RasterImage, RasterKind, RasterSource};
pub use readiness::{await_ready, CancelToken, Ready, WaitError, WaitOptions};
pub use scope::{CachedScopeResolver, FileAttributes, ScopeResolver, TomlScopeResolver};
pub use session::{PlacementSession, SessionReport};
