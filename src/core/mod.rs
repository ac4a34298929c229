//! Core-Domänentypen und Platzierungs-Algorithmen.
//!
//! Synchron und ohne I/O, bis auf das Laden von Heightmaps.

pub mod category;
pub mod distortion;
pub mod error;
pub mod frame;
pub mod geo;
pub mod heightmap;
pub mod heightmap_surface;
pub mod placement;
pub mod record;
pub mod scene;
pub mod surface;

pub use category::Category;
pub use error::{PlacementError, SessionError, Stage};
pub use frame::CoordinateFrame;
pub use geo::{DatasetScope, GeoPosition, GeoSize};
pub use heightmap::{Heightmap, WorldBounds};
pub use heightmap_surface::{HeightmapSurface, SurfaceSettings};
pub use placement::{resolve, ResolvedPlacement, DEFAULT_RAY_HEIGHT};
pub use record::FeatureRecord;
pub use scene::{LocalTransform, NodeId, NodeKind, NodeTree, RasterBinding, Scene, SceneNode};
pub use surface::{Ray, RayHit, SurfaceTransform, TerrainSurface};
