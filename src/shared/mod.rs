//! Geteilte Konfiguration für Core, App-Layer und CLI.

pub mod options;

pub use options::{
    MissPolicy, OverlayBindings, PlacementOptions, PrefabNames, DEFAULT_ROTATION_DEGREES,
    OVERLAY_REFERENCE_SIZE_M, RAY_HEIGHT,
};
