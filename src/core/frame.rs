//! Lokales Koordinaten-Frame einer Platzierungs-Session.

use glam::DVec3;

use super::surface::TerrainSurface;
use super::{DatasetScope, PlacementError};

/// Maßstab und Weltanker, gemeinsam für alle Features einer Session.
///
/// Einmal pro (Oberfläche, Scope)-Paar gebaut und danach nicht mehr verändert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    meters_per_unit: f64,
    world_anchor: DVec3,
    rotation_degrees: f32,
}

impl CoordinateFrame {
    /// Baut das Frame für Oberfläche und Scope.
    ///
    /// `meters_per_unit` = Maßstab am Anker / Welt-Skalierung der Oberfläche (X).
    pub fn build(
        surface: &dyn TerrainSurface,
        scope: &DatasetScope,
        rotation_degrees: f32,
    ) -> Result<Self, PlacementError> {
        let ratio = surface.to_world_scale_ratio(&scope.position);
        let scale_x = surface.transform().scale.x;
        let meters_per_unit = ratio / scale_x;

        if !(meters_per_unit.is_finite() && meters_per_unit > 0.0) {
            return Err(PlacementError::invalid_scope(format!(
                "meters per unit must be positive, got {meters_per_unit} (ratio {ratio}, surface scale {scale_x})"
            )));
        }

        let world_anchor = surface.anchor_to_world(&scope.position);

        log::debug!(
            "Frame gebaut: {:.6} m/Einheit, Anker ({:.3}, {:.3}, {:.3}), Rotation {}°",
            meters_per_unit,
            world_anchor.x,
            world_anchor.y,
            world_anchor.z,
            rotation_degrees
        );

        Ok(Self {
            meters_per_unit,
            world_anchor,
            rotation_degrees,
        })
    }

    /// Frame aus bekannten Werten (z.B. für Tests oder vorab berechnete Szenen).
    pub fn from_parts(
        meters_per_unit: f64,
        world_anchor: DVec3,
        rotation_degrees: f32,
    ) -> Result<Self, PlacementError> {
        if !(meters_per_unit.is_finite() && meters_per_unit > 0.0) {
            return Err(PlacementError::invalid_scope(format!(
                "meters per unit must be positive, got {meters_per_unit}"
            )));
        }
        Ok(Self {
            meters_per_unit,
            world_anchor,
            rotation_degrees,
        })
    }

    /// Reale Meter pro Oberflächen-Einheit am Anker
    pub fn meters_per_unit(&self) -> f64 {
        self.meters_per_unit
    }

    /// Weltposition des geographischen Ankers
    pub fn world_anchor(&self) -> DVec3 {
        self.world_anchor
    }

    /// Gier-Winkel aller Offsets dieser Session
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation_degrees
    }
}
