//! Terrain-Oberfläche als Collaborator-Schnittstelle.
//!
//! Die Platzierungs-Pipeline kennt die Oberfläche nur über `TerrainSurface`:
//! Maßstab am Anker, Geo→Welt-Transformation, Raycast und Welt-Transform.

use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use super::GeoPosition;

/// Welt-Transform der Oberfläche (Position, Rotation, nicht-uniforme Skalierung).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceTransform {
    /// Weltposition des lokalen Ursprungs
    pub position: DVec3,
    /// Welt-Rotation
    pub rotation: DQuat,
    /// Welt-Skalierung pro Achse
    pub scale: DVec3,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl SurfaceTransform {
    /// Lokale X-Achse in Weltkoordinaten
    pub fn right(&self) -> DVec3 {
        self.rotation * DVec3::X
    }

    /// Lokale Y-Achse in Weltkoordinaten
    pub fn up(&self) -> DVec3 {
        self.rotation * DVec3::Y
    }

    /// Lokale Z-Achse in Weltkoordinaten
    pub fn forward(&self) -> DVec3 {
        self.rotation * DVec3::Z
    }

    /// Lokaler Punkt → Weltpunkt
    pub fn transform_point(&self, local: DVec3) -> DVec3 {
        self.position + self.rotation * (local * self.scale)
    }

    /// Weltpunkt → lokaler Punkt
    pub fn inverse_transform_point(&self, world: DVec3) -> DVec3 {
        (self.rotation.inverse() * (world - self.position)) / self.scale
    }

    /// Weltrichtung → lokale Richtung (ohne Translation, mit Skalierung)
    pub fn inverse_transform_vector(&self, world: DVec3) -> DVec3 {
        (self.rotation.inverse() * world) / self.scale
    }
}

/// Strahl in Weltkoordinaten
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Startpunkt
    pub origin: DVec3,
    /// Richtung (muss nicht normiert sein)
    pub direction: DVec3,
}

impl Ray {
    /// Erstellt einen Strahl.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Punkt bei Parameter `t`
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}

/// Trefferpunkt eines Raycasts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Trefferpunkt in Weltkoordinaten
    pub point: DVec3,
    /// Oberflächennormale in Weltkoordinaten
    pub normal: DVec3,
}

/// Abfrage-Schnittstelle der Terrain-Oberfläche.
pub trait TerrainSurface {
    /// Meter pro lokaler Oberflächen-Einheit an der gegebenen Position.
    fn to_world_scale_ratio(&self, position: &GeoPosition) -> f64;

    /// Geographische Position → Weltpunkt auf der Oberfläche.
    fn anchor_to_world(&self, position: &GeoPosition) -> DVec3;

    /// Erster Schnittpunkt des Strahls mit der Oberfläche.
    fn raycast(&self, ray: &Ray) -> Option<RayHit>;

    /// Aktueller Welt-Transform der Oberfläche.
    fn transform(&self) -> SurfaceTransform;

    /// Höchster Punkt des Reliefs in lokalen Einheiten (lokale Y-Achse).
    fn max_relief(&self) -> f64;

    /// `true` sobald die Oberfläche vollständig geladen ist.
    fn is_loaded(&self) -> bool {
        true
    }
}
