//! Platzierung einzelner Features auf der Terrain-Oberfläche.
//!
//! Ablauf pro Record: Meter-Offset → Oberflächen-Einheiten → Gier-Rotation →
//! Strahl von oberhalb des Reliefs → Raycast nach unten → Trefferpunkt zurück
//! in den metrischen Raum des Holders.
//!
//! Rotationskonvention: rechtshändige Drehung um +Y (`DQuat::from_rotation_y`).
//! Positive Winkel drehen +X in Richtung −Z, d.h. der Offset `(100, 50)`
//! wird bei 90° zu `(50, −100)`.

use glam::{DQuat, DVec3};

use super::frame::CoordinateFrame;
use super::surface::{Ray, TerrainSurface};
use super::{FeatureRecord, PlacementError};

/// Standard-Abstand des Strahl-Starts über dem höchsten Punkt aus Relief und
/// Anker (lokale Einheiten).
pub const DEFAULT_RAY_HEIGHT: f64 = 10.0;

/// Ergebnis einer erfolgreichen Platzierung.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedPlacement {
    /// Offset in Oberflächen-Einheiten nach der Gier-Rotation (Y = 0)
    pub rotated_offset: DVec3,
    /// Startpunkt des Boden-Strahls
    pub ray_origin: DVec3,
    /// Trefferpunkt auf der Oberfläche in Weltkoordinaten
    pub world_hit: DVec3,
    /// Position relativ zum Anker im metrischen, rotierten Holder-Raum
    pub local_position: DVec3,
}

/// Gier-Rotation um die vertikale Achse.
pub fn yaw(rotation_degrees: f32) -> DQuat {
    DQuat::from_rotation_y(f64::from(rotation_degrees).to_radians())
}

/// Rechnet den Meter-Offset eines Records in rotierte Oberflächen-Einheiten um.
pub fn rotated_offset(frame: &CoordinateFrame, record: &FeatureRecord) -> DVec3 {
    let local = DVec3::new(
        record.offset_x / frame.meters_per_unit(),
        0.0,
        record.offset_y / frame.meters_per_unit(),
    );
    yaw(frame.rotation_degrees()) * local
}

/// Platziert einen Record auf der Oberfläche.
///
/// Gibt `NoSurfaceHit` zurück, wenn der Strahl die Oberfläche verfehlt
/// (z.B. außerhalb des geladenen Bereichs). Ob das die ganze Session
/// abbricht, entscheidet der Aufrufer.
pub fn resolve(
    surface: &dyn TerrainSurface,
    frame: &CoordinateFrame,
    record: &FeatureRecord,
    ray_height: f64,
) -> Result<ResolvedPlacement, PlacementError> {
    let transform = surface.transform();
    let anchor = frame.world_anchor();
    let offset = rotated_offset(frame, record);

    // Start oberhalb von Relief und Anker, sonst verfehlt der Strahl
    // Gelände, das höher als der Anker liegt.
    let anchor_height = transform.inverse_transform_point(anchor).y;
    let lift = surface.max_relief().max(anchor_height) - anchor_height + ray_height;

    let up = transform.up();
    let ray_origin = anchor
        + transform.right() * offset.x
        + transform.forward() * offset.z
        + up * (lift * transform.scale.y);

    let ray = Ray::new(ray_origin, -up);
    let hit = surface
        .raycast(&ray)
        .ok_or(PlacementError::NoSurfaceHit {
            line: record.line,
            offset_x: record.offset_x,
            offset_y: record.offset_y,
        })?;

    let holder_rotation = transform.rotation * yaw(frame.rotation_degrees());
    let holder_vector = (holder_rotation.inverse() * (hit.point - anchor)) / transform.scale;
    let local_position = holder_vector * (frame.meters_per_unit() * transform.scale.x);

    log::trace!(
        "Record Zeile {}: Offset ({:.2}, {:.2}) -> Treffer ({:.3}, {:.3}, {:.3})",
        record.line,
        record.offset_x,
        record.offset_y,
        hit.point.x,
        hit.point.y,
        hit.point.z
    );

    Ok(ResolvedPlacement {
        rotated_offset: offset,
        ray_origin,
        world_hit: hit.point,
        local_position,
    })
}
