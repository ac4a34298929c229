//! Heightmap-basierte Terrain-Oberfläche mit Web-Mercator-Georeferenz.
//!
//! Lokale Einheiten entsprechen `mercator_meters_per_unit` Mercator-Metern.
//! Der reale Maßstab schrumpft daher mit `cos(lat)`, genau wie bei einer
//! Kachel-Karte im Mercator-Raster.

use std::f64::consts::FRAC_PI_4;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use glam::{DQuat, DVec3};
use serde::{Deserialize, Serialize};

use super::heightmap::{Heightmap, WorldBounds};
use super::surface::{Ray, RayHit, SurfaceTransform, TerrainSurface};
use super::GeoPosition;

/// WGS84-Äquatorradius in Metern.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Anzahl Schritte beim schrägen Ray-Marching.
const MARCH_STEPS: usize = 1024;

/// Bisektions-Iterationen zur Verfeinerung eines Treffers.
const REFINE_ITERATIONS: usize = 48;

/// Serialisierbare Beschreibung einer Heightmap-Oberfläche.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SurfaceSettings {
    /// Mercator-Meter pro lokaler Einheit
    pub mercator_meters_per_unit: f64,
    /// Kantenlänge der Oberfläche in lokalen Einheiten
    pub extent: f64,
    /// Höhenskala: normalisierter Pixelwert × Skala = lokale Höhe
    pub height_scale: f64,
    /// Optionale Heightmap-Datei; ohne Datei ist die Oberfläche flach
    #[serde(default)]
    pub heightmap: Option<PathBuf>,
    /// Weltposition der Oberfläche
    #[serde(default)]
    pub position: [f64; 3],
    /// Gier-Rotation der Oberfläche in Grad
    #[serde(default)]
    pub yaw_degrees: f64,
    /// Welt-Skalierung der Oberfläche
    #[serde(default = "default_scale")]
    pub scale: [f64; 3],
    /// Geographisches Kartenzentrum (lokaler Ursprung)
    #[serde(default)]
    pub center: GeoPosition,
}

fn default_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            mercator_meters_per_unit: 1.0,
            extent: 4096.0,
            height_scale: 1.0,
            heightmap: None,
            position: [0.0; 3],
            yaw_degrees: 0.0,
            scale: default_scale(),
            center: GeoPosition::default(),
        }
    }
}

impl SurfaceSettings {
    /// Prüft Ausdehnung, Maßstab und Skalierung auf positive, endliche Werte.
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.extent) {
            anyhow::bail!("Oberflächen-Ausdehnung muss positiv sein, nicht {}", self.extent);
        }
        if !positive(self.mercator_meters_per_unit) {
            anyhow::bail!(
                "Mercator-Meter pro Einheit müssen positiv sein, nicht {}",
                self.mercator_meters_per_unit
            );
        }
        if !self.height_scale.is_finite() || self.height_scale < 0.0 {
            anyhow::bail!("Ungültige Höhenskala: {}", self.height_scale);
        }
        if !self.scale.iter().copied().all(positive) {
            anyhow::bail!("Skalierung muss in allen Achsen positiv sein: {:?}", self.scale);
        }
        Ok(())
    }

    /// Welt-Transform aus Position, Gier-Winkel und Skalierung.
    pub fn transform(&self) -> SurfaceTransform {
        SurfaceTransform {
            position: DVec3::from_array(self.position),
            rotation: DQuat::from_rotation_y(self.yaw_degrees.to_radians()),
            scale: DVec3::from_array(self.scale),
        }
    }
}

/// Terrain-Oberfläche aus Heightmap, Georeferenz und Welt-Transform.
#[derive(Debug)]
pub struct HeightmapSurface {
    heightmap: Heightmap,
    center: GeoPosition,
    mercator_meters_per_unit: f64,
    height_scale: f64,
    transform: SurfaceTransform,
    loaded: AtomicBool,
}

impl HeightmapSurface {
    /// Erstellt eine Oberfläche aus einer Heightmap.
    pub fn new(
        heightmap: Heightmap,
        center: GeoPosition,
        mercator_meters_per_unit: f64,
        height_scale: f64,
        transform: SurfaceTransform,
    ) -> Self {
        Self {
            heightmap,
            center,
            mercator_meters_per_unit,
            height_scale,
            transform,
            loaded: AtomicBool::new(true),
        }
    }

    /// Baut die Oberfläche aus Einstellungen; lädt ggf. die Heightmap-Datei.
    pub fn from_settings(settings: &SurfaceSettings) -> Result<Self> {
        settings.validate()?;
        let bounds = WorldBounds::from_map_size(settings.extent);
        let heightmap = match &settings.heightmap {
            Some(path) => Heightmap::load(path, bounds)?,
            None => {
                log::info!("Keine Heightmap konfiguriert, Oberfläche ist flach");
                Heightmap::flat(bounds, 0.0)
            }
        };

        Ok(Self::new(
            heightmap,
            settings.center,
            settings.mercator_meters_per_unit,
            settings.height_scale,
            settings.transform(),
        ))
    }

    /// Setzt das geographische Kartenzentrum neu.
    pub fn set_center(&mut self, center: GeoPosition) {
        log::info!(
            "Kartenzentrum gesetzt: ({:.6}, {:.6})",
            center.lat,
            center.lon
        );
        self.center = center;
    }

    /// Aktuelles Kartenzentrum
    pub fn center(&self) -> GeoPosition {
        self.center
    }

    /// Setzt das Lade-Signal (z.B. nach Abschluss eines Hintergrund-Ladevorgangs).
    pub fn set_loaded(&self, loaded: bool) {
        self.loaded.store(loaded, Ordering::Release);
    }

    /// Zugrunde liegende Heightmap
    pub fn heightmap(&self) -> &Heightmap {
        &self.heightmap
    }

    fn mercator(position: &GeoPosition) -> (f64, f64) {
        let x = EARTH_RADIUS_M * position.lon.to_radians();
        let y = EARTH_RADIUS_M * (FRAC_PI_4 + position.lat.to_radians() / 2.0).tan().ln();
        (x, y)
    }

    fn local_height(&self, x: f64, z: f64) -> Option<f64> {
        self.heightmap.sample_height(x, z, self.height_scale)
    }

    fn local_normal(&self, x: f64, z: f64) -> DVec3 {
        let eps = 1e-3;
        let h = |dx: f64, dz: f64| self.local_height(x + dx, z + dz);
        let center = h(0.0, 0.0).unwrap_or(0.0);
        let dhdx = match (h(eps, 0.0), h(-eps, 0.0)) {
            (Some(a), Some(b)) => (a - b) / (2.0 * eps),
            (Some(a), None) => (a - center) / eps,
            (None, Some(b)) => (center - b) / eps,
            (None, None) => 0.0,
        };
        let dhdz = match (h(0.0, eps), h(0.0, -eps)) {
            (Some(a), Some(b)) => (a - b) / (2.0 * eps),
            (Some(a), None) => (a - center) / eps,
            (None, Some(b)) => (center - b) / eps,
            (None, None) => 0.0,
        };
        DVec3::new(-dhdx, 1.0, -dhdz).normalize()
    }

    fn hit_from_local(&self, local: DVec3) -> RayHit {
        let normal = self.local_normal(local.x, local.z);
        let world_normal = (self.transform.rotation * (normal / self.transform.scale)).normalize();
        RayHit {
            point: self.transform.transform_point(local),
            normal: world_normal,
        }
    }

    /// Marschiert entlang eines schrägen Strahls und verfeinert den ersten
    /// Vorzeichenwechsel per Bisektion.
    fn march(&self, origin: DVec3, direction: DVec3) -> Option<DVec3> {
        let max_t = origin.y.max(0.0) / -direction.y + self.height_scale / -direction.y;
        let step = max_t / MARCH_STEPS as f64;
        let above = |t: f64| {
            let p = origin + direction * t;
            self.local_height(p.x, p.z).map(|h| p.y - h)
        };

        let mut previous_t = 0.0;
        let mut previous = above(0.0);
        for i in 1..=MARCH_STEPS {
            let t = step * i as f64;
            let current = above(t);
            if let (Some(before), Some(now)) = (previous, current) {
                if before >= 0.0 && now <= 0.0 {
                    let (mut lo, mut hi) = (previous_t, t);
                    for _ in 0..REFINE_ITERATIONS {
                        let mid = 0.5 * (lo + hi);
                        match above(mid) {
                            Some(d) if d > 0.0 => lo = mid,
                            _ => hi = mid,
                        }
                    }
                    let p = origin + direction * hi;
                    let h = self.local_height(p.x, p.z)?;
                    return Some(DVec3::new(p.x, h, p.z));
                }
            }
            previous_t = t;
            previous = current;
        }
        None
    }
}

impl TerrainSurface for HeightmapSurface {
    fn to_world_scale_ratio(&self, position: &GeoPosition) -> f64 {
        self.mercator_meters_per_unit * position.lat.to_radians().cos()
    }

    fn anchor_to_world(&self, position: &GeoPosition) -> DVec3 {
        let (x, y) = Self::mercator(position);
        let (cx, cy) = Self::mercator(&self.center);
        let local = DVec3::new(
            (x - cx) / self.mercator_meters_per_unit,
            (position.alt - self.center.alt) / self.to_world_scale_ratio(position),
            (y - cy) / self.mercator_meters_per_unit,
        );
        self.transform.transform_point(local)
    }

    fn raycast(&self, ray: &Ray) -> Option<RayHit> {
        let origin = self.transform.inverse_transform_point(ray.origin);
        let direction = self.transform.inverse_transform_vector(ray.direction);
        let length = direction.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        let direction = direction / length;
        if direction.y >= 0.0 {
            return None;
        }

        let vertical = direction.x.abs() < 1e-12 && direction.z.abs() < 1e-12;
        let local_hit = if vertical {
            let h = self.local_height(origin.x, origin.z)?;
            if origin.y < h {
                return None;
            }
            DVec3::new(origin.x, h, origin.z)
        } else {
            self.march(origin, direction)?
        };

        Some(self.hit_from_local(local_hit))
    }

    fn transform(&self) -> SurfaceTransform {
        self.transform
    }

    fn max_relief(&self) -> f64 {
        self.heightmap.peak() * self.height_scale
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }
}
