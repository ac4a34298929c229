//! Gemeinsame Fixtures: Datensatz-Verzeichnisse auf Platte und flache Oberflächen.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use geo_feature_placer::core::{Heightmap, SurfaceTransform, WorldBounds};
use geo_feature_placer::{GeoPosition, HeightmapSurface, PlacementOptions};
use image::{GrayImage, Luma};
use tempfile::TempDir;

/// Datensatz-ID aller Fixtures.
pub const DATASET: &str = "delft";

/// Temporäres Datenverzeichnis mit einem Datensatz.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    /// Leerer Datensatz mit Scope am Äquator (1000 m × 800 m).
    pub fn new() -> Self {
        Self::with_scope(0.0, 0.0, 1000.0, 800.0)
    }

    /// Leerer Datensatz mit beliebigem Scope.
    pub fn with_scope(lat: f64, lon: f64, size_x: f64, size_y: f64) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let fixture = Self { dir };
        fixture.write(
            "scope.toml",
            &format!(
                "[position]\nlat = {lat:?}\nlon = {lon:?}\nalt = 0.0\n\n[size]\nx = {size_x:?}\ny = {size_y:?}\n\n[attributes]\ntitle = \"Fixture\"\n"
            ),
        );
        fixture
    }

    /// Wurzel aller Datensätze
    pub fn data_root(&self) -> &Path {
        self.dir.path()
    }

    /// Verzeichnis des Fixture-Datensatzes
    pub fn dataset_dir(&self) -> PathBuf {
        self.dir.path().join(DATASET)
    }

    /// Schreibt eine Datei relativ zum Datensatz-Verzeichnis.
    pub fn write(&self, relative: &str, content: &str) {
        let path = self.dataset_dir().join(relative);
        std::fs::create_dir_all(path.parent().expect("Elternverzeichnis")).expect("mkdir");
        std::fs::write(path, content).expect("write");
    }

    /// Schreibt die Gebäudetabelle.
    pub fn buildings(&self, csv: &str) {
        self.write("BuildingData/buildingData.csv", csv);
    }

    /// Schreibt ein graues PNG relativ zum Datensatz-Verzeichnis.
    pub fn png(&self, relative: &str, width: u32, height: u32) {
        let path = self.dataset_dir().join(relative);
        std::fs::create_dir_all(path.parent().expect("Elternverzeichnis")).expect("mkdir");
        GrayImage::from_pixel(width, height, Luma([200u8]))
            .save(path)
            .expect("PNG schreiben");
    }

    /// Optionen mit diesem Datenverzeichnis
    pub fn options(&self) -> PlacementOptions {
        PlacementOptions {
            data_root: self.data_root().to_path_buf(),
            ..PlacementOptions::default()
        }
    }
}

/// Flache Oberfläche (Höhe 0, 4096 Einheiten), Zentrum = `center`, 1 Mercator-Meter pro Einheit.
pub fn flat_surface(center: GeoPosition) -> HeightmapSurface {
    flat_surface_with(center, SurfaceTransform::default())
}

/// Flache Oberfläche mit beliebigem Welt-Transform.
pub fn flat_surface_with(center: GeoPosition, transform: SurfaceTransform) -> HeightmapSurface {
    HeightmapSurface::new(
        Heightmap::flat(WorldBounds::from_map_size(4096.0), 0.0),
        center,
        1.0,
        1.0,
        transform,
    )
}

/// Ebene Oberfläche deutlich über Meereshöhe: normalisiert 0.5 × Skala 100 = 50 Einheiten.
pub fn raised_surface(center: GeoPosition) -> HeightmapSurface {
    HeightmapSurface::new(
        Heightmap::flat(WorldBounds::from_map_size(4096.0), 0.5),
        center,
        1.0,
        100.0,
        SurfaceTransform::default(),
    )
}
