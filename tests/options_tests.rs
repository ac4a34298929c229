//! Integrationstests für Optionen-Datei und Oberflächen-Einstellungen.

use approx::assert_relative_eq;
use geo_feature_placer::core::{Ray, TerrainSurface};
use geo_feature_placer::{
    HeightmapSurface, MissPolicy, PlacementOptions, SurfaceSettings,
};
use glam::DVec3;
use image::{ImageBuffer, Luma};

#[test]
fn test_options_survive_save_and_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("geo_feature_placer.toml");

    let mut options = PlacementOptions::default();
    options.miss_policy = MissPolicy::Abort;
    options.rotation_degrees = 12.5;
    options.overlay_bindings.wind_map = "_Wind".to_string();
    options.surface.center.lat = 51.99;
    options.save_to_file(&path).expect("speichern");

    let loaded = PlacementOptions::load_from_file(&path);
    assert_eq!(loaded, options);
}

#[test]
fn test_broken_options_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("geo_feature_placer.toml");
    std::fs::write(&path, "rotation_degrees = \"schief\"").expect("write");

    assert_eq!(
        PlacementOptions::load_from_file(&path),
        PlacementOptions::default()
    );
}

#[test]
fn test_surface_from_settings_loads_heightmap_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let heightmap_path = dir.path().join("heightmap.png");
    // 16-Bit, vollständig auf halber Höhe
    ImageBuffer::<Luma<u16>, Vec<u16>>::from_pixel(4, 4, Luma([32768u16]))
        .save(&heightmap_path)
        .expect("PNG schreiben");

    let settings: SurfaceSettings = toml::from_str(&format!(
        r#"
            mercator_meters_per_unit = 2.0
            extent = 100.0
            height_scale = 10.0
            heightmap = {:?}
        "#,
        heightmap_path.display().to_string()
    ))
    .expect("parsebar");

    let surface = HeightmapSurface::from_settings(&settings).expect("Oberfläche");
    assert_eq!(surface.heightmap().dimensions(), (4, 4));
    assert_eq!(surface.heightmap().bit_depth(), 16);

    let hit = surface
        .raycast(&Ray::new(DVec3::new(10.0, 50.0, -10.0), DVec3::NEG_Y))
        .expect("Treffer");
    assert_relative_eq!(hit.point.y, 10.0 * 32768.0 / 65535.0, epsilon = 1e-6);

    assert!(surface
        .raycast(&Ray::new(DVec3::new(80.0, 50.0, 0.0), DVec3::NEG_Y))
        .is_none());
}
