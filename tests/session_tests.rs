//! Integrationstests für Platzierungs-Sessions:
//! - Gebäude, Strahlung und Wolken auf einer flachen Oberfläche
//! - idempotenter Neuaufbau und Aufräumen nach Fehlern
//! - Miss-Policy (Skip/Abort)

mod common;

use approx::assert_relative_eq;
use common::{flat_surface, raised_surface, Fixture, DATASET};
use geo_feature_placer::core::{NodeKind, NodeTree};
use geo_feature_placer::{
    Category, DirectoryRasterSource, GeoPosition, MissPolicy, PlacementError, PlacementOptions,
    PlacementSession, Scene, SessionError, SessionReport, Stage, TomlScopeResolver,
};

fn run(
    fixture: &Fixture,
    options: &PlacementOptions,
    category: Category,
    scene: &mut Scene,
    rotation: f32,
) -> Result<SessionReport, SessionError> {
    let scopes = TomlScopeResolver::new(fixture.data_root());
    let rasters = DirectoryRasterSource::new(fixture.data_root());
    let surface = flat_surface(GeoPosition::new(0.0, 0.0, 0.0));
    PlacementSession::new(options, &scopes, &rasters).run(category, DATASET, scene, &surface, rotation)
}

fn holder_snapshot(scene: &Scene, name: &str) -> Option<NodeTree> {
    let ids = scene.children_named(scene.root(), name);
    assert!(ids.len() <= 1, "Höchstens ein Holder pro Name erwartet");
    ids.first().and_then(|id| scene.snapshot(*id))
}

#[test]
fn test_buildings_land_at_their_metric_offsets() {
    let fixture = Fixture::new();
    // Spalte 0 = Y-Offset, Spalte 1 = X-Offset
    fixture.buildings("50,100,12\n0,0,3\n-20,300,7.5\n");
    let mut scene = Scene::new("Map");

    let report = run(&fixture, &fixture.options(), Category::Buildings, &mut scene, 0.0)
        .expect("Session erfolgreich");
    assert_eq!(report.placed, 3);
    assert!(report.warnings.is_empty());

    let holder = holder_snapshot(&scene, "Building Holder").expect("Holder vorhanden");
    assert_eq!(holder.children.len(), 3);
    assert_eq!(holder.children[0].name, "Building 0");

    let expected = [(100.0, 50.0, 12.0), (0.0, 0.0, 3.0), (300.0, -20.0, 7.5)];
    for (child, (x, z, h)) in holder.children.iter().zip(expected) {
        assert_relative_eq!(child.transform.position.x, x, epsilon = 1e-6);
        assert_relative_eq!(child.transform.position.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(child.transform.position.z, z, epsilon = 1e-6);
        match &child.kind {
            NodeKind::Feature { prefab, height } => {
                assert_eq!(prefab, "Small Building");
                assert_eq!(*height, h);
            }
            other => panic!("Feature erwartet, erhalten: {other:?}"),
        }
    }

    match holder.kind {
        NodeKind::Holder { pin } => assert_eq!(pin, GeoPosition::new(0.0, 0.0, 0.0)),
        other => panic!("Holder erwartet, erhalten: {other:?}"),
    }
}

#[test]
fn test_holder_carries_session_rotation() {
    let fixture = Fixture::new();
    fixture.buildings("50,100,12\n");
    let mut scene = Scene::new("Map");

    run(&fixture, &fixture.options(), Category::Buildings, &mut scene, 90.0).expect("Session");

    let holder = holder_snapshot(&scene, "Building Holder").expect("Holder");
    assert_eq!(holder.transform.yaw_degrees, 90.0);
    // Position im rotierten Holder-Raum bleibt der metrische Offset
    let child = &holder.children[0];
    assert_relative_eq!(child.transform.position.x, 100.0, epsilon = 1e-6);
    assert_relative_eq!(child.transform.position.z, 50.0, epsilon = 1e-6);
}

#[test]
fn test_rebuild_is_idempotent() {
    let fixture = Fixture::new();
    fixture.buildings("50,100,12\n10,20,5\n");
    let options = fixture.options();
    let mut scene = Scene::new("Map");

    let first = run(&fixture, &options, Category::Buildings, &mut scene, -3.1).expect("1. Lauf");
    let after_first = scene.snapshot(scene.root()).expect("Wurzel");
    let second = run(&fixture, &options, Category::Buildings, &mut scene, -3.1).expect("2. Lauf");
    let after_second = scene.snapshot(scene.root()).expect("Wurzel");

    assert_eq!(first.removed_stale, 0);
    assert_eq!(second.removed_stale, 3);
    assert_eq!(after_first, after_second);
    assert_eq!(scene.children_named(scene.root(), "Building Holder").len(), 1);
}

#[test]
fn test_failed_session_leaves_no_holder() {
    let fixture = Fixture::new();
    fixture.buildings("50,100,12\n");
    let options = fixture.options();
    let mut scene = Scene::new("Map");
    run(&fixture, &options, Category::Buildings, &mut scene, 0.0).expect("gültiger Lauf");

    fixture.buildings("50,100,12\n1.0,x,3.0\n");
    let err = run(&fixture, &options, Category::Buildings, &mut scene, 0.0)
        .expect_err("Format-Fehler erwartet");

    assert_eq!(err.stage, Stage::LoadRecords);
    assert_eq!(err.category, Category::Buildings);
    assert!(matches!(
        err.source,
        PlacementError::Format {
            line: 1,
            column: Some(1),
            ..
        }
    ));
    let message = err.to_string();
    assert!(message.contains(DATASET), "{message}");
    assert!(message.contains("line 1, column 1"), "{message}");

    assert!(scene.children_named(scene.root(), "Building Holder").is_empty());
    assert!(scene.is_empty());
}

#[test]
fn test_missing_building_table_is_not_found() {
    let fixture = Fixture::new();
    let mut scene = Scene::new("Map");
    let err = run(&fixture, &fixture.options(), Category::Buildings, &mut scene, 0.0)
        .expect_err("NotFound erwartet");
    assert_eq!(err.stage, Stage::LoadRecords);
    assert!(matches!(err.source, PlacementError::NotFound { .. }));
}

#[test]
fn test_skip_policy_reports_out_of_extent_features() {
    let fixture = Fixture::new();
    fixture.buildings("0,0,1\n0,5000,2\n10,10,3\n");
    let mut scene = Scene::new("Map");

    let report = run(&fixture, &fixture.options(), Category::Buildings, &mut scene, 0.0)
        .expect("Skip lässt die Session bestehen");

    assert_eq!(report.placed, 2);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].line, 1);
    let holder = holder_snapshot(&scene, "Building Holder").expect("Holder");
    let names: Vec<&str> = holder.children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Building 0", "Building 2"]);
}

#[test]
fn test_abort_policy_fails_session_on_miss() {
    let fixture = Fixture::new();
    fixture.buildings("0,0,1\n0,5000,2\n");
    let options = PlacementOptions {
        miss_policy: MissPolicy::Abort,
        ..fixture.options()
    };
    let mut scene = Scene::new("Map");

    let err = run(&fixture, &options, Category::Buildings, &mut scene, 0.0)
        .expect_err("Abbruch erwartet");
    assert_eq!(err.stage, Stage::PlaceFeatures);
    assert!(matches!(
        err.source,
        PlacementError::NoSurfaceHit { line: 1, .. }
    ));
    assert!(scene.is_empty());
}

#[test]
fn test_invalid_scope_fails_before_touching_the_scene() {
    let fixture = Fixture::with_scope(0.0, 0.0, 0.0, 800.0);
    fixture.buildings("0,0,1\n");
    let mut scene = Scene::new("Map");

    let err = run(&fixture, &fixture.options(), Category::Buildings, &mut scene, 0.0)
        .expect_err("InvalidScope erwartet");
    assert_eq!(err.stage, Stage::ResolveScope);
    assert!(matches!(err.source, PlacementError::InvalidScope { .. }));
}

#[test]
fn test_radiation_overlay_binds_rasters_and_scales_by_distortion() {
    let fixture = Fixture::with_scope(60.0, 0.0, 2000.0, 1500.0);
    fixture.png("RadiationData/radiation_0.png", 16, 8);
    fixture.png("HeightMap/heightmap.png", 32, 32);
    let mut scene = Scene::new("Map");

    let scopes = TomlScopeResolver::new(fixture.data_root());
    let rasters = DirectoryRasterSource::new(fixture.data_root());
    let surface = flat_surface(GeoPosition::new(60.0, 0.0, 0.0));
    let options = fixture.options();
    let report = PlacementSession::new(&options, &scopes, &rasters)
        .run(Category::Radiation, DATASET, &mut scene, &surface, 0.0)
        .expect("Session");
    assert_eq!(report.placed, 1);

    let holder = holder_snapshot(&scene, "Radiation Holder").expect("Holder");
    assert_eq!(holder.children.len(), 1);
    let overlay = &holder.children[0];
    assert_relative_eq!(overlay.transform.scale.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(overlay.transform.scale.y, 2.0, epsilon = 1e-12);
    assert_relative_eq!(overlay.transform.scale.z, 4.0, epsilon = 1e-9);

    match &overlay.kind {
        NodeKind::Overlay {
            prefab,
            lod_size,
            bindings,
        } => {
            assert_eq!(prefab, "Radiation");
            assert_eq!(*lod_size, 2000.0);
            assert_eq!(bindings.len(), 2);
            assert_eq!(bindings[0].property, "_RadiationMap");
            assert_eq!((bindings[0].width, bindings[0].height), (16, 8));
            assert_eq!(bindings[1].property, "_Heightmap");
            assert_eq!((bindings[1].width, bindings[1].height), (32, 32));
        }
        other => panic!("Overlay erwartet, erhalten: {other:?}"),
    }
}

#[test]
fn test_missing_radiation_raster_fails_in_load_stage() {
    let fixture = Fixture::new();
    fixture.png("HeightMap/heightmap.png", 4, 4);
    let mut scene = Scene::new("Map");

    let err = run(&fixture, &fixture.options(), Category::Radiation, &mut scene, 0.0)
        .expect_err("Raster fehlt");
    assert_eq!(err.stage, Stage::LoadRaster);
    assert!(matches!(err.source, PlacementError::NotFound { .. }));
    assert!(holder_snapshot(&scene, "Radiation Holder").is_none());
}

#[test]
fn test_clouds_use_wind_raster() {
    let fixture = Fixture::new();
    fixture.png("WindData/wind_0.png", 8, 8);
    let mut scene = Scene::new("Map");

    run(&fixture, &fixture.options(), Category::Clouds, &mut scene, 0.0).expect("Session");

    let holder = holder_snapshot(&scene, "Cloud Holder").expect("Holder");
    match &holder.children[0].kind {
        NodeKind::Overlay {
            prefab, bindings, ..
        } => {
            assert_eq!(prefab, "Cloud Miniature");
            assert_eq!(bindings.len(), 1);
            assert_eq!(bindings[0].property, "_WindMap");
        }
        other => panic!("Overlay erwartet, erhalten: {other:?}"),
    }
}

#[test]
fn test_categories_keep_separate_holders() {
    let fixture = Fixture::new();
    fixture.buildings("0,0,1\n");
    fixture.png("WindData/wind_0.png", 8, 8);
    let options = fixture.options();
    let mut scene = Scene::new("Map");

    run(&fixture, &options, Category::Buildings, &mut scene, 0.0).expect("Gebäude");
    run(&fixture, &options, Category::Clouds, &mut scene, 0.0).expect("Wolken");
    run(&fixture, &options, Category::Buildings, &mut scene, 0.0).expect("Gebäude erneut");

    assert_eq!(scene.children(scene.root()).len(), 2);
    assert!(holder_snapshot(&scene, "Cloud Holder").is_some());
}

#[test]
fn test_buildings_land_on_terrain_above_anchor_altitude() {
    let fixture = Fixture::new();
    fixture.buildings("0,0,4\n50,100,12\n");
    let options = fixture.options();
    let scopes = TomlScopeResolver::new(fixture.data_root());
    let rasters = DirectoryRasterSource::new(fixture.data_root());
    let surface = raised_surface(GeoPosition::new(0.0, 0.0, 0.0));
    let mut scene = Scene::new("Map");

    let report = PlacementSession::new(&options, &scopes, &rasters)
        .run(Category::Buildings, DATASET, &mut scene, &surface, 0.0)
        .expect("Session erfolgreich");
    assert_eq!(report.placed, 2);
    assert!(report.warnings.is_empty());

    let holder = holder_snapshot(&scene, "Building Holder").expect("Holder vorhanden");
    for child in &holder.children {
        assert_relative_eq!(child.transform.position.y, 50.0, epsilon = 1e-6);
    }
    assert_relative_eq!(holder.children[1].transform.position.x, 100.0, epsilon = 1e-6);
}
