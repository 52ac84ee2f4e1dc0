//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::TileError;
use crate::tile_service::{Protocol, TileService};
use serde_json::Value;
use std::io::Write;
use std::path::Path;
use tessel_core::core::{parse_config, ApplicationCfg};
use tessel_core::pyramid::Storage;
use tile_matrix::CrsBook;

const MERC_MAX: f64 = 20037508.3427892480;

fn write_file(path: &Path, content: &str) {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).unwrap();
    }
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn tms_descriptor(crs: &str, levels: u8, cell_size: f64, width: u32, origin: [f64; 2]) -> String {
    let tile_matrices: Vec<Value> = (0..levels)
        .map(|z| {
            json!({
                "id": z.to_string(),
                "cellSize": cell_size / f64::from(z).exp2(),
                "tileWidth": 256,
                "tileHeight": 256,
                "matrixWidth": width << z,
                "matrixHeight": 1u32 << z,
                "pointOfOrigin": origin
            })
        })
        .collect();
    json!({ "crs": crs, "tileMatrices": tile_matrices }).to_string()
}

/// PM levels 3 to 6, level 6 limited to rows 21..22 and the given columns
fn pyramid_descriptor(min_col: u32, max_col: u32) -> String {
    let levels: Vec<Value> = (3..=6u32)
        .map(|z| {
            let max = (1u32 << z) - 1;
            let limits = if z == 6 {
                json!({ "min_row": 21, "max_row": 22, "min_col": min_col, "max_col": max_col })
            } else {
                json!({ "min_row": 0, "max_row": max, "min_col": 0, "max_col": max })
            };
            json!({
                "id": z.to_string(),
                "storage": { "type": "FILE", "image_directory": format!("ortho/{}", z), "path_depth": 2 },
                "tiles_per_width": 16,
                "tiles_per_height": 16,
                "tile_limits": limits
            })
        })
        .collect();
    json!({
        "tile_matrix_set": "PM",
        "format": "TIFF_JPG_UINT8",
        "raster_specifications": { "photometric": "rgb", "channels": 3, "nodata": "255,255,255" },
        "levels": levels
    })
    .to_string()
}

const CONFIG: &str = r#"
[service]
resolution_tolerance = 0.2

[[tms]]
path = "tms/PM.json"

[[tms]]
path = "tms/WGS84G.json"

[[layer]]
id = "ortho"
title = "Orthophotos"
extra_tms = ["WGS84G", "LAMB93"]

[layer.bbox]
west = 1.0
south = 40.0
east = 10.0
north = 50.0

[[layer.pyramid]]
path = "pyramids/ortho.json"
top_level = "3"
bottom_level = "6"

[[layer]]
id = "plan ign"
wmts = false

[[layer.pyramid]]
path = "pyramids/ortho.json"
top_level = "3"
bottom_level = "6"

[[layer]]
id = "world"
extra_tms = ["WGS84G"]

[layer.bbox]
west = -180.0
south = -80.0
east = 180.0
north = 80.0

[[layer.pyramid]]
path = "pyramids/ortho.json"
top_level = "3"
bottom_level = "6"

[[layer]]
id = "border"

[[layer.pyramid]]
path = "pyramids/border.json"
top_level = "3"
bottom_level = "6"

[[layer]]
id = "broken"

[[layer.pyramid]]
path = "pyramids/missing.json"
top_level = "3"
bottom_level = "6"
"#;

const RELOADED_CONFIG: &str = r#"
[[tms]]
path = "tms/PM.json"

[[layer]]
id = "plan ign"

[[layer.pyramid]]
path = "pyramids/ortho.json"
top_level = "3"
bottom_level = "6"
"#;

fn setup(dir: &Path) -> TileService {
    write_file(
        &dir.join("tms/PM.json"),
        &tms_descriptor("EPSG:3857", 8, 156543.0339280410, 1, [-MERC_MAX, MERC_MAX]),
    );
    write_file(
        &dir.join("tms/WGS84G.json"),
        &tms_descriptor("EPSG:4326", 8, 0.703125, 2, [-180.0, 90.0]),
    );
    write_file(&dir.join("pyramids/ortho.json"), &pyramid_descriptor(33, 34));
    // Column 64 is the east border of level 6
    write_file(&dir.join("pyramids/border.json"), &pyramid_descriptor(62, 64));
    write_file(&dir.join("tessel.toml"), CONFIG);
    TileService::from_config_file(dir.join("tessel.toml"), CrsBook::default()).unwrap()
}

#[test]
fn test_load_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());
    let catalog = service.catalog();

    assert_eq!(catalog.tms_book().ids(), vec!["PM", "WGS84G"]);
    let ids: Vec<&str> = catalog.layers().iter().map(|l| l.id()).collect();
    assert_eq!(ids, vec!["ortho", "plan ign", "world", "border"]);
    assert_eq!(catalog.excluded().len(), 1);
    assert_eq!(catalog.excluded()[0].id, "broken");
    assert!(catalog.layer("plan%20ign").is_some());

    let ortho = catalog.layer("ortho").unwrap();
    assert_eq!(ortho.extra_tile_matrix_sets().len(), 1);
    assert_eq!(ortho.diagnostics().len(), 1);
    assert_eq!(ortho.diagnostics()[0].tms, "LAMB93");
}

const CRS_CONFIG: &str = r#"
[[crs]]
code = "EPSG:2056"
proj4 = "+proj=somerc +lat_0=46.9524055555556 +lon_0=7.43958333333333 +k_0=1 +x_0=2600000 +y_0=1200000 +ellps=bessel +towgs84=674.374,15.056,405.346,0,0,0,0 +units=m +no_defs"
area = { west = 5.96, south = 45.82, east = 10.49, north = 47.81 }

[[crs]]
code = "EPSG:1"
proj4 = "+proj=unknown"
area = { west = 0.0, south = 0.0, east = 1.0, north = 1.0 }

[[tms]]
path = "tms/CH.json"

[[tms]]
path = "tms/BROKEN.json"
"#;

#[test]
fn test_configured_crs() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        &dir.path().join("tms/CH.json"),
        &tms_descriptor("EPSG:2056", 4, 4000.0, 1, [2420000.0, 1350000.0]),
    );
    write_file(
        &dir.path().join("tms/BROKEN.json"),
        &tms_descriptor("EPSG:1", 4, 1.0, 1, [0.0, 0.0]),
    );
    write_file(&dir.path().join("tessel.toml"), CRS_CONFIG);
    let service =
        TileService::from_config_file(dir.path().join("tessel.toml"), CrsBook::default()).unwrap();

    let catalog = service.catalog();
    assert_eq!(catalog.tms_book().ids(), vec!["CH"]);
    let ch = catalog.tms_book().get("CH").unwrap();
    assert_eq!(ch.crs().code(), "EPSG:2056");
    let (x, y) = ch.crs().forward(7.43958333333333, 46.9524055555556).unwrap();
    // Projection origin, up to the datum shift
    assert!((x - 2600000.0).abs() < 500.0, "{}", x);
    assert!((y - 1200000.0).abs() < 500.0, "{}", y);
}

#[test]
fn test_missing_config() {
    let dir = tempfile::tempdir().unwrap();
    assert!(TileService::from_config_file(dir.path().join("missing.toml"), CrsBook::default()).is_err());
}

#[test]
fn test_validate_native_tile() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());

    let target = service
        .validate_tile(Protocol::Wmts, "ortho", "PM", "6", 32, 21)
        .unwrap();
    assert_eq!(target.tms, "PM");
    assert_eq!(target.tile_matrix, "6");
    assert_eq!(
        target.storage,
        Some(Storage::File {
            image_directory: dir.path().join("pyramids/ortho/6"),
            path_depth: 2,
        })
    );
    assert!(service
        .validate_tile(Protocol::Tms, "ortho", "PM", "6", 33, 24)
        .is_ok());

    assert_eq!(
        service.validate_tile(Protocol::Wmts, "ortho", "PM", "6", 34, 21),
        Err(TileError::OutOfLimits {
            layer: "ortho".to_string(),
            tile_matrix: "6".to_string(),
            col: 34,
            row: 21,
        })
    );
    // WMTS also knows the native tile matrix set by its identifier
    let target = service
        .validate_tile(Protocol::Wmts, "ortho", "PM_3_6", "6", 33, 21)
        .unwrap();
    assert_eq!(target.tms, "PM");
    assert!(target.storage.is_some());
    assert!(matches!(
        service.validate_tile(Protocol::Tms, "ortho", "PM_3_6", "6", 33, 21),
        Err(TileError::TmsNotFound { .. })
    ));
    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "ortho", "PM_3_6", "6", 34, 21),
        Err(TileError::OutOfLimits { .. })
    ));

    assert_eq!(
        service.validate_tile(Protocol::Wmts, "ortho", "PM", "7", 0, 0),
        Err(TileError::TileMatrixNotFound {
            layer: "ortho".to_string(),
            tms: "PM".to_string(),
            tile_matrix: "7".to_string(),
        })
    );
}

#[test]
fn test_validate_native_border() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());

    let catalog = service.catalog();
    let layer = catalog.layer("border").unwrap();
    assert_eq!(layer.level("6").unwrap().limits().max_col, 64);
    assert!(service
        .validate_tile(Protocol::Tms, "border", "PM", "6", 63, 21)
        .is_ok());
    assert_eq!(
        service.validate_tile(Protocol::Tms, "border", "PM", "6", 64, 21),
        Err(TileError::OutOfLimits {
            layer: "border".to_string(),
            tile_matrix: "6".to_string(),
            col: 64,
            row: 21,
        })
    );
    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "border", "PM_3_6", "6", 64, 22),
        Err(TileError::OutOfLimits { .. })
    ));

    // The world extent reaches the east border of every level
    assert!(service
        .validate_tile(Protocol::Tms, "world", "PM", "3", 7, 0)
        .is_ok());
    assert!(matches!(
        service.validate_tile(Protocol::Tms, "world", "PM", "3", 8, 0),
        Err(TileError::OutOfLimits { .. })
    ));
}

#[test]
fn test_validate_extra_tile() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());

    let target = service
        .validate_tile(Protocol::Wmts, "ortho", "WGS84G", "5", 32, 7)
        .unwrap();
    assert_eq!(target.tms, "WGS84G");
    assert_eq!(target.storage, None);

    let target = service
        .validate_tile(Protocol::Wmts, "ortho", "WGS84G_2_5", "2", 4, 1)
        .unwrap();
    assert_eq!(target.tms, "WGS84G");

    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "ortho", "WGS84G", "5", 31, 7),
        Err(TileError::OutOfLimits { .. })
    ));
    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "ortho", "WGS84G", "6", 64, 14),
        Err(TileError::TileMatrixNotFound { .. })
    ));
    // TMS only serves the native tile matrix set
    assert!(matches!(
        service.validate_tile(Protocol::Tms, "ortho", "WGS84G", "5", 32, 7),
        Err(TileError::TmsNotFound { .. })
    ));
    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "ortho", "LAMB93", "5", 0, 0),
        Err(TileError::TmsNotFound { .. })
    ));

    // Longitude 180 falls on the east border of WGS84G level 2
    let catalog = service.catalog();
    let world = catalog.layer("world").unwrap();
    let extra = &world.extra_tile_matrix_sets()[0];
    assert_eq!(extra.identifier(), "WGS84G_2_5");
    assert_eq!(extra.limits("2").unwrap().max_col, 8);
    assert!(service
        .validate_tile(Protocol::Wmts, "world", "WGS84G", "2", 7, 0)
        .is_ok());
    assert_eq!(
        service.validate_tile(Protocol::Wmts, "world", "WGS84G", "2", 8, 0),
        Err(TileError::OutOfLimits {
            layer: "world".to_string(),
            tile_matrix: "2".to_string(),
            col: 8,
            row: 0,
        })
    );
    assert!(matches!(
        service.validate_tile(Protocol::Wmts, "world", "WGS84G_2_5", "2", 0, 4),
        Err(TileError::OutOfLimits { .. })
    ));
}

#[test]
fn test_validate_layer_and_protocol() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());

    assert_eq!(
        service.validate_tile(Protocol::Wmts, "broken", "PM", "6", 33, 21),
        Err(TileError::LayerNotFound("broken".to_string()))
    );
    let err = service
        .validate_tile(Protocol::Wmts, "plan%20ign", "PM", "6", 33, 21)
        .unwrap_err();
    assert_eq!(
        err,
        TileError::ProtocolDisabled {
            layer: "plan ign".to_string(),
            protocol: Protocol::Wmts,
        }
    );
    assert_eq!(err.to_string(), "Layer 'plan ign' is not served through WMTS");

    let target = service
        .validate_tile(Protocol::Tms, "plan%20ign", "PM", "6", 33, 21)
        .unwrap();
    assert_eq!(target.layer, "plan ign");
}

#[test]
fn test_capabilities() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());

    let caps = service.capabilities("ortho").unwrap();
    assert_eq!(caps["id"], "ortho");
    assert_eq!(caps["title"], "Orthophotos");
    assert_eq!(caps["format"], "TIFF_JPG_UINT8");
    assert_eq!(caps["protocols"], json!(["WMS", "WMTS", "TMS"]));
    assert_eq!(caps["tileMatrixSet"], "PM");
    assert_eq!(caps["identifier"], "PM_3_6");
    assert_eq!(caps["crs"], "EPSG:3857");
    assert_eq!(caps["geographicBbox"], json!([1.0, 40.0, 10.0, 50.0]));

    let levels = caps["tileMatrices"].as_array().unwrap();
    assert_eq!(levels.len(), 4);
    assert_eq!(levels[0]["id"], "3");
    assert_eq!(levels[3]["limits"]["minTileRow"], 21);
    assert_eq!(levels[3]["limits"]["maxTileRow"], 24);

    let extras = caps["extraTileMatrixSets"].as_array().unwrap();
    assert_eq!(extras.len(), 1);
    assert_eq!(extras[0]["identifier"], "WGS84G_2_5");
    assert_eq!(extras[0]["crs"], "EPSG:4326");
    assert_eq!(extras[0]["limits"].as_array().unwrap().len(), 4);
    assert_eq!(caps["diagnostics"].as_array().unwrap().len(), 1);

    let caps = service.capabilities("plan%20ign").unwrap();
    assert_eq!(caps["protocols"], json!(["WMS", "TMS"]));
    assert!(service.capabilities("broken").is_err());

    let summary = service.catalog_summary();
    assert_eq!(summary["layers"].as_array().unwrap().len(), 4);
    assert_eq!(summary["excluded"][0]["id"], "broken");
}

#[test]
fn test_reload() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());
    let snapshot = service.catalog();

    write_file(&dir.path().join("tessel.toml"), RELOADED_CONFIG);
    service.reload().unwrap();
    assert_eq!(service.catalog().layers().len(), 1);
    assert!(service.catalog().excluded().is_empty());
    // Readers keep the catalog they started with
    assert_eq!(snapshot.layers().len(), 4);

    write_file(&dir.path().join("tessel.toml"), "[[layer]\nid = ");
    assert!(service.reload().is_err());
    assert_eq!(service.catalog().layers().len(), 1);
    assert_eq!(service.catalog().layers()[0].id(), "plan ign");
}

#[test]
fn test_reload_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let service = setup(dir.path());
    let catalog = service.catalog();
    let empty = TileService::new(
        crate::catalog::Catalog::load(&ApplicationCfg::default(), dir.path(), &CrsBook::default())
            .unwrap(),
        CrsBook::default(),
    );
    assert!(empty.reload().is_err());
    assert!(empty.catalog().layers().is_empty());
    assert_eq!(catalog.layers().len(), 4);
}

#[test]
fn test_gen_config() {
    let config: ApplicationCfg = parse_config(TileService::gen_config(), "").unwrap();
    assert_eq!(config.service.resolution_tolerance, 0.2);
    assert_eq!(config.tms.len(), 1);
    assert_eq!(config.layers.len(), 1);
}
