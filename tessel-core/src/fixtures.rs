//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile matrix sets and pyramids for tests

use crate::core::{LoadContext, ServiceSettings, TmsBook};
use crate::pyramid::{Format, Level, Photometric, Pyramid, RasterSpec, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile_matrix::{CrsBook, TileMatrix, TileMatrixLimits, TileMatrixSet};

pub const PIXEL_WIDTH_Z0: f64 = 156543.0339280410;
pub const MERC_MAX: f64 = 20037508.3427892480;

/// Google Maps compatible grid "PM", levels "0".."levels-1"
pub fn web_mercator(levels: u8) -> TileMatrixSet {
    let tile_matrices = (0..levels)
        .map(|z| {
            TileMatrix::new(
                &z.to_string(),
                PIXEL_WIDTH_Z0 / f64::from(z).exp2(),
                256,
                256,
                1 << z,
                1 << z,
                (-MERC_MAX, MERC_MAX),
            )
            .unwrap()
        })
        .collect();
    let crs = CrsBook::default().get("EPSG:3857").unwrap();
    TileMatrixSet::new("PM", crs, tile_matrices).unwrap()
}

/// Geographic quad tree "WGS84G" with two tiles on level "0"
pub fn wgs84(levels: u8) -> TileMatrixSet {
    let tile_matrices = (0..levels)
        .map(|z| {
            TileMatrix::new(
                &z.to_string(),
                0.703125 / f64::from(z).exp2(),
                256,
                256,
                2 << z,
                1 << z,
                (-180.0, 90.0),
            )
            .unwrap()
        })
        .collect();
    let crs = CrsBook::default().get("EPSG:4326").unwrap();
    TileMatrixSet::new("WGS84G", crs, tile_matrices).unwrap()
}

pub fn tms_book() -> TmsBook {
    let mut book = TmsBook::new();
    book.insert(web_mercator(20));
    book.insert(wgs84(18));
    book
}

pub fn rgb() -> RasterSpec {
    RasterSpec {
        photometric: Photometric::Rgb,
        channels: 3,
        nodata: vec![255, 255, 255],
    }
}

pub fn storage(name: &str) -> Storage {
    Storage::File {
        image_directory: PathBuf::from(format!("/data/{}", name)),
        path_depth: 2,
    }
}

/// Level with explicit limits (min_row, max_row, min_col, max_col)
pub fn level(tms: &TileMatrixSet, id: &str, name: &str, limits: (u32, u32, u32, u32)) -> Level {
    let tm = tms.tile_matrix(id).unwrap();
    let limits = TileMatrixLimits::new(id, limits.0, limits.1, limits.2, limits.3);
    Level::new(tm, storage(name), 16, 16, limits).unwrap()
}

/// Level covering the whole tile matrix
pub fn full_level(tms: &TileMatrixSet, id: &str, name: &str) -> Level {
    let tm = tms.tile_matrix(id).unwrap();
    Level::new(tm, storage(name), 16, 16, TileMatrixLimits::full(tm)).unwrap()
}

/// RGB pyramid with full levels, stored below `/data/<name>`
pub fn pyramid(tms: &Arc<TileMatrixSet>, name: &str, ids: &[&str]) -> Pyramid {
    let levels = ids.iter().map(|id| full_level(tms, id, name)).collect();
    Pyramid::new(tms.clone(), Format::TiffJpgUint8, Some(rgb()), levels).unwrap()
}

/// Owner of everything a `LoadContext` refers to
pub struct TestContext {
    pub tms_book: TmsBook,
    pub crs_book: CrsBook,
    pub settings: ServiceSettings,
    pub base_dir: PathBuf,
}

impl TestContext {
    pub fn new() -> TestContext {
        TestContext {
            tms_book: tms_book(),
            crs_book: CrsBook::default(),
            settings: ServiceSettings::default(),
            base_dir: PathBuf::from("."),
        }
    }
    pub fn with_base_dir(base_dir: &Path) -> TestContext {
        TestContext {
            base_dir: base_dir.to_path_buf(),
            ..TestContext::new()
        }
    }
    pub fn ctx(&self) -> LoadContext {
        LoadContext {
            tms_book: &self.tms_book,
            crs_book: &self.crs_book,
            settings: &self.settings,
            base_dir: &self.base_dir,
        }
    }
    pub fn tms(&self, id: &str) -> Arc<TileMatrixSet> {
        self.tms_book.get(id).unwrap().clone()
    }
}
