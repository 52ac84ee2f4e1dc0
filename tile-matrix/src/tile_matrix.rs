//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile matrix: one resolution level of a tile matrix set

use crate::bbox::BoundingBox;
use crate::error::TmsError;
use crate::tile_matrix_limits::TileMatrixLimits;

/// Standardized rendering pixel size according to OGC Symbology Encoding standard
const PIXEL_SCREEN_WIDTH: f64 = 0.00028;

#[derive(PartialEq, Clone, Debug)]
pub struct TileMatrix {
    id: String,
    /// Ground units per pixel
    resolution: f64,
    /// The width of an individual tile, in pixels.
    tile_width: u32,
    /// The height of an individual tile, in pixels.
    tile_height: u32,
    /// Number of tile columns
    matrix_width: u32,
    /// Number of tile rows
    matrix_height: u32,
    /// Top-left corner of the top-left tile
    x0: f64,
    y0: f64,
}

impl TileMatrix {
    pub fn new(
        id: &str,
        resolution: f64,
        tile_width: u32,
        tile_height: u32,
        matrix_width: u32,
        matrix_height: u32,
        origin: (f64, f64),
    ) -> Result<TileMatrix, TmsError> {
        let invalid = |message: &str| TmsError::InvalidTileMatrix {
            id: id.to_string(),
            message: message.to_string(),
        };
        if id.is_empty() {
            return Err(invalid("id have to be a non empty string"));
        }
        if !(resolution > 0.0 && resolution.is_finite()) {
            return Err(invalid("cellSize have to be a positive number"));
        }
        if tile_width == 0 || tile_height == 0 {
            return Err(invalid("tileWidth and tileHeight have to be positive"));
        }
        if matrix_width == 0 || matrix_height == 0 {
            return Err(invalid("matrixWidth and matrixHeight have to be positive"));
        }
        if !(origin.0.is_finite() && origin.1.is_finite()) {
            return Err(invalid("pointOfOrigin have to be finite"));
        }
        Ok(TileMatrix {
            id: id.to_string(),
            resolution,
            tile_width,
            tile_height,
            matrix_width,
            matrix_height,
            x0: origin.0,
            y0: origin.1,
        })
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn resolution(&self) -> f64 {
        self.resolution
    }
    pub fn tile_width(&self) -> u32 {
        self.tile_width
    }
    pub fn tile_height(&self) -> u32 {
        self.tile_height
    }
    pub fn matrix_width(&self) -> u32 {
        self.matrix_width
    }
    pub fn matrix_height(&self) -> u32 {
        self.matrix_height
    }
    pub fn origin(&self) -> (f64, f64) {
        (self.x0, self.y0)
    }
    /// Ground width of one tile
    fn unit_width(&self) -> f64 {
        self.tile_width as f64 * self.resolution
    }
    /// Ground height of one tile
    fn unit_height(&self) -> f64 {
        self.tile_height as f64 * self.resolution
    }
    /// Pixel size in meters
    pub fn resolution_in_meters(&self, meters_per_unit: f64) -> f64 {
        self.resolution * meters_per_unit
    }
    /// Scale denominator based on standardized pixel size (https://www.ogc.org/standards/se)
    pub fn scale_denominator(&self, meters_per_unit: f64) -> f64 {
        self.resolution_in_meters(meters_per_unit) / PIXEL_SCREEN_WIDTH
    }
    /// Extent of the tile at `col`, `row`
    pub fn tile_indices_to_bbox(&self, col: u32, row: u32) -> BoundingBox {
        let xmin = self.x0 + col as f64 * self.unit_width();
        let ymax = self.y0 - row as f64 * self.unit_height();
        BoundingBox {
            xmin,
            ymin: ymax - self.unit_height(),
            xmax: xmin + self.unit_width(),
            ymax,
        }
    }
    /// Tile index window covering `bbox`.
    ///
    /// Indices are truncated and clamped into `[0, matrix_width]` and
    /// `[0, matrix_height]`: a bbox partially or fully outside of the matrix
    /// never fails but yields a reduced or degenerate window.
    pub fn bbox_to_tile_limits(&self, bbox: &BoundingBox) -> TileMatrixLimits {
        let col = |x: f64| clamp_index((x - self.x0) / self.unit_width(), self.matrix_width);
        let row = |y: f64| clamp_index((self.y0 - y) / self.unit_height(), self.matrix_height);

        let (col_a, col_b) = (col(bbox.xmin), col(bbox.xmax));
        let (row_a, row_b) = (row(bbox.ymax), row(bbox.ymin));

        TileMatrixLimits::new(
            &self.id,
            row_a.min(row_b),
            row_a.max(row_b),
            col_a.min(col_b),
            col_a.max(col_b),
        )
    }
    /// Extent of a tile index window, including the far edge of the last tiles
    pub fn limits_to_bbox(&self, limits: &TileMatrixLimits) -> BoundingBox {
        BoundingBox {
            xmin: self.x0 + limits.min_col as f64 * self.unit_width(),
            ymin: self.y0 - (limits.max_row as f64 + 1.0) * self.unit_height(),
            xmax: self.x0 + (limits.max_col as f64 + 1.0) * self.unit_width(),
            ymax: self.y0 - limits.min_row as f64 * self.unit_height(),
        }
    }
    /// True if `col`, `row` addresses a tile of the matrix
    pub fn has_tile(&self, col: u32, row: u32) -> bool {
        col < self.matrix_width && row < self.matrix_height
    }
    /// Extent of the whole matrix
    pub fn bbox(&self) -> BoundingBox {
        self.limits_to_bbox(&TileMatrixLimits::full(self))
    }
    /// True if `bbox` covers some surface of the matrix
    pub fn overlaps(&self, bbox: &BoundingBox) -> bool {
        self.bbox().intersects(bbox)
    }
}

/// Truncate toward zero and clamp into `[0, max]`
fn clamp_index(value: f64, max: u32) -> u32 {
    let index = value.trunc();
    if !(index > 0.0) {
        0
    } else if index >= max as f64 {
        max
    } else {
        index as u32
    }
}
