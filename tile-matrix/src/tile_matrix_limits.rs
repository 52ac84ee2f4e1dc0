//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::tile_matrix::TileMatrix;

/// Inclusive row/column window of the tiles available in one tile matrix
#[derive(PartialEq, Eq, Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileMatrixLimits {
    /// Identifier of the limited tile matrix
    pub tile_matrix: String,
    #[serde(rename = "minTileRow")]
    pub min_row: u32,
    #[serde(rename = "maxTileRow")]
    pub max_row: u32,
    #[serde(rename = "minTileCol")]
    pub min_col: u32,
    #[serde(rename = "maxTileCol")]
    pub max_col: u32,
}

impl TileMatrixLimits {
    pub fn new(
        tile_matrix: &str,
        min_row: u32,
        max_row: u32,
        min_col: u32,
        max_col: u32,
    ) -> TileMatrixLimits {
        TileMatrixLimits {
            tile_matrix: tile_matrix.to_string(),
            min_row,
            max_row,
            min_col,
            max_col,
        }
    }
    /// Limits covering the whole matrix
    pub fn full(tm: &TileMatrix) -> TileMatrixLimits {
        TileMatrixLimits::new(
            tm.id(),
            0,
            tm.matrix_height().saturating_sub(1),
            0,
            tm.matrix_width().saturating_sub(1),
        )
    }
    pub fn contains(&self, col: u32, row: u32) -> bool {
        row >= self.min_row && row <= self.max_row && col >= self.min_col && col <= self.max_col
    }
    /// Number of tile indices inside the window
    pub fn tile_count(&self) -> u64 {
        let cols = self.max_col.saturating_sub(self.min_col) as u64 + 1;
        let rows = self.max_row.saturating_sub(self.min_row) as u64 + 1;
        cols * rows
    }
    /// True if the window does not address any existing tile of `tm`,
    /// i.e. it was clamped onto the right or bottom border of the matrix.
    pub fn is_degenerate(&self, tm: &TileMatrix) -> bool {
        self.min_col >= tm.matrix_width() || self.min_row >= tm.matrix_height()
    }
}
