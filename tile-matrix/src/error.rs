//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;

/// Tile matrix set definition errors
#[derive(Debug, Error, PartialEq)]
pub enum TmsError {
    #[error("Cannot read tile matrix set file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("Cannot load tile matrix set '{id}': {message}")]
    Parse { id: String, message: String },

    #[error("Tile matrix set '{id}' uses unknown CRS '{crs}'")]
    UnknownCrs { id: String, crs: String },

    #[error("Invalid CRS definition for '{code}': {message}")]
    InvalidCrs { code: String, message: String },

    #[error("No tile matrix in the tile matrix set '{0}'")]
    Empty(String),

    #[error("Tile matrix '{tile_matrix}' defined twice in tile matrix set '{id}'")]
    DuplicateTileMatrix { id: String, tile_matrix: String },

    #[error("Tile matrices '{first}' and '{second}' of tile matrix set '{id}' have the same resolution")]
    DuplicateResolution {
        id: String,
        first: String,
        second: String,
    },

    #[error("Invalid tile matrix '{id}': {message}")]
    InvalidTileMatrix { id: String, message: String },
}
