//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::tile_service::Protocol;
use tessel_core::core::CoreError;
use thiserror::Error;

/// Service configuration errors
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Request rejections. All of them mean "not found" for the client.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TileError {
    #[error("Layer '{0}' not found")]
    LayerNotFound(String),

    #[error("Layer '{layer}' is not served through {protocol}")]
    ProtocolDisabled { layer: String, protocol: Protocol },

    #[error("Tile matrix set '{tms}' not available for layer '{layer}'")]
    TmsNotFound { layer: String, tms: String },

    #[error("Tile matrix '{tile_matrix}' not available for layer '{layer}' in '{tms}'")]
    TileMatrixNotFound {
        layer: String,
        tms: String,
        tile_matrix: String,
    },

    #[error("Tile ({col}, {row}) of tile matrix '{tile_matrix}' is outside of layer '{layer}'")]
    OutOfLimits {
        layer: String,
        tile_matrix: String,
        col: u32,
        row: u32,
    },
}
