//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use thiserror::Error;
use tile_matrix::TmsError;

/// Configuration and composition errors. A unit failing with one of these
/// is excluded from the service.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Tms(#[from] TmsError),

    #[error("Cannot read pyramid '{path}': {message}")]
    PyramidRead { path: String, message: String },

    #[error("Unknown tile matrix set '{0}'")]
    UnknownTms(String),

    #[error("Level '{level}' is not a tile matrix of '{tms}'")]
    UnknownLevel { tms: String, level: String },

    #[error("Level '{0}' defined twice in the pyramid")]
    DuplicateLevel(String),

    #[error("Invalid level '{level}': {message}")]
    InvalidLevel { level: String, message: String },

    #[error("No source pyramid to compose")]
    NoSource,

    #[error("Incompatible source pyramid '{source_name}': {message}")]
    IncompatibleSource {
        source_name: String,
        message: String,
    },

    #[error("Top level '{top}' is finer than bottom level '{bottom}'")]
    InvertedLevelRange { top: String, bottom: String },

    #[error("Source pyramid '{source_name}' has no level '{level}'")]
    MissingSourceLevel { source_name: String, level: String },

    #[error("Level '{0}' is provided by several source pyramids")]
    AmbiguousLevel(String),

    #[error("Level '{0}' is missing between the composed levels")]
    LevelGap(String),

    #[error("Invalid bounding box: {0}")]
    InvalidBbox(String),
}
