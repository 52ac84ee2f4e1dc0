//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::{resolve_path, CoreError};
use std::fmt;
use std::path::{Path, PathBuf};
use tile_matrix::{TileMatrix, TileMatrixLimits, TileMatrixSet};

/// Slab storage of a level as written in pyramid descriptors
#[derive(Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum StorageCfg {
    File {
        image_directory: String,
        path_depth: u32,
    },
    Ceph {
        pool_name: String,
        image_prefix: String,
    },
    S3 {
        bucket_name: String,
        image_prefix: String,
    },
    Swift {
        container_name: String,
        image_prefix: String,
    },
}

#[derive(Deserialize, Clone, Debug)]
pub struct TileLimitsCfg {
    pub min_row: i64,
    pub max_row: i64,
    pub min_col: i64,
    pub max_col: i64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LevelCfg {
    pub id: String,
    pub storage: StorageCfg,
    pub tiles_per_width: u32,
    pub tiles_per_height: u32,
    pub tile_limits: TileLimitsCfg,
}

/// Location of the slabs of one level
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Storage {
    File {
        image_directory: PathBuf,
        path_depth: u32,
    },
    Ceph {
        pool_name: String,
        image_prefix: String,
    },
    S3 {
        bucket_name: String,
        image_prefix: String,
    },
    Swift {
        container_name: String,
        image_prefix: String,
    },
}

impl Storage {
    /// Relative image directories are resolved against `base_dir`
    pub fn from_config(cfg: &StorageCfg, base_dir: &Path) -> Storage {
        match cfg {
            StorageCfg::File {
                image_directory,
                path_depth,
            } => Storage::File {
                image_directory: resolve_path(base_dir, image_directory),
                path_depth: *path_depth,
            },
            StorageCfg::Ceph {
                pool_name,
                image_prefix,
            } => Storage::Ceph {
                pool_name: pool_name.clone(),
                image_prefix: image_prefix.clone(),
            },
            StorageCfg::S3 {
                bucket_name,
                image_prefix,
            } => Storage::S3 {
                bucket_name: bucket_name.clone(),
                image_prefix: image_prefix.clone(),
            },
            StorageCfg::Swift {
                container_name,
                image_prefix,
            } => Storage::Swift {
                container_name: container_name.clone(),
                image_prefix: image_prefix.clone(),
            },
        }
    }
    pub fn kind(&self) -> &'static str {
        match self {
            Storage::File { .. } => "FILE",
            Storage::Ceph { .. } => "CEPH",
            Storage::S3 { .. } => "S3",
            Storage::Swift { .. } => "SWIFT",
        }
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Storage::File {
                image_directory,
                path_depth,
            } => write!(f, "file://{} (depth {})", image_directory.display(), path_depth),
            Storage::Ceph {
                pool_name,
                image_prefix,
            } => write!(f, "ceph://{}/{}", pool_name, image_prefix),
            Storage::S3 {
                bucket_name,
                image_prefix,
            } => write!(f, "s3://{}/{}", bucket_name, image_prefix),
            Storage::Swift {
                container_name,
                image_prefix,
            } => write!(f, "swift://{}/{}", container_name, image_prefix),
        }
    }
}

/// One tile matrix of a pyramid with its storage and existing tiles
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Level {
    tile_matrix: String,
    storage: Storage,
    tiles_per_width: u32,
    tiles_per_height: u32,
    limits: TileMatrixLimits,
}

impl Level {
    pub fn new(
        tm: &TileMatrix,
        storage: Storage,
        tiles_per_width: u32,
        tiles_per_height: u32,
        limits: TileMatrixLimits,
    ) -> Result<Level, CoreError> {
        if tiles_per_width == 0 || tiles_per_height == 0 {
            return Err(CoreError::InvalidLevel {
                level: tm.id().to_string(),
                message: "slab tiles size have to be non zero integers".to_string(),
            });
        }
        if limits.tile_matrix != tm.id() {
            return Err(CoreError::InvalidLevel {
                level: tm.id().to_string(),
                message: format!("limits belong to tile matrix '{}'", limits.tile_matrix),
            });
        }
        Ok(Level {
            tile_matrix: tm.id().to_string(),
            storage,
            tiles_per_width,
            tiles_per_height,
            limits,
        })
    }
    pub fn from_config(
        cfg: &LevelCfg,
        tms: &TileMatrixSet,
        base_dir: &Path,
    ) -> Result<Level, CoreError> {
        let tm = tms
            .tile_matrix(&cfg.id)
            .ok_or_else(|| CoreError::UnknownLevel {
                tms: tms.id().to_string(),
                level: cfg.id.clone(),
            })?;
        let storage = Storage::from_config(&cfg.storage, base_dir);
        let limits = clamped_limits(&cfg.tile_limits, tm);
        if limits.min_row > limits.max_row || limits.min_col > limits.max_col {
            return Err(CoreError::InvalidLevel {
                level: cfg.id.clone(),
                message: "tile_limits minimum greater than maximum".to_string(),
            });
        }
        Level::new(
            tm,
            storage,
            cfg.tiles_per_width,
            cfg.tiles_per_height,
            limits,
        )
    }
    /// Tile matrix identifier
    pub fn id(&self) -> &str {
        &self.tile_matrix
    }
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
    pub fn tiles_per_width(&self) -> u32 {
        self.tiles_per_width
    }
    pub fn tiles_per_height(&self) -> u32 {
        self.tiles_per_height
    }
    pub fn limits(&self) -> &TileMatrixLimits {
        &self.limits
    }
    pub(crate) fn set_limits(&mut self, limits: TileMatrixLimits) {
        self.limits = limits;
    }
}

/// Out of range values fall back to the matrix border
fn clamped_limits(cfg: &TileLimitsCfg, tm: &TileMatrix) -> TileMatrixLimits {
    let width = i64::from(tm.matrix_width());
    let height = i64::from(tm.matrix_height());
    let min = |value: i64, size: i64| if value < 0 || value > size { 0 } else { value };
    let max = |value: i64, size: i64| if value < 0 || value > size { size } else { value };
    TileMatrixLimits::new(
        tm.id(),
        min(cfg.min_row, height) as u32,
        max(cfg.max_row, height) as u32,
        min(cfg.min_col, width) as u32,
        max(cfg.max_col, width) as u32,
    )
}
