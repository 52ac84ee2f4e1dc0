//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::catalog::Catalog;
use crate::error::{ServiceError, TileError};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tessel_core::core::{read_config, ApplicationCfg, Config, ServiceSettings, TmsBook};
use tessel_core::layer::Layer;
use tessel_core::pyramid::Storage;
use tile_matrix::{CrsBook, TileMatrix, TileMatrixLimits};

/// Tile protocols
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Protocol {
    Wmts,
    Tms,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Protocol::Wmts => f.write_str("WMTS"),
            Protocol::Tms => f.write_str("TMS"),
        }
    }
}

/// Validated tile address
#[derive(Clone, Debug, PartialEq)]
pub struct TileTarget {
    pub layer: String,
    pub tms: String,
    pub tile_matrix: String,
    pub col: u32,
    pub row: u32,
    /// Slab location for tiles of the native tile matrix set
    pub storage: Option<Storage>,
}

/// Tile service with an atomically replaceable catalog
pub struct TileService {
    catalog: RwLock<Arc<Catalog>>,
    crs_book: CrsBook,
    config_path: Option<PathBuf>,
}

impl TileService {
    pub fn new(catalog: Catalog, crs_book: CrsBook) -> TileService {
        TileService {
            catalog: RwLock::new(Arc::new(catalog)),
            crs_book,
            config_path: None,
        }
    }
    /// Load the catalog from a TOML configuration file. Relative paths are
    /// resolved against the directory of the file.
    pub fn from_config_file<P: AsRef<Path>>(
        path: P,
        crs_book: CrsBook,
    ) -> Result<TileService, ServiceError> {
        let path = path.as_ref();
        let catalog = load_catalog(path, &crs_book)?;
        Ok(TileService {
            catalog: RwLock::new(Arc::new(catalog)),
            crs_book,
            config_path: Some(path.to_path_buf()),
        })
    }
    /// Currently published catalog
    pub fn catalog(&self) -> Arc<Catalog> {
        match self.catalog.read() {
            Ok(catalog) => catalog.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
    /// Replace the published catalog
    pub fn publish(&self, catalog: Catalog) {
        let catalog = Arc::new(catalog);
        match self.catalog.write() {
            Ok(mut published) => *published = catalog,
            Err(poisoned) => *poisoned.into_inner() = catalog,
        }
    }
    /// Reload the configuration file. The published catalog is only
    /// replaced when loading succeeds.
    pub fn reload(&self) -> Result<(), ServiceError> {
        let path = self
            .config_path
            .as_ref()
            .ok_or_else(|| ServiceError::Config("No configuration file to reload".to_string()))?;
        let catalog = load_catalog(path, &self.crs_book)?;
        self.publish(catalog);
        info!("Configuration {} reloaded", path.display());
        Ok(())
    }
    /// Check that a tile exists and return its address.
    ///
    /// WMTS accepts the native tile matrix set and the additional ones, either
    /// by identifier of the tile matrix set or by the `<tms>_<top>_<bottom>`
    /// identifier of the layer. TMS only serves the native tile matrix set,
    /// by its identifier.
    pub fn validate_tile(
        &self,
        protocol: Protocol,
        layer: &str,
        tms: &str,
        tile_matrix: &str,
        col: u32,
        row: u32,
    ) -> Result<TileTarget, TileError> {
        let catalog = self.catalog();
        let layer = catalog
            .layer(layer)
            .ok_or_else(|| TileError::LayerNotFound(layer.to_string()))?;
        let enabled = match protocol {
            Protocol::Wmts => layer.wmts,
            Protocol::Tms => layer.tms,
        };
        if !enabled {
            return Err(TileError::ProtocolDisabled {
                layer: layer.id().to_string(),
                protocol,
            });
        }
        let tms_not_found = || TileError::TmsNotFound {
            layer: layer.id().to_string(),
            tms: tms.to_string(),
        };
        let tile_matrix_not_found = |tms: &str| TileError::TileMatrixNotFound {
            layer: layer.id().to_string(),
            tms: tms.to_string(),
            tile_matrix: tile_matrix.to_string(),
        };

        let native = layer.pyramid().tms();
        if tms == native.id() || (protocol == Protocol::Wmts && tms == layer.native_identifier()) {
            let (level, tm) = layer
                .level(tile_matrix)
                .and_then(|level| Some((level, native.tile_matrix(level.id())?)))
                .ok_or_else(|| tile_matrix_not_found(tms))?;
            check_limits(layer, tm, level.limits(), col, row)?;
            return Ok(TileTarget {
                layer: layer.id().to_string(),
                tms: native.id().to_string(),
                tile_matrix: tile_matrix.to_string(),
                col,
                row,
                storage: Some(level.storage().clone()),
            });
        }
        if protocol == Protocol::Tms {
            return Err(tms_not_found());
        }
        let extra = layer
            .extra_tile_matrix_sets()
            .iter()
            .find(|extra| extra.tms().id() == tms || extra.identifier() == tms)
            .ok_or_else(tms_not_found)?;
        let (limits, tm) = extra
            .limits(tile_matrix)
            .and_then(|limits| Some((limits, extra.tms().tile_matrix(tile_matrix)?)))
            .ok_or_else(|| tile_matrix_not_found(tms))?;
        check_limits(layer, tm, limits, col, row)?;
        Ok(TileTarget {
            layer: layer.id().to_string(),
            tms: extra.tms().id().to_string(),
            tile_matrix: tile_matrix.to_string(),
            col,
            row,
            storage: None,
        })
    }
    /// Configuration template
    pub fn gen_config() -> String {
        let mut config = String::new();
        config.push_str(&ServiceSettings::gen_config());
        config.push_str(&TmsBook::gen_config());
        config.push_str(&Layer::gen_config());
        config
    }
}

/// Limits may be clamped onto the matrix border, which is not a tile
fn check_limits(
    layer: &Layer,
    tm: &TileMatrix,
    limits: &TileMatrixLimits,
    col: u32,
    row: u32,
) -> Result<(), TileError> {
    if limits.contains(col, row) && tm.has_tile(col, row) {
        Ok(())
    } else {
        Err(TileError::OutOfLimits {
            layer: layer.id().to_string(),
            tile_matrix: limits.tile_matrix.clone(),
            col,
            row,
        })
    }
}

fn load_catalog(path: &Path, crs_book: &CrsBook) -> Result<Catalog, ServiceError> {
    let config: ApplicationCfg =
        read_config(&path.to_string_lossy()).map_err(ServiceError::Config)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Catalog::load(&config, base_dir, crs_book)
}
