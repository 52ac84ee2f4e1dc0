//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::ServiceError;
use percent_encoding::percent_decode;
use std::path::Path;
use tessel_core::core::{ApplicationCfg, Config, LoadContext, ServiceSettings, TmsBook};
use tessel_core::layer::Layer;
use tile_matrix::{BoundingBox, CrsBook};

/// Layer which could not be loaded
#[derive(Clone, Debug, PartialEq)]
pub struct ExcludedLayer {
    pub id: String,
    pub error: String,
}

/// Everything published by the service. Immutable once loaded.
#[derive(Debug)]
pub struct Catalog {
    settings: ServiceSettings,
    tms_book: TmsBook,
    layers: Vec<Layer>,
    excluded: Vec<ExcludedLayer>,
}

impl Catalog {
    /// Load CRS definitions, tile matrix sets and layers. Failing CRS and
    /// layers are logged and excluded, invalid service settings fail the
    /// whole catalog.
    pub fn load(
        config: &ApplicationCfg,
        base_dir: &Path,
        crs_book: &CrsBook,
    ) -> Result<Catalog, ServiceError> {
        let settings = ServiceSettings::from_config(&config.service).map_err(ServiceError::Config)?;
        let mut crs_book = crs_book.clone();
        for crs in &config.crs {
            let area =
                BoundingBox::new(crs.area.west, crs.area.south, crs.area.east, crs.area.north);
            match crs_book.register_proj4(&crs.code, &crs.proj4, area) {
                Ok(()) => debug!("CRS {} registered", crs.code),
                Err(e) => error!("{}", e),
            }
        }
        let crs_book = &crs_book;
        let tms_book = TmsBook::load(&config.tms, base_dir, crs_book);
        info!("{} tile matrix sets loaded", tms_book.len());

        let ctx = LoadContext {
            tms_book: &tms_book,
            crs_book,
            settings: &settings,
            base_dir,
        };
        let mut layers: Vec<Layer> = Vec::new();
        let mut excluded = Vec::new();
        for layer_cfg in &config.layers {
            let result = if layers.iter().any(|l| l.id() == layer_cfg.id) {
                Err(format!("Layer '{}' already defined", layer_cfg.id))
            } else {
                Layer::from_config(layer_cfg, &ctx).map_err(|e| e.to_string())
            };
            match result {
                Ok(layer) => layers.push(layer),
                Err(error) => {
                    error!("Layer '{}' excluded: {}", layer_cfg.id, error);
                    excluded.push(ExcludedLayer {
                        id: layer_cfg.id.clone(),
                        error,
                    });
                }
            }
        }
        Ok(Catalog {
            settings,
            tms_book,
            layers,
            excluded,
        })
    }
    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }
    pub fn tms_book(&self) -> &TmsBook {
        &self.tms_book
    }
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }
    pub fn excluded(&self) -> &[ExcludedLayer] {
        &self.excluded
    }
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        // URL decode layer names from http requests
        let id = percent_decode(id.as_bytes())
            .decode_utf8()
            .map(|id| id.to_string())
            .unwrap_or_else(|_| id.to_string());
        self.layers.iter().find(|l| l.id() == id)
    }
}
