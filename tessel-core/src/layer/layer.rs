//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{BboxCfg, LayerCfg};
use crate::core::{resolve_path, Config, CoreError, LoadContext};
use crate::layer::tile_limits::{
    derive_extra_tile_matrix_sets, set_native_limits, ExtraTileMatrixSet, GridDiagnostic,
};
use crate::pyramid::{Level, Pyramid, PyramidSource};
use tile_matrix::BoundingBox;

impl<'a> Config<'a, BboxCfg> for BoundingBox {
    fn from_config(cfg: &BboxCfg) -> Result<Self, String> {
        if !(cfg.north >= cfg.south && cfg.east >= cfg.west) {
            return Err(format!(
                "north ({}) has to be greater than south ({}) and east ({}) greater than west ({})",
                cfg.north, cfg.south, cfg.east, cfg.west
            ));
        }
        Ok(BoundingBox::new(cfg.west, cfg.south, cfg.east, cfg.north))
    }
    fn gen_config() -> String {
        "#bbox = { west = -5.0, south = 41.0, east = 10.0, north = 51.0 }\n".to_string()
    }
}

/// Published data: one composed pyramid with its extents and tile matrix sets
#[derive(Clone, Debug)]
pub struct Layer {
    id: String,
    pub title: String,
    pub abstract_: String,
    pub keywords: Vec<String>,
    pub wms: bool,
    pub wmts: bool,
    pub tms: bool,
    pyramid: Pyramid,
    native_identifier: String,
    native_bbox: BoundingBox,
    geographic_bbox: BoundingBox,
    extra_tms: Vec<ExtraTileMatrixSet>,
    diagnostics: Vec<GridDiagnostic>,
}

impl Layer {
    /// Compute the tile limits of `pyramid` and the requested additional
    /// tile matrix sets. `bbox` is geographic (EPSG:4326).
    pub fn new(
        id: &str,
        mut pyramid: Pyramid,
        bbox: Option<BoundingBox>,
        extra_tms: &[String],
        ctx: &LoadContext,
    ) -> Result<Layer, CoreError> {
        if id.trim().is_empty() {
            return Err(CoreError::Config("Layer without id".to_string()));
        }
        let (native_bbox, geographic_bbox) =
            set_native_limits(&mut pyramid, bbox.as_ref(), ctx.crs_book)?;
        let (extra_tms, diagnostics) =
            derive_extra_tile_matrix_sets(&pyramid, &geographic_bbox, extra_tms, ctx);
        for diagnostic in &diagnostics {
            warn!("Layer '{}': {}", id, diagnostic);
        }
        info!(
            "Layer '{}': {} levels in {}, {} additional tile matrix sets",
            id,
            pyramid.levels().len(),
            pyramid.tms().id(),
            extra_tms.len()
        );
        let native_identifier = format!(
            "{}_{}_{}",
            pyramid.tms().id(),
            pyramid.highest_level().id(),
            pyramid.lowest_level().id()
        );
        Ok(Layer {
            id: id.to_string(),
            title: id.to_string(),
            abstract_: String::new(),
            keywords: Vec::new(),
            wms: pyramid.is_raster(),
            wmts: pyramid.is_raster(),
            tms: true,
            pyramid,
            native_identifier,
            native_bbox,
            geographic_bbox,
            extra_tms,
            diagnostics,
        })
    }
    /// Read and compose the source pyramids of the layer
    pub fn from_config(cfg: &LayerCfg, ctx: &LoadContext) -> Result<Layer, CoreError> {
        let bbox = match cfg.bbox {
            Some(ref bbox) => Some(BoundingBox::from_config(bbox).map_err(CoreError::InvalidBbox)?),
            None => None,
        };
        let sources = cfg
            .pyramids
            .iter()
            .map(|source| {
                let path = resolve_path(ctx.base_dir, &source.path);
                Ok(PyramidSource {
                    name: source.path.clone(),
                    pyramid: Pyramid::read(&path, ctx.tms_book)?,
                    bottom_level: source.bottom_level.clone(),
                    top_level: source.top_level.clone(),
                })
            })
            .collect::<Result<Vec<_>, CoreError>>()?;
        let pyramid = Pyramid::compose(&sources)?;

        let mut layer = Layer::new(&cfg.id, pyramid, bbox, &cfg.extra_tms, ctx)?;
        if let Some(ref title) = cfg.title {
            layer.title = title.clone();
        }
        layer.abstract_ = cfg.abstract_.clone().unwrap_or_default();
        layer.keywords = cfg.keywords.clone();
        if !layer.is_raster() {
            if cfg.wms {
                warn!("Layer '{}': WMS is not available for vector pyramids", cfg.id);
            }
            if cfg.wmts {
                warn!("Layer '{}': WMTS is not available for vector pyramids", cfg.id);
            }
        }
        layer.wms = cfg.wms && layer.is_raster();
        layer.wmts = cfg.wmts && layer.is_raster();
        layer.tms = cfg.tms;
        Ok(layer)
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn pyramid(&self) -> &Pyramid {
        &self.pyramid
    }
    pub fn is_raster(&self) -> bool {
        self.pyramid.is_raster()
    }
    /// WMTS identifier of the native tile matrix set `<tms>_<top>_<bottom>`
    pub fn native_identifier(&self) -> &str {
        &self.native_identifier
    }
    /// Extent in the pyramid CRS
    pub fn native_bbox(&self) -> &BoundingBox {
        &self.native_bbox
    }
    /// Extent in EPSG:4326
    pub fn geographic_bbox(&self) -> &BoundingBox {
        &self.geographic_bbox
    }
    /// Level of the native tile matrix set
    pub fn level(&self, tile_matrix: &str) -> Option<&Level> {
        self.pyramid.level(tile_matrix)
    }
    pub fn extra_tile_matrix_sets(&self) -> &[ExtraTileMatrixSet] {
        &self.extra_tms
    }
    pub fn extra_tile_matrix_set(&self, tms: &str) -> Option<&ExtraTileMatrixSet> {
        self.extra_tms.iter().find(|extra| extra.tms().id() == tms)
    }
    /// Additional tile matrix sets which could not be derived
    pub fn diagnostics(&self) -> &[GridDiagnostic] {
        &self.diagnostics
    }
    pub fn gen_config() -> String {
        let toml = r#"
[[layer]]
id = "ortho"
title = "Orthophotos"
#abstract = ""
#keywords = []
# Geographic extent. Default: extent of the finest level
BBOX
#wms = true
#wmts = true
#tms = true
extra_tms = ["WGS84G"]

[[layer.pyramid]]
path = "pyramids/ortho.json"
bottom_level = "19"
top_level = "0"
"#;
        toml.replace("BBOX\n", &BoundingBox::gen_config())
    }
}
