//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::error::TileError;
use crate::tile_service::TileService;
use serde_json::Value;
use tessel_core::layer::Layer;
use tile_matrix::{BoundingBox, TileMatrixLimits};

#[derive(Serialize)]
struct LevelInfo {
    id: String,
    resolution: f64,
    #[serde(rename = "scaleDenominator")]
    scale_denominator: f64,
    #[serde(rename = "tileWidth")]
    tile_width: u32,
    #[serde(rename = "tileHeight")]
    tile_height: u32,
    #[serde(rename = "matrixWidth")]
    matrix_width: u32,
    #[serde(rename = "matrixHeight")]
    matrix_height: u32,
    limits: TileMatrixLimits,
}

#[derive(Serialize)]
struct ExtraInfo {
    identifier: String,
    tms: String,
    crs: String,
    top: String,
    bottom: String,
    limits: Vec<TileMatrixLimits>,
}

fn bbox_array(bbox: &BoundingBox) -> [f64; 4] {
    [bbox.xmin, bbox.ymin, bbox.xmax, bbox.ymax]
}

fn protocols(layer: &Layer) -> Vec<&'static str> {
    let mut protocols = Vec::new();
    if layer.wms {
        protocols.push("WMS");
    }
    if layer.wmts {
        protocols.push("WMTS");
    }
    if layer.tms {
        protocols.push("TMS");
    }
    protocols
}

impl TileService {
    /// Layer description for capabilities documents
    pub fn capabilities(&self, layer: &str) -> Result<Value, TileError> {
        let catalog = self.catalog();
        let layer = catalog
            .layer(layer)
            .ok_or_else(|| TileError::LayerNotFound(layer.to_string()))?;
        let pyramid = layer.pyramid();
        let tms = pyramid.tms();
        let meters_per_unit = tms.crs().meters_per_unit();

        let levels: Vec<LevelInfo> = pyramid
            .levels()
            .iter()
            .filter_map(|level| {
                let tm = tms.tile_matrix(level.id())?;
                Some(LevelInfo {
                    id: level.id().to_string(),
                    resolution: tm.resolution(),
                    scale_denominator: tm.scale_denominator(meters_per_unit),
                    tile_width: tm.tile_width(),
                    tile_height: tm.tile_height(),
                    matrix_width: tm.matrix_width(),
                    matrix_height: tm.matrix_height(),
                    limits: level.limits().clone(),
                })
            })
            .collect();
        let extras: Vec<ExtraInfo> = layer
            .extra_tile_matrix_sets()
            .iter()
            .map(|extra| ExtraInfo {
                identifier: extra.identifier().to_string(),
                tms: extra.tms().id().to_string(),
                crs: extra.tms().crs().code().to_string(),
                top: extra.top().to_string(),
                bottom: extra.bottom().to_string(),
                limits: extra.tile_limits().to_vec(),
            })
            .collect();
        let diagnostics: Vec<String> = layer.diagnostics().iter().map(|d| d.to_string()).collect();

        Ok(json!({
            "id": layer.id(),
            "title": layer.title,
            "abstract": layer.abstract_,
            "keywords": layer.keywords,
            "format": pyramid.format().as_str(),
            "protocols": protocols(layer),
            "tileMatrixSet": tms.id(),
            "identifier": layer.native_identifier(),
            "crs": tms.crs().code(),
            "bbox": bbox_array(layer.native_bbox()),
            "geographicBbox": bbox_array(layer.geographic_bbox()),
            "tileMatrices": levels,
            "extraTileMatrixSets": extras,
            "diagnostics": diagnostics,
        }))
    }
    /// Published and excluded layers
    pub fn catalog_summary(&self) -> Value {
        let catalog = self.catalog();
        let layers: Vec<Value> = catalog
            .layers()
            .iter()
            .map(|layer| {
                json!({
                    "id": layer.id(),
                    "title": layer.title,
                    "tileMatrixSet": layer.pyramid().tms().id(),
                    "protocols": protocols(layer),
                })
            })
            .collect();
        let excluded: Vec<Value> = catalog
            .excluded()
            .iter()
            .map(|excluded| json!({"id": excluded.id, "error": excluded.error}))
            .collect();
        json!({
            "tileMatrixSets": catalog.tms_book().ids(),
            "layers": layers,
            "excluded": excluded,
        })
    }
}
