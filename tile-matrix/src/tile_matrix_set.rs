//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile matrix sets

use crate::crs::{Crs, CrsBook};
use crate::error::TmsError;
use crate::tile_matrix::TileMatrix;
use std::fs;
use std::path::Path;

/// Relative tolerance for the quad tree detection
const QUAD_TREE_EPSILON: f64 = 0.0001;

/// Tile matrix set descriptor (JSON)
#[derive(Deserialize, Clone, Debug)]
pub struct TileMatrixSetCfg {
    pub crs: String,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(rename = "tileMatrices")]
    pub tile_matrices: Vec<TileMatrixCfg>,
}

#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TileMatrixCfg {
    pub id: String,
    /// Resolution in CRS units per pixel
    pub cell_size: f64,
    pub tile_width: u32,
    pub tile_height: u32,
    pub matrix_width: u32,
    pub matrix_height: u32,
    /// Top-left corner of the matrix
    pub point_of_origin: [f64; 2],
}

impl TileMatrixCfg {
    pub fn to_tile_matrix(&self) -> Result<TileMatrix, TmsError> {
        TileMatrix::new(
            &self.id,
            self.cell_size,
            self.tile_width,
            self.tile_height,
            self.matrix_width,
            self.matrix_height,
            (self.point_of_origin[0], self.point_of_origin[1]),
        )
    }
}

/// Family of tile matrices sharing one CRS, ordered from the coarsest
/// ("top") to the finest ("bottom") resolution.
#[derive(Clone, Debug)]
pub struct TileMatrixSet {
    id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    crs: Crs,
    tile_matrices: Vec<TileMatrix>,
    is_quad_tree: bool,
}

impl TileMatrixSet {
    pub fn new(
        id: &str,
        crs: Crs,
        mut tile_matrices: Vec<TileMatrix>,
    ) -> Result<TileMatrixSet, TmsError> {
        if tile_matrices.is_empty() {
            return Err(TmsError::Empty(id.to_string()));
        }
        tile_matrices.sort_by(|a, b| b.resolution().total_cmp(&a.resolution()));
        for (i, tm) in tile_matrices.iter().enumerate() {
            if tile_matrices[..i].iter().any(|other| other.id() == tm.id()) {
                return Err(TmsError::DuplicateTileMatrix {
                    id: id.to_string(),
                    tile_matrix: tm.id().to_string(),
                });
            }
        }
        for pair in tile_matrices.windows(2) {
            if pair[0].resolution() == pair[1].resolution() {
                return Err(TmsError::DuplicateResolution {
                    id: id.to_string(),
                    first: pair[0].id().to_string(),
                    second: pair[1].id().to_string(),
                });
            }
        }
        let is_quad_tree = detect_quad_tree(&tile_matrices);
        Ok(TileMatrixSet {
            id: id.to_string(),
            title: None,
            description: None,
            keywords: Vec::new(),
            crs,
            tile_matrices,
            is_quad_tree,
        })
    }
    /// Build from a parsed descriptor
    pub fn from_config(
        id: &str,
        cfg: &TileMatrixSetCfg,
        crs_book: &CrsBook,
    ) -> Result<TileMatrixSet, TmsError> {
        let crs = crs_book.get(&cfg.crs).ok_or_else(|| TmsError::UnknownCrs {
            id: id.to_string(),
            crs: cfg.crs.clone(),
        })?;
        let tile_matrices = cfg
            .tile_matrices
            .iter()
            .map(|tm| tm.to_tile_matrix())
            .collect::<Result<Vec<_>, _>>()?;
        let mut tms = TileMatrixSet::new(id, crs, tile_matrices)?;
        tms.title = cfg.title.clone();
        tms.description = cfg.description.clone();
        tms.keywords = cfg.keywords.clone();
        Ok(tms)
    }
    /// Parse a JSON descriptor
    pub fn parse(id: &str, json: &str, crs_book: &CrsBook) -> Result<TileMatrixSet, TmsError> {
        let cfg: TileMatrixSetCfg =
            serde_json::from_str(json).map_err(|e| TmsError::Parse {
                id: id.to_string(),
                message: e.to_string(),
            })?;
        TileMatrixSet::from_config(id, &cfg, crs_book)
    }
    /// Read a JSON descriptor file. The identifier is the file stem.
    pub fn read<P: AsRef<Path>>(path: P, crs_book: &CrsBook) -> Result<TileMatrixSet, TmsError> {
        let path = path.as_ref();
        let read_error = |message: String| TmsError::Read {
            path: path.display().to_string(),
            message,
        };
        let id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| read_error("no file name".to_string()))?;
        let json = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        info!("Add tile matrix set {} from file {}", id, path.display());
        TileMatrixSet::parse(id, &json, crs_book)
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    pub fn crs(&self) -> &Crs {
        &self.crs
    }
    pub fn is_quad_tree(&self) -> bool {
        self.is_quad_tree
    }
    pub fn tile_matrix(&self, id: &str) -> Option<&TileMatrix> {
        self.tile_matrices.iter().find(|tm| tm.id() == id)
    }
    /// Tile matrices from the coarsest to the finest
    pub fn tile_matrices(&self) -> &[TileMatrix] {
        &self.tile_matrices
    }
    /// Position in coarse to fine order
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tile_matrices.iter().position(|tm| tm.id() == id)
    }
    /// Tile matrices from `top` down to `bottom`, both included.
    /// `None` if one of them is unknown or `top` is finer than `bottom`.
    pub fn between(&self, top: &str, bottom: &str) -> Option<&[TileMatrix]> {
        let top = self.position(top)?;
        let bottom = self.position(bottom)?;
        if top > bottom {
            return None;
        }
        Some(&self.tile_matrices[top..=bottom])
    }
    /// Tile matrix of this set equivalent to `source_tm` of `source_tms`.
    ///
    /// The source resolution is converted into this set's CRS units and the
    /// tile matrices are tried by increasing resolution distance. The first one
    /// with a relative difference below `tolerance` is accepted, there is no
    /// nearest-match fallback.
    pub fn find_corresponding_tile_matrix(
        &self,
        source_tms: &TileMatrixSet,
        source_tm: &TileMatrix,
        tolerance: f64,
    ) -> Option<&TileMatrix> {
        let target = source_tm.resolution() * source_tms.crs().meters_per_unit()
            / self.crs.meters_per_unit();
        let distance = |tm: &TileMatrix| (tm.resolution() - target).abs() / target;
        let mut candidates: Vec<&TileMatrix> = self.tile_matrices.iter().collect();
        candidates.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
        candidates.into_iter().find(|tm| distance(tm) < tolerance)
    }
}

/// Every level halves the resolution of its parent with identical origin and tile size
fn detect_quad_tree(tile_matrices: &[TileMatrix]) -> bool {
    tile_matrices.windows(2).all(|pair| {
        let (coarse, fine) = (&pair[0], &pair[1]);
        (fine.resolution() * 2.0 - coarse.resolution()).abs() < QUAD_TREE_EPSILON * fine.resolution()
            && coarse.origin() == fine.origin()
            && coarse.tile_width() == fine.tile_width()
            && coarse.tile_height() == fine.tile_height()
    })
}
