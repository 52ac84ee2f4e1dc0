//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::config::{ServiceCfg, TmsRefCfg, DEFAULT_RESOLUTION_TOLERANCE};
use crate::core::Config;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tile_matrix::{CrsBook, TileMatrixSet};

/// Tile matrix sets by identifier
#[derive(Clone, Debug, Default)]
pub struct TmsBook {
    tms: HashMap<String, Arc<TileMatrixSet>>,
}

impl TmsBook {
    pub fn new() -> TmsBook {
        TmsBook::default()
    }
    /// Read all descriptor files. Failing descriptors are logged and skipped.
    pub fn load(cfgs: &[TmsRefCfg], base_dir: &Path, crs_book: &CrsBook) -> TmsBook {
        let mut book = TmsBook::new();
        for cfg in cfgs {
            let path = resolve_path(base_dir, &cfg.path);
            match TileMatrixSet::read(&path, crs_book) {
                Ok(tms) => {
                    if book.contains(tms.id()) {
                        warn!("Tile matrix set '{}' already loaded - skipping {}", tms.id(), path.display());
                    } else {
                        book.insert(tms);
                    }
                }
                Err(e) => error!("{}", e),
            }
        }
        book
    }
    pub fn insert(&mut self, tms: TileMatrixSet) -> Arc<TileMatrixSet> {
        let tms = Arc::new(tms);
        self.tms.insert(tms.id().to_string(), tms.clone());
        tms
    }
    pub fn get(&self, id: &str) -> Option<&Arc<TileMatrixSet>> {
        self.tms.get(id)
    }
    pub fn contains(&self, id: &str) -> bool {
        self.tms.contains_key(id)
    }
    /// Sorted identifiers
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.tms.keys().map(|id| id.as_str()).collect();
        ids.sort();
        ids
    }
    pub fn len(&self) -> usize {
        self.tms.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tms.is_empty()
    }
    pub fn gen_config() -> String {
        let toml = r#"
[[tms]]
path = "tms/PM.json"

#[[tms]]
#path = "tms/WGS84G.json"
"#;
        toml.to_string()
    }
}

/// Service wide settings for layer loading
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceSettings {
    pub resolution_tolerance: f64,
    pub reprojection: bool,
    pub allowed_crs: Vec<String>,
}

impl Default for ServiceSettings {
    fn default() -> ServiceSettings {
        ServiceSettings {
            resolution_tolerance: DEFAULT_RESOLUTION_TOLERANCE,
            reprojection: true,
            allowed_crs: Vec::new(),
        }
    }
}

impl ServiceSettings {
    /// An empty allow-list accepts every CRS
    pub fn is_crs_allowed(&self, code: &str) -> bool {
        self.allowed_crs.is_empty()
            || self
                .allowed_crs
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(code))
    }
}

impl<'a> Config<'a, ServiceCfg> for ServiceSettings {
    fn from_config(cfg: &ServiceCfg) -> Result<Self, String> {
        let tolerance = cfg.resolution_tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(format!(
                "resolution_tolerance has to be a positive number (got {})",
                tolerance
            ));
        }
        Ok(ServiceSettings {
            resolution_tolerance: tolerance,
            reprojection: cfg.reprojection,
            allowed_crs: cfg.allowed_crs.iter().map(|c| c.to_uppercase()).collect(),
        })
    }
    fn gen_config() -> String {
        let toml = r#"
[service]
# Maximal relative resolution difference of matching tile matrices
resolution_tolerance = 0.2
# Allow tile matrix sets in another CRS than the pyramid
reprojection = true
# CRS accepted for additional tile matrix sets (empty: all)
#allowed_crs = ["EPSG:3857", "EPSG:4326"]
"#;
        toml.to_string()
    }
    fn gen_runtime_config(&self) -> String {
        let mut lines = vec!["[service]".to_string()];
        lines.push(format!("resolution_tolerance = {:?}", self.resolution_tolerance));
        lines.push(format!("reprojection = {}", self.reprojection));
        if self.allowed_crs.is_empty() {
            lines.push(r#"#allowed_crs = ["EPSG:3857", "EPSG:4326"]"#.to_string());
        } else {
            let codes: Vec<String> = self.allowed_crs.iter().map(|c| format!("\"{}\"", c)).collect();
            lines.push(format!("allowed_crs = [{}]", codes.join(", ")));
        }
        lines.join("\n") + "\n"
    }
}

/// Everything a layer needs for loading
#[derive(Clone, Copy, Debug)]
pub struct LoadContext<'a> {
    pub tms_book: &'a TmsBook,
    pub crs_book: &'a CrsBook,
    pub settings: &'a ServiceSettings,
    /// Directory relative descriptor paths are resolved against
    pub base_dir: &'a Path,
}

pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
