//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::{Config, CoreError, TmsBook};
use crate::pyramid::format::{Format, RasterSpec, RasterSpecCfg};
use crate::pyramid::level::{Level, LevelCfg};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tile_matrix::{BoundingBox, TileMatrix, TileMatrixSet};

/// Pyramid descriptor (JSON)
#[derive(Deserialize, Clone, Debug)]
pub struct PyramidCfg {
    pub tile_matrix_set: String,
    pub format: Format,
    pub raster_specifications: Option<RasterSpecCfg>,
    #[serde(default)]
    pub levels: Vec<LevelCfg>,
}

/// Levels of one tile matrix set, ordered from the coarsest to the finest
#[derive(Clone, Debug)]
pub struct Pyramid {
    tms: Arc<TileMatrixSet>,
    format: Format,
    raster: Option<RasterSpec>,
    levels: Vec<Level>,
}

/// Source pyramid contributing the levels `top_level` down to `bottom_level`
#[derive(Clone, Debug)]
pub struct PyramidSource {
    /// Name used in error messages, usually the descriptor path
    pub name: String,
    pub pyramid: Pyramid,
    pub bottom_level: String,
    pub top_level: String,
}

impl Pyramid {
    pub fn new(
        tms: Arc<TileMatrixSet>,
        format: Format,
        raster: Option<RasterSpec>,
        levels: Vec<Level>,
    ) -> Result<Pyramid, CoreError> {
        if format.is_raster() && raster.is_none() {
            return Err(CoreError::Config(format!(
                "raster_specifications have to be provided for format {}",
                format
            )));
        }
        let mut ordered = BTreeMap::new();
        for level in levels {
            let pos = tms.position(level.id()).ok_or_else(|| CoreError::UnknownLevel {
                tms: tms.id().to_string(),
                level: level.id().to_string(),
            })?;
            if ordered.contains_key(&pos) {
                return Err(CoreError::DuplicateLevel(level.id().to_string()));
            }
            ordered.insert(pos, level);
        }
        if ordered.is_empty() {
            return Err(CoreError::Config("No level in the pyramid".to_string()));
        }
        Ok(Pyramid {
            tms,
            format,
            raster: raster.filter(|_| format.is_raster()),
            levels: ordered.into_iter().map(|(_, level)| level).collect(),
        })
    }
    /// Build from a parsed descriptor
    pub fn from_config(
        cfg: &PyramidCfg,
        tms_book: &TmsBook,
        base_dir: &Path,
    ) -> Result<Pyramid, CoreError> {
        let tms = tms_book
            .get(&cfg.tile_matrix_set)
            .ok_or_else(|| CoreError::UnknownTms(cfg.tile_matrix_set.clone()))?;
        let raster = match (cfg.format.is_raster(), &cfg.raster_specifications) {
            (true, Some(spec)) => Some(RasterSpec::from_config(spec).map_err(CoreError::Config)?),
            _ => None,
        };
        let levels = cfg
            .levels
            .iter()
            .map(|level| Level::from_config(level, tms, base_dir))
            .collect::<Result<Vec<_>, _>>()?;
        Pyramid::new(tms.clone(), cfg.format, raster, levels)
    }
    /// Parse a JSON descriptor
    pub fn parse(json: &str, tms_book: &TmsBook, base_dir: &Path) -> Result<Pyramid, CoreError> {
        let cfg: PyramidCfg =
            serde_json::from_str(json).map_err(|e| CoreError::Config(e.to_string()))?;
        Pyramid::from_config(&cfg, tms_book, base_dir)
    }
    /// Read a JSON descriptor file. Relative storage paths are resolved
    /// against the directory of the file.
    pub fn read<P: AsRef<Path>>(path: P, tms_book: &TmsBook) -> Result<Pyramid, CoreError> {
        let path = path.as_ref();
        let read_error = |message: String| CoreError::PyramidRead {
            path: path.display().to_string(),
            message,
        };
        let json = fs::read_to_string(path).map_err(|e| read_error(e.to_string()))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        debug!("Reading pyramid {}", path.display());
        Pyramid::parse(&json, tms_book, base_dir).map_err(|e| match e {
            CoreError::Config(message) => read_error(message),
            e => e,
        })
    }
    /// Merge the level bands of several source pyramids into one pyramid.
    ///
    /// All sources have to share tile matrix set, format and raster
    /// specifications. Every level has to be provided by exactly one source
    /// and the result must not contain a gap.
    pub fn compose(sources: &[PyramidSource]) -> Result<Pyramid, CoreError> {
        let first = sources.first().ok_or(CoreError::NoSource)?;
        let tms = first.pyramid.tms.clone();
        let format = first.pyramid.format;
        let raster = first.pyramid.raster.clone();

        let mut levels: BTreeMap<usize, Level> = BTreeMap::new();
        for source in sources {
            check_compatibility(&first.pyramid, source)?;
            let (start, band) = level_band(&tms, source)?;
            for (pos, tm) in (start..).zip(band) {
                let level = source.pyramid.level(tm.id()).ok_or_else(|| {
                    CoreError::MissingSourceLevel {
                        source_name: source.name.clone(),
                        level: tm.id().to_string(),
                    }
                })?;
                if levels.contains_key(&pos) {
                    return Err(CoreError::AmbiguousLevel(tm.id().to_string()));
                }
                debug!("Level {} from pyramid {}", tm.id(), source.name);
                levels.insert(pos, level.clone());
            }
        }

        let positions: Vec<usize> = levels.keys().cloned().collect();
        if let (Some(&top), Some(&bottom)) = (positions.first(), positions.last()) {
            if let Some(missing) = (top..=bottom).find(|pos| !levels.contains_key(pos)) {
                let id = tms.tile_matrices()[missing].id().to_string();
                return Err(CoreError::LevelGap(id));
            }
        }

        Pyramid::new(tms, format, raster, levels.into_iter().map(|(_, l)| l).collect())
    }
    pub fn tms(&self) -> &Arc<TileMatrixSet> {
        &self.tms
    }
    pub fn format(&self) -> Format {
        self.format
    }
    pub fn is_raster(&self) -> bool {
        self.format.is_raster()
    }
    pub fn raster(&self) -> Option<&RasterSpec> {
        self.raster.as_ref()
    }
    /// Levels from the coarsest to the finest
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }
    pub fn level(&self, id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.id() == id)
    }
    /// Coarsest level
    pub fn highest_level(&self) -> &Level {
        &self.levels[0]
    }
    /// Finest level
    pub fn lowest_level(&self) -> &Level {
        &self.levels[self.levels.len() - 1]
    }
    /// Replace the limits of the selected levels by the tiles covering `bbox`
    pub(crate) fn set_limits_from_bbox<F>(&mut self, bbox: &BoundingBox, selected: F)
    where
        F: Fn(&Level) -> bool,
    {
        let tms = self.tms.clone();
        for level in self.levels.iter_mut().filter(|level| selected(level)) {
            if let Some(tm) = tms.tile_matrix(level.id()) {
                level.set_limits(tm.bbox_to_tile_limits(bbox));
            }
        }
    }
    pub fn gen_config() -> String {
        let json = r#"{
  "tile_matrix_set": "PM",
  "format": "TIFF_JPG_UINT8","#;
        let levels = r#"
  "levels": [
    {
      "id": "0",
      "storage": { "type": "FILE", "image_directory": "ortho/DATA/0", "path_depth": 2 },
      "tiles_per_width": 16,
      "tiles_per_height": 16,
      "tile_limits": { "min_row": 0, "max_row": 0, "min_col": 0, "max_col": 0 }
    }
  ]
}
"#;
        format!(
            "{}{}{}",
            json,
            RasterSpec::gen_config().trim_end(),
            levels
        )
    }
}

fn check_compatibility(first: &Pyramid, source: &PyramidSource) -> Result<(), CoreError> {
    let incompatible = |message: String| CoreError::IncompatibleSource {
        source_name: source.name.clone(),
        message,
    };
    let pyramid = &source.pyramid;
    if pyramid.tms.id() != first.tms.id() {
        return Err(incompatible(format!(
            "tile matrix set {} instead of {}",
            pyramid.tms.id(),
            first.tms.id()
        )));
    }
    if pyramid.format != first.format {
        return Err(incompatible(format!(
            "format {} instead of {}",
            pyramid.format, first.format
        )));
    }
    if let (Some(spec), Some(first_spec)) = (&pyramid.raster, &first.raster) {
        if !spec.is_compatible(first_spec) {
            return Err(incompatible(
                "photometric or channel count differ".to_string(),
            ));
        }
    }
    Ok(())
}

/// Position of the top level and the tile matrices from top to bottom
fn level_band<'a>(
    tms: &'a TileMatrixSet,
    source: &PyramidSource,
) -> Result<(usize, &'a [TileMatrix]), CoreError> {
    let position = |id: &str| {
        tms.position(id).ok_or_else(|| CoreError::UnknownLevel {
            tms: tms.id().to_string(),
            level: id.to_string(),
        })
    };
    let top = position(&source.top_level)?;
    let bottom = position(&source.bottom_level)?;
    if top > bottom {
        return Err(CoreError::InvertedLevelRange {
            top: source.top_level.clone(),
            bottom: source.bottom_level.clone(),
        });
    }
    Ok((top, &tms.tile_matrices()[top..=bottom]))
}
