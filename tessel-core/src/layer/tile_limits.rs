//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Tile limits of a layer in its native and in additional tile matrix sets

use crate::core::{CoreError, LoadContext};
use crate::pyramid::{Level, Pyramid};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tile_matrix::{BoundingBox, CrsBook, TileMatrixLimits, TileMatrixSet};

/// Additional tile matrix set of a layer with the levels matching the pyramid
#[derive(Clone, Debug)]
pub struct ExtraTileMatrixSet {
    tms: Arc<TileMatrixSet>,
    top: String,
    bottom: String,
    identifier: String,
    limits: Vec<TileMatrixLimits>,
}

impl ExtraTileMatrixSet {
    pub fn tms(&self) -> &Arc<TileMatrixSet> {
        &self.tms
    }
    /// Coarsest matching tile matrix
    pub fn top(&self) -> &str {
        &self.top
    }
    /// Finest matching tile matrix
    pub fn bottom(&self) -> &str {
        &self.bottom
    }
    /// WMTS identifier `<tms>_<top>_<bottom>`
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
    /// Limits from top to bottom. Tile matrices not covering the layer
    /// extent have no limits.
    pub fn tile_limits(&self) -> &[TileMatrixLimits] {
        &self.limits
    }
    pub fn limits(&self, tile_matrix: &str) -> Option<&TileMatrixLimits> {
        self.limits.iter().find(|l| l.tile_matrix == tile_matrix)
    }
}

impl PartialEq for ExtraTileMatrixSet {
    fn eq(&self, other: &ExtraTileMatrixSet) -> bool {
        self.tms.id() == other.tms.id()
            && self.top == other.top
            && self.bottom == other.bottom
            && self.identifier == other.identifier
            && self.limits == other.limits
    }
}

/// Why an additional tile matrix set is not offered by a layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DropReason {
    #[error("unknown tile matrix set")]
    UnknownTms,
    #[error("native tile matrix set of the pyramid")]
    NativeTms,
    #[error("listed more than once")]
    Duplicate,
    #[error("vector pyramids are only served in their native tile matrix set")]
    VectorPyramid,
    #[error("CRS {0} is not allowed")]
    ForbiddenCrs(String),
    #[error("reprojection into {0} is disabled")]
    ReprojectionDisabled(String),
    #[error("layer extent is outside of the CRS definition area")]
    OutsideCrsArea,
    #[error("layer extent cannot be reprojected")]
    ReprojectionFailed,
    #[error("no tile matrix matches a pyramid level")]
    NoTopLevel,
    #[error("no tile matrix matches the finest pyramid levels")]
    NoBottomLevel,
    #[error("matching tile matrices are in reverse order")]
    InvertedLevels,
    #[error("layer extent does not cover any tile of the matching tile matrices")]
    NoTileInExtent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridDiagnostic {
    pub tms: String,
    pub reason: DropReason,
}

impl fmt::Display for GridDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tile matrix set '{}' ignored: {}", self.tms, self.reason)
    }
}

/// Set the limits of every pyramid level and return the native and the
/// geographic extent.
///
/// Without `bbox`, the limits of the finest level are kept and define the
/// extent. Otherwise the geographic `bbox` is projected into the pyramid CRS.
pub fn set_native_limits(
    pyramid: &mut Pyramid,
    bbox: Option<&BoundingBox>,
    crs_book: &CrsBook,
) -> Result<(BoundingBox, BoundingBox), CoreError> {
    let geographic_crs = crs_book.epsg4326();
    let tms = pyramid.tms().clone();
    let crs = tms.crs();
    match bbox {
        None => {
            let finest = pyramid.lowest_level();
            let tm = tms
                .tile_matrix(finest.id())
                .ok_or_else(|| CoreError::UnknownLevel {
                    tms: tms.id().to_string(),
                    level: finest.id().to_string(),
                })?;
            let native = tm.limits_to_bbox(finest.limits());
            let finest = finest.id().to_string();
            pyramid.set_limits_from_bbox(&native, |level| level.id() != finest);
            let geographic = native
                .reproject(crs.as_ref(), geographic_crs.as_ref())
                .ok_or_else(|| {
                    CoreError::InvalidBbox(format!(
                        "extent of level {} cannot be reprojected into {}",
                        finest,
                        geographic_crs.code()
                    ))
                })?;
            Ok((native, geographic))
        }
        Some(bbox) => {
            if !(bbox.ymax >= bbox.ymin && bbox.xmax >= bbox.xmin) {
                return Err(CoreError::InvalidBbox(
                    "north has to be greater than south and east greater than west".to_string(),
                ));
            }
            let cropped = if bbox.has_null_area() {
                Some(*bbox)
            } else {
                bbox.crop_to_area(crs.as_ref())
            }
            .ok_or_else(|| {
                CoreError::InvalidBbox(format!("outside of the {} definition area", crs.code()))
            })?;
            let native = cropped
                .reproject(geographic_crs.as_ref(), crs.as_ref())
                .ok_or_else(|| {
                    CoreError::InvalidBbox(format!("cannot be reprojected into {}", crs.code()))
                })?;
            pyramid.set_limits_from_bbox(&native, |_| true);
            Ok((native, *bbox))
        }
    }
}

/// Derive every requested additional tile matrix set.
///
/// Tile matrix sets which can't be offered are collected as diagnostics.
pub fn derive_extra_tile_matrix_sets(
    pyramid: &Pyramid,
    geographic_bbox: &BoundingBox,
    requested: &[String],
    ctx: &LoadContext,
) -> (Vec<ExtraTileMatrixSet>, Vec<GridDiagnostic>) {
    let mut extras = Vec::new();
    let mut diagnostics = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    for id in requested {
        let derived = if seen.contains(&id.as_str()) {
            Err(DropReason::Duplicate)
        } else {
            seen.push(id);
            check_and_derive(pyramid, geographic_bbox, id, ctx)
        };
        match derived {
            Ok(extra) => extras.push(extra),
            Err(reason) => diagnostics.push(GridDiagnostic {
                tms: id.clone(),
                reason,
            }),
        }
    }
    (extras, diagnostics)
}

fn check_and_derive(
    pyramid: &Pyramid,
    geographic_bbox: &BoundingBox,
    id: &str,
    ctx: &LoadContext,
) -> Result<ExtraTileMatrixSet, DropReason> {
    let tms = ctx.tms_book.get(id).ok_or(DropReason::UnknownTms)?;
    if tms.id() == pyramid.tms().id() {
        return Err(DropReason::NativeTms);
    }
    if !pyramid.is_raster() {
        return Err(DropReason::VectorPyramid);
    }
    let code = tms.crs().code();
    if !ctx.settings.is_crs_allowed(code) {
        return Err(DropReason::ForbiddenCrs(code.to_string()));
    }
    if !ctx.settings.reprojection && !code.eq_ignore_ascii_case(pyramid.tms().crs().code()) {
        return Err(DropReason::ReprojectionDisabled(code.to_string()));
    }
    derive_extra_tile_matrix_set(
        pyramid,
        geographic_bbox,
        tms,
        ctx.crs_book,
        ctx.settings.resolution_tolerance,
    )
}

/// Levels and tile limits of `tms` corresponding to the pyramid levels
pub fn derive_extra_tile_matrix_set(
    pyramid: &Pyramid,
    geographic_bbox: &BoundingBox,
    tms: &Arc<TileMatrixSet>,
    crs_book: &CrsBook,
    tolerance: f64,
) -> Result<ExtraTileMatrixSet, DropReason> {
    let geographic_crs = crs_book.epsg4326();
    let crs = tms.crs();
    let bbox = geographic_bbox
        .crop_to_area(crs.as_ref())
        .ok_or(DropReason::OutsideCrsArea)?
        .reproject(geographic_crs.as_ref(), crs.as_ref())
        .ok_or(DropReason::ReprojectionFailed)?;

    let native = pyramid.tms();
    let matching = |level: &Level| {
        native
            .tile_matrix(level.id())
            .and_then(|tm| tms.find_corresponding_tile_matrix(native, tm, tolerance))
    };
    let top = pyramid
        .levels()
        .iter()
        .find_map(&matching)
        .ok_or(DropReason::NoTopLevel)?;
    let bottom = pyramid
        .levels()
        .iter()
        .rev()
        .find_map(&matching)
        .ok_or(DropReason::NoBottomLevel)?;
    // Windows clamped onto the matrix border address no tile
    let limits: Vec<TileMatrixLimits> = tms
        .between(top.id(), bottom.id())
        .ok_or(DropReason::InvertedLevels)?
        .iter()
        .map(|tm| (tm, tm.bbox_to_tile_limits(&bbox)))
        .filter(|(tm, limits)| !limits.is_degenerate(tm))
        .map(|(_, limits)| limits)
        .collect();
    if limits.is_empty() {
        return Err(DropReason::NoTileInExtent);
    }

    Ok(ExtraTileMatrixSet {
        tms: tms.clone(),
        top: top.id().to_string(),
        bottom: bottom.id().to_string(),
        identifier: format!("{}_{}_{}", tms.id(), top.id(), bottom.id()),
        limits,
    })
}
