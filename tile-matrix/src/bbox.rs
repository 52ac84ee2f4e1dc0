//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Bounding boxes

use crate::crs::Projection;

/// Number of sample points per bbox edge used for reprojection
const DENSIFY_POINTS: usize = 21;

/// Ground or geographic bounding box
#[derive(PartialEq, Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> BoundingBox {
        BoundingBox {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }
    /// True for boxes without surface (including inverted ones)
    pub fn has_null_area(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.xmin < other.xmax
            && self.xmax > other.xmin
            && self.ymin < other.ymax
            && self.ymax > other.ymin
    }
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }
        Some(BoundingBox {
            xmin: self.xmin.max(other.xmin),
            ymin: self.ymin.max(other.ymin),
            xmax: self.xmax.min(other.xmax),
            ymax: self.ymax.min(other.ymax),
        })
    }
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }
    /// Crop a geographic (lon/lat) bbox to the definition area of `crs`.
    /// Returns `None` when nothing with a surface remains.
    pub fn crop_to_area(&self, crs: &dyn Projection) -> Option<BoundingBox> {
        self.intersection(&crs.definition_area())
            .filter(|cropped| !cropped.has_null_area())
    }
    /// Reproject from `from` into `to`.
    ///
    /// Every edge is densified before transformation, the result is the
    /// envelope of all transformed points. Fails if any point cannot be
    /// transformed.
    pub fn reproject(&self, from: &dyn Projection, to: &dyn Projection) -> Option<BoundingBox> {
        if from.code() == to.code() {
            return Some(*self);
        }
        let mut result: Option<BoundingBox> = None;
        for (x, y) in self.edge_points() {
            let (lon, lat) = from.inverse(x, y)?;
            let (px, py) = to.forward(lon, lat)?;
            let point = BoundingBox::new(px, py, px, py);
            result = Some(match result {
                Some(bbox) => bbox.union(&point),
                None => point,
            });
        }
        result
    }
    fn edge_points(&self) -> Vec<(f64, f64)> {
        let steps = (DENSIFY_POINTS - 1) as f64;
        let dx = self.width() / steps;
        let dy = self.height() / steps;
        let mut points = Vec::with_capacity(DENSIFY_POINTS * 4);
        for i in 0..DENSIFY_POINTS {
            let (x, y) = if i == DENSIFY_POINTS - 1 {
                (self.xmax, self.ymax)
            } else {
                (self.xmin + dx * i as f64, self.ymin + dy * i as f64)
            };
            points.push((x, self.ymin));
            points.push((x, self.ymax));
            points.push((self.xmin, y));
            points.push((self.xmax, y));
        }
        points
    }
}
