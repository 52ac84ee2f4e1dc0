//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

//! Coordinate reference systems
//!
//! Tile matrix calculations only need a small surface of a CRS: its code, its
//! domain of validity, its unit size and a transformation from and to
//! longitude/latitude. Anything implementing [`Projection`] can be registered
//! in a [`CrsBook`], the built-in implementations cover geographic
//! coordinates and spherical Web Mercator. Other CRS are described with a
//! PROJ.4 definition and transformed by [`Proj4`].

use crate::bbox::BoundingBox;
use crate::error::TmsError;
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::collections::HashMap;
use std::f64::consts;
use std::fmt;
use std::sync::Arc;

const EARTH_RADIUS: f64 = 6378137.0;
/// Length of one degree on the equator of the WGS84 sphere
pub const METERS_PER_DEGREE: f64 = EARTH_RADIUS * 2.0 * consts::PI / 360.0;
/// Latitude limit of the square Web Mercator world
pub const MERCATOR_MAX_LAT: f64 = 85.0511287798066;

/// Coordinate reference system as seen by the tile matrix engine
pub trait Projection: fmt::Debug + Send + Sync {
    /// Request code, e.g. `EPSG:3857`
    fn code(&self) -> &str;
    /// Domain of validity in longitude/latitude
    fn definition_area(&self) -> BoundingBox;
    /// Ground meters of one CRS unit
    fn meters_per_unit(&self) -> f64;
    /// Longitude/latitude to CRS coordinates
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)>;
    /// CRS coordinates to longitude/latitude
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)>;
}

/// Shared CRS handle
pub type Crs = Arc<dyn Projection>;

/// Longitude/latitude in degrees
#[derive(Debug, Clone)]
pub struct Geographic {
    code: String,
}

impl Geographic {
    pub fn new(code: &str) -> Geographic {
        Geographic {
            code: code.to_uppercase(),
        }
    }
}

impl Projection for Geographic {
    fn code(&self) -> &str {
        &self.code
    }
    fn definition_area(&self) -> BoundingBox {
        BoundingBox::new(-180.0, -90.0, 180.0, 90.0)
    }
    fn meters_per_unit(&self) -> f64 {
        METERS_PER_DEGREE
    }
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        Some((lon, lat))
    }
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        Some((x, y))
    }
}

/// Spherical Mercator (Google maps compatible)
#[derive(Debug, Clone)]
pub struct WebMercator {
    code: String,
}

impl WebMercator {
    pub fn new(code: &str) -> WebMercator {
        WebMercator {
            code: code.to_uppercase(),
        }
    }
}

impl Projection for WebMercator {
    fn code(&self) -> &str {
        &self.code
    }
    fn definition_area(&self) -> BoundingBox {
        BoundingBox::new(-180.0, -MERCATOR_MAX_LAT, 180.0, MERCATOR_MAX_LAT)
    }
    fn meters_per_unit(&self) -> f64 {
        1.0
    }
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if lat.abs() >= 90.0 || !lon.is_finite() {
            return None;
        }
        let x = EARTH_RADIUS * lon.to_radians();
        let y = EARTH_RADIUS * ((consts::PI * 0.25) + (0.5 * lat.to_radians())).tan().ln();
        Some((x, y))
    }
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let lon = (x / EARTH_RADIUS).to_degrees();
        let lat = (2.0 * (y / EARTH_RADIUS).exp().atan() - consts::FRAC_PI_2).to_degrees();
        Some((lon, lat))
    }
}

const LONLAT_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";
const LAMBERT93_DEFINITION: &str = "+proj=lcc +lat_0=46.5 +lon_0=3 +lat_1=49 +lat_2=44 \
    +x_0=700000 +y_0=6600000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// CRS given by a PROJ.4 definition
#[derive(Debug, Clone)]
pub struct Proj4 {
    code: String,
    area: BoundingBox,
    geographic: bool,
    meters_per_unit: f64,
    proj: Proj,
    lonlat: Proj,
}

impl Proj4 {
    /// `area` is the domain of validity in longitude/latitude
    pub fn new(code: &str, definition: &str, area: BoundingBox) -> Result<Proj4, TmsError> {
        let invalid = |message: String| TmsError::InvalidCrs {
            code: code.to_uppercase(),
            message,
        };
        let proj = Proj::from_proj_string(definition).map_err(|e| invalid(e.to_string()))?;
        let lonlat = Proj::from_proj_string(LONLAT_DEFINITION).map_err(|e| invalid(e.to_string()))?;
        let geographic = definition
            .split_whitespace()
            .any(|param| param == "+proj=longlat" || param == "+proj=latlong");
        let meters_per_unit = if geographic {
            METERS_PER_DEGREE
        } else {
            match definition
                .split_whitespace()
                .find_map(|param| param.strip_prefix("+to_meter="))
            {
                Some(value) => value
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite() && *v > 0.0)
                    .ok_or_else(|| invalid(format!("invalid unit size '{}'", value)))?,
                None => 1.0,
            }
        };
        Ok(Proj4 {
            code: code.to_uppercase(),
            area,
            geographic,
            meters_per_unit,
            proj,
            lonlat,
        })
    }
}

impl Projection for Proj4 {
    fn code(&self) -> &str {
        &self.code
    }
    fn definition_area(&self) -> BoundingBox {
        self.area
    }
    fn meters_per_unit(&self) -> f64 {
        self.meters_per_unit
    }
    fn forward(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.lonlat, &self.proj, &mut point).ok()?;
        let (x, y) = if self.geographic {
            (point.0.to_degrees(), point.1.to_degrees())
        } else {
            (point.0, point.1)
        };
        if x.is_finite() && y.is_finite() {
            Some((x, y))
        } else {
            None
        }
    }
    fn inverse(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let mut point = if self.geographic {
            (x.to_radians(), y.to_radians(), 0.0)
        } else {
            (x, y, 0.0)
        };
        transform(&self.proj, &self.lonlat, &mut point).ok()?;
        let (lon, lat) = (point.0.to_degrees(), point.1.to_degrees());
        if lon.is_finite() && lat.is_finite() {
            Some((lon, lat))
        } else {
            None
        }
    }
}

/// Registry of known CRS, looked up by (case insensitive) request code
#[derive(Clone, Debug)]
pub struct CrsBook {
    crs: HashMap<String, Crs>,
}

impl CrsBook {
    /// Empty registry
    pub fn empty() -> CrsBook {
        CrsBook {
            crs: HashMap::new(),
        }
    }
    pub fn register(&mut self, crs: Crs) {
        self.crs.insert(crs.code().to_uppercase(), crs);
    }
    /// Register a CRS from its PROJ.4 definition
    pub fn register_proj4(
        &mut self,
        code: &str,
        definition: &str,
        area: BoundingBox,
    ) -> Result<(), TmsError> {
        let crs = Proj4::new(code, definition, area)?;
        self.register(Arc::new(crs));
        Ok(())
    }
    pub fn get(&self, code: &str) -> Option<Crs> {
        self.crs.get(&code.to_uppercase()).cloned()
    }
    pub fn contains(&self, code: &str) -> bool {
        self.crs.contains_key(&code.to_uppercase())
    }
    /// Reference CRS of geographic bounding boxes
    pub fn epsg4326(&self) -> Crs {
        self.get("EPSG:4326")
            .unwrap_or_else(|| Arc::new(Geographic::new("EPSG:4326")))
    }
}

impl Default for CrsBook {
    /// Registry with the built-in geographic and Web Mercator CRS and
    /// Lambert-93
    fn default() -> CrsBook {
        let mut book = CrsBook::empty();
        for code in &["EPSG:4326", "CRS:84"] {
            book.register(Arc::new(Geographic::new(code)));
        }
        for code in &["EPSG:3857", "EPSG:900913"] {
            book.register(Arc::new(WebMercator::new(code)));
        }
        let lambert93 = BoundingBox::new(-9.86, 41.15, 10.38, 51.56);
        if let Err(e) = book.register_proj4("EPSG:2154", LAMBERT93_DEFINITION, lambert93) {
            warn!("{}", e);
        }
        book
    }
}
