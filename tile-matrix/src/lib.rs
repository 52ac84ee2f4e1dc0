//! A library for OGC tile matrix calculations
//!
//! ## Tile matrix
//!
//! ```rust
//! use tile_matrix::{BoundingBox, TileMatrix, TileMatrixLimits};
//!
//! let tm = TileMatrix::new("0", 1.0, 256, 256, 10, 10, (0.0, 100.0)).unwrap();
//! assert_eq!(
//!     tm.tile_indices_to_bbox(0, 0),
//!     BoundingBox::new(0.0, -156.0, 256.0, 100.0)
//! );
//! assert_eq!(
//!     tm.bbox_to_tile_limits(&BoundingBox::new(10.0, 10.0, 20.0, 30.0)),
//!     TileMatrixLimits::new("0", 0, 0, 0, 0)
//! );
//! ```
//!
//! ## Tile matrix sets
//!
//! ```rust
//! use tile_matrix::{CrsBook, TileMatrixSet};
//!
//! let json = r#"{
//!     "crs": "EPSG:3857",
//!     "tileMatrices": [
//!         { "id": "1", "cellSize": 78271.51696402048, "tileWidth": 256, "tileHeight": 256,
//!           "matrixWidth": 2, "matrixHeight": 2,
//!           "pointOfOrigin": [-20037508.3427892, 20037508.3427892] },
//!         { "id": "0", "cellSize": 156543.03392804097, "tileWidth": 256, "tileHeight": 256,
//!           "matrixWidth": 1, "matrixHeight": 1,
//!           "pointOfOrigin": [-20037508.3427892, 20037508.3427892] }
//!     ]
//! }"#;
//! let tms = TileMatrixSet::parse("PM", json, &CrsBook::default()).unwrap();
//! assert_eq!(tms.tile_matrices()[0].id(), "0");
//! assert!(tms.is_quad_tree());
//! ```

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

mod bbox;
mod crs;
mod error;
mod tile_matrix;
mod tile_matrix_limits;
mod tile_matrix_set;


pub use bbox::BoundingBox;
pub use crs::{
    Crs, CrsBook, Geographic, Proj4, Projection, WebMercator, MERCATOR_MAX_LAT,
    METERS_PER_DEGREE,
};
pub use error::TmsError;
pub use tile_matrix::TileMatrix;
pub use tile_matrix_limits::TileMatrixLimits;
pub use tile_matrix_set::{TileMatrixCfg, TileMatrixSet, TileMatrixSetCfg};
