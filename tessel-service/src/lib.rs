//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate serde_json;

mod capabilities;
pub mod catalog;
pub mod error;
pub mod tile_service;
#[cfg(test)]
mod tile_service_test;

pub use catalog::{Catalog, ExcludedLayer};
pub use error::{ServiceError, TileError};
pub use tile_service::{Protocol, TileService, TileTarget};
