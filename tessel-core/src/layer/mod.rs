//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[allow(clippy::module_inception)]
mod layer;
mod tile_limits;

pub use self::layer::Layer;
pub use self::tile_limits::{
    derive_extra_tile_matrix_set, derive_extra_tile_matrix_sets, set_native_limits, DropReason,
    ExtraTileMatrixSet, GridDiagnostic,
};
