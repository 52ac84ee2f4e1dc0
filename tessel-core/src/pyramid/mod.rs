//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

mod format;
mod level;
#[allow(clippy::module_inception)]
mod pyramid;

pub use self::format::{Format, Photometric, RasterSpec, RasterSpecCfg, DEFAULT_NODATA};
pub use self::level::{Level, LevelCfg, Storage, StorageCfg, TileLimitsCfg};
pub use self::pyramid::{Pyramid, PyramidCfg, PyramidSource};
