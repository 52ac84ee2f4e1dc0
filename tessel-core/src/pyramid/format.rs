//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use crate::core::Config;
use std::fmt;

/// Tile data format
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    #[serde(rename = "TIFF_RAW_UINT8")]
    TiffRawUint8,
    #[serde(rename = "TIFF_JPG_UINT8")]
    TiffJpgUint8,
    #[serde(rename = "TIFF_PNG_UINT8")]
    TiffPngUint8,
    #[serde(rename = "TIFF_LZW_UINT8")]
    TiffLzwUint8,
    #[serde(rename = "TIFF_ZIP_UINT8")]
    TiffZipUint8,
    #[serde(rename = "TIFF_PKB_UINT8")]
    TiffPkbUint8,
    #[serde(rename = "TIFF_RAW_FLOAT32")]
    TiffRawFloat32,
    #[serde(rename = "TIFF_LZW_FLOAT32")]
    TiffLzwFloat32,
    #[serde(rename = "TIFF_ZIP_FLOAT32")]
    TiffZipFloat32,
    #[serde(rename = "TIFF_PKB_FLOAT32")]
    TiffPkbFloat32,
    #[serde(rename = "TIFF_PBF_MVT")]
    TiffPbfMvt,
}

impl Format {
    pub fn is_raster(&self) -> bool {
        *self != Format::TiffPbfMvt
    }
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::TiffRawUint8 => "TIFF_RAW_UINT8",
            Format::TiffJpgUint8 => "TIFF_JPG_UINT8",
            Format::TiffPngUint8 => "TIFF_PNG_UINT8",
            Format::TiffLzwUint8 => "TIFF_LZW_UINT8",
            Format::TiffZipUint8 => "TIFF_ZIP_UINT8",
            Format::TiffPkbUint8 => "TIFF_PKB_UINT8",
            Format::TiffRawFloat32 => "TIFF_RAW_FLOAT32",
            Format::TiffLzwFloat32 => "TIFF_LZW_FLOAT32",
            Format::TiffZipFloat32 => "TIFF_ZIP_FLOAT32",
            Format::TiffPkbFloat32 => "TIFF_PKB_FLOAT32",
            Format::TiffPbfMvt => "TIFF_PBF_MVT",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Photometric {
    Gray,
    Rgb,
    Mask,
}

/// Value of missing channel values in `nodata`
pub const DEFAULT_NODATA: i32 = 255;

#[derive(Deserialize, Clone, Debug)]
pub struct RasterSpecCfg {
    pub photometric: Photometric,
    pub channels: u32,
    /// Comma separated value per channel, e.g. "255,255,255"
    pub nodata: String,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RasterSpec {
    pub photometric: Photometric,
    pub channels: u32,
    pub nodata: Vec<i32>,
}

impl RasterSpec {
    /// Photometric and channel count have to match for composition
    pub fn is_compatible(&self, other: &RasterSpec) -> bool {
        self.photometric == other.photometric && self.channels == other.channels
    }
}

impl<'a> Config<'a, RasterSpecCfg> for RasterSpec {
    fn from_config(cfg: &RasterSpecCfg) -> Result<Self, String> {
        if cfg.channels == 0 {
            return Err("raster_specifications.channels has to be a non zero integer".to_string());
        }
        let values = cfg
            .nodata
            .split(',')
            .map(|value| match value.trim() {
                "" => Ok(DEFAULT_NODATA),
                value => value
                    .parse::<i32>()
                    .map_err(|_| format!("Invalid nodata value '{}'", value)),
            })
            .collect::<Result<Vec<i32>, String>>()?;
        if (values.len() as u32) < cfg.channels {
            return Err(format!(
                "{} channels but only {} nodata values",
                cfg.channels,
                values.len()
            ));
        }
        Ok(RasterSpec {
            photometric: cfg.photometric,
            channels: cfg.channels,
            nodata: values.into_iter().take(cfg.channels as usize).collect(),
        })
    }
    fn gen_config() -> String {
        let json = r#"
  "raster_specifications": {
    "photometric": "rgb",
    "channels": 3,
    "nodata": "255,255,255"
  },
"#;
        json.to_string()
    }
}
