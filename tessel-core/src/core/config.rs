//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use regex::Regex;
use serde::Deserialize;
use std;
use std::collections::HashMap;
use std::env;
use std::error::Error;
use std::fs::File;
use std::io::prelude::*;
use tera::{Context, Tera};
use toml::Value;

pub trait Config<'a, C: Deserialize<'a>>
where
    Self: std::marker::Sized,
{
    /// Read configuration
    fn from_config(config: &C) -> Result<Self, String>;
    /// Generate configuration template
    fn gen_config() -> String;
    /// Generate configuration template with runtime information
    fn gen_runtime_config(&self) -> String {
        Self::gen_config()
    }
}

#[derive(Deserialize, Clone, Debug, Default)]
pub struct ApplicationCfg {
    #[serde(default)]
    pub service: ServiceCfg,
    #[serde(default)]
    pub crs: Vec<CrsCfg>,
    #[serde(default)]
    pub tms: Vec<TmsRefCfg>,
    #[serde(rename = "layer", default)]
    pub layers: Vec<LayerCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServiceCfg {
    /// Maximal relative resolution difference of matching tile matrices
    #[serde(default = "default_resolution_tolerance")]
    pub resolution_tolerance: f64,
    /// Allow tile matrix sets in another CRS than the pyramid
    #[serde(default = "default_true")]
    pub reprojection: bool,
    /// CRS accepted for additional tile matrix sets (empty: all)
    #[serde(default)]
    pub allowed_crs: Vec<String>,
}

impl Default for ServiceCfg {
    fn default() -> ServiceCfg {
        ServiceCfg {
            resolution_tolerance: default_resolution_tolerance(),
            reprojection: true,
            allowed_crs: Vec::new(),
        }
    }
}

pub const DEFAULT_RESOLUTION_TOLERANCE: f64 = 0.2;

pub fn default_resolution_tolerance() -> f64 {
    DEFAULT_RESOLUTION_TOLERANCE
}

pub fn default_true() -> bool {
    true
}

/// Tile matrix set descriptor file. The file stem is the identifier.
#[derive(Deserialize, Clone, Debug)]
pub struct TmsRefCfg {
    pub path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LayerCfg {
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Geographic extent (EPSG:4326). Default: extent of the finest level
    pub bbox: Option<BboxCfg>,
    #[serde(default = "default_true")]
    pub wms: bool,
    #[serde(default = "default_true")]
    pub wmts: bool,
    #[serde(default = "default_true")]
    pub tms: bool,
    /// Additional tile matrix sets served through WMTS
    #[serde(default)]
    pub extra_tms: Vec<String>,
    #[serde(rename = "pyramid", default)]
    pub pyramids: Vec<PyramidRefCfg>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct BboxCfg {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// CRS defined by a PROJ.4 string, valid within `area` (longitude/latitude)
#[derive(Deserialize, Clone, Debug)]
pub struct CrsCfg {
    pub code: String,
    pub proj4: String,
    pub area: BboxCfg,
}

/// Source pyramid contributing the levels from `top_level` down to `bottom_level`
#[derive(Deserialize, Clone, Debug)]
pub struct PyramidRefCfg {
    pub path: String,
    pub bottom_level: String,
    pub top_level: String,
}

pub const DEFAULT_CONFIG: &'static str = r#"
[service]
resolution_tolerance = 0.2
reprojection = true
#allowed_crs = ["EPSG:3857", "EPSG:4326"]

#[[crs]]
#code = "EPSG:2056"
#proj4 = "+proj=somerc +lat_0=46.9524055555556 +lon_0=7.43958333333333 +k_0=1 +x_0=2600000 +y_0=1200000 +ellps=bessel +towgs84=674.374,15.056,405.346,0,0,0,0 +units=m +no_defs"
#area = { west = 5.96, south = 45.82, east = 10.49, north = 47.81 }

[[tms]]
path = "tms/PM.json"

[[layer]]
id = ""
extra_tms = []

[[layer.pyramid]]
path = ""
bottom_level = ""
top_level = ""
"#;

/// Load and parse the config file into an config struct.
pub fn read_config<'a, T: Deserialize<'a>>(path: &str) -> Result<T, String> {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(_) => {
            return Err("Could not find config file!".to_string());
        }
    };
    let mut config_toml = String::new();
    if let Err(err) = file.read_to_string(&mut config_toml) {
        return Err(format!("Error while reading config: [{}]", err));
    };

    parse_config(config_toml, path)
}

/// Parse the configuration into an config struct.
pub fn parse_config<'a, T: Deserialize<'a>>(config_toml: String, path: &str) -> Result<T, String> {
    // Check for old ${var} expressions
    let re = Regex::new(r"\$\{([[:alnum:]]+)\}").map_err(|e| e.to_string())?;
    if re.is_match(&config_toml) {
        return Err(
            "Replace old environment variable syntax ${VARNAME} with `{{env.VARNAME}}`".to_string(),
        );
    }

    // Parse template
    let mut tera = Tera::default();
    tera.add_raw_template(path, &config_toml)
        .map_err(|e| format!("Template error: {}", e))?;
    let mut context = Context::new();
    let env: HashMap<String, String> = env::vars().collect();
    context.insert("env", &env);
    let toml = tera.render(path, &context).map_err(|e| match e.source() {
        Some(source) => format!("Template error: {}", source),
        None => format!("Template error: {}", e),
    })?;

    toml.parse::<Value>()
        .and_then(|cfg| cfg.try_into::<T>())
        .map_err(|err| format!("{} - {}", path, err))
}
