//! Run configuration
//!
//! A [`Config`] can be built in code, loaded from JSON, or assembled by the
//! command line. [`Config::validate`] performs every range and name check up
//! front so no computation starts with a bad setting.

use crate::error::{Error, Result};
use crate::feature::AttributePolicy;
use crate::interpolation::{InterpolationParams, Kernel, Method, RbfParams};
use crate::levels::{Extend, LevelSet};
use crate::source::CsvColumns;
use crate::writer::{OutputFormat, WriteOptions, DEFAULT_PRECISION};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::fs;
use std::path::Path;

/// Largest coordinate precision worth keeping for an f64
const MAX_PRECISION: u32 = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid spacing target, in coordinate units
    pub resolution: f64,
    /// Margin added around the data extent
    pub spatial_pad: f64,
    pub interp_method: Method,
    pub rbf_kernel: Kernel,
    pub rbf_smoothing: f64,
    pub rbf_epsilon: Option<f64>,
    /// Ascending contour levels
    pub levels: Vec<f64>,
    pub extend: Extend,
    pub attribute_policy: AttributePolicy,
    /// CSV value column and output attribute name
    pub attribute_field_name: String,
    pub layer_name: String,
    /// Output driver name, matched case-insensitively
    pub output_format: String,
    pub coordinate_precision: Option<u32>,
    pub cpu_time_limit_seconds: Option<u64>,
    pub x_field: String,
    pub y_field: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resolution: 0.25,
            spatial_pad: 5.0,
            interp_method: Method::Rbf,
            rbf_kernel: Kernel::Linear,
            rbf_smoothing: 1.0,
            rbf_epsilon: None,
            levels: Vec::new(),
            extend: Extend::Neither,
            attribute_policy: AttributePolicy::Lower,
            attribute_field_name: "wind".to_string(),
            layer_name: "bands".to_string(),
            output_format: OutputFormat::GeoJson.name().to_string(),
            coordinate_precision: Some(DEFAULT_PRECISION),
            cpu_time_limit_seconds: None,
            x_field: "longitude".to_string(),
            y_field: "latitude".to_string(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file; missing keys take defaults
    ///
    /// Malformed JSON is a `Json` error. Well-formed JSON carrying an unknown
    /// name or a mistyped value is `InvalidConfig`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| match e.classify() {
            Category::Data => Error::InvalidConfig(e.to_string()),
            _ => Error::Json(e),
        })
    }

    /// Check every setting
    ///
    /// Range and name problems are `InvalidConfig`; an unknown output driver
    /// is `UnsupportedFormat`.
    pub fn validate(&self) -> Result<()> {
        if !self.resolution.is_finite() || self.resolution <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "resolution must be a finite value > 0, got {}",
                self.resolution
            )));
        }
        if !self.spatial_pad.is_finite() || self.spatial_pad < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "spatial pad must be a finite value >= 0, got {}",
                self.spatial_pad
            )));
        }
        self.rbf_params().validate()?;
        self.level_set()?;

        for (what, value) in [
            ("attribute field name", &self.attribute_field_name),
            ("layer name", &self.layer_name),
            ("x field", &self.x_field),
            ("y field", &self.y_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidConfig(format!("{what} must not be empty")));
            }
        }

        if let Some(precision) = self.coordinate_precision {
            if precision > MAX_PRECISION {
                return Err(Error::InvalidConfig(format!(
                    "coordinate precision must be at most {MAX_PRECISION}, got {precision}"
                )));
            }
        }
        if self.cpu_time_limit_seconds == Some(0) {
            return Err(Error::InvalidConfig(
                "cpu time limit must be at least 1 second".into(),
            ));
        }

        self.format()?;
        Ok(())
    }

    pub fn level_set(&self) -> Result<LevelSet> {
        LevelSet::new(self.levels.clone())
    }

    pub fn rbf_params(&self) -> RbfParams {
        RbfParams {
            kernel: self.rbf_kernel,
            smoothing: self.rbf_smoothing,
            epsilon: self.rbf_epsilon,
        }
    }

    pub fn interpolation_params(&self) -> InterpolationParams {
        InterpolationParams {
            method: self.interp_method,
            rbf: self.rbf_params(),
        }
    }

    pub fn format(&self) -> Result<OutputFormat> {
        self.output_format.parse()
    }

    pub fn write_options(&self) -> Result<WriteOptions> {
        Ok(WriteOptions {
            format: self.format()?,
            attribute_field: self.attribute_field_name.clone(),
            precision: self.coordinate_precision,
        })
    }

    pub fn columns(&self) -> CsvColumns {
        CsvColumns::new(&self.x_field, &self.y_field, &self.attribute_field_name)
    }
}
