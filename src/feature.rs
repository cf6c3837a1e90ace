//! Pairing assembled polygons with band attribute values

use crate::bands::BandPaths;
use crate::error::{Error, Result};
use crate::levels::{Band, Extend, LevelSet};
use crate::ring_assembler::{assemble, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which value of a band is written as the feature attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum AttributePolicy {
    /// The band's lower threshold
    #[default]
    Lower,
    /// The band's upper threshold
    Upper,
    /// Halfway between the thresholds
    Midpoint,
}

impl AttributePolicy {
    pub fn name(&self) -> &'static str {
        match self {
            AttributePolicy::Lower => "lower",
            AttributePolicy::Upper => "upper",
            AttributePolicy::Midpoint => "midpoint",
        }
    }

    /// Attribute value of a band
    ///
    /// Open bands fall back to their finite bound.
    pub fn value(&self, band: &Band) -> f64 {
        match (band.lower.is_finite(), band.upper.is_finite()) {
            (true, false) => band.lower,
            (false, true) => band.upper,
            _ => match self {
                AttributePolicy::Lower => band.lower,
                AttributePolicy::Upper => band.upper,
                AttributePolicy::Midpoint => (band.lower + band.upper) / 2.0,
            },
        }
    }
}

impl fmt::Display for AttributePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for AttributePolicy {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for AttributePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lower" => Ok(AttributePolicy::Lower),
            "upper" => Ok(AttributePolicy::Upper),
            "midpoint" | "mid" => Ok(AttributePolicy::Midpoint),
            other => Err(Error::InvalidConfig(format!(
                "unknown attribute policy '{other}', try: lower, upper, midpoint"
            ))),
        }
    }
}

/// A polygon tagged with its band
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Polygon,
    pub attribute_value: f64,
    pub band: Band,
}

/// Ordered features of one output layer
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureCollection {
    pub layer: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Build the feature for a polygon of a known band
pub fn emit_band(band: &Band, polygon: Polygon, policy: AttributePolicy) -> Feature {
    Feature {
        geometry: polygon,
        attribute_value: policy.value(band),
        band: *band,
    }
}

/// Build the feature for a polygon of the band at `band_index`
///
/// Band indices follow [`LevelSet::bands`] under `extend`.
pub fn emit(
    band_index: usize,
    levels: &LevelSet,
    extend: Extend,
    polygon: Polygon,
    policy: AttributePolicy,
) -> Result<Feature> {
    let bands = levels.bands(extend);
    let band = bands.get(band_index).ok_or_else(|| {
        Error::InvalidConfig(format!(
            "band index {band_index} out of range for {} bands",
            bands.len()
        ))
    })?;
    Ok(emit_band(band, polygon, policy))
}

/// Assemble every path and emit one feature per non-empty polygon
///
/// Features come out band-ascending, then in path order within a band.
pub fn emit_all(
    bands: &[BandPaths],
    policy: AttributePolicy,
    layer: &str,
) -> Result<FeatureCollection> {
    let mut features = Vec::new();

    for band_paths in bands {
        for path in &band_paths.paths {
            if let Some(polygon) = assemble(path)? {
                features.push(emit_band(&band_paths.band, polygon, policy));
            }
        }
    }

    debug!(features = features.len(), %policy, layer, "emitted features");

    Ok(FeatureCollection {
        layer: layer.to_string(),
        features,
    })
}
