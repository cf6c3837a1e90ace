//! Contour levels and the bands they define
//!
//! `n` strictly ascending levels give `n - 1` closed bands
//! `[levels[i], levels[i + 1])`. The [`Extend`] policy optionally adds open
//! bands below the first level and above the last one.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which open-ended bands to add around the closed ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Extend {
    /// Values outside the level range belong to no band
    #[default]
    Neither,
    /// Add `(-inf, levels[0])`
    Min,
    /// Add `[levels[last], +inf)`
    Max,
    /// Add both open bands
    Both,
}

impl Extend {
    pub fn name(&self) -> &'static str {
        match self {
            Extend::Neither => "neither",
            Extend::Min => "min",
            Extend::Max => "max",
            Extend::Both => "both",
        }
    }

    fn below(&self) -> bool {
        matches!(self, Extend::Min | Extend::Both)
    }

    fn above(&self) -> bool {
        matches!(self, Extend::Max | Extend::Both)
    }
}

impl fmt::Display for Extend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Extend {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for Extend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "neither" => Ok(Extend::Neither),
            "min" => Ok(Extend::Min),
            "max" => Ok(Extend::Max),
            "both" => Ok(Extend::Both),
            other => Err(Error::InvalidConfig(format!(
                "unknown extend policy '{other}', try: neither, min, max, both"
            ))),
        }
    }
}

/// One value interval to fill
///
/// `lower` may be `-inf` and `upper` may be `+inf` for open bands. The
/// interval is `[lower, upper)`, or `[lower, upper]` when `upper_inclusive`
/// is set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub index: usize,
    pub lower: f64,
    pub upper: f64,
    pub upper_inclusive: bool,
}

impl Band {
    pub fn new(index: usize, lower: f64, upper: f64) -> Self {
        Self {
            index,
            lower,
            upper,
            upper_inclusive: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.lower.is_infinite() || self.upper.is_infinite()
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower
            && (value < self.upper || (self.upper_inclusive && value == self.upper))
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let close = if self.upper_inclusive { ']' } else { ')' };
        write!(f, "[{}, {}{}", self.lower, self.upper, close)
    }
}

/// Validated, strictly ascending contour levels
#[derive(Debug, Clone, PartialEq)]
pub struct LevelSet {
    levels: Vec<f64>,
}

impl LevelSet {
    /// Fails with `InvalidConfig` for fewer than two levels, non-finite
    /// levels, or levels that are not strictly ascending
    pub fn new(levels: Vec<f64>) -> Result<Self> {
        if levels.len() < 2 {
            return Err(Error::InvalidConfig(format!(
                "at least 2 levels are required to define a band, got {}",
                levels.len()
            )));
        }
        if let Some(bad) = levels.iter().find(|l| !l.is_finite()) {
            return Err(Error::InvalidConfig(format!("level {bad} is not finite")));
        }
        if let Some(pair) = levels.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::InvalidConfig(format!(
                "levels must be strictly ascending, got {} before {}",
                pair[0], pair[1]
            )));
        }
        Ok(Self { levels })
    }

    /// Parse a comma separated list such as `"0,5,10.5"`
    pub fn parse(list: &str) -> Result<Self> {
        let levels = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| Error::InvalidConfig(format!("level '{s}' is not a number")))
            })
            .collect::<Result<Vec<f64>>>()?;
        Self::new(levels)
    }

    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Bands in ascending order under the given extend policy
    pub fn bands(&self, extend: Extend) -> Vec<Band> {
        let mut bounds: Vec<(f64, f64)> = Vec::with_capacity(self.levels.len() + 1);
        if extend.below() {
            bounds.push((f64::NEG_INFINITY, self.levels[0]));
        }
        bounds.extend(self.levels.windows(2).map(|w| (w[0], w[1])));
        if extend.above() {
            bounds.push((self.levels[self.levels.len() - 1], f64::INFINITY));
        }

        let last = bounds.len() - 1;
        bounds
            .into_iter()
            .enumerate()
            .map(|(index, (lower, upper))| Band {
                index,
                lower,
                upper,
                // the topmost closed band keeps values equal to the last level
                upper_inclusive: index == last && upper.is_finite(),
            })
            .collect()
    }
}
