//! Spatial interpolation of scattered observations onto a regular grid
//!
//! Four methods are available:
//! - `nearest`: value of the closest observation, defined everywhere
//! - `linear`: barycentric interpolation over a Delaunay triangulation,
//!   masked outside the convex hull
//! - `cubic`: Clough-Tocher C1 cubic over the same triangulation, masked
//!   outside the convex hull
//! - `rbf`: radial basis function expansion, defined everywhere
//!
//! Every method produces a [`ScalarField`] whose masked nodes are `None`.

mod cubic;
mod delaunay;
mod linear;
mod nearest;
mod rbf;

pub use cubic::CloughTocherInterpolator;
pub use delaunay::Triangulation;
pub use linear::LinearInterpolator;
pub use nearest::NearestInterpolator;
pub use rbf::{Kernel, RbfInterpolator};

use crate::error::{Error, Result};
use crate::grid::{Grid, ScalarField};
use crate::point::Observation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// A surface fitted to observations that can be sampled anywhere
pub trait Interpolator: Send + Sync {
    /// Value at (x, y), or `None` where the method is undefined
    fn value_at(&self, x: f64, y: f64) -> Option<f64>;
}

/// Interpolation method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Method {
    Nearest,
    Linear,
    Cubic,
    Rbf,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Nearest => "nearest",
            Method::Linear => "linear",
            Method::Cubic => "cubic",
            Method::Rbf => "rbf",
        }
    }

    /// Whether nodes outside the convex hull of the data are masked
    pub fn is_hull_bound(&self) -> bool {
        matches!(self, Method::Linear | Method::Cubic)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Method {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(Method::Nearest),
            "linear" => Ok(Method::Linear),
            "cubic" => Ok(Method::Cubic),
            "rbf" => Ok(Method::Rbf),
            other => Err(Error::InvalidConfig(format!(
                "unsupported interpolation method '{other}', try: linear, nearest, cubic, rbf"
            ))),
        }
    }
}

/// Radial basis parameters, ignored by the other methods
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RbfParams {
    pub kernel: Kernel,
    /// 0 interpolates exactly; larger values smooth through noisy data
    pub smoothing: f64,
    /// Shape parameter; `None` derives it from the data extent
    pub epsilon: Option<f64>,
}

impl Default for RbfParams {
    fn default() -> Self {
        Self {
            kernel: Kernel::Linear,
            smoothing: 0.0,
            epsilon: None,
        }
    }
}

impl RbfParams {
    pub fn validate(&self) -> Result<()> {
        if !self.smoothing.is_finite() || self.smoothing < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "rbf smoothing must be a finite value >= 0, got {}",
                self.smoothing
            )));
        }
        if let Some(eps) = self.epsilon {
            if !eps.is_finite() || eps <= 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "rbf epsilon must be a finite value > 0, got {eps}"
                )));
            }
        }
        Ok(())
    }
}

/// Method selection plus method-specific parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationParams {
    pub method: Method,
    pub rbf: RbfParams,
}

impl Default for InterpolationParams {
    fn default() -> Self {
        Self {
            method: Method::Linear,
            rbf: RbfParams::default(),
        }
    }
}

impl InterpolationParams {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn rbf(kernel: Kernel, smoothing: f64) -> Self {
        Self {
            method: Method::Rbf,
            rbf: RbfParams {
                kernel,
                smoothing,
                epsilon: None,
            },
        }
    }
}

/// Fit the selected interpolator to `points`
pub fn build_interpolator(
    points: &[Observation],
    params: &InterpolationParams,
) -> Result<Box<dyn Interpolator>> {
    if points.is_empty() {
        return Err(Error::InsufficientData(
            "interpolation needs at least one observation".into(),
        ));
    }
    params.rbf.validate()?;

    let interpolator: Box<dyn Interpolator> = match params.method {
        Method::Nearest => Box::new(NearestInterpolator::new(points)),
        Method::Linear => Box::new(LinearInterpolator::new(Triangulation::new(points)?)),
        Method::Cubic => Box::new(CloughTocherInterpolator::new(Triangulation::new(points)?)),
        Method::Rbf => Box::new(RbfInterpolator::new(points, &params.rbf)?),
    };

    Ok(interpolator)
}

/// Interpolate `points` at every node of `grid`
///
/// Rows are evaluated in parallel; the field keeps the grid's row-major
/// order.
pub fn interpolate(
    points: &[Observation],
    grid: &Grid,
    params: &InterpolationParams,
) -> Result<ScalarField> {
    let start = std::time::Instant::now();
    let interpolator = build_interpolator(points, params)?;
    debug!(method = %params.method, points = points.len(), elapsed = ?start.elapsed(), "fitted interpolator");

    let field = sample(interpolator.as_ref(), grid)?;

    info!(
        method = %params.method,
        rows = grid.rows(),
        cols = grid.cols(),
        defined = field.defined_count(),
        elapsed = ?start.elapsed(),
        "interpolated grid"
    );

    Ok(field)
}

/// Sample an interpolator at every node of `grid`
pub fn sample(interpolator: &dyn Interpolator, grid: &Grid) -> Result<ScalarField> {
    let rows: Vec<Vec<Option<f64>>> = grid
        .ys
        .par_iter()
        .map(|&y| {
            grid.xs
                .iter()
                .map(|&x| interpolator.value_at(x, y))
                .collect()
        })
        .collect();

    ScalarField::from_values(grid.rows(), grid.cols(), rows.concat())
}
