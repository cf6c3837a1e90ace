//! Radial basis function interpolation
//!
//! The surface is a weighted sum of one radial kernel per observation:
//!
//! ```text
//! s(x, y) = Σᵢ wᵢ · φ(‖(x, y) - (xᵢ, yᵢ)‖)
//! ```
//!
//! Weights solve the dense system `(Φ - λI) w = z`, with `λ` the smoothing
//! parameter, so the cost is cubic in the number of observations. The
//! surface is defined everywhere, including outside the convex hull.

use super::{Interpolator, RbfParams};
use crate::error::{Error, Result};
use crate::point::Observation;
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Radial kernel, named as in common scientific toolkits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Kernel {
    /// `sqrt((r/ε)² + 1)`
    Multiquadric,
    /// `1 / sqrt((r/ε)² + 1)`
    Inverse,
    /// `exp(-(r/ε)²)`
    Gaussian,
    /// `r`
    Linear,
    /// `r³`
    Cubic,
    /// `r⁵`
    Quintic,
    /// `r² ln r`
    ThinPlate,
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Multiquadric => "multiquadric",
            Kernel::Inverse => "inverse",
            Kernel::Gaussian => "gaussian",
            Kernel::Linear => "linear",
            Kernel::Cubic => "cubic",
            Kernel::Quintic => "quintic",
            Kernel::ThinPlate => "thin_plate",
        }
    }

    /// Kernel value at distance `r` with shape parameter `epsilon`
    #[inline]
    pub fn eval(&self, r: f64, epsilon: f64) -> f64 {
        match self {
            Kernel::Multiquadric => ((r / epsilon).powi(2) + 1.0).sqrt(),
            Kernel::Inverse => 1.0 / ((r / epsilon).powi(2) + 1.0).sqrt(),
            Kernel::Gaussian => (-(r / epsilon).powi(2)).exp(),
            Kernel::Linear => r,
            Kernel::Cubic => r * r * r,
            Kernel::Quintic => r.powi(5),
            Kernel::ThinPlate => {
                if r < 1e-15 {
                    0.0
                } else {
                    r * r * r.ln()
                }
            }
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Kernel {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl FromStr for Kernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "multiquadric" => Ok(Kernel::Multiquadric),
            "inverse" | "inverse_multiquadric" => Ok(Kernel::Inverse),
            "gaussian" => Ok(Kernel::Gaussian),
            "linear" => Ok(Kernel::Linear),
            "cubic" => Ok(Kernel::Cubic),
            "quintic" => Ok(Kernel::Quintic),
            "thin_plate" => Ok(Kernel::ThinPlate),
            other => Err(Error::InvalidConfig(format!(
                "unknown rbf kernel '{other}', try: multiquadric, inverse, gaussian, linear, cubic, quintic, thin_plate"
            ))),
        }
    }
}

/// Default shape parameter: the mean spacing of the observations
///
/// `(Π non-zero extents / n) ^ (1 / number of non-zero extents)`, or 1 when
/// every extent is zero.
pub fn default_epsilon(points: &[Observation]) -> f64 {
    let mut extents = Vec::with_capacity(2);
    let (min_x, max_x) = min_max(points.iter().map(|p| p.x));
    let (min_y, max_y) = min_max(points.iter().map(|p| p.y));
    for extent in [max_x - min_x, max_y - min_y] {
        if extent > 0.0 {
            extents.push(extent);
        }
    }

    if extents.is_empty() || points.is_empty() {
        return 1.0;
    }

    let product: f64 = extents.iter().product();
    (product / points.len() as f64).powf(1.0 / extents.len() as f64)
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Fitted radial basis expansion
pub struct RbfInterpolator {
    centres: Vec<[f64; 2]>,
    weights: Vec<f64>,
    kernel: Kernel,
    epsilon: f64,
}

impl RbfInterpolator {
    /// Solve for the kernel weights
    ///
    /// Fails with `InsufficientData` when there are no observations or the
    /// system is singular.
    pub fn new(points: &[Observation], params: &RbfParams) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::InsufficientData(
                "rbf interpolation needs at least one observation".into(),
            ));
        }

        let n = points.len();
        let epsilon = params.epsilon.unwrap_or_else(|| default_epsilon(points));
        let centres: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();

        let mut a = DMatrix::zeros(n, n);
        for i in 0..n {
            for j in 0..n {
                let r = distance(centres[i], centres[j]);
                a[(i, j)] = params.kernel.eval(r, epsilon);
            }
            a[(i, i)] -= params.smoothing;
        }
        let b = DVector::from_iterator(n, points.iter().map(|p| p.z));

        let weights = a.lu().solve(&b).ok_or_else(|| {
            Error::InsufficientData(format!(
                "rbf system with {n} observations is singular (kernel {}, smoothing {})",
                params.kernel, params.smoothing
            ))
        })?;

        if weights.iter().any(|w| !w.is_finite()) {
            return Err(Error::InsufficientData(
                "rbf weights are not finite, the system is ill-conditioned".into(),
            ));
        }

        debug!(kernel = %params.kernel, epsilon, smoothing = params.smoothing, n, "solved rbf weights");

        Ok(Self {
            centres,
            weights: weights.iter().copied().collect(),
            kernel: params.kernel,
            epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

#[inline]
fn distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)).sqrt()
}

impl Interpolator for RbfInterpolator {
    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let value = self
            .centres
            .iter()
            .zip(&self.weights)
            .map(|(&c, &w)| w * self.kernel.eval(distance(c, [x, y]), self.epsilon))
            .sum::<f64>();
        value.is_finite().then_some(value)
    }
}
