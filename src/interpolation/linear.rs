//! Piecewise linear interpolation over the Delaunay triangulation

use super::{Interpolator, Triangulation};

/// Barycentric interpolator, masked outside the convex hull
pub struct LinearInterpolator {
    tri: Triangulation,
}

impl LinearInterpolator {
    pub fn new(tri: Triangulation) -> Self {
        Self { tri }
    }
}

impl Interpolator for LinearInterpolator {
    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let (t, bary) = self.tri.locate(x, y)?;
        let values = self.tri.values();
        let [i, j, k] = self.tri.triangles()[t];
        Some(bary[0] * values[i] + bary[1] * values[j] + bary[2] * values[k])
    }
}
