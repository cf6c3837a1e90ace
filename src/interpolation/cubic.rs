//! Clough-Tocher piecewise cubic interpolation
//!
//! Every Delaunay triangle is split at its centroid into three
//! micro-triangles, each carrying a cubic Bernstein patch. Vertex gradients
//! are estimated from the incident triangles, weighted by area. Normal
//! derivatives vary linearly along every outer edge, which makes the surface
//! C1 across neighbouring triangles; the centroid split makes it C1 inside
//! each triangle. Planes are reproduced exactly.

use super::{Interpolator, Triangulation};

/// Bernstein control net of one macro triangle
#[derive(Debug, Clone, Copy)]
struct Patch {
    /// Vertex values
    f: [f64; 3],
    /// `edge[i][j]`: control point on edge i-j next to vertex i
    edge: [[f64; 3]; 3],
    /// Control point from vertex i toward the centroid
    inner: [f64; 3],
    /// Interior control point of the micro-triangle opposite vertex k
    mid: [f64; 3],
    /// Control point next to the centroid on the split edge from vertex i
    near_centre: [f64; 3],
    centre: f64,
}

impl Patch {
    fn new(p: [[f64; 2]; 3], f: [f64; 3], g: [[f64; 2]; 3]) -> Self {
        let c = [
            (p[0][0] + p[1][0] + p[2][0]) / 3.0,
            (p[0][1] + p[1][1] + p[2][1]) / 3.0,
        ];
        let slope = |grad: [f64; 2], from: [f64; 2], to: [f64; 2]| {
            grad[0] * (to[0] - from[0]) + grad[1] * (to[1] - from[1])
        };

        let mut edge = [[0.0; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    edge[i][j] = f[i] + slope(g[i], p[i], p[j]) / 3.0;
                }
            }
        }

        let inner: [f64; 3] = std::array::from_fn(|i| f[i] + slope(g[i], p[i], c) / 3.0);

        let mid: [f64; 3] = std::array::from_fn(|k| {
            let i = (k + 1) % 3;
            let j = (k + 2) % 3;
            let (ex, ey) = (p[j][0] - p[i][0], p[j][1] - p[i][1]);
            // foot of the perpendicular from the centroid onto edge i-j
            let t = ((c[0] - p[i][0]) * ex + (c[1] - p[i][1]) * ey) / (ex * ex + ey * ey);

            let c0 = inner[i] - (1.0 - t) * f[i] - t * edge[i][j];
            let c2 = inner[j] - (1.0 - t) * edge[j][i] - t * f[j];
            (c0 + c2) / 2.0 + (1.0 - t) * edge[i][j] + t * edge[j][i]
        });

        let near_centre: [f64; 3] =
            std::array::from_fn(|i| (inner[i] + mid[(i + 1) % 3] + mid[(i + 2) % 3]) / 3.0);
        let centre = near_centre.iter().sum::<f64>() / 3.0;

        Self {
            f,
            edge,
            inner,
            mid,
            near_centre,
            centre,
        }
    }

    fn eval(&self, bary: [f64; 3]) -> f64 {
        let k = if bary[0] <= bary[1] && bary[0] <= bary[2] {
            0
        } else if bary[1] <= bary[2] {
            1
        } else {
            2
        };
        let i = (k + 1) % 3;
        let j = (k + 2) % 3;

        let u = bary[i] - bary[k];
        let v = bary[j] - bary[k];
        let w = 3.0 * bary[k];

        u * u * u * self.f[i]
            + v * v * v * self.f[j]
            + w * w * w * self.centre
            + 3.0 * u * u * v * self.edge[i][j]
            + 3.0 * u * v * v * self.edge[j][i]
            + 3.0 * u * u * w * self.inner[i]
            + 3.0 * v * v * w * self.inner[j]
            + 3.0 * u * w * w * self.near_centre[i]
            + 3.0 * v * w * w * self.near_centre[j]
            + 6.0 * u * v * w * self.mid[k]
    }
}

/// C1 cubic interpolator, masked outside the convex hull
pub struct CloughTocherInterpolator {
    tri: Triangulation,
    patches: Vec<Patch>,
}

impl CloughTocherInterpolator {
    pub fn new(tri: Triangulation) -> Self {
        let gradients = vertex_gradients(&tri);
        let vertices = tri.vertices();
        let values = tri.values();

        let patches = tri
            .triangles()
            .iter()
            .map(|t| {
                Patch::new(
                    t.map(|v| vertices[v]),
                    t.map(|v| values[v]),
                    t.map(|v| gradients[v]),
                )
            })
            .collect();

        Self { tri, patches }
    }
}

/// Area-weighted mean of the gradients of the triangles around each vertex
fn vertex_gradients(tri: &Triangulation) -> Vec<[f64; 2]> {
    let n = tri.vertices().len();
    let mut sums = vec![[0.0f64; 2]; n];
    let mut weights = vec![0.0f64; n];

    for (t, verts) in tri.triangles().iter().enumerate() {
        let area = tri.triangle_area(t);
        let [gx, gy] = tri.triangle_gradient(t);
        for &v in verts {
            sums[v][0] += area * gx;
            sums[v][1] += area * gy;
            weights[v] += area;
        }
    }

    sums.into_iter()
        .zip(weights)
        .map(|(s, w)| if w > 0.0 { [s[0] / w, s[1] / w] } else { [0.0, 0.0] })
        .collect()
}

impl Interpolator for CloughTocherInterpolator {
    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        let (t, bary) = self.tri.locate(x, y)?;
        Some(self.patches[t].eval(bary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Observation;
    use approx::assert_relative_eq;

    fn scattered(f: impl Fn(f64, f64) -> f64) -> Vec<Observation> {
        [
            (0.0, 0.0),
            (10.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (4.0, 6.0),
            (7.0, 3.0),
            (2.0, 8.5),
        ]
        .iter()
        .map(|&(x, y)| Observation::new(x, y, f(x, y)))
        .collect()
    }

    #[test]
    fn test_reproduces_plane() {
        let plane = |x: f64, y: f64| 0.5 * x - 1.5 * y + 4.0;
        let interp = CloughTocherInterpolator::new(Triangulation::new(&scattered(plane)).unwrap());

        for &(x, y) in &[(1.0, 1.0), (5.0, 5.0), (9.0, 0.5), (3.3, 6.6), (6.0, 9.0)] {
            assert_relative_eq!(interp.value_at(x, y).unwrap(), plane(x, y), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_exact_at_observations() {
        let points = scattered(|x, y| (x * 0.3).sin() + y * y * 0.05);
        let interp = CloughTocherInterpolator::new(Triangulation::new(&points).unwrap());
        for p in &points {
            assert_relative_eq!(interp.value_at(p.x, p.y).unwrap(), p.z, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_continuous_across_micro_triangles() {
        let points = scattered(|x, y| x * y * 0.1);
        let interp = CloughTocherInterpolator::new(Triangulation::new(&points).unwrap());

        // Sweep a line and make sure there are no jumps
        let mut prev = interp.value_at(0.5, 5.0).unwrap();
        for step in 1..=90 {
            let x = 0.5 + step as f64 * 0.1;
            let z = interp.value_at(x, 5.0).unwrap();
            assert!((z - prev).abs() < 0.5, "jump at x={x}: {prev} -> {z}");
            prev = z;
        }
    }

    #[test]
    fn test_masked_outside_hull() {
        let interp =
            CloughTocherInterpolator::new(Triangulation::new(&scattered(|x, _| x)).unwrap());
        assert_eq!(interp.value_at(11.0, 5.0), None);
    }
}
