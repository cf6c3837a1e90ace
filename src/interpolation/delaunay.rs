//! Delaunay triangulation of the observations
//!
//! Built with the incremental Bowyer-Watson algorithm. Coordinates are
//! shifted to the data centroid before triangulating so circumcircle tests
//! keep their precision for geographic coordinates far from the origin.
//! Triangles are stored counter-clockwise and indexed in an R-tree by their
//! bounding boxes for point location.

use crate::error::{Error, Result};
use crate::point::Observation;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, AABB};

/// Barycentric tolerance for points on a triangle edge
const BARY_EPS: f64 = -1e-10;

type TriangleEnvelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Circumcircle of a triangle
#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

fn circumcircle(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> Option<Circumcircle> {
    let d = 2.0 * (a[0] * (b[1] - c[1]) + b[0] * (c[1] - a[1]) + c[0] * (a[1] - b[1]));
    if d.abs() < 1e-12 {
        return None;
    }

    let a2 = a[0] * a[0] + a[1] * a[1];
    let b2 = b[0] * b[0] + b[1] * b[1];
    let c2 = c[0] * c[0] + c[1] * c[1];

    let ux = (a2 * (b[1] - c[1]) + b2 * (c[1] - a[1]) + c2 * (a[1] - b[1])) / d;
    let uy = (a2 * (c[0] - b[0]) + b2 * (a[0] - c[0]) + c2 * (b[0] - a[0])) / d;

    let dx = a[0] - ux;
    let dy = a[1] - uy;
    Some(Circumcircle {
        cx: ux,
        cy: uy,
        radius_sq: dx * dx + dy * dy,
    })
}

/// Twice the signed area of (a, b, c); positive when counter-clockwise
#[inline]
fn orient(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

/// Bowyer-Watson over already centred coordinates
///
/// Returns vertex index triples into `points`.
fn bowyer_watson(points: &[[f64; 2]]) -> Vec<[usize; 3]> {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for p in points {
        min_x = min_x.min(p[0]);
        min_y = min_y.min(p[1]);
        max_x = max_x.max(p[0]);
        max_y = max_y.max(p[1]);
    }

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy).max(f64::MIN_POSITIVE) * 100.0;
    let mid_x = (min_x + max_x) / 2.0;
    let mid_y = (min_y + max_y) / 2.0;

    // Super-triangle vertices occupy indices 0..3
    let mut vertices: Vec<[f64; 2]> = vec![
        [mid_x - 2.0 * delta, mid_y - delta],
        [mid_x + 2.0 * delta, mid_y - delta],
        [mid_x, mid_y + 2.0 * delta],
    ];
    let mut triangles: Vec<[usize; 3]> = vec![[0, 1, 2]];

    for point in points {
        let vi = vertices.len();
        vertices.push(*point);

        let bad: Vec<usize> = triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| {
                circumcircle(vertices[t[0]], vertices[t[1]], vertices[t[2]]).is_some_and(|cc| {
                    let dx = point[0] - cc.cx;
                    let dy = point[1] - cc.cy;
                    dx * dx + dy * dy <= cc.radius_sq
                })
            })
            .map(|(i, _)| i)
            .collect();

        // Boundary of the cavity: edges of bad triangles not shared with another bad one
        let mut boundary: Vec<(usize, usize)> = Vec::new();
        for &bi in &bad {
            let t = triangles[bi];
            for (ea, eb) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                let shared = bad.iter().any(|&oi| {
                    oi != bi && {
                        let o = triangles[oi];
                        [(o[0], o[1]), (o[1], o[2]), (o[2], o[0])]
                            .iter()
                            .any(|&(oa, ob)| (oa == ea && ob == eb) || (oa == eb && ob == ea))
                    }
                });
                if !shared {
                    boundary.push((ea, eb));
                }
            }
        }

        let mut bad = bad;
        bad.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad {
            triangles.swap_remove(bi);
        }

        for (ea, eb) in boundary {
            triangles.push([ea, eb, vi]);
        }
    }

    triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v >= 3))
        .map(|t| [t[0] - 3, t[1] - 3, t[2] - 3])
        .collect()
}

/// Triangulated observations with point location
pub struct Triangulation {
    vertices: Vec<[f64; 2]>,
    values: Vec<f64>,
    triangles: Vec<[usize; 3]>,
    index: RTree<TriangleEnvelope>,
}

impl Triangulation {
    /// Triangulate the observations
    ///
    /// Fails with `InsufficientData` for fewer than three points or when all
    /// points are collinear.
    pub fn new(points: &[Observation]) -> Result<Self> {
        if points.len() < 3 {
            return Err(Error::InsufficientData(format!(
                "triangulation needs at least 3 points, got {}",
                points.len()
            )));
        }

        let n = points.len() as f64;
        let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
        let centred: Vec<[f64; 2]> = points.iter().map(|p| [p.x - cx, p.y - cy]).collect();

        let vertices: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
        let scale = points
            .iter()
            .map(|p| (p.x - cx).abs().max((p.y - cy).abs()))
            .fold(0.0, f64::max);

        let triangles: Vec<[usize; 3]> = bowyer_watson(&centred)
            .into_iter()
            .filter_map(|[a, b, c]| {
                let area = orient(vertices[a], vertices[b], vertices[c]);
                if area.abs() <= 1e-12 * scale * scale {
                    None
                } else if area > 0.0 {
                    Some([a, b, c])
                } else {
                    Some([a, c, b])
                }
            })
            .collect();

        if triangles.is_empty() {
            return Err(Error::InsufficientData(
                "failed to build a triangulation (are all points collinear?)".into(),
            ));
        }

        let margin = scale * 1e-9;
        let envelopes = triangles
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let xs = t.map(|v| vertices[v][0]);
                let ys = t.map(|v| vertices[v][1]);
                let lower = [
                    xs.iter().cloned().fold(f64::INFINITY, f64::min) - margin,
                    ys.iter().cloned().fold(f64::INFINITY, f64::min) - margin,
                ];
                let upper = [
                    xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + margin,
                    ys.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + margin,
                ];
                TriangleEnvelope::new(Rectangle::from_corners(lower, upper), i)
            })
            .collect();

        Ok(Self {
            vertices,
            values: points.iter().map(|p| p.z).collect(),
            triangles,
            index: RTree::bulk_load(envelopes),
        })
    }

    pub fn vertices(&self) -> &[[f64; 2]] {
        &self.vertices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Counter-clockwise vertex index triples
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    /// Barycentric coordinates of (px, py) in triangle `t`
    pub fn barycentric(&self, t: usize, px: f64, py: f64) -> [f64; 3] {
        let [a, b, c] = self.triangles[t].map(|v| self.vertices[v]);
        let det = orient(a, b, c);
        let l0 = orient([px, py], b, c) / det;
        let l1 = orient(a, [px, py], c) / det;
        [l0, l1, 1.0 - l0 - l1]
    }

    /// Triangle containing (x, y) with its barycentric coordinates
    ///
    /// `None` outside the convex hull. Points on a shared edge resolve to
    /// the lowest-numbered candidate triangle.
    pub fn locate(&self, x: f64, y: f64) -> Option<(usize, [f64; 3])> {
        let probe = AABB::from_point([x, y]);
        self.index
            .locate_in_envelope_intersecting(&probe)
            .map(|entry| entry.data)
            .filter_map(|t| {
                let bary = self.barycentric(t, x, y);
                bary.iter().all(|&l| l >= BARY_EPS).then_some((t, bary))
            })
            .min_by_key(|(t, _)| *t)
    }

    /// Gradient of the linear interpolant over triangle `t`
    pub fn triangle_gradient(&self, t: usize) -> [f64; 2] {
        let [i, j, k] = self.triangles[t];
        let (p0, p1, p2) = (self.vertices[i], self.vertices[j], self.vertices[k]);
        let (f0, f1, f2) = (self.values[i], self.values[j], self.values[k]);

        let (ax, ay) = (p1[0] - p0[0], p1[1] - p0[1]);
        let (bx, by) = (p2[0] - p0[0], p2[1] - p0[1]);
        let (da, db) = (f1 - f0, f2 - f0);
        let det = ax * by - ay * bx;

        [(da * by - db * ay) / det, (ax * db - bx * da) / det]
    }

    /// Area of triangle `t`
    pub fn triangle_area(&self, t: usize) -> f64 {
        let [a, b, c] = self.triangles[t].map(|v| self.vertices[v]);
        orient(a, b, c) / 2.0
    }
}
