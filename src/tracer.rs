//! Isoband tracing over a masked scalar field
//!
//! For one band the tracer:
//! 1. Triangulates every cell that can contribute (see [`Cell`])
//! 2. Clips each triangle to the band
//! 3. Cancels the edges shared by neighbouring pieces
//! 4. Walks the remaining edges into closed loops
//! 5. Sorts the loops into exteriors and holes and nests the holes
//!
//! The band lies on the left of every traced edge, so exteriors come out
//! counter-clockwise and holes clockwise.

use crate::cell::{clip_triangle, Cell, ClipVertex, VertexKey};
use crate::edge::{turn_angle, Edge, EdgeSet};
use crate::error::{Error, Result};
use crate::grid::{Grid, ScalarField};
use crate::levels::Band;
use crate::path::{RingPath, Vertex};
use std::collections::HashMap;
use std::time::Instant;
use tracing::{debug, warn};

/// Bounding box for fast rejection during hole nesting
#[derive(Debug, Clone)]
struct BBox {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

impl BBox {
    fn from_ring(ring: &[Vertex]) -> Self {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for point in ring {
            min_x = min_x.min(point.x);
            max_x = max_x.max(point.x);
            min_y = min_y.min(point.y);
            max_y = max_y.max(point.y);
        }

        Self { min_x, max_x, min_y, max_y }
    }

    /// Check if this bbox is completely inside another bbox
    fn is_inside(&self, other: &BBox) -> bool {
        self.min_x >= other.min_x
            && self.max_x <= other.max_x
            && self.min_y >= other.min_y
            && self.max_y <= other.max_y
    }

    fn contains(&self, point: &Vertex) -> bool {
        point.x >= self.min_x && point.x <= self.max_x && point.y >= self.min_y && point.y <= self.max_y
    }
}

/// Ray-casting point in ring test
///
/// Reference: http://www.ecse.rpi.edu/Homepages/wrf/Research/Short_Notes/pnpoly.html
fn point_in_ring(point: &Vertex, ring: &[Vertex]) -> bool {
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let one = &ring[i];
        let two = &ring[j];

        if ((one.y > point.y) != (two.y > point.y))
            && (point.x < (two.x - one.x) * (point.y - one.y) / (two.y - one.y) + one.x)
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

fn signed_area(ring: &[Vertex]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        / 2.0
}

/// A point just to the left of the ring's first edge, on the band side
fn probe_point(ring: &[Vertex]) -> Vertex {
    let a = ring[0];
    let b = ring[1 % ring.len()];
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    Vertex::new((a.x + b.x) / 2.0 - dy * 1e-6, (a.y + b.y) / 2.0 + dx * 1e-6)
}

struct Exterior {
    ring: Vec<Vertex>,
    bbox: BBox,
    area: f64,
    holes: Vec<Vec<Vertex>>,
}

/// Walk boundary edges into closed loops
///
/// Loops start at the first unused edge in insertion order. Where several
/// edges leave a vertex the sharpest left turn is taken, which keeps regions
/// that only touch at a vertex apart.
fn walk_loops(edges: &[Edge]) -> Vec<Vec<Vertex>> {
    let mut outgoing: HashMap<VertexKey, Vec<usize>> = HashMap::new();
    for (i, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.start().key).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut loops = Vec::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let mut ring: Vec<ClipVertex> = vec![*edges[first].start()];
        let mut current = first;

        let closed = loop {
            let incoming = &edges[current];
            let next = outgoing
                .get(&incoming.end().key)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&i| !used[i] || i == first)
                .max_by(|&a, &b| {
                    turn_angle(incoming, &edges[a]).total_cmp(&turn_angle(incoming, &edges[b]))
                });

            match next {
                None => break false,
                Some(n) if n == first => break true,
                Some(n) => {
                    used[n] = true;
                    ring.push(*edges[n].start());
                    current = n;
                }
            }
        };

        if !closed {
            warn!(vertices = ring.len(), "dropping unclosed band boundary");
            continue;
        }
        if ring.len() >= 3 {
            loops.push(ring.iter().map(|v| Vertex::new(v.x, v.y)).collect());
        }
    }

    loops
}

/// Split loops into exteriors and holes, attaching each hole to the
/// smallest exterior that contains it
fn nest(loops: Vec<Vec<Vertex>>) -> Vec<Exterior> {
    let mut exteriors = Vec::new();
    let mut holes = Vec::new();

    for ring in loops {
        let area = signed_area(&ring);
        if area > 0.0 {
            exteriors.push(Exterior {
                bbox: BBox::from_ring(&ring),
                ring,
                area,
                holes: Vec::new(),
            });
        } else if area < 0.0 {
            holes.push(ring);
        }
    }

    for hole in holes {
        let probe = probe_point(&hole);
        let hole_bbox = BBox::from_ring(&hole);

        let owner = exteriors
            .iter()
            .enumerate()
            .filter(|(_, ext)| hole_bbox.is_inside(&ext.bbox) && ext.bbox.contains(&probe))
            .filter(|(_, ext)| point_in_ring(&probe, &ext.ring))
            .min_by(|(_, a), (_, b)| a.area.total_cmp(&b.area))
            .map(|(i, _)| i);

        match owner {
            Some(i) => exteriors[i].holes.push(hole),
            None => warn!(vertices = hole.len(), "hole without an enclosing ring, dropped"),
        }
    }

    exteriors
}

/// Trace the contour paths of one band
///
/// Returns one path per exterior ring, in discovery order (row-major over
/// the grid cells). Each path holds the exterior followed by its holes. Ring
/// vertices never lie on masked nodes.
pub fn trace_band(field: &ScalarField, grid: &Grid, band: &Band) -> Result<Vec<RingPath>> {
    if field.rows() != grid.rows() || field.cols() != grid.cols() {
        return Err(Error::InvalidConfig(format!(
            "field of {}x{} does not match grid of {}x{}",
            field.rows(),
            field.cols(),
            grid.rows(),
            grid.cols()
        )));
    }

    let start = Instant::now();
    let mut edges = EdgeSet::new();
    let mut pieces = 0usize;

    for row in 0..grid.rows().saturating_sub(1) {
        for col in 0..grid.cols().saturating_sub(1) {
            let cell = Cell::new(field, grid, row, col);
            if cell.is_outside(band) {
                continue;
            }
            for triangle in cell.triangles() {
                if let Some(piece) = clip_triangle(&triangle, band) {
                    edges.add_piece(&piece);
                    pieces += 1;
                }
            }
        }
    }

    let boundary = edges.into_edges();
    let loops = walk_loops(&boundary);
    let exteriors = nest(loops);

    let paths: Vec<RingPath> = exteriors
        .into_iter()
        .map(|ext| {
            let mut path = RingPath::new();
            path.push_ring(&ext.ring);
            for hole in &ext.holes {
                path.push_ring(hole);
            }
            path
        })
        .collect();

    debug!(
        band = %band,
        pieces,
        edges = boundary.len(),
        paths = paths.len(),
        elapsed = ?start.elapsed(),
        "traced band"
    );

    Ok(paths)
}
