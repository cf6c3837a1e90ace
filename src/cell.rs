use crate::grid::{Grid, ScalarField};
use crate::levels::Band;
use arrayvec::ArrayVec;

/// Position of a value relative to a band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ternary {
    Below,
    Within,
    Above,
}

impl Ternary {
    pub fn classify(value: f64, band: &Band) -> Self {
        if value < band.lower {
            Ternary::Below
        } else if value > band.upper || (value == band.upper && !band.upper_inclusive) {
            Ternary::Above
        } else {
            Ternary::Within
        }
    }
}

/// Identity of a triangulation node: a grid node or the centre of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Grid { row: usize, col: usize },
    Centre { row: usize, col: usize },
}

/// Which bound of the band a crossing lies on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Lower,
    Upper,
}

/// Topological identity of a clip vertex
///
/// Crossings are keyed by their edge's node pair in ascending order, so the
/// two triangles sharing an edge agree on the vertex without comparing
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexKey {
    Node(NodeId),
    Crossing { from: NodeId, to: NodeId, level: Level },
}

/// A defined triangulation node with its coordinates and value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corner {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Corner {
    fn vertex(&self) -> ClipVertex {
        ClipVertex {
            key: VertexKey::Node(self.id),
            x: self.x,
            y: self.y,
        }
    }
}

/// Vertex of a clipped piece
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipVertex {
    pub key: VertexKey,
    pub x: f64,
    pub y: f64,
}

/// Counter-clockwise triangle
pub type Triangle = [Corner; 3];

/// Part of a triangle inside a band, counter-clockwise, at most a pentagon
pub type Piece = ArrayVec<ClipVertex, 5>;

/// A grid cell with its defined corners
///
/// Corners are kept counter-clockwise starting from the south-west node;
/// masked corners are left out.
#[derive(Debug, Clone)]
pub struct Cell {
    row: usize,
    col: usize,
    corners: ArrayVec<Corner, 4>,
}

impl Cell {
    /// Cell whose south-west node is (row, col)
    pub fn new(field: &ScalarField, grid: &Grid, row: usize, col: usize) -> Self {
        let nodes = [(row, col), (row, col + 1), (row + 1, col + 1), (row + 1, col)];
        let corners = nodes
            .iter()
            .filter_map(|&(r, c)| {
                field.get(r, c).map(|value| Corner {
                    id: NodeId::Grid { row: r, col: c },
                    x: grid.xs[c],
                    y: grid.ys[r],
                    value,
                })
            })
            .collect();

        Self { row, col, corners }
    }

    #[cfg(test)]
    pub fn corners(&self) -> &[Corner] {
        &self.corners
    }

    /// True when the cell cannot contribute to the band
    ///
    /// Cells with fewer than three defined corners, or whose corners are all
    /// below or all above the band, are skipped.
    pub fn is_outside(&self, band: &Band) -> bool {
        if self.corners.len() < 3 {
            return true;
        }
        let first = Ternary::classify(self.corners[0].value, band);
        first != Ternary::Within
            && self.corners[1..]
                .iter()
                .all(|c| Ternary::classify(c.value, band) == first)
    }

    /// Triangles covering the defined part of the cell
    ///
    /// A fully defined cell is split into four triangles around its centre,
    /// which takes the mean of the corner values. With one masked corner the
    /// three remaining corners form a single triangle.
    pub fn triangles(&self) -> ArrayVec<Triangle, 4> {
        let mut triangles = ArrayVec::new();
        match self.corners.len() {
            4 => {
                let c = &self.corners;
                let centre = Corner {
                    id: NodeId::Centre {
                        row: self.row,
                        col: self.col,
                    },
                    x: (c[0].x + c[1].x) / 2.0,
                    y: (c[1].y + c[2].y) / 2.0,
                    value: (c[0].value + c[1].value + c[2].value + c[3].value) / 4.0,
                };
                for i in 0..4 {
                    triangles.push([c[i], c[(i + 1) % 4], centre]);
                }
            }
            3 => triangles.push([self.corners[0], self.corners[1], self.corners[2]]),
            _ => {}
        }
        triangles
    }
}

/// Point where the field crosses `level` on the edge between `p` and `q`
///
/// Computed from the lower node id so both sides of an edge produce the same
/// vertex. A crossing that falls on a node is that node.
fn crossing(p: &Corner, q: &Corner, level: f64, bound: Level) -> ClipVertex {
    if p.value == level {
        return p.vertex();
    }
    if q.value == level {
        return q.vertex();
    }

    let (a, b) = if p.id <= q.id { (p, q) } else { (q, p) };
    let t = (level - a.value) / (b.value - a.value);
    ClipVertex {
        key: VertexKey::Crossing {
            from: a.id,
            to: b.id,
            level: bound,
        },
        x: a.x + t * (b.x - a.x),
        y: a.y + t * (b.y - a.y),
    }
}

fn push_distinct(piece: &mut Piece, vertex: ClipVertex) {
    if piece.last().map(|last| last.key) != Some(vertex.key) {
        piece.push(vertex);
    }
}

/// Twice the signed area of a closed vertex ring
pub fn ring_area2(ring: &[ClipVertex]) -> f64 {
    let n = ring.len();
    (0..n)
        .map(|i| {
            let a = &ring[i];
            let b = &ring[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum()
}

/// Clip a counter-clockwise triangle to the band
///
/// Walks the triangle boundary keeping in-band corners and the crossings of
/// the band bounds, in boundary order. The field is linear over the
/// triangle, so the result is convex. Degenerate pieces give `None`.
pub fn clip_triangle(tri: &Triangle, band: &Band) -> Option<Piece> {
    use Ternary::*;

    let classes = tri.map(|c| Ternary::classify(c.value, band));
    let mut piece = Piece::new();

    for i in 0..3 {
        let j = (i + 1) % 3;
        let (p, q) = (&tri[i], &tri[j]);

        if classes[i] == Within {
            push_distinct(&mut piece, p.vertex());
        }

        match (classes[i], classes[j]) {
            (Below, Within) | (Within, Below) => {
                push_distinct(&mut piece, crossing(p, q, band.lower, Level::Lower));
            }
            (Within, Above) | (Above, Within) => {
                push_distinct(&mut piece, crossing(p, q, band.upper, Level::Upper));
            }
            (Below, Above) => {
                push_distinct(&mut piece, crossing(p, q, band.lower, Level::Lower));
                push_distinct(&mut piece, crossing(p, q, band.upper, Level::Upper));
            }
            (Above, Below) => {
                push_distinct(&mut piece, crossing(p, q, band.upper, Level::Upper));
                push_distinct(&mut piece, crossing(p, q, band.lower, Level::Lower));
            }
            _ => {}
        }
    }

    while piece.len() > 1 && piece.first().map(|v| v.key) == piece.last().map(|v| v.key) {
        piece.pop();
    }

    if piece.len() < 3 || ring_area2(&piece) <= 0.0 {
        return None;
    }
    Some(piece)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BoundingBox;
    use crate::levels::{Extend, LevelSet};

    fn unit_grid() -> Grid {
        let bbox = BoundingBox {
            west: 0.0,
            south: 0.0,
            east: 1.0,
            north: 1.0,
        };
        Grid::new(bbox, 0.5).unwrap()
    }

    fn band(lower: f64, upper: f64) -> Band {
        Band::new(0, lower, upper)
    }

    fn corner(row: usize, col: usize, x: f64, y: f64, value: f64) -> Corner {
        Corner {
            id: NodeId::Grid { row, col },
            x,
            y,
            value,
        }
    }

    fn unit_triangle(values: [f64; 3]) -> Triangle {
        [
            corner(0, 0, 0.0, 0.0, values[0]),
            corner(0, 1, 1.0, 0.0, values[1]),
            corner(1, 0, 0.0, 1.0, values[2]),
        ]
    }

    #[test]
    fn test_ternary_classification() {
        let b = band(10.0, 20.0);
        assert_eq!(Ternary::classify(5.0, &b), Ternary::Below);
        assert_eq!(Ternary::classify(10.0, &b), Ternary::Within);
        assert_eq!(Ternary::classify(19.9, &b), Ternary::Within);
        // upper bound excluded unless the band is the topmost one
        assert_eq!(Ternary::classify(20.0, &b), Ternary::Above);

        let top = LevelSet::new(vec![10.0, 20.0]).unwrap().bands(Extend::Neither)[0];
        assert_eq!(Ternary::classify(20.0, &top), Ternary::Within);
    }

    #[test]
    fn test_open_band_classification() {
        let below = band(f64::NEG_INFINITY, 0.0);
        assert_eq!(Ternary::classify(-1e300, &below), Ternary::Within);
        let above = band(0.0, f64::INFINITY);
        assert_eq!(Ternary::classify(1e300, &above), Ternary::Within);
    }

    #[test]
    fn test_clip_whole_triangle() {
        let piece = clip_triangle(&unit_triangle([1.0, 2.0, 3.0]), &band(0.0, 10.0)).unwrap();
        assert_eq!(piece.len(), 3);
        assert!(piece.iter().all(|v| matches!(v.key, VertexKey::Node(_))));
    }

    #[test]
    fn test_clip_outside_triangle() {
        assert!(clip_triangle(&unit_triangle([1.0, 2.0, 3.0]), &band(5.0, 10.0)).is_none());
        assert!(clip_triangle(&unit_triangle([11.0, 12.0, 13.0]), &band(5.0, 10.0)).is_none());
    }

    #[test]
    fn test_clip_pentagon() {
        // one corner below, one within, one above
        let piece = clip_triangle(&unit_triangle([0.0, 5.0, 10.0]), &band(2.0, 8.0)).unwrap();
        assert_eq!(piece.len(), 5);
        assert!(ring_area2(&piece) > 0.0);
    }

    #[test]
    fn test_clip_strip_positions() {
        // value = 10 * x, band [2, 8) cuts the strip 0.2 <= x < 0.8
        let piece = clip_triangle(&unit_triangle([0.0, 10.0, 0.0]), &band(2.0, 8.0)).unwrap();
        assert_eq!(piece.len(), 4);
        for v in &piece {
            let on_cut = (v.x - 0.2).abs() < 1e-12 || (v.x - 0.8).abs() < 1e-12;
            assert!(on_cut, "unexpected vertex at x={}", v.x);
        }
    }

    #[test]
    fn test_crossing_on_node_collapses() {
        // corner 1 sits exactly on the lower bound; only the sliver at it would remain
        assert!(clip_triangle(&unit_triangle([0.0, 2.0, 0.0]), &band(2.0, 8.0)).is_none());
    }

    #[test]
    fn test_crossing_is_canonical() {
        let a = corner(0, 0, 0.0, 0.0, 0.0);
        let b = corner(0, 1, 0.3, 0.7, 10.0);
        let forward = crossing(&a, &b, 3.7, Level::Lower);
        let backward = crossing(&b, &a, 3.7, Level::Lower);
        assert_eq!(forward, backward);
        assert_eq!(forward.x.to_bits(), backward.x.to_bits());
    }

    #[test]
    fn test_cell_masked_corner() {
        let grid = unit_grid();
        assert_eq!((grid.rows(), grid.cols()), (2, 2));

        let field =
            ScalarField::from_values(2, 2, vec![Some(1.0), Some(2.0), None, Some(4.0)]).unwrap();
        let cell = Cell::new(&field, &grid, 0, 0);
        assert_eq!(cell.corners().len(), 3);

        let triangles = cell.triangles();
        assert_eq!(triangles.len(), 1);
        let t = &triangles[0];
        let area2 = (t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[1].y - t[0].y) * (t[2].x - t[0].x);
        assert!(area2 > 0.0);
    }

    #[test]
    fn test_cell_outside_band() {
        let grid = unit_grid();
        let field = ScalarField::from_values(2, 2, vec![Some(1.0); 4]).unwrap();
        let cell = Cell::new(&field, &grid, 0, 0);

        assert!(cell.is_outside(&band(5.0, 6.0)));
        assert!(cell.is_outside(&band(-1.0, 0.0)));
        assert!(!cell.is_outside(&band(0.0, 5.0)));
        assert_eq!(cell.triangles().len(), 4);
    }
}
