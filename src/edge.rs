use crate::cell::{ClipVertex, Piece, VertexKey};
use std::collections::HashMap;

/// A directed edge of a band boundary
///
/// The band lies on the left of the edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    start: ClipVertex,
    end: ClipVertex,
}

impl Edge {
    pub fn new(start: ClipVertex, end: ClipVertex) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> &ClipVertex {
        &self.start
    }

    pub fn end(&self) -> &ClipVertex {
        &self.end
    }

    /// Direction vector from start to end
    pub fn direction(&self) -> (f64, f64) {
        (self.end.x - self.start.x, self.end.y - self.start.y)
    }

    fn key(&self) -> (VertexKey, VertexKey) {
        (self.start.key, self.end.key)
    }

    fn reverse_key(&self) -> (VertexKey, VertexKey) {
        (self.end.key, self.start.key)
    }
}

/// Signed turn angle from `incoming` to `outgoing`, positive to the left
pub fn turn_angle(incoming: &Edge, outgoing: &Edge) -> f64 {
    let (ax, ay) = incoming.direction();
    let (bx, by) = outgoing.direction();
    (ax * by - ay * bx).atan2(ax * bx + ay * by)
}

/// Boundary edges of one band
///
/// Edges shared by two adjacent pieces arrive once in each direction and
/// cancel out, leaving the outline of the band. Surviving edges keep their
/// insertion order.
#[derive(Debug, Default)]
pub struct EdgeSet {
    edges: Vec<Option<Edge>>,
    index: HashMap<(VertexKey, VertexKey), usize>,
}

impl EdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, edge: Edge) {
        if let Some(twin) = self.index.remove(&edge.reverse_key()) {
            self.edges[twin] = None;
            return;
        }
        self.index.insert(edge.key(), self.edges.len());
        self.edges.push(Some(edge));
    }

    /// Insert the outline of a counter-clockwise piece
    pub fn add_piece(&mut self, piece: &Piece) {
        let n = piece.len();
        for i in 0..n {
            self.insert(Edge::new(piece[i], piece[(i + 1) % n]));
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn into_edges(self) -> Vec<Edge> {
        self.edges.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::NodeId;

    fn vertex(row: usize, col: usize) -> ClipVertex {
        ClipVertex {
            key: VertexKey::Node(NodeId::Grid { row, col }),
            x: col as f64,
            y: row as f64,
        }
    }

    #[test]
    fn test_shared_edge_cancels() {
        let mut set = EdgeSet::new();
        // two triangles sharing the diagonal (0,1)-(1,0)
        let lower: Piece = [vertex(0, 0), vertex(0, 1), vertex(1, 0)].into_iter().collect();
        let upper: Piece = [vertex(0, 1), vertex(1, 1), vertex(1, 0)].into_iter().collect();
        set.add_piece(&lower);
        set.add_piece(&upper);

        assert_eq!(set.len(), 4);
        let edges = set.into_edges();
        assert_eq!(edges.len(), 4);
        assert!(edges
            .iter()
            .all(|e| !(e.start().key == vertex(1, 0).key && e.end().key == vertex(0, 1).key)));
    }

    #[test]
    fn test_insertion_order_kept() {
        let mut set = EdgeSet::new();
        set.insert(Edge::new(vertex(0, 0), vertex(0, 1)));
        set.insert(Edge::new(vertex(5, 5), vertex(5, 6)));
        set.insert(Edge::new(vertex(0, 1), vertex(1, 1)));
        set.insert(Edge::new(vertex(5, 6), vertex(5, 5)));

        let edges = set.into_edges();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].start(), &vertex(0, 0));
        assert_eq!(edges[1].start(), &vertex(0, 1));
    }

    #[test]
    fn test_turn_angle_sign() {
        let east = Edge::new(vertex(0, 0), vertex(0, 1));
        let north = Edge::new(vertex(0, 1), vertex(1, 1));
        let south = Edge::new(vertex(0, 1), ClipVertex { y: -1.0, ..vertex(0, 1) });
        assert!(turn_angle(&east, &north) > 0.0);
        assert!(turn_angle(&east, &south) < 0.0);
    }
}
