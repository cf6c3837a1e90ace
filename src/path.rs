//! Contour paths as tagged vertex sequences
//!
//! A [`RingPath`] holds one exterior ring followed by its holes. Each ring
//! begins with a [`PathCommand::RingStart`] element; the rest of its
//! vertices are [`PathCommand::RingPoint`]s. Rings are not explicitly closed.

/// A planar vertex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
}

impl Vertex {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCommand {
    /// Begin a new ring at this vertex
    RingStart,
    /// Continue the current ring
    RingPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathElement {
    pub vertex: Vertex,
    pub command: PathCommand,
}

impl PathElement {
    pub fn start(vertex: Vertex) -> Self {
        Self {
            vertex,
            command: PathCommand::RingStart,
        }
    }

    pub fn point(vertex: Vertex) -> Self {
        Self {
            vertex,
            command: PathCommand::RingPoint,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RingPath {
    elements: Vec<PathElement>,
}

impl RingPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap raw elements without checking them
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Append a ring: its first vertex becomes a ring start
    pub fn push_ring(&mut self, ring: &[Vertex]) {
        let mut vertices = ring.iter();
        if let Some(&first) = vertices.next() {
            self.elements.push(PathElement::start(first));
            self.elements.extend(vertices.map(|&v| PathElement::point(v)));
        }
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn ring_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| e.command == PathCommand::RingStart)
            .count()
    }
}

impl IntoIterator for RingPath {
    type Item = PathElement;
    type IntoIter = std::vec::IntoIter<PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a> IntoIterator for &'a RingPath {
    type Item = &'a PathElement;
    type IntoIter = std::slice::Iter<'a, PathElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
