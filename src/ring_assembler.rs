//! Ring assembly module
//!
//! This module turns a tagged [`RingPath`] into a [`Polygon`]: the first
//! ring is the exterior, every following ring is a hole.

use crate::error::{Error, Result};
use crate::path::{PathCommand, PathElement, RingPath, Vertex};

/// A polygon with explicitly closed rings
///
/// Ring 0 is the exterior; rings 1.. are holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<Vec<Vertex>>,
}

impl Polygon {
    pub fn rings(&self) -> &[Vec<Vertex>] {
        &self.rings
    }

    pub fn exterior(&self) -> &[Vertex] {
        &self.rings[0]
    }

    pub fn holes(&self) -> &[Vec<Vertex>] {
        &self.rings[1..]
    }

    pub fn into_rings(self) -> Vec<Vec<Vertex>> {
        self.rings
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    BuildingRing,
}

/// Assembles path elements into closed rings
pub struct RingAssembler {
    state: State,
    current: Vec<Vertex>,
    rings: Vec<Vec<Vertex>>,
}

impl Default for RingAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl RingAssembler {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            current: Vec::new(),
            rings: Vec::new(),
        }
    }

    /// Feed one path element
    ///
    /// A `RingPoint` before any `RingStart` is `CorruptGeometry`.
    pub fn push(&mut self, element: &PathElement) -> Result<()> {
        match (self.state, element.command) {
            (_, PathCommand::RingStart) => {
                self.close_current();
                self.current.push(element.vertex);
                self.state = State::BuildingRing;
            }
            (State::BuildingRing, PathCommand::RingPoint) => {
                self.current.push(element.vertex);
            }
            (State::Idle, PathCommand::RingPoint) => {
                return Err(Error::CorruptGeometry(format!(
                    "ring point ({}, {}) before any ring start",
                    element.vertex.x, element.vertex.y
                )));
            }
        }
        Ok(())
    }

    /// Close the last ring and return the polygon, `None` when no ring was
    /// started
    pub fn finish(mut self) -> Option<Polygon> {
        self.close_current();
        if self.rings.is_empty() {
            None
        } else {
            Some(Polygon { rings: self.rings })
        }
    }

    fn close_current(&mut self) {
        if self.state != State::BuildingRing {
            return;
        }
        let mut ring = std::mem::take(&mut self.current);
        if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
            if first != last || ring.len() == 1 {
                ring.push(first);
            }
        }
        self.rings.push(ring);
        self.state = State::Idle;
    }
}

/// Assemble one path into a polygon
pub fn assemble(path: &RingPath) -> Result<Option<Polygon>> {
    let mut assembler = RingAssembler::new();
    for element in path {
        assembler.push(element)?;
    }
    Ok(assembler.finish())
}
