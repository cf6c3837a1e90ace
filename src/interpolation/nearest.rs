//! Nearest neighbour interpolation
//!
//! Each node takes the value of the closest observation, which yields a
//! Voronoi tessellation of the data. Lookups go through an R-tree.

use super::Interpolator;
use crate::point::Observation;
use rstar::primitives::GeomWithData;
use rstar::RTree;

type IndexedValue = GeomWithData<[f64; 2], f64>;

/// Voronoi-style interpolator, defined at every location
pub struct NearestInterpolator {
    tree: RTree<IndexedValue>,
}

impl NearestInterpolator {
    pub fn new(points: &[Observation]) -> Self {
        let entries = points
            .iter()
            .map(|p| IndexedValue::new([p.x, p.y], p.z))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }
}

impl Interpolator for NearestInterpolator {
    fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.tree.nearest_neighbor(&[x, y]).map(|entry| entry.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadrant_points() -> Vec<Observation> {
        vec![
            Observation::new(2.0, 8.0, 10.0),
            Observation::new(8.0, 8.0, 20.0),
            Observation::new(2.0, 2.0, 30.0),
            Observation::new(8.0, 2.0, 40.0),
        ]
    }

    #[test]
    fn test_nearest_voronoi() {
        let interp = NearestInterpolator::new(&quadrant_points());

        assert_eq!(interp.value_at(0.0, 10.0), Some(10.0));
        assert_eq!(interp.value_at(10.0, 10.0), Some(20.0));
        assert_eq!(interp.value_at(1.0, 1.0), Some(30.0));
        assert_eq!(interp.value_at(9.5, 0.5), Some(40.0));
    }

    #[test]
    fn test_nearest_defined_far_away() {
        let interp = NearestInterpolator::new(&quadrant_points());
        assert_eq!(interp.value_at(1000.0, 1000.0), Some(20.0));
    }

    #[test]
    fn test_nearest_single_point() {
        let interp = NearestInterpolator::new(&[Observation::new(5.0, 5.0, 99.0)]);
        assert_eq!(interp.value_at(-3.0, 12.0), Some(99.0));
    }
}
