//! Removal of unusable observations
//!
//! Interpolators need one finite value per location. Observations without a
//! measurement are dropped, then repeated coordinates are reduced to their
//! first occurrence.

use crate::point::{CoordKey, Observation, PointSet};
use std::collections::HashSet;
use tracing::debug;

/// Clean a raw point set
///
/// Survivors keep their original relative order. A later duplicate of an
/// (x, y) pair is dropped whatever its value. An empty result is valid.
pub fn clean(points: PointSet) -> PointSet {
    let total = points.len();
    let valued: Vec<Observation> = points.into_iter().filter(Observation::has_value).collect();
    let missing = total - valued.len();

    let mut seen: HashSet<CoordKey> = HashSet::with_capacity(valued.len());
    let cleaned: PointSet = valued
        .into_iter()
        .filter(|obs| seen.insert(obs.key()))
        .collect();

    debug!(
        total,
        missing,
        duplicates = total - missing - cleaned.len(),
        kept = cleaned.len(),
        "cleaned observations"
    );

    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_nan_values() {
        let points = vec![
            Observation::new(0.0, 0.0, 1.0),
            Observation::new(1.0, 0.0, f64::NAN),
            Observation::new(2.0, 0.0, 3.0),
        ];

        let cleaned = clean(points);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0].x, 0.0);
        assert_eq!(cleaned[1].x, 2.0);
    }

    #[test]
    fn test_first_duplicate_wins() {
        let points = vec![
            Observation::new(2.0, 3.0, 10.0),
            Observation::new(1.0, 1.0, 5.0),
            Observation::new(2.0, 3.0, 20.0),
        ];

        let cleaned = clean(points);
        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned[0], Observation::new(2.0, 3.0, 10.0));
        assert_eq!(cleaned[1], Observation::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn test_nan_does_not_shadow_later_duplicate() {
        // The NaN entry is removed first, so the valued one is the first survivor
        let points = vec![
            Observation::new(4.0, 4.0, f64::NAN),
            Observation::new(4.0, 4.0, 7.0),
        ];

        let cleaned = clean(points);
        assert_eq!(cleaned, vec![Observation::new(4.0, 4.0, 7.0)]);
    }

    #[test]
    fn test_empty_is_valid() {
        assert!(clean(Vec::new()).is_empty());
        assert!(clean(vec![Observation::new(0.0, 0.0, f64::NAN)]).is_empty());
    }
}
