use std::hash::{Hash, Hasher};

/// A scattered observation: a coordinate pair and the measured value
///
/// `z` is NaN when the measurement is missing; the cleaner drops those
/// before anything downstream sees them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Ordered observations sharing one coordinate reference
pub type PointSet = Vec<Observation>;

impl Observation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Whether the measurement can be used for interpolation
    pub fn has_value(&self) -> bool {
        !self.z.is_nan()
    }

    /// Hashable identity of the coordinate pair
    pub fn key(&self) -> CoordKey {
        CoordKey::new(self.x, self.y)
    }
}

/// Bitwise identity of an (x, y) pair
///
/// Two coordinates are the same location when their bit patterns match.
/// `-0.0` is folded onto `0.0` so the sign of zero never splits a location.
#[derive(Debug, Clone, Copy)]
pub struct CoordKey {
    x: u64,
    y: u64,
}

impl CoordKey {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: canonical_bits(x),
            y: canonical_bits(y),
        }
    }

    pub fn x(&self) -> f64 {
        f64::from_bits(self.x)
    }

    pub fn y(&self) -> f64 {
        f64::from_bits(self.y)
    }
}

#[inline]
fn canonical_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

impl PartialEq for CoordKey {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

impl Eq for CoordKey {}

impl Hash for CoordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.y.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_observation_value() {
        assert!(Observation::new(1.0, 2.0, 3.0).has_value());
        assert!(!Observation::new(1.0, 2.0, f64::NAN).has_value());
    }

    #[test]
    fn test_key_equality() {
        let a = Observation::new(2.0, 3.0, 1.0);
        let b = Observation::new(2.0, 3.0, 9.0);
        let c = Observation::new(2.0, 3.000001, 1.0);

        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), c.key());
    }

    #[test]
    fn test_signed_zero_is_one_location() {
        assert_eq!(CoordKey::new(0.0, 1.0), CoordKey::new(-0.0, 1.0));
    }

    #[test]
    fn test_key_in_hashmap() {
        let mut map = HashMap::new();
        map.insert(CoordKey::new(5.0, 10.0), "first");
        map.insert(CoordKey::new(5.0, 10.0), "second");

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&CoordKey::new(5.0, 10.0)), Some(&"second"));
    }

    #[test]
    fn test_key_round_trips_coordinates() {
        let key = CoordKey::new(-122.4194, 37.7749);
        assert_eq!(key.x(), -122.4194);
        assert_eq!(key.y(), 37.7749);
    }
}
