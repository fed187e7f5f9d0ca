//! Geographic bounding boxes in SNWE order.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in (south, north, west, east) order, degrees.
///
/// Longitudes may be expressed in either (-180, 180] or [0, 360) depending
/// on the producer. Consumers that build spatial masks must retry under the
/// [0, 360) convention before declaring no overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnweBounds {
    pub south: f64,
    pub north: f64,
    pub west: f64,
    pub east: f64,
}

impl SnweBounds {
    /// Create a new bounding box. Invariant: `south <= north`.
    pub fn new(south: f64, north: f64, west: f64, east: f64) -> Self {
        Self {
            south,
            north,
            west,
            east,
        }
    }

    /// Corner points in (lat, lon) order: SW, NW, NE, SE.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.south, self.west),
            (self.north, self.west),
            (self.north, self.east),
            (self.south, self.east),
        ]
    }

    /// The same box with west/east remapped into [0, 360).
    ///
    /// Latitudes are untouched; only the longitude components change
    /// convention.
    pub fn wrapped_0_360(&self) -> Self {
        Self {
            south: self.south,
            north: self.north,
            west: to_0_360(self.west),
            east: to_0_360(self.east),
        }
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &SnweBounds) -> bool {
        self.south <= other.south
            && self.north >= other.north
            && self.west <= other.west
            && self.east >= other.east
    }

    /// Cache-key fragment, quantized to one decimal place for stability.
    pub fn key_fragment(&self) -> String {
        format!(
            "S{:.1}_N{:.1}_W{:.1}_E{:.1}",
            self.south, self.north, self.west, self.east
        )
    }
}

impl std::fmt::Display for SnweBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2}/{:.2}/{:.2}/{:.2} (SNWE)",
            self.south, self.north, self.west, self.east
        )
    }
}

/// Remap a longitude into [0, 360).
pub fn to_0_360(lon: f64) -> f64 {
    lon.rem_euclid(360.0)
}

/// Remap a longitude into (-180, 180].
pub fn normalize_lon_180(lon: f64) -> f64 {
    let wrapped = lon.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_0_360() {
        let b = SnweBounds::new(33.0, 36.0, -119.0, -115.0);
        let w = b.wrapped_0_360();
        assert_eq!(w.west, 241.0);
        assert_eq!(w.east, 245.0);
        assert_eq!(w.south, 33.0);
        assert_eq!(w.north, 36.0);
    }

    #[test]
    fn test_normalize_lon_180() {
        assert_eq!(normalize_lon_180(270.0), -90.0);
        assert_eq!(normalize_lon_180(180.0), 180.0);
        assert_eq!(normalize_lon_180(360.0), 0.0);
        assert_eq!(normalize_lon_180(-115.0), -115.0);
    }

    #[test]
    fn test_contains() {
        let outer = SnweBounds::new(20.0, 50.0, -125.0, -66.0);
        let inner = SnweBounds::new(33.0, 36.0, -119.0, -115.0);
        assert!(outer.contains(&inner));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_key_fragment_stability() {
        let b = SnweBounds::new(33.04, 36.0, -119.0, -115.0);
        assert_eq!(b.key_fragment(), "S33.0_N36.0_W-119.0_E-115.0");
    }
}
