//! Coverage polygons for weather-model extents.

use serde::{Deserialize, Serialize};

use crate::bounds::SnweBounds;

/// The valid-coverage outline of a weather model, in the model's native
/// longitude convention.
///
/// Vertices are (lon, lat) pairs. The polygon is treated as closed; the
/// final vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveragePolygon {
    vertices: Vec<(f64, f64)>,
}

impl CoveragePolygon {
    pub fn new(vertices: Vec<(f64, f64)>) -> Self {
        Self { vertices }
    }

    /// Ray-cast point-in-polygon test.
    ///
    /// A degenerate polygon (fewer than three vertices) or NaN coordinates
    /// yield `false` rather than an error.
    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        if self.vertices.len() < 3 || lon.is_nan() || lat.is_nan() {
            return false;
        }

        let mut inside = false;
        let n = self.vertices.len();
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.vertices[i];
            let (xj, yj) = self.vertices[j];
            if ((yi > lat) != (yj > lat))
                && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi)
            {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// True when all four corner points of `bounds` fall inside the polygon.
    ///
    /// This is a corner-only test, not a full box/polygon intersection: a
    /// box whose interior overlaps the polygon but whose corners all fall
    /// outside is rejected.
    pub fn contains_box(&self, bounds: &SnweBounds) -> bool {
        bounds
            .corners()
            .iter()
            .all(|&(lat, lon)| self.contains_point(lon, lat))
    }
}
