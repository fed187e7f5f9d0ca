//! Geographic-to-index bounds resolution.
//!
//! The only place spatial index arithmetic occurs: a requested SNWE box is
//! turned into inclusive pixel ranges against a product's own 2-D lat/lon
//! fields, with a [0, 360) longitude retry when the first mask is empty.

use ndarray::Array2;
use wx_common::{to_0_360, AcquireError, AcquireResult, SnweBounds};

/// Inclusive pixel ranges into a source grid, clamped to its shape.
///
/// Derived fresh for every fetch, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexBounds {
    pub x_min: usize,
    pub x_max: usize,
    pub y_min: usize,
    pub y_max: usize,
}

/// Convert SNWE bounds to index bounds against 2-D lat/lon fields.
///
/// The mask is built under the bounds' own longitude convention first; if
/// it is empty, both the longitude grid and the west/east bounds are
/// remapped into [0, 360) and the mask rebuilt. A still-empty mask is a
/// no-overlap error. A single-pixel overlap yields `min == max`.
pub fn resolve(
    bounds: &SnweBounds,
    lats: &Array2<f64>,
    lons: &Array2<f64>,
) -> AcquireResult<IndexBounds> {
    if let Some(ib) = mask_extents(bounds, lats, lons) {
        return Ok(ib);
    }

    let wrapped = bounds.wrapped_0_360();
    let lons_wrapped = lons.mapv(to_0_360);
    mask_extents(&wrapped, lats, &lons_wrapped).ok_or(AcquireError::NoOverlap)
}

/// Row/column extents of the containment mask, or None when it is empty.
fn mask_extents(
    bounds: &SnweBounds,
    lats: &Array2<f64>,
    lons: &Array2<f64>,
) -> Option<IndexBounds> {
    let (ny, nx) = lats.dim();
    let mut row_any = vec![false; ny];
    let mut col_any = vec![false; nx];
    let mut hits = 0usize;

    for ((j, i), &lat) in lats.indexed_iter() {
        let lon = lons[[j, i]];
        if bounds.south <= lat && lat <= bounds.north && bounds.west <= lon && lon <= bounds.east {
            row_any[j] = true;
            col_any[i] = true;
            hits += 1;
        }
    }
    if hits == 0 {
        return None;
    }

    let y_min = row_any.iter().position(|&b| b)?;
    let y_max = row_any.iter().rposition(|&b| b)?.min(ny - 1);
    let x_min = col_any.iter().position(|&b| b)?;
    let x_max = col_any.iter().rposition(|&b| b)?.min(nx - 1);

    Some(IndexBounds {
        x_min,
        x_max,
        y_min,
        y_max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// 1-degree synthetic grid: lat rows 30..39, lon columns -110..-101.
    fn synthetic_grid() -> (Array2<f64>, Array2<f64>) {
        let lats = Array2::from_shape_fn((10, 10), |(j, _)| 30.0 + j as f64);
        let lons = Array2::from_shape_fn((10, 10), |(_, i)| -110.0 + i as f64);
        (lats, lons)
    }

    #[test]
    fn test_single_cell_overlap() {
        let (lats, lons) = synthetic_grid();
        // Covers exactly the cell at lat 34, lon -107 (j=4, i=3).
        let b = SnweBounds::new(33.6, 34.4, -107.4, -106.6);
        let ib = resolve(&b, &lats, &lons).unwrap();
        assert_eq!(ib.y_min, 4);
        assert_eq!(ib.y_max, 4);
        assert_eq!(ib.x_min, 3);
        assert_eq!(ib.x_max, 3);
    }

    #[test]
    fn test_window_extents() {
        let (lats, lons) = synthetic_grid();
        let b = SnweBounds::new(32.0, 35.0, -109.0, -104.0);
        let ib = resolve(&b, &lats, &lons).unwrap();
        assert_eq!((ib.y_min, ib.y_max), (2, 5));
        assert_eq!((ib.x_min, ib.x_max), (1, 6));
    }

    #[test]
    fn test_wrap_retry_finds_overlap() {
        // Grid longitudes in [0, 360); bounds in (-180, 180].
        let lats = Array2::from_shape_fn((10, 10), |(j, _)| 55.0 + j as f64);
        let lons = Array2::from_shape_fn((10, 10), |(_, i)| 200.0 + i as f64);
        let b = SnweBounds::new(57.0, 59.0, -157.0, -154.0);
        let ib = resolve(&b, &lats, &lons).unwrap();
        assert_eq!((ib.y_min, ib.y_max), (2, 4));
        assert_eq!((ib.x_min, ib.x_max), (3, 6));
    }

    #[test]
    fn test_no_overlap_after_both_conventions() {
        let (lats, lons) = synthetic_grid();
        let b = SnweBounds::new(89.0, 89.5, -110.0, -105.0);
        assert!(matches!(
            resolve(&b, &lats, &lons),
            Err(AcquireError::NoOverlap)
        ));
    }
}
