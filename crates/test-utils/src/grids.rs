//! Synthetic gridded products with predictable values.

use acquisition::RawGriddedProduct;
use ndarray::{Array2, Array3};

/// Create a raw product on a regular 1-degree patch.
///
/// Latitude rows run `south, south+1, ...`; longitude columns run
/// `west, west+1, ...` in whatever convention `west` is given. Data values
/// are predictable so reads can be verified positionally:
///
/// - temperature `= 250 + 10k + j + i/10`
/// - specific humidity `= 0.001 * (k + 1)`
/// - geopotential height `= 100 + 5000k + j + i`
///
/// where `k` is the level index, `j` the row, and `i` the column.
pub fn synthetic_product(
    south: f64,
    west: f64,
    ny: usize,
    nx: usize,
    levels_hpa: &[f64],
) -> RawGriddedProduct {
    let nlev = levels_hpa.len();
    RawGriddedProduct {
        level_coord: "isobaricInhPa".to_string(),
        levels_hpa: levels_hpa.to_vec(),
        latitude: Array2::from_shape_fn((ny, nx), |(j, _)| south + j as f64),
        longitude: Array2::from_shape_fn((ny, nx), |(_, i)| west + i as f64),
        temperature: Array3::from_shape_fn((nlev, ny, nx), |(k, j, i)| {
            250.0 + 10.0 * k as f32 + j as f32 + i as f32 / 10.0
        }),
        specific_humidity: Array3::from_shape_fn((nlev, ny, nx), |(k, _, _)| {
            0.001 * (k + 1) as f32
        }),
        geopotential_height: Array3::from_shape_fn((nlev, ny, nx), |(k, j, i)| {
            100.0 + 5000.0 * k as f32 + j as f32 + i as f32
        }),
    }
}
