//! The canonical in-memory weather data cube.

use std::path::Path;

use ndarray::{Array3, Axis};
use wx_common::{normalize_lon_180, AcquireResult, SnweBounds};

use crate::ncio;

/// Millibar/hectopascal to pascal.
const HPA_TO_PA: f64 = 100.0;

/// The canonical 3-D stack of meteorological fields.
///
/// Every array shares the shape (row, column, level): rows follow the
/// grid's y axis, columns its x axis. Longitudes are normalized to
/// (-180, 180] and pressure is in pascals. Created once per acquisition;
/// the downstream refractivity stage owns all further computation.
#[derive(Debug, Clone)]
pub struct WeatherCube {
    /// Planar x coordinate (m), broadcast
    pub xs: Array3<f64>,
    /// Planar y coordinate (m), broadcast
    pub ys: Array3<f64>,
    /// Longitude (degrees), broadcast
    pub lons: Array3<f64>,
    /// Latitude (degrees), broadcast
    pub lats: Array3<f64>,
    /// Specific humidity (kg/kg)
    pub q: Array3<f32>,
    /// Temperature (K)
    pub t: Array3<f32>,
    /// Geopotential height (gpm)
    pub z: Array3<f32>,
    /// Pressure (Pa), broadcast
    pub p: Array3<f64>,
}

impl WeatherCube {
    /// Load a persisted gridded file into the canonical cube.
    ///
    /// Axes are reordered from the on-disk (level, y, x) to (y, x, level);
    /// 1-D and 2-D coordinates are broadcast to the full cube shape. The
    /// only numeric change is the hPa-to-Pa conversion of the levels.
    pub fn load(path: &Path) -> AcquireResult<Self> {
        let product = ncio::read_product(path)?;

        let (nlev, ny, nx) = product.t.dim();
        let shape = (ny, nx, nlev);

        let lons_2d = product.longitude.mapv(normalize_lon_180);
        let lats_2d = product.latitude;

        Ok(WeatherCube {
            xs: Array3::from_shape_fn(shape, |(_, i, _)| product.x[i]),
            ys: Array3::from_shape_fn(shape, |(j, _, _)| product.y[j]),
            lons: Array3::from_shape_fn(shape, |(j, i, _)| lons_2d[[j, i]]),
            lats: Array3::from_shape_fn(shape, |(j, i, _)| lats_2d[[j, i]]),
            q: to_row_major(product.q),
            t: to_row_major(product.t),
            z: to_row_major(product.z),
            p: Array3::from_shape_fn(shape, |(_, _, k)| product.levels_hpa[k] * HPA_TO_PA),
        })
    }

    /// Cube shape as (rows, columns, levels).
    pub fn shape(&self) -> (usize, usize, usize) {
        self.t.dim()
    }

    /// SNWE extent of the cube's geographic coordinates.
    pub fn extent(&self) -> SnweBounds {
        let surface_lats = self.lats.index_axis(Axis(2), 0);
        let surface_lons = self.lons.index_axis(Axis(2), 0);
        SnweBounds::new(
            fold_min(surface_lats.iter()),
            fold_max(surface_lats.iter()),
            fold_min(surface_lons.iter()),
            fold_max(surface_lons.iter()),
        )
    }

    /// Mean of a data field, ignoring non-finite values.
    pub fn finite_mean(field: &Array3<f32>) -> f64 {
        let mut sum = 0.0f64;
        let mut count = 0usize;
        for &v in field.iter() {
            if v.is_finite() {
                sum += f64::from(v);
                count += 1;
            }
        }
        if count == 0 {
            f64::NAN
        } else {
            sum / count as f64
        }
    }
}

/// (level, y, x) to (y, x, level), owned and contiguous.
fn to_row_major(a: Array3<f32>) -> Array3<f32> {
    a.permuted_axes([1, 2, 0]).as_standard_layout().into_owned()
}

fn fold_min<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.copied().fold(f64::INFINITY, f64::min)
}

fn fold_max<'a>(values: impl Iterator<Item = &'a f64>) -> f64 {
    values.copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use projection::{GridProjection, LambertConformal};

    use crate::ncio::write_product;
    use crate::product::RawGriddedProduct;

    fn write_sample(path: &Path) {
        let product = RawGriddedProduct {
            level_coord: "levels".to_string(),
            levels_hpa: vec![1000.0, 500.0],
            latitude: Array2::from_shape_fn((3, 4), |(j, _)| 33.0 + j as f64),
            // [0, 360) on disk; the loader must hand back (-180, 180].
            longitude: Array2::from_shape_fn((3, 4), |(_, i)| 241.0 + i as f64),
            temperature: Array3::from_shape_fn((2, 3, 4), |(k, j, i)| {
                (k * 100 + j * 10 + i) as f32
            }),
            specific_humidity: Array3::from_elem((2, 3, 4), 0.004),
            geopotential_height: Array3::from_shape_fn((2, 3, 4), |(k, _, _)| {
                111.0 + 5000.0 * k as f32
            }),
        };
        let proj = GridProjection::Lambert(LambertConformal::hrrr_conus());
        let x = vec![0.0, 3000.0, 6000.0, 9000.0];
        let y = vec![-3000.0, 0.0, 3000.0];
        write_product(path, &product, &x, &y, &proj.cf_attributes()).unwrap();
    }

    #[test]
    fn test_cube_shape_invariant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.nc");
        write_sample(&path);

        let cube = WeatherCube::load(&path).unwrap();
        let shape = cube.shape();
        assert_eq!(shape, (3, 4, 2));
        assert_eq!(cube.xs.dim(), shape);
        assert_eq!(cube.ys.dim(), shape);
        assert_eq!(cube.lons.dim(), shape);
        assert_eq!(cube.lats.dim(), shape);
        assert_eq!(cube.q.dim(), shape);
        assert_eq!(cube.z.dim(), shape);
        assert_eq!(cube.p.dim(), shape);
    }

    #[test]
    fn test_axis_reorder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.nc");
        write_sample(&path);

        let cube = WeatherCube::load(&path).unwrap();
        // On disk t[k, j, i] = k*100 + j*10 + i; in memory it is (j, i, k).
        assert_eq!(cube.t[[0, 0, 0]], 0.0);
        assert_eq!(cube.t[[0, 0, 1]], 100.0);
        assert_eq!(cube.t[[2, 3, 1]], 123.0);
    }

    #[test]
    fn test_pressure_in_pascals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.nc");
        write_sample(&path);

        let cube = WeatherCube::load(&path).unwrap();
        assert_eq!(cube.p[[0, 0, 0]], 100_000.0);
        assert_eq!(cube.p[[2, 3, 1]], 50_000.0);
    }

    #[test]
    fn test_longitudes_are_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.nc");
        write_sample(&path);

        let cube = WeatherCube::load(&path).unwrap();
        assert!(cube.lons.iter().all(|&l| l > -180.0 && l <= 180.0));
        assert_eq!(cube.lons[[0, 0, 0]], -119.0);

        let extent = cube.extent();
        assert_eq!(extent.south, 33.0);
        assert_eq!(extent.north, 35.0);
        assert_eq!(extent.west, -119.0);
        assert_eq!(extent.east, -116.0);
    }

    #[test]
    fn test_finite_mean_skips_nan() {
        let mut field = Array3::from_elem((1, 1, 4), 2.0f32);
        field[[0, 0, 3]] = f32::NAN;
        assert!((WeatherCube::finite_mean(&field) - 2.0).abs() < 1e-12);
    }
}
