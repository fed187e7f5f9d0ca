//! Raw gridded products as returned by the upstream archive.

use ndarray::{s, Array2, Array3};
use wx_common::normalize_lon_180;

use crate::subset::IndexBounds;

/// Vertical coordinate names recognized as isobaric level axes.
pub const LEVEL_COORD_CANDIDATES: [&str; 2] = ["isobaricInhPa", "levels"];

/// A field set on the model's native grid, as extracted from the archive.
///
/// Ephemeral: produced by the archive client, subset and reprojected by the
/// fetcher, then persisted and dropped. Level index 0 is the highest
/// pressure (nearest the surface); lat/lon are 2-D fields over (ny, nx) and
/// the data variables are shaped (level, ny, nx).
#[derive(Debug, Clone)]
pub struct RawGriddedProduct {
    /// Name of the vertical coordinate as exposed by the archive.
    pub level_coord: String,
    /// Pressure levels in hectopascals, matching the data's level axis.
    pub levels_hpa: Vec<f64>,
    pub latitude: Array2<f64>,
    pub longitude: Array2<f64>,
    /// Temperature (K)
    pub temperature: Array3<f32>,
    /// Specific humidity (kg/kg)
    pub specific_humidity: Array3<f32>,
    /// Geopotential height (gpm); persisted under the canonical name `z`
    pub geopotential_height: Array3<f32>,
}

impl RawGriddedProduct {
    /// Whether the product's vertical coordinate is a recognized level axis.
    pub fn has_level_coordinate(&self) -> bool {
        LEVEL_COORD_CANDIDATES
            .iter()
            .any(|c| *c == self.level_coord)
    }

    /// Remap all longitudes into (-180, 180].
    pub fn normalize_longitudes(&mut self) {
        self.longitude.mapv_inplace(normalize_lon_180);
    }

    /// Extract the inclusive index window as an owned product.
    pub fn window(&self, ib: &IndexBounds) -> RawGriddedProduct {
        let (ys, ye, xs, xe) = (ib.y_min, ib.y_max + 1, ib.x_min, ib.x_max + 1);
        RawGriddedProduct {
            level_coord: self.level_coord.clone(),
            levels_hpa: self.levels_hpa.clone(),
            latitude: self.latitude.slice(s![ys..ye, xs..xe]).to_owned(),
            longitude: self.longitude.slice(s![ys..ye, xs..xe]).to_owned(),
            temperature: self.temperature.slice(s![.., ys..ye, xs..xe]).to_owned(),
            specific_humidity: self
                .specific_humidity
                .slice(s![.., ys..ye, xs..xe])
                .to_owned(),
            geopotential_height: self
                .geopotential_height
                .slice(s![.., ys..ye, xs..xe])
                .to_owned(),
        }
    }

    /// Pick the first candidate exposing a recognized level coordinate.
    pub fn select_candidate(
        candidates: Vec<RawGriddedProduct>,
    ) -> Option<RawGriddedProduct> {
        candidates.into_iter().find(|p| p.has_level_coordinate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    fn product(level_coord: &str) -> RawGriddedProduct {
        RawGriddedProduct {
            level_coord: level_coord.to_string(),
            levels_hpa: vec![1000.0, 500.0],
            latitude: Array2::zeros((3, 4)),
            longitude: Array2::from_shape_fn((3, 4), |(_, i)| 240.0 + i as f64),
            temperature: Array3::zeros((2, 3, 4)),
            specific_humidity: Array3::zeros((2, 3, 4)),
            geopotential_height: Array3::zeros((2, 3, 4)),
        }
    }

    #[test]
    fn test_candidate_probing() {
        let picked = RawGriddedProduct::select_candidate(vec![
            product("heightAboveGround"),
            product("isobaricInhPa"),
        ])
        .unwrap();
        assert_eq!(picked.level_coord, "isobaricInhPa");

        assert!(RawGriddedProduct::select_candidate(vec![product("surface")]).is_none());
    }

    #[test]
    fn test_normalize_longitudes() {
        let mut p = product("levels");
        p.normalize_longitudes();
        assert!(p.longitude.iter().all(|&l| l > -180.0 && l <= 180.0));
        assert_eq!(p.longitude[[0, 0]], -120.0);
    }

    #[test]
    fn test_window_is_inclusive() {
        let p = product("isobaricInhPa");
        let w = p.window(&IndexBounds {
            x_min: 1,
            x_max: 2,
            y_min: 0,
            y_max: 0,
        });
        assert_eq!(w.latitude.dim(), (1, 2));
        assert_eq!(w.temperature.dim(), (2, 1, 2));
        assert_eq!(w.longitude[[0, 0]], 241.0);
    }
}
