//! Lambert Conformal Conic projection.
//!
//! This projection is commonly used for continental-scale weather grids.
//! It maps a cone tangent or secant to the Earth's surface onto a flat
//! plane. Coordinates are planar meters relative to the projection origin
//! (lat0, lon0) with no false easting/northing.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::CfValue;

/// Lambert Conformal Conic projection on a spherical Earth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambertConformal {
    /// Central meridian in radians
    lon0: f64,
    /// Latitude of origin in radians
    lat0: f64,
    /// First standard parallel in radians
    latin1: f64,
    /// Second standard parallel in radians
    latin2: f64,
    /// Earth radius (meters)
    earth_radius: f64,
    /// Cone constant (n)
    n: f64,
    /// F constant
    f: f64,
    /// Rho at the latitude of origin
    rho0: f64,
}

impl LambertConformal {
    /// Create a projection from parameters in degrees.
    ///
    /// `lon0_deg` may be given in [0, 360); it is folded into (-180, 180].
    pub fn new(
        lat0_deg: f64,
        lon0_deg: f64,
        latin1_deg: f64,
        latin2_deg: f64,
        earth_radius: f64,
    ) -> Self {
        let to_rad = PI / 180.0;

        let lon0_deg = if lon0_deg > 180.0 { lon0_deg - 360.0 } else { lon0_deg };
        let lat0 = lat0_deg * to_rad;
        let lon0 = lon0_deg * to_rad;
        let latin1 = latin1_deg * to_rad;
        let latin2 = latin2_deg * to_rad;

        // Cone constant n
        let n = if (latin1 - latin2).abs() < 1e-10 {
            // Tangent cone (single standard parallel)
            latin1.sin()
        } else {
            // Secant cone (two standard parallels)
            let ln_ratio = (latin1.cos() / latin2.cos()).ln();
            let tan_ratio =
                ((PI / 4.0 + latin2 / 2.0).tan() / (PI / 4.0 + latin1 / 2.0).tan()).ln();
            ln_ratio / tan_ratio
        };

        let f = (latin1.cos() * (PI / 4.0 + latin1 / 2.0).tan().powf(n)) / n;
        let rho0 = earth_radius * f / (PI / 4.0 + lat0 / 2.0).tan().powf(n);

        Self {
            lon0,
            lat0,
            latin1,
            latin2,
            earth_radius,
            n,
            f,
            rho0,
        }
    }

    /// The continental 3-km grid projection: origin 38.5N/262.5E, both
    /// standard parallels at 38.5N, spherical Earth of radius 6371229 m.
    pub fn hrrr_conus() -> Self {
        Self::new(38.5, 262.5, 38.5, 38.5, 6_371_229.0)
    }

    /// Geographic (degrees) to planar (meters from the origin).
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let mut dlon = lon - self.lon0;
        while dlon > PI {
            dlon -= 2.0 * PI;
        }
        while dlon < -PI {
            dlon += 2.0 * PI;
        }

        let rho = self.earth_radius * self.f / (PI / 4.0 + lat / 2.0).tan().powf(self.n);
        let theta = self.n * dlon;

        let x = rho * theta.sin();
        let y = self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Planar (meters from the origin) to geographic (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let rho = (x * x + (self.rho0 - y) * (self.rho0 - y)).sqrt();
        let rho = if self.n < 0.0 { -rho } else { rho };

        let theta = (x / (self.rho0 - y)).atan();

        let lat = 2.0 * ((self.earth_radius * self.f / rho).powf(1.0 / self.n)).atan() - PI / 2.0;
        let lon = self.lon0 + theta / self.n;

        (lat * to_deg, lon * to_deg)
    }

    /// CF grid-mapping parameters for this projection.
    pub fn cf_attributes(&self) -> Vec<(&'static str, CfValue)> {
        let to_deg = 180.0 / PI;
        vec![
            (
                "grid_mapping_name",
                CfValue::Text("lambert_conformal_conic".to_string()),
            ),
            ("standard_parallel", CfValue::Number(self.latin1 * to_deg)),
            (
                "longitude_of_central_meridian",
                CfValue::Number(self.lon0 * to_deg),
            ),
            (
                "latitude_of_projection_origin",
                CfValue::Number(self.lat0 * to_deg),
            ),
            ("earth_radius", CfValue::Number(self.earth_radius)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_origin_maps_to_zero() {
        let proj = LambertConformal::hrrr_conus();
        let (x, y) = proj.project(38.5, -97.5);
        assert!(x.abs() < 1e-6, "x should be ~0, got {}", x);
        assert!(y.abs() < 1e-6, "y should be ~0, got {}", y);
    }

    #[test]
    fn test_roundtrip_conus_interior() {
        let proj = LambertConformal::hrrr_conus();

        // Kansas City, roughly the middle of the continental grid.
        let (x, y) = proj.project(39.0, -94.5);
        let (lat, lon) = proj.inverse(x, y);

        assert_relative_eq!(lat, 39.0, epsilon = 1e-8);
        assert_relative_eq!(lon, -94.5, epsilon = 1e-8);
    }

    #[test]
    fn test_east_of_meridian_is_positive_x() {
        let proj = LambertConformal::hrrr_conus();
        let (x_east, _) = proj.project(38.5, -90.0);
        let (x_west, _) = proj.project(38.5, -105.0);
        assert!(x_east > 0.0);
        assert!(x_west < 0.0);
    }

    #[test]
    fn test_central_meridian_in_0_360_convention() {
        let a = LambertConformal::new(38.5, 262.5, 38.5, 38.5, 6_371_229.0);
        let b = LambertConformal::new(38.5, -97.5, 38.5, 38.5, 6_371_229.0);
        let (xa, ya) = a.project(30.0, -110.0);
        let (xb, yb) = b.project(30.0, -110.0);
        assert_relative_eq!(xa, xb, epsilon = 1e-9);
        assert_relative_eq!(ya, yb, epsilon = 1e-9);
    }
}
