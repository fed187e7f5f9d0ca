//! North polar stereographic projection.
//!
//! Used by the high-latitude regional grid. The plane touches (or cuts)
//! the sphere around the north pole; scale is true at the standard
//! parallel `lat_ts`. Coordinates are planar meters with the pole at the
//! origin.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::CfValue;

/// North polar stereographic projection on a spherical Earth.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolarStereographic {
    /// Central meridian (straight vertical longitude from the pole), radians
    lon0: f64,
    /// Latitude of true scale, radians
    lat_ts: f64,
    /// Earth radius (meters)
    earth_radius: f64,
    /// Scale reduction factor derived from lat_ts
    k0: f64,
}

impl PolarStereographic {
    /// Create a projection from parameters in degrees.
    ///
    /// `lon0_deg` may be given in [0, 360); it is folded into (-180, 180].
    pub fn new(lon0_deg: f64, lat_ts_deg: f64, earth_radius: f64) -> Self {
        let to_rad = PI / 180.0;
        let lon0_deg = if lon0_deg > 180.0 { lon0_deg - 360.0 } else { lon0_deg };

        let lat_ts = lat_ts_deg * to_rad;
        // True scale at lat_ts for the spherical polar aspect.
        let k0 = (1.0 + lat_ts.sin()) / 2.0;

        Self {
            lon0: lon0_deg * to_rad,
            lat_ts,
            earth_radius,
            k0,
        }
    }

    /// The Alaska 3-km grid projection: central meridian 225E, true scale
    /// at 60N, spherical Earth of radius 6371229 m.
    pub fn hrrr_alaska() -> Self {
        Self::new(225.0, 60.0, 6_371_229.0)
    }

    /// Geographic (degrees) to planar (meters from the pole).
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        let to_rad = PI / 180.0;
        let lat = lat_deg * to_rad;
        let lon = lon_deg * to_rad;

        let rho = 2.0 * self.earth_radius * self.k0 * (PI / 4.0 - lat / 2.0).tan();
        let dlon = lon - self.lon0;

        let x = rho * dlon.sin();
        let y = -rho * dlon.cos();
        (x, y)
    }

    /// Planar (meters from the pole) to geographic (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        let to_deg = 180.0 / PI;

        let rho = (x * x + y * y).sqrt();
        let lat = PI / 2.0 - 2.0 * (rho / (2.0 * self.earth_radius * self.k0)).atan();
        let lon = if rho == 0.0 {
            self.lon0
        } else {
            self.lon0 + x.atan2(-y)
        };

        (lat * to_deg, lon * to_deg)
    }

    /// CF grid-mapping parameters for this projection.
    pub fn cf_attributes(&self) -> Vec<(&'static str, CfValue)> {
        let to_deg = 180.0 / PI;
        vec![
            (
                "grid_mapping_name",
                CfValue::Text("polar_stereographic".to_string()),
            ),
            (
                "straight_vertical_longitude_from_pole",
                CfValue::Number(self.lon0 * to_deg),
            ),
            ("standard_parallel", CfValue::Number(self.lat_ts * to_deg)),
            ("latitude_of_projection_origin", CfValue::Number(90.0)),
            ("earth_radius", CfValue::Number(self.earth_radius)),
        ]
    }
}
