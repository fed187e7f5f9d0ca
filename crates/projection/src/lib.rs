//! Map projections for weather-model grids.
//!
//! Each projection converts between geographic coordinates (lat/lon in
//! degrees) and planar coordinates (meters from the projection origin),
//! and can describe itself as CF-convention key/value attributes for
//! embedding in a self-describing gridded file.

pub mod lambert;
pub mod stereographic;

pub use lambert::LambertConformal;
pub use stereographic::PolarStereographic;

/// A CF attribute value: numeric or text.
#[derive(Debug, Clone, PartialEq)]
pub enum CfValue {
    Number(f64),
    Text(String),
}

/// A projection used by one of the supported weather-model grids.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub enum GridProjection {
    Lambert(LambertConformal),
    PolarStereo(PolarStereographic),
}

impl GridProjection {
    /// Geographic (degrees) to planar (meters).
    pub fn project(&self, lat_deg: f64, lon_deg: f64) -> (f64, f64) {
        match self {
            GridProjection::Lambert(p) => p.project(lat_deg, lon_deg),
            GridProjection::PolarStereo(p) => p.project(lat_deg, lon_deg),
        }
    }

    /// Planar (meters) to geographic (degrees).
    pub fn inverse(&self, x: f64, y: f64) -> (f64, f64) {
        match self {
            GridProjection::Lambert(p) => p.inverse(x, y),
            GridProjection::PolarStereo(p) => p.inverse(x, y),
        }
    }

    /// CF-convention grid-mapping parameters.
    pub fn cf_attributes(&self) -> Vec<(&'static str, CfValue)> {
        match self {
            GridProjection::Lambert(p) => p.cf_attributes(),
            GridProjection::PolarStereo(p) => p.cf_attributes(),
        }
    }
}
