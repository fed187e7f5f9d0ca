//! Weather-model descriptors and regional selection.

use chrono::{DateTime, Duration, TimeZone, Utc};
use ndarray::Array2;
use projection::{GridProjection, LambertConformal, PolarStereographic};
use wx_common::{normalize_lon_180, AcquireError, AcquireResult, CoveragePolygon, SnweBounds, ValidRange};

/// Regular grid geometry in the model's native planar coordinates.
#[derive(Debug, Clone, Copy)]
pub struct GridGeometry {
    /// Number of grid points in X (columns)
    pub nx: usize,
    /// Number of grid points in Y (rows)
    pub ny: usize,
    /// Grid spacing X (meters)
    pub dx: f64,
    /// Grid spacing Y (meters)
    pub dy: f64,
    /// Latitude of the first (south-west) grid point (degrees)
    pub lat1: f64,
    /// Longitude of the first (south-west) grid point (degrees)
    pub lon1: f64,
}

impl GridGeometry {
    /// Synthesize the native 2-D latitude/longitude fields, shape (ny, nx).
    ///
    /// Row 0 is the southern edge; longitudes come back in the projection's
    /// output convention and are not normalized here.
    pub fn latlon_fields(&self, proj: &GridProjection) -> (Array2<f64>, Array2<f64>) {
        let (x0, y0) = proj.project(self.lat1, normalize_lon_180(self.lon1));

        let mut lats = Array2::zeros((self.ny, self.nx));
        let mut lons = Array2::zeros((self.ny, self.nx));
        for j in 0..self.ny {
            for i in 0..self.nx {
                let (lat, lon) = proj.inverse(x0 + i as f64 * self.dx, y0 + j as f64 * self.dy);
                lats[[j, i]] = lat;
                lons[[j, i]] = lon;
            }
        }
        (lats, lons)
    }
}

/// One selectable weather-model variant.
///
/// Immutable once constructed; one instance is selected per request and
/// never mutated across requests.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    /// Archive dataset identifier (object-key component)
    pub id: &'static str,
    /// Display name, also used in cache file names
    pub name: &'static str,
    /// Archive domain directory for this variant
    pub domain: &'static str,
    /// Valid coverage outline in the model's native longitude convention
    pub coverage: CoveragePolygon,
    /// Hours between available analyses
    pub step_hours: u32,
    /// Date span of the archive
    pub valid_range: ValidRange,
    /// Publication lag bounding the open end of the valid range
    pub lag: Duration,
    /// Product type carrying isobaric levels
    pub product: &'static str,
    /// Native projection
    pub projection: GridProjection,
    /// Native grid geometry
    pub grid: GridGeometry,
}

impl ModelDescriptor {
    /// The continental 3-km model.
    pub fn hrrr_conus() -> Self {
        Self {
            id: "hrrr",
            name: "HRRR",
            domain: "conus",
            coverage: CoveragePolygon::new(vec![
                (-125.0, 21.0),
                (-133.0, 49.0),
                (-60.0, 49.0),
                (-72.0, 21.0),
            ]),
            step_hours: 1,
            valid_range: ValidRange::since(Utc.with_ymd_and_hms(2016, 7, 15, 0, 0, 0).unwrap()),
            lag: Duration::hours(3),
            product: "prs",
            projection: GridProjection::Lambert(LambertConformal::hrrr_conus()),
            grid: GridGeometry {
                nx: 1799,
                ny: 1059,
                dx: 3000.0,
                dy: 3000.0,
                lat1: 21.138123,
                lon1: -122.719528,
            },
        }
    }

    /// The Alaska 3-km model. Its coverage polygon is expressed in the
    /// [0, 360) longitude convention.
    pub fn hrrr_alaska() -> Self {
        Self {
            id: "hrrrak",
            name: "HRRR-AK",
            domain: "alaska",
            coverage: CoveragePolygon::new(vec![
                (195.0, 40.0),
                (157.0, 55.0),
                (175.0, 70.0),
                (260.0, 77.0),
                (232.0, 52.0),
            ]),
            step_hours: 3,
            valid_range: ValidRange::since(Utc.with_ymd_and_hms(2018, 7, 13, 0, 0, 0).unwrap()),
            lag: Duration::hours(3),
            product: "prs",
            projection: GridProjection::PolarStereo(PolarStereographic::hrrr_alaska()),
            grid: GridGeometry {
                nx: 1299,
                ny: 919,
                dx: 3000.0,
                dy: 3000.0,
                lat1: 41.612949,
                lon1: -174.681087,
            },
        }
    }

    /// Whether the model's coverage polygon contains all corners of the box.
    pub fn covers(&self, bounds: &SnweBounds) -> bool {
        self.coverage.contains_box(bounds)
    }

    /// Validate a normalized time against the model's valid date span.
    pub fn check_time(&self, t: DateTime<Utc>) -> AcquireResult<()> {
        if self.valid_range.contains_at(t, Utc::now(), self.lag) {
            Ok(())
        } else {
            Err(AcquireError::DateRange {
                model: self.name.to_string(),
                requested: t,
                range: self.valid_range.describe(),
            })
        }
    }
}

/// Choose the model variant covering `bounds`.
///
/// The continental model is tried against the bounds as given; if its
/// corners fall outside, the west/east components are remapped into
/// [0, 360) and the Alaska variant's polygon (native to that convention)
/// is tried. Neither covering the request is a coverage error naming both
/// models.
pub fn select_model(bounds: &SnweBounds) -> AcquireResult<ModelDescriptor> {
    let conus = ModelDescriptor::hrrr_conus();
    if conus.covers(bounds) {
        return Ok(conus);
    }

    let alaska = ModelDescriptor::hrrr_alaska();
    if alaska.covers(&bounds.wrapped_0_360()) {
        return Ok(alaska);
    }

    Err(AcquireError::Coverage(format!(
        "area {} is unavailable for {}, {}",
        bounds, conus.name, alaska.name
    )))
}
