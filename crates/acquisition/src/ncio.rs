//! Persisted gridded-file I/O.
//!
//! The on-disk product is a self-describing NetCDF file: data variables
//! `t`, `q`, `z` shaped (level, y, x), coordinates `levels` (hPa), planar
//! `x`/`y` (meters), 2-D `latitude`/`longitude` (degrees), and a
//! zero-valued scalar `proj` carrying the CRS parameters that every data
//! variable references through `grid_mapping`.
//!
//! Writes land on a `.partial` sibling first and are renamed into place,
//! so a reader never observes a torn file and concurrent writers of the
//! same key cannot corrupt it.

use std::path::{Path, PathBuf};

use ndarray::{Array2, Array3};
use projection::CfValue;
use tracing::debug;
use wx_common::{normalize_lon_180, AcquireError, AcquireResult, SnweBounds};

use crate::product::RawGriddedProduct;

/// Write a subset product with its derived planar coordinates.
pub fn write_product(
    path: &Path,
    product: &RawGriddedProduct,
    x: &[f64],
    y: &[f64],
    proj_attrs: &[(&'static str, CfValue)],
) -> AcquireResult<()> {
    let partial = partial_path(path);
    if let Err(e) = write_inner(&partial, product, x, y, proj_attrs) {
        let _ = std::fs::remove_file(&partial);
        return Err(e);
    }
    std::fs::rename(&partial, path).map_err(|e| {
        let _ = std::fs::remove_file(&partial);
        AcquireError::WriteFailure(format!(
            "failed to move {} into place: {e}",
            partial.display()
        ))
    })?;

    debug!(path = %path.display(), "Persisted weather model file");
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|s| s.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

fn wf(e: netcdf::Error) -> AcquireError {
    AcquireError::WriteFailure(e.to_string())
}

fn write_inner(
    path: &Path,
    product: &RawGriddedProduct,
    x: &[f64],
    y: &[f64],
    proj_attrs: &[(&'static str, CfValue)],
) -> AcquireResult<()> {
    let mut file = netcdf::create(path).map_err(wf)?;

    let (nlev, ny, nx) = product.temperature.dim();
    file.add_dimension("level", nlev).map_err(wf)?;
    file.add_dimension("y", ny).map_err(wf)?;
    file.add_dimension("x", nx).map_err(wf)?;

    {
        let mut var = file.add_variable::<f64>("levels", &["level"]).map_err(wf)?;
        var.put_attribute("units", "hPa").map_err(wf)?;
        var.put_values(&product.levels_hpa, ..).map_err(wf)?;
    }
    {
        let mut var = file.add_variable::<f64>("x", &["x"]).map_err(wf)?;
        var.put_attribute("standard_name", "projection_x_coordinate")
            .map_err(wf)?;
        var.put_attribute("units", "m").map_err(wf)?;
        var.put_values(x, ..).map_err(wf)?;
    }
    {
        let mut var = file.add_variable::<f64>("y", &["y"]).map_err(wf)?;
        var.put_attribute("standard_name", "projection_y_coordinate")
            .map_err(wf)?;
        var.put_attribute("units", "m").map_err(wf)?;
        var.put_values(y, ..).map_err(wf)?;
    }
    {
        let mut var = file
            .add_variable::<f64>("latitude", &["y", "x"])
            .map_err(wf)?;
        var.put_attribute("units", "degrees_north").map_err(wf)?;
        var.put_values(&flat2(&product.latitude), ..).map_err(wf)?;
    }
    {
        let mut var = file
            .add_variable::<f64>("longitude", &["y", "x"])
            .map_err(wf)?;
        var.put_attribute("units", "degrees_east").map_err(wf)?;
        var.put_values(&flat2(&product.longitude), ..).map_err(wf)?;
    }

    {
        let mut var = file.add_variable::<i32>("proj", &[]).map_err(wf)?;
        for (key, value) in proj_attrs {
            match value {
                CfValue::Number(n) => var.put_attribute(key, *n).map_err(wf)?,
                CfValue::Text(s) => var.put_attribute(key, s.as_str()).map_err(wf)?,
            };
        }
        var.put_values(&[0i32], ..).map_err(wf)?;
    }

    let data_dims = ["level", "y", "x"];
    for (name, units, values) in [
        ("t", "K", &product.temperature),
        ("q", "kg kg-1", &product.specific_humidity),
        ("z", "gpm", &product.geopotential_height),
    ] {
        let mut var = file.add_variable::<f32>(name, &data_dims).map_err(wf)?;
        var.put_attribute("units", units).map_err(wf)?;
        var.put_attribute("grid_mapping", "proj").map_err(wf)?;
        var.put_values(&flat3(values), ..).map_err(wf)?;
    }

    Ok(())
}

/// Row-major copies; slices of windowed arrays are not contiguous.
fn flat2(a: &Array2<f64>) -> Vec<f64> {
    a.iter().copied().collect()
}

fn flat3(a: &Array3<f32>) -> Vec<f32> {
    a.iter().copied().collect()
}

/// The persisted product read back, still in on-disk axis order.
#[derive(Debug)]
pub struct PersistedProduct {
    pub levels_hpa: Vec<f64>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub latitude: Array2<f64>,
    pub longitude: Array2<f64>,
    /// (level, y, x)
    pub t: Array3<f32>,
    pub q: Array3<f32>,
    pub z: Array3<f32>,
}

fn format_err(path: &Path, what: impl Into<String>) -> AcquireError {
    AcquireError::Format {
        path: path.to_path_buf(),
        what: what.into(),
    }
}

fn require_dim(file: &netcdf::File, path: &Path, name: &str) -> AcquireResult<usize> {
    file.dimension(name)
        .map(|d| d.len())
        .ok_or_else(|| format_err(path, format!("missing dimension '{name}'")))
}

fn read_f64(file: &netcdf::File, path: &Path, name: &str) -> AcquireResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| format_err(path, format!("missing variable '{name}'")))?;
    var.get_values::<f64, _>(..)
        .map_err(|e| format_err(path, format!("failed to read '{name}': {e}")))
}

fn read_f32(file: &netcdf::File, path: &Path, name: &str) -> AcquireResult<Vec<f32>> {
    let var = file
        .variable(name)
        .ok_or_else(|| format_err(path, format!("missing variable '{name}'")))?;
    var.get_values::<f32, _>(..)
        .map_err(|e| format_err(path, format!("failed to read '{name}': {e}")))
}

/// Read the full persisted product.
pub fn read_product(path: &Path) -> AcquireResult<PersistedProduct> {
    let file = netcdf::open(path).map_err(|e| format_err(path, format!("failed to open: {e}")))?;

    let nlev = require_dim(&file, path, "level")?;
    let ny = require_dim(&file, path, "y")?;
    let nx = require_dim(&file, path, "x")?;

    let to_2d = |v: Vec<f64>, name: &str| {
        Array2::from_shape_vec((ny, nx), v)
            .map_err(|e| format_err(path, format!("bad shape for '{name}': {e}")))
    };
    let to_3d = |v: Vec<f32>, name: &str| {
        Array3::from_shape_vec((nlev, ny, nx), v)
            .map_err(|e| format_err(path, format!("bad shape for '{name}': {e}")))
    };

    Ok(PersistedProduct {
        levels_hpa: read_f64(&file, path, "levels")?,
        x: read_f64(&file, path, "x")?,
        y: read_f64(&file, path, "y")?,
        latitude: to_2d(read_f64(&file, path, "latitude")?, "latitude")?,
        longitude: to_2d(read_f64(&file, path, "longitude")?, "longitude")?,
        t: to_3d(read_f32(&file, path, "t")?, "t")?,
        q: to_3d(read_f32(&file, path, "q")?, "q")?,
        z: to_3d(read_f32(&file, path, "z")?, "z")?,
    })
}

/// SNWE extent of the file's geographic fields, longitudes normalized to
/// (-180, 180]. Used to check whether a cached file still covers a request.
pub fn read_extent(path: &Path) -> AcquireResult<SnweBounds> {
    let file = netcdf::open(path).map_err(|e| format_err(path, format!("failed to open: {e}")))?;

    let lats = read_f64(&file, path, "latitude")?;
    let lons = read_f64(&file, path, "longitude")?;
    if lats.is_empty() || lons.is_empty() {
        return Err(format_err(path, "empty geographic coordinates"));
    }

    let mut south = f64::INFINITY;
    let mut north = f64::NEG_INFINITY;
    let mut west = f64::INFINITY;
    let mut east = f64::NEG_INFINITY;
    for &lat in &lats {
        south = south.min(lat);
        north = north.max(lat);
    }
    for &lon in &lons {
        let lon = normalize_lon_180(lon);
        west = west.min(lon);
        east = east.max(lon);
    }

    Ok(SnweBounds::new(south, north, west, east))
}
