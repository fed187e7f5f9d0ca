//! The remote fetcher: archive to persisted gridded file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ndarray::Array2;
use tracing::{info, instrument};
use wx_common::{AcquireError, AcquireResult, SnweBounds};

use crate::archive::ArchiveClient;
use crate::model::ModelDescriptor;
use crate::product::{RawGriddedProduct, LEVEL_COORD_CANDIDATES};
use crate::{ncio, subset};

/// Forecast-hour offset requested from the archive (analysis fields).
pub const DEFAULT_FORECAST_HOUR: u32 = 0;

/// Fetch the model fields for `bounds` at the normalized `valid_time` and
/// persist them at `destination`.
///
/// Candidate products from the archive are probed for a recognized
/// vertical-level coordinate; the selected product is normalized to the
/// (-180, 180] longitude convention, subset to the requested area,
/// reprojected into the model's planar coordinates, and written
/// atomically. Identical inputs produce an identical file; a failed write
/// never leaves a partial file behind.
#[instrument(skip(archive, model), fields(model = %model.name, time = %valid_time))]
pub async fn fetch(
    archive: &dyn ArchiveClient,
    model: &ModelDescriptor,
    bounds: &SnweBounds,
    valid_time: DateTime<Utc>,
    destination: &Path,
) -> AcquireResult<PathBuf> {
    let candidates = archive
        .retrieve(model, valid_time, DEFAULT_FORECAST_HOUR)
        .await?;

    let mut product = RawGriddedProduct::select_candidate(candidates).ok_or_else(|| {
        AcquireError::Coverage(format!(
            "no product for {} exposes a vertical level coordinate (expected one of {:?})",
            model.name, LEVEL_COORD_CANDIDATES
        ))
    })?;

    product.normalize_longitudes();

    let window = product.window(&subset::resolve(
        bounds,
        &product.latitude,
        &product.longitude,
    )?);

    let (x, y) = planar_coordinates(model, &window);
    ncio::write_product(
        destination,
        &window,
        &x,
        &y,
        &model.projection.cf_attributes(),
    )?;

    info!(
        path = %destination.display(),
        ny = window.latitude.dim().0,
        nx = window.latitude.dim().1,
        nlevels = window.levels_hpa.len(),
        "Fetched and persisted weather model data"
    );

    Ok(destination.to_path_buf())
}

/// Project the window's lat/lon into planar meters and reduce to 1-D
/// coordinate vectors: x from column means across rows, y from row means
/// across columns.
fn planar_coordinates(model: &ModelDescriptor, window: &RawGriddedProduct) -> (Vec<f64>, Vec<f64>) {
    let (ny, nx) = window.latitude.dim();
    let mut px = Array2::<f64>::zeros((ny, nx));
    let mut py = Array2::<f64>::zeros((ny, nx));

    for j in 0..ny {
        for i in 0..nx {
            let (x, y) = model
                .projection
                .project(window.latitude[[j, i]], window.longitude[[j, i]]);
            px[[j, i]] = x;
            py[[j, i]] = y;
        }
    }

    let x = (0..nx).map(|i| px.column(i).sum() / ny as f64).collect();
    let y = (0..ny).map(|j| py.row(j).sum() / nx as f64).collect();
    (x, y)
}
