//! The acquisition orchestrator.
//!
//! Decides between downloading and reusing a cached file, runs the fetch
//! and load stages, and reports diagnostics. The decision flow is an
//! explicit state sequence so callers and tests can observe which path an
//! acquisition took.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use wx_common::{
    round_to_step, AcquireError, AcquireResult, DiagnosticEvent, DiagnosticSink, SnweBounds,
};

use crate::archive::ArchiveClient;
use crate::cube::WeatherCube;
use crate::model::{select_model, ModelDescriptor};
use crate::{fetch, filename, ncio};

/// States of a single acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionState {
    NotStarted,
    Downloading,
    Downloaded,
    Loading,
    Ready,
    Failed,
}

/// One acquisition request.
#[derive(Debug, Clone)]
pub struct PrepareRequest {
    /// Requested time; rounded to the selected model's step.
    pub time: DateTime<Utc>,
    /// Requested area (SNWE).
    pub bounds: SnweBounds,
    /// Directory holding persisted weather files.
    pub output_dir: PathBuf,
    /// Stop after the download stage and return no cube.
    pub download_only: bool,
    /// Re-download even when a cached file exists.
    pub force_download: bool,
}

/// The result of a successful acquisition.
#[derive(Debug)]
pub struct PrepareOutcome {
    /// Path of the persisted weather file.
    pub file: PathBuf,
    /// The loaded cube; `None` in download-only mode.
    pub cube: Option<WeatherCube>,
    /// Name of the model that served the request.
    pub model: String,
    /// The normalized time the file actually holds. For a reused cache
    /// file this is re-derived from the file name, not the request.
    pub time: DateTime<Utc>,
    /// The state sequence this acquisition went through.
    pub states: Vec<AcquisitionState>,
}

/// Orchestrates model selection, caching, fetching, and loading.
pub struct Orchestrator {
    archive: Arc<dyn ArchiveClient>,
    sink: Arc<dyn DiagnosticSink>,
}

impl Orchestrator {
    pub fn new(archive: Arc<dyn ArchiveClient>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { archive, sink }
    }

    /// Acquire the weather cube for a request.
    ///
    /// Selection, time normalization, and date validation run first; then
    /// either the cached file is reused (with a containment re-check that
    /// warns but never fails) or a fresh fetch is performed. Fetch and
    /// load errors propagate unchanged.
    pub async fn prepare(&self, request: &PrepareRequest) -> AcquireResult<PrepareOutcome> {
        let mut states = vec![AcquisitionState::NotStarted];
        let result = self.run(request, &mut states).await;
        if result.is_err() {
            states.push(AcquisitionState::Failed);
            debug!(?states, "Acquisition failed");
        }
        result
    }

    async fn run(
        &self,
        request: &PrepareRequest,
        states: &mut Vec<AcquisitionState>,
    ) -> AcquireResult<PrepareOutcome> {
        std::fs::create_dir_all(&request.output_dir).map_err(|e| {
            AcquireError::WriteFailure(format!(
                "failed to create {}: {e}",
                request.output_dir.display()
            ))
        })?;

        let model = select_model(&request.bounds)?;

        let mut time = round_to_step(request.time, model.step_hours);
        if time != request.time {
            self.sink.emit(&DiagnosticEvent::TimeRounded {
                requested: request.time,
                rounded: time,
            });
        }
        model.check_time(time)?;

        let file = request
            .output_dir
            .join(filename::cache_filename(model.name, time, &request.bounds));

        if !file.exists() || request.force_download {
            states.push(AcquisitionState::Downloading);
            fetch::fetch(
                self.archive.as_ref(),
                &model,
                &request.bounds,
                time,
                &file,
            )
            .await?;
            states.push(AcquisitionState::Downloaded);
        } else {
            self.sink
                .emit(&DiagnosticEvent::CacheReused { path: file.clone() });

            // Trust the file, not the caller: the normalized time comes
            // from the file's own name, and containment is re-checked
            // against the original request. A short extent is only a
            // warning; the cached file is used regardless.
            time = filename::time_from_filename(&file).ok_or_else(|| AcquireError::Format {
                path: file.clone(),
                what: "file name does not embed a timestamp".to_string(),
            })?;
            let available = ncio::read_extent(&file)?;
            if !available.contains(&request.bounds) {
                self.sink.emit(&DiagnosticEvent::ContainmentWarning {
                    requested: request.bounds,
                    available,
                });
            }
            states.push(AcquisitionState::Downloaded);
        }

        if request.download_only {
            self.sink.emit(&DiagnosticEvent::DownloadOnly);
            return Ok(PrepareOutcome {
                file,
                cube: None,
                model: model.name.to_string(),
                time,
                states: states.clone(),
            });
        }

        states.push(AcquisitionState::Loading);
        let cube = WeatherCube::load(&file)?;
        self.emit_stats(&model, &cube);
        states.push(AcquisitionState::Ready);

        Ok(PrepareOutcome {
            file,
            cube: Some(cube),
            model: model.name.to_string(),
            time,
            states: states.clone(),
        })
    }

    fn emit_stats(&self, model: &ModelDescriptor, cube: &WeatherCube) {
        self.sink.emit(&DiagnosticEvent::CubeStats {
            shape: cube.shape(),
            extent: cube.extent(),
            mean_temperature: WeatherCube::finite_mean(&cube.t),
            mean_humidity: WeatherCube::finite_mean(&cube.q),
            mean_height: WeatherCube::finite_mean(&cube.z),
        });
        debug!(model = %model.name, shape = ?cube.shape(), "Weather cube ready");
    }
}
