//! Structured diagnostic events.
//!
//! Components emit observable, non-fatal events through an injected sink
//! rather than a process-wide logger, so callers can capture or redirect
//! them. The provided [`TracingSink`] forwards everything to `tracing`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::bounds::SnweBounds;

/// Observable events emitted during acquisition.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    /// The requested time was moved to the model's time step.
    TimeRounded {
        requested: DateTime<Utc>,
        rounded: DateTime<Utc>,
    },
    /// An existing weather file short-circuited the download.
    CacheReused { path: PathBuf },
    /// A cached file does not cover the requested area; it is used anyway.
    ContainmentWarning {
        requested: SnweBounds,
        available: SnweBounds,
    },
    /// Download finished without loading (download-only mode).
    DownloadOnly,
    /// Summary statistics of a loaded cube.
    CubeStats {
        shape: (usize, usize, usize),
        extent: SnweBounds,
        mean_temperature: f64,
        mean_humidity: f64,
        mean_height: f64,
    },
}

/// Receiver for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: &DiagnosticEvent);
}

/// Forwards diagnostic events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, event: &DiagnosticEvent) {
        match event {
            DiagnosticEvent::TimeRounded { requested, rounded } => {
                info!(%requested, %rounded, "Rounded requested time to model step");
            }
            DiagnosticEvent::CacheReused { path } => {
                warn!(
                    path = %path.display(),
                    "Weather file already exists, skipping download; remove it to force a fresh fetch"
                );
            }
            DiagnosticEvent::ContainmentWarning { requested, available } => {
                warn!(
                    %requested,
                    %available,
                    "Existing weather file does not cover the requested area; using it anyway"
                );
            }
            DiagnosticEvent::DownloadOnly => {
                warn!("download-only selected, no further processing will happen");
            }
            DiagnosticEvent::CubeStats {
                shape,
                extent,
                mean_temperature,
                mean_humidity,
                mean_height,
            } => {
                debug!(
                    ny = shape.0,
                    nx = shape.1,
                    nlevels = shape.2,
                    %extent,
                    mean_t = mean_temperature,
                    mean_q = mean_humidity,
                    mean_z = mean_height,
                    "Loaded weather cube"
                );
            }
        }
    }
}
