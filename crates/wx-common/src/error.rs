//! Error types for weather-model acquisition.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias using AcquireError.
pub type AcquireResult<T> = Result<T, AcquireError>;

/// Errors surfaced by the acquisition pipeline.
///
/// All variants are fatal to the current acquisition except where the
/// orchestrator explicitly downgrades (a cached file that does not cover
/// the request is a warning, never an error).
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The request cannot be served by any candidate model: either the
    /// area falls outside every coverage polygon, or extraction yielded no
    /// product with a recognized vertical-level coordinate.
    #[error("coverage error: {0}")]
    Coverage(String),

    /// The normalized time is outside the selected model's valid span.
    #[error("time {requested} is outside the valid range for {model} ({range})")]
    DateRange {
        model: String,
        requested: DateTime<Utc>,
        range: String,
    },

    /// The upstream archive has no matching product, or the network call
    /// failed.
    #[error("archive retrieval failed: {0}")]
    Retrieval(String),

    /// A persisted weather file is missing an expected variable or
    /// coordinate. Carries the path so the cache entry can be removed.
    #[error("weather file {} has invalid contents: {what}", path.display())]
    Format { path: PathBuf, what: String },

    /// Index-bounds resolution found zero intersecting pixels under both
    /// longitude conventions.
    #[error("area of interest has no overlap with the model's available extent")]
    NoOverlap,

    /// Serialization of results failed.
    #[error("failed to write weather data: {0}")]
    WriteFailure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::SnweBounds;

    #[test]
    fn test_format_error_names_path() {
        let err = AcquireError::Format {
            path: PathBuf::from("/tmp/HRRR_x.nc"),
            what: "missing variable 't'".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/HRRR_x.nc"));
        assert!(msg.contains("missing variable 't'"));
    }

    #[test]
    fn test_coverage_error_names_models() {
        let bounds = SnweBounds::new(10.0, 20.0, -100.0, -90.0);
        let err = AcquireError::Coverage(format!(
            "area {bounds} is unavailable for HRRR, HRRR-AK"
        ));
        assert!(err.to_string().contains("HRRR, HRRR-AK"));
    }
}
