//! Mock archive clients for orchestration tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use acquisition::{ArchiveClient, ModelDescriptor, RawGriddedProduct};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use wx_common::{AcquireError, AcquireResult};

/// Serves fixed candidate products and counts retrievals.
pub struct CountingArchive {
    candidates: Vec<RawGriddedProduct>,
    calls: AtomicUsize,
}

impl CountingArchive {
    pub fn new(candidates: Vec<RawGriddedProduct>) -> Self {
        Self {
            candidates,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of retrieve calls seen so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArchiveClient for CountingArchive {
    async fn retrieve(
        &self,
        _model: &ModelDescriptor,
        _valid_time: DateTime<Utc>,
        _forecast_hour: u32,
    ) -> AcquireResult<Vec<RawGriddedProduct>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candidates.clone())
    }
}

/// Always fails with a retrieval error.
pub struct FailingArchive;

#[async_trait]
impl ArchiveClient for FailingArchive {
    async fn retrieve(
        &self,
        model: &ModelDescriptor,
        valid_time: DateTime<Utc>,
        _forecast_hour: u32,
    ) -> AcquireResult<Vec<RawGriddedProduct>> {
        Err(AcquireError::Retrieval(format!(
            "archive has no product for {} at {valid_time}",
            model.name
        )))
    }
}
