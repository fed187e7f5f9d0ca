//! Shared test utilities for the weather-cube workspace.

pub mod archives;
pub mod grids;
pub mod sinks;

pub use archives::{CountingArchive, FailingArchive};
pub use grids::synthetic_product;
pub use sinks::CollectingSink;

/// Install a tracing subscriber writing to the test harness; safe to call
/// from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
