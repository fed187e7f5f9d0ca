//! Common types shared across the weather-cube acquisition crates.

pub mod bounds;
pub mod diagnostics;
pub mod error;
pub mod polygon;
pub mod time;

pub use bounds::{normalize_lon_180, to_0_360, SnweBounds};
pub use diagnostics::{DiagnosticEvent, DiagnosticSink, TracingSink};
pub use error::{AcquireError, AcquireResult};
pub use polygon::CoveragePolygon;
pub use time::{round_to_step, ValidRange};
