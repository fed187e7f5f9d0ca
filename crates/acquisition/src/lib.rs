//! Acquisition of gridded weather-model fields.
//!
//! The pipeline selects a regional model variant for a requested area,
//! normalizes the requested time to the model's step, fetches the raw
//! fields from the upstream archive, subsets and reprojects them, persists
//! a self-describing NetCDF file, and loads it back as a canonical
//! (row, column, level) data cube for downstream delay interpolation.

pub mod archive;
pub mod cube;
pub mod fetch;
pub mod filename;
pub mod model;
pub mod ncio;
pub mod orchestrator;
pub mod product;
pub mod subset;

pub use archive::{ArchiveClient, NoaaArchive};
pub use cube::WeatherCube;
pub use fetch::fetch;
pub use model::{select_model, GridGeometry, ModelDescriptor};
pub use orchestrator::{AcquisitionState, Orchestrator, PrepareOutcome, PrepareRequest};
pub use product::RawGriddedProduct;
pub use subset::{resolve, IndexBounds};
