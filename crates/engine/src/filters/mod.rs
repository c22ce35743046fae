//! Filter implementations for the candidate pipeline.
//!
//! This module contains all the concrete filters that can be composed into
//! a FilterPipeline.

pub mod abandoned_series;
pub mod already_watched;
pub mod in_progress;
pub mod media_type;
pub mod sparse_metadata;
pub mod started_series;

// Re-export for convenience
pub use abandoned_series::AbandonedSeriesFilter;
pub use already_watched::AlreadyWatchedFilter;
pub use in_progress::InProgressFilter;
pub use media_type::MediaTypeFilter;
pub use sparse_metadata::SparseMetadataFilter;
pub use started_series::StartedSeriesFilter;
