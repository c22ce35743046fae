//! # Catalog Crate
//!
//! Domain types shared by the whole recommendation workspace.
//!
//! ## Main Components
//!
//! - **types**: CatalogItem, MediaKind, FeatureClass, WatchRecord and the
//!   `WatchHistory` collaborator trait
//! - **config**: RecommendationConfig with defaults and validation
//! - **index**: CatalogIndex, the in-memory catalog + watch history store
//! - **snapshot**: JSON snapshot loading for host integrations
//! - **error**: The error taxonomy of the recommendation core
//!
//! ## Example Usage
//!
//! ```ignore
//! use catalog::{CatalogIndex, WatchHistory};
//! use std::path::Path;
//!
//! let index = CatalogIndex::load_from_file(Path::new("library.json"))?;
//! let history = index.watch_records("alice");
//! println!("alice has {} watch records", history.len());
//! ```

// Public modules
pub mod config;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod types;

// Re-export commonly used types for convenience
pub use config::{RecommendationConfig, YearEncoding};
pub use error::{RecommendError, Result};
pub use index::CatalogIndex;
pub use snapshot::{CatalogSnapshot, HistoryEntry, UserSnapshot};
pub use types::{
    CatalogItem, FeatureClass, ItemId, MediaKind, UNKNOWN_DECADE, UserId, WatchHistory,
    WatchRecord, normalize_feature,
};
