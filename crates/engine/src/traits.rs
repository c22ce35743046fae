//! Core traits for the candidate filtering pipeline.

use crate::context::UserWatchState;
use catalog::{CatalogItem, Result};

/// Core trait for filtering recommendation candidates.
///
/// ## Design Note
/// - `Send + Sync` so pipelines can be shared across worker threads
/// - Candidates are borrowed catalog items; filters take the Vec by value and
///   return the survivors without cloning any item
pub trait CandidateFilter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Apply this filter to a set of candidates.
    ///
    /// # Arguments
    /// * `candidates` - The candidates to filter (takes ownership)
    /// * `context` - Watch state of the user being served
    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>>;
}
