//! The FilterPipeline orchestrates multiple candidate filters.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(MediaTypeFilter::new(Some(MediaKind::Movie)))
///     .add_filter(AlreadyWatchedFilter);
///
/// let survivors = pipeline.apply(catalog.items().iter().collect(), &state)?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn CandidateFilter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl CandidateFilter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Names of the filters in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence, logging counts around each one.
    pub fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        let mut current = candidates;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current, context)?;
            debug!(
                "Filter {} kept {} of {} candidates",
                filter.name(),
                current.len(),
                before
            );
        }
        Ok(current)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
