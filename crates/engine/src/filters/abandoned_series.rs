//! Optional filter for series the user gave up on.
//!
//! A series counts as abandoned when some episodes were watched, it is not
//! finished, and nothing was played for longer than the threshold.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};

/// Removes abandoned series.
pub struct AbandonedSeriesFilter {
    threshold_days: u32,
}

impl AbandonedSeriesFilter {
    /// # Arguments
    /// * `threshold_days` - Days without activity after which a started series is abandoned
    pub fn new(threshold_days: u32) -> Self {
        Self { threshold_days }
    }
}

impl CandidateFilter for AbandonedSeriesFilter {
    fn name(&self) -> &str {
        "AbandonedSeriesFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| !context.is_abandoned_series(item, self.threshold_days))
            .collect())
    }
}
