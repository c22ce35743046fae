//! Filter to remove series the user has already started.
//!
//! The series-level played flag is unreliable, so "started" is derived from
//! episode-level watch data.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};

/// Removes series with at least one watched episode.
pub struct StartedSeriesFilter;

impl CandidateFilter for StartedSeriesFilter {
    fn name(&self) -> &str {
        "StartedSeriesFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| !context.has_started_series(item))
            .collect())
    }
}
