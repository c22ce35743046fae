//! Filter to remove items with a saved playback position.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};

/// Removes candidates the user is partway through, whatever their played
/// flag says. Those belong in "continue watching", not in recommendations.
pub struct InProgressFilter;

impl CandidateFilter for InProgressFilter {
    fn name(&self) -> &str {
        "InProgressFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| !context.is_in_progress(item))
            .collect())
    }
}
