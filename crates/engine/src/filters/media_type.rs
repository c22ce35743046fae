//! Filter restricting candidates to one media type.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, MediaKind, Result};

/// Keeps only items of the requested kind; `None` keeps everything.
pub struct MediaTypeFilter {
    kind: Option<MediaKind>,
}

impl MediaTypeFilter {
    pub fn new(kind: Option<MediaKind>) -> Self {
        Self { kind }
    }
}

impl CandidateFilter for MediaTypeFilter {
    fn name(&self) -> &str {
        "MediaTypeFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        _context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        let Some(kind) = self.kind else {
            return Ok(candidates);
        };
        Ok(candidates
            .into_iter()
            .filter(|item| item.kind == kind)
            .collect())
    }
}
