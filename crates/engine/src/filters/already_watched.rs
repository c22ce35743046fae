//! Filter to remove items the user has already watched.
//!
//! Used by both the cold-start and the personalized path; there's no point
//! in recommending something the user has finished.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};

/// Removes candidates the user has fully watched.
///
/// Movies use the played flag; series use episode-level watch data.
pub struct AlreadyWatchedFilter;

impl CandidateFilter for AlreadyWatchedFilter {
    fn name(&self) -> &str {
        "AlreadyWatchedFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| !context.is_fully_watched(item))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{MediaKind, WatchRecord};

    #[test]
    fn test_already_watched_filter() {
        let mut context = UserWatchState::new("alice", 0);
        context.records.insert("100".into(), WatchRecord::played(0));
        context.records.insert("200".into(), WatchRecord::episodes(5, 5, Some(0)));
        context.records.insert("300".into(), WatchRecord::episodes(2, 5, Some(0)));

        let items = vec![
            CatalogItem::new("100", "Seen", MediaKind::Movie),
            CatalogItem::new("101", "Unseen", MediaKind::Movie),
            CatalogItem::new("200", "Finished Show", MediaKind::Series),
            CatalogItem::new("300", "Ongoing Show", MediaKind::Series),
        ];

        let filtered = AlreadyWatchedFilter
            .apply(items.iter().collect(), &context)
            .unwrap();

        let ids: Vec<_> = filtered.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["101", "300"]);
    }
}
