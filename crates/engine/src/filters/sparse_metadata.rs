//! Filter to drop items too sparsely described to score.

use crate::context::UserWatchState;
use crate::traits::CandidateFilter;
use catalog::{CatalogItem, Result};

/// Removes items that have neither genres nor actors.
///
/// Their embeddings are dominated by the rating dimensions, so similarity
/// against a taste vector says little about them.
pub struct SparseMetadataFilter;

impl CandidateFilter for SparseMetadataFilter {
    fn name(&self) -> &str {
        "SparseMetadataFilter"
    }

    fn apply<'a>(
        &self,
        candidates: Vec<&'a CatalogItem>,
        _context: &UserWatchState,
    ) -> Result<Vec<&'a CatalogItem>> {
        Ok(candidates
            .into_iter()
            .filter(|item| item.has_descriptive_metadata())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::MediaKind;

    #[test]
    fn test_sparse_metadata_filter() {
        let items = vec![
            CatalogItem::new("1", "Genres", MediaKind::Movie).with_genres(&["Drama"]),
            CatalogItem::new("2", "Cast", MediaKind::Movie).with_actors(&["Tilda Swinton"]),
            CatalogItem::new("3", "Tagged", MediaKind::Movie)
                .with_tags(&["cult"])
                .with_directors(&["David Lynch"]),
            CatalogItem::new("4", "Nothing", MediaKind::Series),
        ];
        let context = UserWatchState::new("alice", 0);

        let filtered = SparseMetadataFilter
            .apply(items.iter().collect(), &context)
            .unwrap();
        let ids: Vec<_> = filtered.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
