//! Per-call snapshot of a user's watch state.
//!
//! The engine queries the watch-history collaborator once per call and hands
//! this context to every filter, so filters answer "watched?", "in
//! progress?" or "abandoned?" with O(1) lookups.

use catalog::{CatalogItem, ItemId, MediaKind, UserId, WatchHistory, WatchRecord};
use std::collections::HashMap;

/// Watch records of one user, keyed by item, plus the reference time.
#[derive(Debug, Clone)]
pub struct UserWatchState {
    pub user_id: UserId,
    pub records: HashMap<ItemId, WatchRecord>,
    /// Unix timestamp (seconds) used for recency checks
    pub now: i64,
}

impl UserWatchState {
    /// A user without any watch data
    pub fn new(user_id: impl Into<UserId>, now: i64) -> Self {
        Self {
            user_id: user_id.into(),
            records: HashMap::new(),
            now,
        }
    }

    /// Fetch the user's records from the collaborator
    pub fn load<H: WatchHistory + ?Sized>(history: &H, user_id: &str, now: i64) -> Self {
        Self {
            user_id: user_id.to_string(),
            records: history.watch_records(user_id).into_iter().collect(),
            now,
        }
    }

    pub fn record(&self, item_id: &str) -> Option<&WatchRecord> {
        self.records.get(item_id)
    }

    /// Items without watch data count as unwatched
    pub fn is_fully_watched(&self, item: &CatalogItem) -> bool {
        self.record(&item.id)
            .is_some_and(|r| r.is_fully_watched(item.kind))
    }

    pub fn is_in_progress(&self, item: &CatalogItem) -> bool {
        self.record(&item.id).is_some_and(WatchRecord::is_in_progress)
    }

    /// Series with at least one watched episode
    pub fn has_started_series(&self, item: &CatalogItem) -> bool {
        item.kind == MediaKind::Series
            && self.record(&item.id).is_some_and(WatchRecord::has_watched_episodes)
    }

    pub fn is_abandoned_series(&self, item: &CatalogItem, threshold_days: u32) -> bool {
        self.record(&item.id)
            .is_some_and(|r| r.is_abandoned_series(item.kind, self.now, threshold_days))
    }

    /// Mean community rating of the fully watched, rated items in `metadata`
    pub fn mean_watched_rating(&self, metadata: &[CatalogItem]) -> Option<f32> {
        let ratings: Vec<f32> = metadata
            .iter()
            .filter(|item| self.is_fully_watched(item))
            .filter_map(|item| item.community_rating)
            .filter(|r| r.is_finite())
            .collect();
        if ratings.is_empty() {
            return None;
        }
        Some(ratings.iter().sum::<f32>() / ratings.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::CatalogIndex;

    #[test]
    fn test_load_from_history() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record("alice", "m1", WatchRecord::played(10));
        index.insert_watch_record("alice", "m2", WatchRecord::default().with_position(99));
        index.insert_watch_record("alice", "s1", WatchRecord::episodes(1, 8, Some(10)));

        let state = UserWatchState::load(&index, "alice", 20);
        let m1 = CatalogItem::new("m1", "One", MediaKind::Movie);
        let m2 = CatalogItem::new("m2", "Two", MediaKind::Movie);
        let m3 = CatalogItem::new("m3", "Three", MediaKind::Movie);
        let s1 = CatalogItem::new("s1", "Show", MediaKind::Series);

        assert!(state.is_fully_watched(&m1));
        assert!(!state.is_fully_watched(&m2));
        assert!(!state.is_fully_watched(&m3));
        assert!(state.is_in_progress(&m2));
        assert!(!state.is_in_progress(&m3));
        assert!(state.has_started_series(&s1));
        assert!(!state.has_started_series(&m1));
        assert!(!state.is_fully_watched(&s1));
    }

    #[test]
    fn test_mean_watched_rating() {
        let mut state = UserWatchState::new("alice", 0);
        state.records.insert("a".into(), WatchRecord::played(0));
        state.records.insert("b".into(), WatchRecord::played(0));
        state.records.insert("c".into(), WatchRecord::played(0));

        let metadata = vec![
            CatalogItem::new("a", "A", MediaKind::Movie).with_ratings(Some(8.0), None),
            CatalogItem::new("b", "B", MediaKind::Movie).with_ratings(Some(6.0), None),
            CatalogItem::new("c", "C", MediaKind::Movie),
            CatalogItem::new("d", "D", MediaKind::Movie).with_ratings(Some(1.0), None),
        ];
        assert_eq!(state.mean_watched_rating(&metadata), Some(7.0));
        assert_eq!(UserWatchState::new("bob", 0).mean_watched_rating(&metadata), None);
    }
}
