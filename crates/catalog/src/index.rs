//! In-memory catalog and watch-history store.
//!
//! `CatalogIndex` keeps items in catalog order (the order embeddings and
//! cold-start ties follow) with a HashMap position index for O(1) lookups,
//! and per-user watch records keyed by item.

use crate::error::{RecommendError, Result};
use crate::types::*;
use std::collections::{BTreeMap, HashMap};

/// A catalog snapshot plus the watch history of every known user.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    pub(crate) items: Vec<CatalogItem>,
    pub(crate) positions: HashMap<ItemId, usize>,

    /// Watch records per user. BTreeMap keeps user iteration deterministic.
    pub(crate) history: BTreeMap<UserId, HashMap<ItemId, WatchRecord>>,
}

impl CatalogIndex {
    /// Creates a new, empty CatalogIndex
    pub fn new() -> Self {
        Self::default()
    }

    /// All items in catalog order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// Get an item by ID
    pub fn get_item(&self, id: &str) -> Option<&CatalogItem> {
        self.positions.get(id).map(|&pos| &self.items[pos])
    }

    /// Users that have a history entry (possibly empty)
    pub fn user_ids(&self) -> impl Iterator<Item = &UserId> {
        self.history.keys()
    }

    pub fn contains_user(&self, user_id: &str) -> bool {
        self.history.contains_key(user_id)
    }

    /// Insert an item, rejecting empty names and duplicate IDs
    pub fn insert_item(&mut self, item: CatalogItem) -> Result<()> {
        if item.id.trim().is_empty() {
            return Err(RecommendError::invalid("item.id", "item identifier is empty"));
        }
        if item.name.trim().is_empty() {
            return Err(RecommendError::invalid(
                "item.name",
                format!("item {} has an empty display name", item.id),
            ));
        }
        if self.positions.contains_key(&item.id) {
            return Err(RecommendError::invalid(
                "item.id",
                format!("duplicate item identifier {}", item.id),
            ));
        }
        self.positions.insert(item.id.clone(), self.items.len());
        self.items.push(item);
        Ok(())
    }

    /// Register a user without any history
    pub fn insert_user(&mut self, user_id: impl Into<UserId>) {
        self.history.entry(user_id.into()).or_default();
    }

    /// Insert or replace the watch record of a (user, item) pair
    pub fn insert_watch_record(
        &mut self,
        user_id: impl Into<UserId>,
        item_id: impl Into<ItemId>,
        record: WatchRecord,
    ) {
        self.history
            .entry(user_id.into())
            .or_default()
            .insert(item_id.into(), record);
    }

    /// Get counts for debugging/validation: (items, users, watch records)
    pub fn counts(&self) -> (usize, usize, usize) {
        let records = self.history.values().map(|h| h.len()).sum();
        (self.items.len(), self.history.len(), records)
    }
}

impl WatchHistory for CatalogIndex {
    fn watch_records(&self, user_id: &str) -> Vec<(ItemId, WatchRecord)> {
        self.history
            .get(user_id)
            .map(|records| {
                records
                    .iter()
                    .map(|(item_id, record)| (item_id.clone(), record.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn watch_record(&self, user_id: &str, item_id: &str) -> Option<WatchRecord> {
        self.history.get(user_id)?.get(item_id).cloned()
    }
}
