//! Loading catalog snapshots exported by the host media server.
//!
//! Format (JSON):
//! ```text
//! {
//!   "items": [ { "id": "..", "name": "..", "kind": "movie", "genres": [..], ... } ],
//!   "users": [ { "id": "..", "history": [ { "item_id": "..", "played": true, ... } ] } ]
//! }
//! ```

use crate::error::{RecommendError, Result};
use crate::index::CatalogIndex;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// On-disk snapshot layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub users: Vec<UserSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSnapshot {
    pub id: UserId,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub item_id: ItemId,
    #[serde(flatten)]
    pub record: WatchRecord,
}

impl CatalogIndex {
    /// Load a snapshot file from disk
    pub fn load_from_file(path: &Path) -> Result<Self> {
        info!("Loading catalog snapshot from {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let snapshot: CatalogSnapshot =
            serde_json::from_str(&content).map_err(|source| RecommendError::SnapshotParse {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_snapshot(snapshot)
    }

    /// Parse a snapshot from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let snapshot: CatalogSnapshot =
            serde_json::from_str(json).map_err(|source| RecommendError::SnapshotParse {
                path: "<inline>".to_string(),
                source,
            })?;
        Self::from_snapshot(snapshot)
    }

    /// Build the index from a decoded snapshot
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Result<Self> {
        let mut index = CatalogIndex::new();

        for item in snapshot.items {
            index.insert_item(item)?;
        }

        let mut dangling = 0usize;
        for user in snapshot.users {
            index.insert_user(user.id.clone());
            for entry in user.history {
                if index.get_item(&entry.item_id).is_none() {
                    dangling += 1;
                }
                index.insert_watch_record(user.id.clone(), entry.item_id, entry.record);
            }
        }
        if dangling > 0 {
            // Records for items outside the snapshot are kept; the core ignores them.
            warn!("{} watch records reference items missing from the catalog", dangling);
        }

        let (items, users, records) = index.counts();
        info!("Loaded {} items, {} users, {} watch records", items, users, records);
        Ok(index)
    }
}
