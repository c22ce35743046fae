//! Core domain types for the media catalog and watch history.
//!
//! Everything in here is a plain data record. Items are immutable for the
//! lifetime of a catalog snapshot; watch records are read-only views supplied
//! by the host media server.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// =============================================================================
// Type Aliases
// =============================================================================

/// Opaque unique identifier of a catalog item
pub type ItemId = String;

/// Opaque unique identifier of a user
pub type UserId = String;

/// Label used for the decade bucket of items without a release year
pub const UNKNOWN_DECADE: &str = "Unknown";

const SECONDS_PER_DAY: f32 = 86_400.0;

// =============================================================================
// Catalog Items
// =============================================================================

/// The kind of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Series,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Movie => write!(f, "movie"),
            MediaKind::Series => write!(f, "series"),
        }
    }
}

/// The categorical feature classes that make up the vocabulary.
///
/// The order of [`FeatureClass::ALL`] is the block order of every embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureClass {
    Genre,
    Actor,
    Director,
    Tag,
    Decade,
}

impl FeatureClass {
    pub const ALL: [FeatureClass; 5] = [
        FeatureClass::Genre,
        FeatureClass::Actor,
        FeatureClass::Director,
        FeatureClass::Tag,
        FeatureClass::Decade,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FeatureClass::Genre => "genre",
            FeatureClass::Actor => "actor",
            FeatureClass::Director => "director",
            FeatureClass::Tag => "tag",
            FeatureClass::Decade => "decade",
        }
    }
}

/// A movie or series from the media library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    /// Display name, must not be empty
    pub name: String,
    pub kind: MediaKind,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
    #[serde(default)]
    pub directors: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Community rating on a 0-10 scale
    #[serde(default)]
    pub community_rating: Option<f32>,
    /// Critic rating on a 0-100 scale
    #[serde(default)]
    pub critic_rating: Option<f32>,
    #[serde(default)]
    pub year: Option<i32>,
}

impl CatalogItem {
    /// Create an item with no features and no ratings.
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, kind: MediaKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            genres: Vec::new(),
            actors: Vec::new(),
            directors: Vec::new(),
            tags: Vec::new(),
            community_rating: None,
            critic_rating: None,
            year: None,
        }
    }

    pub fn with_genres(mut self, genres: &[&str]) -> Self {
        self.genres = genres.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn with_actors(mut self, actors: &[&str]) -> Self {
        self.actors = actors.iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn with_directors(mut self, directors: &[&str]) -> Self {
        self.directors = directors.iter().map(|d| d.to_string()).collect();
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_ratings(mut self, community: Option<f32>, critic: Option<f32>) -> Self {
        self.community_rating = community;
        self.critic_rating = critic;
        self
    }

    /// Decade bucket, e.g. `"1990s"`, or [`UNKNOWN_DECADE`] without a year.
    pub fn decade(&self) -> String {
        match self.year {
            Some(year) => format!("{}s", year.div_euclid(10) * 10),
            None => UNKNOWN_DECADE.to_string(),
        }
    }

    /// Raw feature strings of one class, as supplied by the catalog.
    pub fn raw_features(&self, class: FeatureClass) -> Vec<&str> {
        match class {
            FeatureClass::Genre => self.genres.iter().map(String::as_str).collect(),
            FeatureClass::Actor => self.actors.iter().map(String::as_str).collect(),
            FeatureClass::Director => self.directors.iter().map(String::as_str).collect(),
            FeatureClass::Tag => self.tags.iter().map(String::as_str).collect(),
            FeatureClass::Decade => Vec::new(),
        }
    }

    /// Distinct normalized feature keys of one class.
    ///
    /// Blank values are dropped and duplicates collapse case-insensitively.
    pub fn feature_keys(&self, class: FeatureClass) -> HashSet<String> {
        if class == FeatureClass::Decade {
            return std::iter::once(normalize_feature(&self.decade())).collect();
        }
        self.raw_features(class)
            .into_iter()
            .map(normalize_feature)
            .filter(|key| !key.is_empty())
            .collect()
    }

    /// Items with neither genres nor actors are too sparse to score.
    pub fn has_descriptive_metadata(&self) -> bool {
        let has_any = |values: &[String]| values.iter().any(|v| !v.trim().is_empty());
        has_any(&self.genres) || has_any(&self.actors)
    }
}

/// Normalize a feature value into its case-insensitive vocabulary key.
pub fn normalize_feature(value: &str) -> String {
    value.trim().to_lowercase()
}

// =============================================================================
// Watch History
// =============================================================================

/// Per (user, item) watch state as reported by the host media server.
///
/// For series the `played` flag is not trusted; watch status comes from the
/// episode aggregates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchRecord {
    #[serde(default)]
    pub played: bool,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub play_count: u32,
    /// Unix timestamp (seconds) of the last playback
    #[serde(default)]
    pub last_played: Option<i64>,
    #[serde(default)]
    pub playback_position_ticks: i64,
    #[serde(default)]
    pub watched_episodes: u32,
    /// Known episode count, 0 when unknown
    #[serde(default)]
    pub total_episodes: u32,
}

impl WatchRecord {
    /// A fully played movie, played once.
    pub fn played(last_played: i64) -> Self {
        Self {
            played: true,
            play_count: 1,
            last_played: Some(last_played),
            ..Default::default()
        }
    }

    /// A series with `watched` of `total` episodes seen.
    pub fn episodes(watched: u32, total: u32, last_played: Option<i64>) -> Self {
        Self {
            play_count: watched.min(1),
            last_played,
            watched_episodes: watched,
            total_episodes: total,
            ..Default::default()
        }
    }

    pub fn with_favorite(mut self, is_favorite: bool) -> Self {
        self.is_favorite = is_favorite;
        self
    }

    pub fn with_play_count(mut self, play_count: u32) -> Self {
        self.play_count = play_count;
        self
    }

    pub fn with_position(mut self, ticks: i64) -> Self {
        self.playback_position_ticks = ticks;
        self
    }

    /// Whether the user has completely watched the item.
    pub fn is_fully_watched(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Movie => self.played,
            MediaKind::Series => {
                self.watched_episodes > 0
                    && (self.total_episodes == 0 || self.watched_episodes >= self.total_episodes)
            }
        }
    }

    /// Playback was started but not finished. Any non-zero position counts.
    pub fn is_in_progress(&self) -> bool {
        self.playback_position_ticks != 0
    }

    pub fn has_watched_episodes(&self) -> bool {
        self.watched_episodes > 0
    }

    /// Days between the last playback and `now`, never negative.
    pub fn days_since_last_played(&self, now: i64) -> Option<f32> {
        self.last_played
            .map(|ts| (now.saturating_sub(ts) as f32 / SECONDS_PER_DAY).max(0.0))
    }

    /// A started but unfinished series without activity for longer than
    /// `threshold_days`. Unknown last activity counts as stale.
    pub fn is_abandoned_series(&self, kind: MediaKind, now: i64, threshold_days: u32) -> bool {
        if kind != MediaKind::Series
            || !self.has_watched_episodes()
            || self.is_fully_watched(kind)
        {
            return false;
        }
        match self.days_since_last_played(now) {
            Some(days) => days > threshold_days as f32,
            None => true,
        }
    }
}

/// Read access to per-user watch history.
///
/// This is the seam to the host media server. Unknown users have an empty
/// history rather than an error.
pub trait WatchHistory: Send + Sync {
    /// All watch records of a user.
    fn watch_records(&self, user_id: &str) -> Vec<(ItemId, WatchRecord)>;

    /// The watch record of one (user, item) pair, if any.
    fn watch_record(&self, user_id: &str, item_id: &str) -> Option<WatchRecord>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decade_bucket() {
        let item = CatalogItem::new("1", "Heat", MediaKind::Movie).with_year(1995);
        assert_eq!(item.decade(), "1990s");

        let item = CatalogItem::new("2", "Metropolis", MediaKind::Movie).with_year(1927);
        assert_eq!(item.decade(), "1920s");

        let item = CatalogItem::new("3", "Untitled", MediaKind::Movie);
        assert_eq!(item.decade(), UNKNOWN_DECADE);
    }

    #[test]
    fn test_feature_keys_dedupe_case_insensitive() {
        let item = CatalogItem::new("1", "Heat", MediaKind::Movie)
            .with_genres(&["Crime", "crime", " CRIME ", "", "   ", "Drama"]);

        let keys = item.feature_keys(FeatureClass::Genre);
        assert_eq!(keys.len(), 2);
        assert!(keys.contains("crime"));
        assert!(keys.contains("drama"));
    }

    #[test]
    fn test_descriptive_metadata() {
        let bare = CatalogItem::new("1", "Bare", MediaKind::Movie).with_tags(&["tag"]);
        assert!(!bare.has_descriptive_metadata());

        let blank = CatalogItem::new("2", "Blank", MediaKind::Movie).with_genres(&[" "]);
        assert!(!blank.has_descriptive_metadata());

        let actors_only =
            CatalogItem::new("3", "Cast", MediaKind::Movie).with_actors(&["Al Pacino"]);
        assert!(actors_only.has_descriptive_metadata());
    }

    #[test]
    fn test_series_watch_status_ignores_played_flag() {
        let mut record = WatchRecord::episodes(3, 10, Some(0));
        record.played = true;

        assert!(!record.is_fully_watched(MediaKind::Series));
        assert!(record.is_fully_watched(MediaKind::Movie));

        let finished = WatchRecord::episodes(10, 10, Some(0));
        assert!(finished.is_fully_watched(MediaKind::Series));

        let unknown_total = WatchRecord::episodes(2, 0, Some(0));
        assert!(unknown_total.is_fully_watched(MediaKind::Series));
    }

    #[test]
    fn test_days_since_last_played_clamps_future_dates() {
        let record = WatchRecord::played(1_000_000);
        assert_eq!(record.days_since_last_played(1_000_000 - 86_400), Some(0.0));
        assert_eq!(record.days_since_last_played(1_000_000 + 86_400 * 2), Some(2.0));
        assert_eq!(WatchRecord::default().days_since_last_played(0), None);
    }

    #[test]
    fn test_days_since_last_played_extreme_timestamps() {
        let ancient = WatchRecord::played(i64::MIN);
        let days = ancient.days_since_last_played(0).unwrap();
        assert!(days.is_finite() && days > 0.0);

        let far_future = WatchRecord::played(i64::MAX);
        assert_eq!(far_future.days_since_last_played(0), Some(0.0));
        assert_eq!(far_future.days_since_last_played(i64::MIN), Some(0.0));

        let stale = WatchRecord::episodes(1, 10, Some(i64::MIN));
        assert!(stale.is_abandoned_series(MediaKind::Series, 0, 90));
        let future = WatchRecord::episodes(1, 10, Some(i64::MAX));
        assert!(!future.is_abandoned_series(MediaKind::Series, 0, 90));
    }

    #[test]
    fn test_any_nonzero_position_is_in_progress() {
        assert!(WatchRecord::default().with_position(12_000).is_in_progress());
        assert!(WatchRecord::default().with_position(-5).is_in_progress());
        assert!(!WatchRecord::default().is_in_progress());
    }

    #[test]
    fn test_abandoned_series() {
        let now = 200 * 86_400;

        let stale = WatchRecord::episodes(2, 10, Some(0));
        assert!(stale.is_abandoned_series(MediaKind::Series, now, 90));

        let recent = WatchRecord::episodes(2, 10, Some(now - 86_400));
        assert!(!recent.is_abandoned_series(MediaKind::Series, now, 90));

        let undated = WatchRecord::episodes(2, 10, None);
        assert!(undated.is_abandoned_series(MediaKind::Series, now, 90));

        let finished = WatchRecord::episodes(10, 10, Some(0));
        assert!(!finished.is_abandoned_series(MediaKind::Series, now, 90));

        assert!(!stale.is_abandoned_series(MediaKind::Movie, now, 90));
    }
}
