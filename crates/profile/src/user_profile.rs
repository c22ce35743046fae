//! Taste vectors built from a user's watch history.
//!
//! A taste vector is the weighted mean of the embeddings of every item the
//! user has fully watched, L2-normalized. Each item weighs
//! `combined_weight(days since last play, half life, favorite, boost,
//! play count, rewatch base)`.
//!
//! A user without qualifying history has no profile (`None`), which the
//! engine treats as the cold-start signal.

use catalog::{
    ItemId, RecommendError, RecommendationConfig, Result, UserId, WatchHistory, WatchRecord,
};
use features::{ItemEmbedding, combined_weight};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// A user's aggregated taste, rebuilt on every recommendation cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    /// Unit-length (or zero) vector in embedding space
    pub taste_vector: Vec<f32>,
    /// Number of fully watched items that contributed
    pub watched_item_count: usize,
}

/// Builds [`UserProfile`]s from the watch-history collaborator.
///
/// `now` is a unix timestamp (seconds) used as the reference point for
/// recency decay.
pub struct UserProfileService<'a, H: WatchHistory + ?Sized> {
    history: &'a H,
    now: i64,
}

impl<'a, H: WatchHistory + ?Sized> UserProfileService<'a, H> {
    pub fn new(history: &'a H, now: i64) -> Self {
        Self { history, now }
    }

    /// Build the taste vector of `user_id`.
    ///
    /// Returns `Ok(None)` when the user has no fully watched item among
    /// `embeddings` (including unknown users). Fails on an empty or
    /// inconsistent embedding map, and propagates weighting errors such as a
    /// non-positive half life.
    #[instrument(skip(self, embeddings, config))]
    pub fn build_user_profile(
        &self,
        user_id: &str,
        embeddings: &HashMap<ItemId, ItemEmbedding>,
        config: &RecommendationConfig,
    ) -> Result<Option<UserProfile>> {
        let dimension = embedding_dimension(embeddings)?;

        let mut watched: Vec<(ItemId, WatchRecord, &ItemEmbedding)> = self
            .history
            .watch_records(user_id)
            .into_iter()
            .filter_map(|(item_id, record)| {
                let embedding = embeddings.get(&item_id)?;
                record
                    .is_fully_watched(embedding.kind)
                    .then_some((item_id, record, embedding))
            })
            .collect();

        if watched.is_empty() {
            debug!("No fully watched items for user {}, no profile", user_id);
            return Ok(None);
        }
        // Fixed summation order keeps profiles reproducible
        watched.sort_by(|a, b| a.0.cmp(&b.0));

        let mut accumulated = vec![0f64; dimension];
        let mut total_weight = 0f64;
        for (_, record, embedding) in &watched {
            let weight = self.item_weight(record, config)? as f64;
            total_weight += weight;
            for (acc, value) in accumulated.iter_mut().zip(&embedding.vector) {
                *acc += weight * *value as f64;
            }
        }

        if total_weight > 0.0 && total_weight.is_finite() {
            for acc in accumulated.iter_mut() {
                *acc /= total_weight;
            }
        }
        let taste_vector = normalize_f64(&accumulated);

        debug!(
            "Built profile for user {} from {} watched items (total weight {:.3})",
            user_id,
            watched.len(),
            total_weight
        );
        Ok(Some(UserProfile {
            user_id: user_id.to_string(),
            taste_vector,
            watched_item_count: watched.len(),
        }))
    }

    fn item_weight(&self, record: &WatchRecord, config: &RecommendationConfig) -> Result<f32> {
        // Undated plays count as recent
        let days_since = record.days_since_last_played(self.now).unwrap_or(0.0);
        combined_weight(
            days_since,
            config.recency_decay_half_life_days,
            record.is_favorite,
            config.favorite_boost,
            record.play_count.max(1),
            config.rewatch_boost,
        )
    }
}

/// Common dimension of all embeddings, rejecting empty or mixed maps.
fn embedding_dimension(embeddings: &HashMap<ItemId, ItemEmbedding>) -> Result<usize> {
    let mut dimensions = embeddings.values().map(ItemEmbedding::dimension);
    let dimension = dimensions
        .next()
        .ok_or(RecommendError::EmptyCollection { param: "embeddings" })?;
    if dimensions.any(|d| d != dimension) {
        return Err(RecommendError::invalid(
            "embeddings",
            "embeddings have differing dimensions",
        ));
    }
    Ok(dimension)
}

fn normalize_f64(v: &[f64]) -> Vec<f32> {
    let magnitude = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if magnitude == 0.0 || !magnitude.is_finite() {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| (x / magnitude) as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogIndex, MediaKind};
    use features::{cosine_similarity, magnitude};

    const DAY: i64 = 86_400;
    const NOW: i64 = 1_000 * DAY;
    const EPS: f32 = 1e-3;

    fn embedding(id: &str, kind: MediaKind, vector: Vec<f32>) -> (ItemId, ItemEmbedding) {
        (
            id.to_string(),
            ItemEmbedding {
                item_id: id.to_string(),
                kind,
                vector,
            },
        )
    }

    fn embeddings() -> HashMap<ItemId, ItemEmbedding> {
        [
            embedding("a", MediaKind::Movie, vec![1.0, 0.0, 0.0]),
            embedding("b", MediaKind::Movie, vec![0.0, 1.0, 0.0]),
            embedding("c", MediaKind::Movie, vec![0.0, 0.0, 1.0]),
            embedding("s", MediaKind::Series, vec![0.6, 0.8, 0.0]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_no_history_returns_none() {
        let index = CatalogIndex::new();
        let service = UserProfileService::new(&index, NOW);
        let profile = service
            .build_user_profile("ghost", &embeddings(), &RecommendationConfig::default())
            .unwrap();
        assert!(profile.is_none());
    }

    #[test]
    fn test_partial_items_are_excluded() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record(
            "alice",
            "a",
            WatchRecord::default().with_position(5_000).with_favorite(true),
        );
        index.insert_watch_record("alice", "s", WatchRecord::episodes(2, 10, Some(NOW)));

        let service = UserProfileService::new(&index, NOW);
        let profile = service
            .build_user_profile("alice", &embeddings(), &RecommendationConfig::default())
            .unwrap();
        assert!(profile.is_none());
    }

    #[test]
    fn test_items_outside_embeddings_are_ignored() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record("alice", "gone", WatchRecord::played(NOW));
        index.insert_watch_record("alice", "a", WatchRecord::played(NOW));

        let service = UserProfileService::new(&index, NOW);
        let profile = service
            .build_user_profile("alice", &embeddings(), &RecommendationConfig::default())
            .unwrap()
            .unwrap();
        assert_eq!(profile.watched_item_count, 1);
        assert!((profile.taste_vector[0] - 1.0).abs() < EPS);
    }

    #[test]
    fn test_equal_weights_give_mean_direction() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record("alice", "a", WatchRecord::played(NOW));
        index.insert_watch_record("alice", "b", WatchRecord::played(NOW));

        let service = UserProfileService::new(&index, NOW);
        let profile = service
            .build_user_profile("alice", &embeddings(), &RecommendationConfig::default())
            .unwrap()
            .unwrap();

        assert_eq!(profile.user_id, "alice");
        assert_eq!(profile.watched_item_count, 2);
        assert!((magnitude(&profile.taste_vector) - 1.0).abs() < EPS);
        assert!((profile.taste_vector[0] - profile.taste_vector[1]).abs() < EPS);
        assert_eq!(profile.taste_vector[2], 0.0);
    }

    #[test]
    fn test_recency_and_favorites_shift_taste() {
        let mut index = CatalogIndex::new();
        // "a" watched recently, "b" two half-lives ago
        index.insert_watch_record("alice", "a", WatchRecord::played(NOW));
        index.insert_watch_record("alice", "b", WatchRecord::played(NOW - 730 * DAY));
        // "c" is an old favorite rewatched many times
        index.insert_watch_record("bob", "a", WatchRecord::played(NOW));
        index.insert_watch_record(
            "bob",
            "c",
            WatchRecord::played(NOW).with_favorite(true).with_play_count(8),
        );

        let config = RecommendationConfig::default();
        let service = UserProfileService::new(&index, NOW);

        let alice = service.build_user_profile("alice", &embeddings(), &config).unwrap().unwrap();
        assert!(alice.taste_vector[0] > alice.taste_vector[1]);
        // weights 1.0 and 0.25
        assert!((alice.taste_vector[1] / alice.taste_vector[0] - 0.25).abs() < EPS);

        let bob = service.build_user_profile("bob", &embeddings(), &config).unwrap().unwrap();
        // favorite x2, then rewatch x(1 + log2 8) = x4 => weight 8 vs 1
        assert!((bob.taste_vector[2] / bob.taste_vector[0] - 8.0).abs() < 1e-2);
    }

    #[test]
    fn test_finished_series_counts() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record("alice", "s", WatchRecord::episodes(10, 10, Some(NOW)));

        let service = UserProfileService::new(&index, NOW);
        let profile = service
            .build_user_profile("alice", &embeddings(), &RecommendationConfig::default())
            .unwrap()
            .unwrap();
        let map = embeddings();
        let series = &map["s"];
        let similarity = cosine_similarity(&profile.taste_vector, &series.vector).unwrap();
        assert!((similarity - 1.0).abs() < EPS);
    }

    #[test]
    fn test_invalid_half_life_propagates() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record("alice", "a", WatchRecord::played(NOW));

        let config = RecommendationConfig::default().with_half_life_days(0.0);
        let service = UserProfileService::new(&index, NOW);
        let err = service.build_user_profile("alice", &embeddings(), &config).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_empty_embeddings_rejected() {
        let index = CatalogIndex::new();
        let service = UserProfileService::new(&index, NOW);
        let err = service
            .build_user_profile("alice", &HashMap::new(), &RecommendationConfig::default())
            .unwrap_err();
        assert_eq!(err.param(), Some("embeddings"));
    }

    #[test]
    fn test_mixed_dimensions_rejected() {
        let mut map = embeddings();
        map.extend([embedding("x", MediaKind::Movie, vec![1.0])]);

        let index = CatalogIndex::new();
        let service = UserProfileService::new(&index, NOW);
        let err = service
            .build_user_profile("alice", &map, &RecommendationConfig::default())
            .unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_extreme_boost_stays_finite() {
        let mut index = CatalogIndex::new();
        index.insert_watch_record(
            "alice",
            "a",
            WatchRecord::played(NOW).with_favorite(true).with_play_count(u32::MAX),
        );
        index.insert_watch_record("alice", "b", WatchRecord::played(NOW).with_favorite(true));

        let config = RecommendationConfig::default().with_favorite_boost(f32::MAX);
        let service = UserProfileService::new(&index, NOW);
        let profile = service.build_user_profile("alice", &embeddings(), &config).unwrap().unwrap();
        assert!(profile.taste_vector.iter().all(|x| x.is_finite()));
        assert!((magnitude(&profile.taste_vector) - 1.0).abs() < EPS);
    }
}
