//! # Recommendation Engine
//!
//! Ranks unwatched catalog items for one user.
//!
//! Per call:
//! 1. Validate inputs
//! 2. Decide the start mode (cold start vs. personalized)
//! 3. Filter candidates through the mode's FilterPipeline
//! 4. Score (catalog rating, or cosine similarity to the taste vector)
//! 5. Rank by descending score and truncate
//!
//! Any validation failure ends the call; there are no retries.

use crate::cold_start::rank_by_rating;
use crate::context::UserWatchState;
use crate::filter_pipeline::FilterPipeline;
use crate::filters::*;
use catalog::{
    CatalogItem, ItemId, MediaKind, RecommendError, RecommendationConfig, Result, WatchHistory,
};
use features::{ItemEmbedding, cosine_similarity};
use profile::UserProfile;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

/// One ranked recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRecommendation {
    pub item_id: ItemId,
    /// Relevance in [0, 1]
    pub score: f32,
}

/// Which ranking path a call takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Not enough history: rank by catalog rating
    ColdStart,
    /// Rank by similarity to the user's taste vector
    Personalized,
}

impl StartMode {
    /// Cold start whenever there is no profile or it rests on fewer watched
    /// items than the configured minimum.
    pub fn decide(profile: Option<&UserProfile>, config: &RecommendationConfig) -> Self {
        match profile {
            Some(p) if p.watched_item_count >= config.min_watched_items_for_personalization => {
                StartMode::Personalized
            }
            _ => StartMode::ColdStart,
        }
    }
}

/// Generates recommendations against the watch-history collaborator.
pub struct RecommendationEngine<'a, H: WatchHistory + ?Sized> {
    history: &'a H,
    now: i64,
}

impl<'a, H: WatchHistory + ?Sized> RecommendationEngine<'a, H> {
    /// # Arguments
    /// * `history` - Watch-history lookup
    /// * `now` - Unix timestamp (seconds) for abandoned-series checks
    pub fn new(history: &'a H, now: i64) -> Self {
        Self { history, now }
    }

    /// Convenience wrapper around [`StartMode::decide`]
    pub fn start_mode(profile: Option<&UserProfile>, config: &RecommendationConfig) -> StartMode {
        StartMode::decide(profile, config)
    }

    /// Rank unwatched items for `user_id`.
    ///
    /// # Arguments
    /// * `profile` - Taste vector, `None` for users without history
    /// * `embeddings` - Embeddings of the catalog items, keyed by item
    /// * `metadata` - Catalog items in catalog order
    /// * `media_type` - Restrict results to one kind (`None` = any)
    /// * `max_results` - Maximum length of the returned list
    ///
    /// # Returns
    /// Recommendations sorted by descending score. An empty list means
    /// nothing is left to recommend.
    #[instrument(skip(self, profile, embeddings, metadata, config))]
    #[allow(clippy::too_many_arguments)]
    pub fn generate_recommendations(
        &self,
        user_id: &str,
        profile: Option<&UserProfile>,
        embeddings: &HashMap<ItemId, ItemEmbedding>,
        metadata: &[CatalogItem],
        config: &RecommendationConfig,
        media_type: Option<MediaKind>,
        max_results: usize,
    ) -> Result<Vec<ScoredRecommendation>> {
        if embeddings.is_empty() {
            return Err(RecommendError::EmptyCollection { param: "embeddings" });
        }
        if metadata.is_empty() {
            return Err(RecommendError::EmptyCollection { param: "metadata" });
        }
        config.validate()?;

        let state = UserWatchState::load(self.history, user_id, self.now);
        let mode = StartMode::decide(profile, config);
        debug!("Start mode for user {}: {:?}", user_id, mode);

        let recommendations = match (mode, profile) {
            (StartMode::Personalized, Some(profile)) => self.personalized(
                profile,
                embeddings,
                metadata,
                config,
                media_type,
                max_results,
                &state,
            )?,
            _ => {
                let candidates = cold_start_pipeline(config, media_type)
                    .apply(metadata.iter().collect(), &state)?;
                rank_by_rating(candidates, max_results)
            }
        };

        info!(
            "Generated {} {:?} recommendations for user {}",
            recommendations.len(),
            mode,
            user_id
        );
        Ok(recommendations)
    }

    #[allow(clippy::too_many_arguments)]
    fn personalized(
        &self,
        profile: &UserProfile,
        embeddings: &HashMap<ItemId, ItemEmbedding>,
        metadata: &[CatalogItem],
        config: &RecommendationConfig,
        media_type: Option<MediaKind>,
        max_results: usize,
        state: &UserWatchState,
    ) -> Result<Vec<ScoredRecommendation>> {
        let candidates = personalized_pipeline(config, media_type)
            .apply(metadata.iter().collect(), state)?;

        let preferred_rating = if config.rating_proximity_weight > 0.0 {
            state.mean_watched_rating(metadata)
        } else {
            None
        };

        let mut scored: Vec<ScoredRecommendation> = candidates
            .par_iter()
            .filter_map(|item| embeddings.get(&item.id).map(|embedding| (item, embedding)))
            .map(|(item, embedding)| {
                let similarity = cosine_similarity(&profile.taste_vector, &embedding.vector)
                    .map_err(|_| {
                        RecommendError::invalid(
                            "profile",
                            format!(
                                "taste vector has {} dimensions, embedding of {} has {}",
                                profile.taste_vector.len(),
                                item.id,
                                embedding.dimension()
                            ),
                        )
                    })?
                    .clamp(0.0, 1.0);
                Ok(ScoredRecommendation {
                    item_id: item.id.clone(),
                    score: blend_rating_proximity(
                        similarity,
                        config.rating_proximity_weight,
                        item.community_rating,
                        preferred_rating,
                    ),
                })
            })
            .collect::<Result<_>>()?;

        if scored.len() < candidates.len() {
            debug!(
                "{} candidates had no embedding and were skipped",
                candidates.len() - scored.len()
            );
        }

        // Stable sort: equal scores keep catalog order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(max_results);
        Ok(scored)
    }
}

/// Media type -> already watched -> abandoned series (optional)
fn cold_start_pipeline(
    config: &RecommendationConfig,
    media_type: Option<MediaKind>,
) -> FilterPipeline {
    let pipeline = FilterPipeline::new()
        .add_filter(MediaTypeFilter::new(media_type))
        .add_filter(AlreadyWatchedFilter);
    with_abandoned_series(pipeline, config)
}

/// Media type -> sparse metadata -> already watched -> in progress ->
/// started series -> abandoned series (optional)
fn personalized_pipeline(
    config: &RecommendationConfig,
    media_type: Option<MediaKind>,
) -> FilterPipeline {
    let pipeline = FilterPipeline::new()
        .add_filter(MediaTypeFilter::new(media_type))
        .add_filter(SparseMetadataFilter)
        .add_filter(AlreadyWatchedFilter)
        .add_filter(InProgressFilter)
        .add_filter(StartedSeriesFilter);
    with_abandoned_series(pipeline, config)
}

fn with_abandoned_series(
    pipeline: FilterPipeline,
    config: &RecommendationConfig,
) -> FilterPipeline {
    if config.exclude_abandoned_series {
        pipeline.add_filter(AbandonedSeriesFilter::new(config.abandoned_series_threshold_days))
    } else {
        pipeline
    }
}

/// `(1 - w) * similarity + w * proximity`, where proximity is how close the
/// candidate's community rating is to the user's mean. Unknown ratings leave
/// the similarity unchanged.
fn blend_rating_proximity(
    similarity: f32,
    weight: f32,
    candidate_rating: Option<f32>,
    preferred_rating: Option<f32>,
) -> f32 {
    match (candidate_rating, preferred_rating) {
        (Some(candidate), Some(preferred)) if weight > 0.0 && candidate.is_finite() => {
            let proximity = 1.0 - ((candidate - preferred) / 10.0).abs();
            let blended = (1.0 - weight) * similarity + weight * proximity.clamp(0.0, 1.0);
            blended.clamp(0.0, 1.0)
        }
        _ => similarity,
    }
}
