//! # Recommendation Orchestrator
//!
//! Runs a recommendation cycle over a catalog snapshot:
//! 1. Build the feature vocabulary
//! 2. Embed every catalog item
//! 3. Build each user's taste profile
//! 4. Rank movies and series separately through the engine
//! 5. Attach display metadata
//!
//! Nothing is cached between cycles; every cycle starts from the snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use catalog::{CatalogIndex, ItemId, MediaKind, RecommendationConfig, UserId};
use engine::{RecommendationEngine, ScoredRecommendation, StartMode};
use features::{EmbeddingService, FeatureVocabulary, ItemEmbedding, VocabularyBuilder};
use profile::{UserProfile, UserProfileService};

/// A recommendation ready for display
#[derive(Debug, Clone)]
pub struct ItemRecommendation {
    pub item_id: ItemId,
    pub name: String,
    pub kind: MediaKind,
    pub year: Option<i32>,
    pub genres: Vec<String>,
    pub score: f32,
    pub explanation: String,
}

/// Everything one user gets out of a cycle
#[derive(Debug, Clone)]
pub struct UserRecommendations {
    pub user_id: UserId,
    pub mode: StartMode,
    pub movies: Vec<ItemRecommendation>,
    pub series: Vec<ItemRecommendation>,
}

/// Vocabulary and embeddings of one catalog snapshot
#[derive(Debug, Clone)]
pub struct CatalogModel {
    pub vocabulary: FeatureVocabulary,
    pub embeddings: HashMap<ItemId, ItemEmbedding>,
}

/// Coordinates features, profiles and the engine for a whole catalog
#[derive(Clone)]
pub struct RecommendationOrchestrator {
    catalog: Arc<CatalogIndex>,
    config: Arc<RecommendationConfig>,
}

impl RecommendationOrchestrator {
    /// Create an orchestrator over a loaded catalog
    ///
    /// # Arguments
    /// * `catalog` - Shared catalog and watch history
    /// * `config` - Tuning knobs; rejected up front when invalid
    pub fn new(catalog: Arc<CatalogIndex>, config: RecommendationConfig) -> Result<Self> {
        config.validate().context("Invalid recommendation config")?;
        Ok(Self {
            catalog,
            config: Arc::new(config),
        })
    }

    pub fn catalog(&self) -> &CatalogIndex {
        &self.catalog
    }

    pub fn config(&self) -> &RecommendationConfig {
        &self.config
    }

    /// Build the vocabulary and embeddings of the current snapshot
    #[instrument(skip(self))]
    pub fn build_model(&self) -> Result<CatalogModel> {
        let start = Instant::now();
        let items = self.catalog.items();

        let vocabulary = VocabularyBuilder::from_config(&self.config).build(items);
        let embeddings = EmbeddingService::from_config(&self.config)
            .compute_embeddings(items, &vocabulary)
            .context("Failed to compute item embeddings")?;

        info!(
            "Built model for {} items ({} features) in {:.2?}",
            embeddings.len(),
            vocabulary.feature_count(),
            start.elapsed()
        );
        Ok(CatalogModel {
            vocabulary,
            embeddings,
        })
    }

    /// Taste profile of one user, `None` when there is no qualifying history
    pub fn profile_for_user(
        &self,
        model: &CatalogModel,
        user_id: &str,
        now: i64,
    ) -> Result<Option<UserProfile>> {
        UserProfileService::new(&*self.catalog, now)
            .build_user_profile(user_id, &model.embeddings, &self.config)
            .with_context(|| format!("Failed to build profile for user {user_id}"))
    }

    /// Build a fresh model and recommend for a single user
    pub fn recommend_for_user(&self, user_id: &str, now: i64) -> Result<UserRecommendations> {
        let model = self.build_model()?;
        self.recommend_with_model(&model, user_id, now)
    }

    /// Recommend for one user against an already built model
    pub fn recommend_with_model(
        &self,
        model: &CatalogModel,
        user_id: &str,
        now: i64,
    ) -> Result<UserRecommendations> {
        let profile = self.profile_for_user(model, user_id, now)?;
        let mode = StartMode::decide(profile.as_ref(), &self.config);

        let movies = self.rank(
            model,
            user_id,
            profile.as_ref(),
            now,
            MediaKind::Movie,
            self.config.movie_recommendation_count,
        )?;
        let series = self.rank(
            model,
            user_id,
            profile.as_ref(),
            now,
            MediaKind::Series,
            self.config.tv_recommendation_count,
        )?;

        debug!(
            "User {}: {} movies, {} series ({:?})",
            user_id,
            movies.len(),
            series.len(),
            mode
        );
        Ok(UserRecommendations {
            user_id: user_id.to_string(),
            mode,
            movies: self.enrich(movies, mode),
            series: self.enrich(series, mode),
        })
    }

    /// Recommend for every known user.
    ///
    /// The CPU-bound work runs on the blocking pool, with users spread over
    /// rayon's threads. Results come back in user id order.
    #[instrument(skip(self))]
    pub async fn run_cycle(&self, now: i64) -> Result<Vec<UserRecommendations>> {
        let start = Instant::now();
        let orchestrator = self.clone();

        let results = tokio::task::spawn_blocking(move || -> Result<Vec<UserRecommendations>> {
            let model = orchestrator.build_model()?;
            let users: Vec<&UserId> = orchestrator.catalog.user_ids().collect();
            users
                .par_iter()
                .map(|user_id| orchestrator.recommend_with_model(&model, user_id, now))
                .collect()
        })
        .await
        .context("Recommendation cycle task panicked")??;

        info!(
            "Recommendation cycle finished for {} users in {:.2?}",
            results.len(),
            start.elapsed()
        );
        Ok(results)
    }

    fn rank(
        &self,
        model: &CatalogModel,
        user_id: &str,
        profile: Option<&UserProfile>,
        now: i64,
        kind: MediaKind,
        limit: usize,
    ) -> Result<Vec<ScoredRecommendation>> {
        RecommendationEngine::new(&*self.catalog, now)
            .generate_recommendations(
                user_id,
                profile,
                &model.embeddings,
                self.catalog.items(),
                &self.config,
                Some(kind),
                limit,
            )
            .with_context(|| format!("Failed to rank {kind} recommendations for user {user_id}"))
    }

    /// Attach catalog metadata; ids missing from the catalog are dropped
    fn enrich(
        &self,
        scored: Vec<ScoredRecommendation>,
        mode: StartMode,
    ) -> Vec<ItemRecommendation> {
        scored
            .into_iter()
            .filter_map(|rec| {
                let item = self.catalog.get_item(&rec.item_id)?;
                let explanation = match mode {
                    StartMode::ColdStart => match item.community_rating {
                        Some(rating) => format!("Popular pick: community rating {rating:.1}"),
                        None => "Popular pick: unrated".to_string(),
                    },
                    StartMode::Personalized => {
                        format!("Matches your taste: similarity {:.2}", rec.score)
                    }
                };
                Some(ItemRecommendation {
                    item_id: rec.item_id,
                    name: item.name.clone(),
                    kind: item.kind,
                    year: item.year,
                    genres: item.genres.clone(),
                    score: rec.score,
                    explanation,
                })
            })
            .collect()
    }
}

/// Seconds since the unix epoch
pub fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CatalogItem, WatchRecord};

    const DAY: i64 = 86_400;
    const NOW: i64 = 19_000 * DAY;

    // ============================================================================
    // Test Fixtures
    // ============================================================================

    fn build_test_catalog() -> Arc<CatalogIndex> {
        let mut index = CatalogIndex::new();
        let items = vec![
            CatalogItem::new("heat", "Heat", MediaKind::Movie)
                .with_genres(&["Crime", "Thriller"])
                .with_directors(&["Michael Mann"])
                .with_year(1995)
                .with_ratings(Some(8.3), Some(86.0)),
            CatalogItem::new("collateral", "Collateral", MediaKind::Movie)
                .with_genres(&["Crime", "Thriller"])
                .with_directors(&["Michael Mann"])
                .with_year(2004)
                .with_ratings(Some(7.5), Some(86.0)),
            CatalogItem::new("thief", "Thief", MediaKind::Movie)
                .with_genres(&["Crime", "Drama"])
                .with_directors(&["Michael Mann"])
                .with_year(1981)
                .with_ratings(Some(7.3), Some(88.0)),
            CatalogItem::new("up", "Up", MediaKind::Movie)
                .with_genres(&["Animation", "Family"])
                .with_year(2009)
                .with_ratings(Some(8.3), Some(98.0)),
            CatalogItem::new("cars", "Cars", MediaKind::Movie)
                .with_genres(&["Animation", "Family"])
                .with_year(2006)
                .with_ratings(Some(7.2), Some(74.0)),
            CatalogItem::new("wire", "The Wire", MediaKind::Series)
                .with_genres(&["Crime", "Drama"])
                .with_year(2002)
                .with_ratings(Some(9.3), None),
            CatalogItem::new("bluey", "Bluey", MediaKind::Series)
                .with_genres(&["Animation", "Family"])
                .with_year(2018)
                .with_ratings(Some(9.4), None),
        ];
        for item in items {
            index.insert_item(item).unwrap();
        }

        index.insert_user("guest");
        for id in ["heat", "collateral", "thief"] {
            index.insert_watch_record("crime_fan", id, WatchRecord::played(NOW - 5 * DAY));
        }
        Arc::new(index)
    }

    fn build_test_orchestrator() -> RecommendationOrchestrator {
        let config = RecommendationConfig::default().with_recommendation_counts(2, 5);
        RecommendationOrchestrator::new(build_test_catalog(), config).unwrap()
    }

    fn ids(recs: &[ItemRecommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.item_id.as_str()).collect()
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[test]
    fn test_rejects_invalid_config() {
        let config = RecommendationConfig::default().with_rewatch_boost(1.0);
        let err = RecommendationOrchestrator::new(build_test_catalog(), config)
            .err()
            .unwrap();
        assert!(format!("{err:#}").contains("rewatch_boost"));
    }

    #[test]
    fn test_cold_start_user() {
        let orchestrator = build_test_orchestrator();
        let recs = orchestrator.recommend_for_user("guest", NOW).unwrap();

        assert_eq!(recs.mode, StartMode::ColdStart);
        // Movie count is capped at 2; equal ratings fall back to critic rating
        assert_eq!(ids(&recs.movies), vec!["up", "heat"]);
        assert_eq!(ids(&recs.series), vec!["bluey", "wire"]);
        assert!(recs.movies[0].explanation.contains("8.3"));
        assert_eq!(recs.movies[0].name, "Up");
    }

    #[test]
    fn test_personalized_user() {
        let orchestrator = build_test_orchestrator();
        let recs = orchestrator.recommend_for_user("crime_fan", NOW).unwrap();

        assert_eq!(recs.mode, StartMode::Personalized);
        assert_eq!(ids(&recs.movies), vec!["up", "cars"]);
        assert_eq!(recs.series[0].item_id, "wire");
        assert!(recs.series[0].score > recs.series[1].score);
        assert!(recs.series[0].explanation.starts_with("Matches your taste"));
    }

    #[test]
    fn test_profile_for_user() {
        let orchestrator = build_test_orchestrator();
        let model = orchestrator.build_model().unwrap();

        assert!(orchestrator.profile_for_user(&model, "guest", NOW).unwrap().is_none());
        let profile = orchestrator
            .profile_for_user(&model, "crime_fan", NOW)
            .unwrap()
            .unwrap();
        assert_eq!(profile.watched_item_count, 3);
        assert_eq!(profile.taste_vector.len(), model.embeddings["heat"].dimension());
    }

    #[tokio::test]
    async fn test_run_cycle_covers_every_user() {
        let orchestrator = build_test_orchestrator();
        let results = orchestrator.run_cycle(NOW).await.unwrap();

        let users: Vec<&str> = results.iter().map(|r| r.user_id.as_str()).collect();
        assert_eq!(users, vec!["crime_fan", "guest"]);
        assert_eq!(results[0].mode, StartMode::Personalized);
        assert_eq!(results[1].mode, StartMode::ColdStart);
        assert!(results.iter().all(|r| r.movies.len() <= 2));
    }

    #[tokio::test]
    async fn test_run_cycle_matches_single_user_path() {
        let orchestrator = build_test_orchestrator();
        let cycle = orchestrator.run_cycle(NOW).await.unwrap();
        let single = orchestrator.recommend_for_user("crime_fan", NOW).unwrap();

        assert_eq!(ids(&cycle[0].movies), ids(&single.movies));
        assert_eq!(ids(&cycle[0].series), ids(&single.series));
    }

    #[tokio::test]
    async fn test_run_cycle_on_empty_catalog_fails_with_context() {
        let orchestrator = RecommendationOrchestrator::new(
            Arc::new({
                let mut index = CatalogIndex::new();
                index.insert_user("lonely");
                index
            }),
            RecommendationConfig::default(),
        )
        .unwrap();

        let err = orchestrator.run_cycle(NOW).await.unwrap_err();
        assert!(format!("{err:#}").contains("embeddings"));
    }
}
