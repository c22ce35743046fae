//! Recommendation settings.
//!
//! Every field has a default so partial JSON files deserialize cleanly.
//! Callers validate a config once before running a recommendation cycle.

use crate::error::{RecommendError, Result};
use serde::{Deserialize, Serialize};

/// How the release year is encoded into item embeddings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YearEncoding {
    /// One IDF-weighted dimension per decade in the vocabulary
    #[default]
    DecadeVocabulary,
    /// A single dimension holding the year scaled into the catalog's year range
    NormalizedYear,
}

/// Tunable parameters of the recommendation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub movie_recommendation_count: usize,
    pub tv_recommendation_count: usize,
    /// Multiplier applied to favorite items
    pub favorite_boost: f32,
    /// Logarithm base of the rewatch boost, must be greater than 1
    pub rewatch_boost: f32,
    pub recency_decay_half_life_days: f32,
    pub min_watched_items_for_personalization: usize,
    pub exclude_abandoned_series: bool,
    pub abandoned_series_threshold_days: u32,
    /// 0 means unlimited
    pub max_vocabulary_actors: usize,
    /// 0 means unlimited
    pub max_vocabulary_directors: usize,
    /// 0 means unlimited
    pub max_vocabulary_tags: usize,
    pub year_encoding: YearEncoding,
    /// Share of the personalized score taken from rating proximity (0 disables)
    pub rating_proximity_weight: f32,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            movie_recommendation_count: 25,
            tv_recommendation_count: 25,
            favorite_boost: 2.0,
            rewatch_boost: 2.0,
            recency_decay_half_life_days: 365.0,
            min_watched_items_for_personalization: 3,
            exclude_abandoned_series: true,
            abandoned_series_threshold_days: 90,
            max_vocabulary_actors: 0,
            max_vocabulary_directors: 0,
            max_vocabulary_tags: 0,
            year_encoding: YearEncoding::DecadeVocabulary,
            rating_proximity_weight: 0.0,
        }
    }
}

impl RecommendationConfig {
    pub fn with_recommendation_counts(mut self, movies: usize, series: usize) -> Self {
        self.movie_recommendation_count = movies;
        self.tv_recommendation_count = series;
        self
    }

    pub fn with_favorite_boost(mut self, boost: f32) -> Self {
        self.favorite_boost = boost;
        self
    }

    pub fn with_rewatch_boost(mut self, base: f32) -> Self {
        self.rewatch_boost = base;
        self
    }

    pub fn with_half_life_days(mut self, days: f32) -> Self {
        self.recency_decay_half_life_days = days;
        self
    }

    pub fn with_min_watched_items(mut self, count: usize) -> Self {
        self.min_watched_items_for_personalization = count;
        self
    }

    pub fn with_abandoned_series(mut self, exclude: bool, threshold_days: u32) -> Self {
        self.exclude_abandoned_series = exclude;
        self.abandoned_series_threshold_days = threshold_days;
        self
    }

    pub fn with_vocabulary_caps(mut self, actors: usize, directors: usize, tags: usize) -> Self {
        self.max_vocabulary_actors = actors;
        self.max_vocabulary_directors = directors;
        self.max_vocabulary_tags = tags;
        self
    }

    pub fn with_year_encoding(mut self, encoding: YearEncoding) -> Self {
        self.year_encoding = encoding;
        self
    }

    pub fn with_rating_proximity_weight(mut self, weight: f32) -> Self {
        self.rating_proximity_weight = weight;
        self
    }

    /// Load a config from a JSON string; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| RecommendError::SnapshotParse {
            path: "<config>".to_string(),
            source,
        })
    }

    /// Reject values the weighting functions cannot work with.
    pub fn validate(&self) -> Result<()> {
        let half_life = self.recency_decay_half_life_days;
        if !half_life.is_finite() || half_life <= 0.0 {
            return Err(RecommendError::invalid(
                "recency_decay_half_life_days",
                format!("must be a positive number, got {half_life}"),
            ));
        }
        if !self.favorite_boost.is_finite() || self.favorite_boost < 0.0 {
            return Err(RecommendError::invalid(
                "favorite_boost",
                format!("must be a non-negative number, got {}", self.favorite_boost),
            ));
        }
        if !self.rewatch_boost.is_finite() || self.rewatch_boost <= 1.0 {
            return Err(RecommendError::invalid(
                "rewatch_boost",
                format!("logarithm base must be greater than 1, got {}", self.rewatch_boost),
            ));
        }
        if !(0.0..=1.0).contains(&self.rating_proximity_weight) {
            return Err(RecommendError::invalid(
                "rating_proximity_weight",
                format!("must lie in [0, 1], got {}", self.rating_proximity_weight),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(RecommendationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_half_life() {
        for days in [0.0, -5.0, f32::NAN] {
            let err = RecommendationConfig::default()
                .with_half_life_days(days)
                .validate()
                .unwrap_err();
            assert_eq!(err.param(), Some("recency_decay_half_life_days"));
        }
    }

    #[test]
    fn test_rejects_bad_boosts() {
        let err = RecommendationConfig::default()
            .with_favorite_boost(-1.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.param(), Some("favorite_boost"));

        let err = RecommendationConfig::default()
            .with_rewatch_boost(1.0)
            .validate()
            .unwrap_err();
        assert_eq!(err.param(), Some("rewatch_boost"));

        let err = RecommendationConfig::default()
            .with_rating_proximity_weight(1.5)
            .validate()
            .unwrap_err();
        assert_eq!(err.param(), Some("rating_proximity_weight"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RecommendationConfig::from_json_str(
            r#"{ "favorite_boost": 3.0, "year_encoding": "normalized_year" }"#,
        )
        .unwrap();

        assert_eq!(config.favorite_boost, 3.0);
        assert_eq!(config.year_encoding, YearEncoding::NormalizedYear);
        assert_eq!(config.movie_recommendation_count, 25);
        assert_eq!(config.min_watched_items_for_personalization, 3);
    }
}
