//! Item embeddings built from the feature vocabulary.
//!
//! Layout of every vector, in order:
//! genre block, actor block, director block, tag block, year block,
//! community rating, critic rating.
//!
//! Categorical blocks hold `idf` where the item has the feature and 0
//! elsewhere (binary TF). The year block is either the decade vocabulary
//! (single-hot IDF) or one normalized-year dimension, depending on the
//! configured [`YearEncoding`]. The whole vector is L2-normalized.

use crate::vector_math::normalize_in_place;
use crate::vocabulary::{FeatureTable, FeatureVocabulary};
use catalog::{
    CatalogItem, FeatureClass, ItemId, MediaKind, RecommendError, RecommendationConfig, Result,
    YearEncoding, normalize_feature,
};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Neutral value for missing ratings and unknown years
const NEUTRAL: f32 = 0.5;

/// Dense embedding of one catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemEmbedding {
    pub item_id: ItemId,
    /// Kind of the embedded item, needed to interpret its watch records
    pub kind: MediaKind,
    pub vector: Vec<f32>,
}

impl ItemEmbedding {
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// Turns catalog items into embeddings against a fixed vocabulary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingService {
    year_encoding: YearEncoding,
}

impl EmbeddingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self {
            year_encoding: config.year_encoding,
        }
    }

    pub fn with_year_encoding(mut self, encoding: YearEncoding) -> Self {
        self.year_encoding = encoding;
        self
    }

    pub fn year_encoding(&self) -> YearEncoding {
        self.year_encoding
    }

    /// Length of every embedding built from `vocabulary`
    pub fn embedding_dimension(&self, vocabulary: &FeatureVocabulary) -> usize {
        let year_block = match self.year_encoding {
            YearEncoding::DecadeVocabulary => vocabulary.decades.len(),
            YearEncoding::NormalizedYear => 1,
        };
        vocabulary.genres.len()
            + vocabulary.actors.len()
            + vocabulary.directors.len()
            + vocabulary.tags.len()
            + year_block
            + 2
    }

    /// Human-readable name of every dimension, e.g. `genre:drama`
    pub fn dimension_labels(&self, vocabulary: &FeatureVocabulary) -> Vec<String> {
        let mut labels = Vec::with_capacity(self.embedding_dimension(vocabulary));
        for class in [
            FeatureClass::Genre,
            FeatureClass::Actor,
            FeatureClass::Director,
            FeatureClass::Tag,
        ] {
            labels.extend(
                vocabulary
                    .table(class)
                    .iter_idf()
                    .map(|(key, _)| format!("{}:{}", class.name(), key)),
            );
        }
        match self.year_encoding {
            YearEncoding::DecadeVocabulary => labels.extend(
                vocabulary
                    .decades
                    .iter_idf()
                    .map(|(key, _)| format!("decade:{key}")),
            ),
            YearEncoding::NormalizedYear => labels.push("year".to_string()),
        }
        labels.push("community_rating".to_string());
        labels.push("critic_rating".to_string());
        labels
    }

    /// Embed a single item
    pub fn compute_embedding(
        &self,
        item: &CatalogItem,
        vocabulary: &FeatureVocabulary,
    ) -> Result<ItemEmbedding> {
        if item.id.trim().is_empty() {
            return Err(RecommendError::invalid("item", "item identifier is empty"));
        }
        if item.name.trim().is_empty() {
            return Err(RecommendError::invalid(
                "item",
                format!("item {} has an empty display name", item.id),
            ));
        }

        let mut vector = Vec::with_capacity(self.embedding_dimension(vocabulary));

        for class in [
            FeatureClass::Genre,
            FeatureClass::Actor,
            FeatureClass::Director,
            FeatureClass::Tag,
        ] {
            push_tfidf_block(&mut vector, vocabulary.table(class), &item.feature_keys(class));
        }

        match self.year_encoding {
            YearEncoding::DecadeVocabulary => {
                let decade = normalize_feature(&item.decade());
                vector.extend(
                    vocabulary
                        .decades
                        .iter_idf()
                        .map(|(key, idf)| if key == decade { idf } else { 0.0 }),
                );
            }
            YearEncoding::NormalizedYear => vector.push(normalized_year(item.year, vocabulary)),
        }

        vector.push(normalized_rating(item.community_rating, 10.0));
        vector.push(normalized_rating(item.critic_rating, 100.0));

        normalize_in_place(&mut vector);
        Ok(ItemEmbedding {
            item_id: item.id.clone(),
            kind: item.kind,
            vector,
        })
    }

    /// Embed every item of the catalog in parallel
    #[instrument(skip(self, items, vocabulary), fields(items = items.len()))]
    pub fn compute_embeddings(
        &self,
        items: &[CatalogItem],
        vocabulary: &FeatureVocabulary,
    ) -> Result<HashMap<ItemId, ItemEmbedding>> {
        let embeddings: Vec<ItemEmbedding> = items
            .par_iter()
            .map(|item| self.compute_embedding(item, vocabulary))
            .collect::<Result<_>>()?;

        debug!(
            "Computed {} embeddings of dimension {}",
            embeddings.len(),
            self.embedding_dimension(vocabulary)
        );
        Ok(embeddings
            .into_iter()
            .map(|embedding| (embedding.item_id.clone(), embedding))
            .collect())
    }
}

fn push_tfidf_block(vector: &mut Vec<f32>, table: &FeatureTable, item_keys: &HashSet<String>) {
    vector.extend(
        table
            .iter_idf()
            .map(|(key, idf)| if item_keys.contains(key) { idf } else { 0.0 }),
    );
}

/// `rating / scale` clamped into [0, 1], neutral when unknown
fn normalized_rating(rating: Option<f32>, scale: f32) -> f32 {
    match rating {
        Some(r) if r.is_finite() => (r / scale).clamp(0.0, 1.0),
        _ => NEUTRAL,
    }
}

/// Year scaled into the catalog's year range, neutral when unknown or the
/// range is a single year
fn normalized_year(year: Option<i32>, vocabulary: &FeatureVocabulary) -> f32 {
    match (year, vocabulary.min_year, vocabulary.max_year) {
        (Some(year), Some(min), Some(max)) if max > min => {
            ((year - min) as f32 / (max - min) as f32).clamp(0.0, 1.0)
        }
        _ => NEUTRAL,
    }
}
