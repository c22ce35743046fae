//! Feature vocabulary: document frequencies and IDF per feature class.
//!
//! The vocabulary is built once per catalog snapshot and never mutated
//! afterwards. Keys are normalized (trimmed, lowercased) so lookups are
//! case-insensitive, and tables iterate in key order so every embedding built
//! from the same vocabulary has the same layout.
//!
//! ## Algorithm
//! 1. Count, per class, how many items contain each distinct feature
//!    (parallel fold/reduce over the catalog)
//! 2. Optionally keep only the top-K actors/directors/tags by frequency
//! 3. `idf = ln(total_items / document_frequency)`

use catalog::{CatalogItem, FeatureClass, RecommendationConfig, normalize_feature};
use rayon::prelude::*;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument};

/// Document frequency and IDF of every feature of one class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    document_frequency: BTreeMap<String, u32>,
    idf: BTreeMap<String, f32>,
}

impl FeatureTable {
    fn from_counts(counts: HashMap<String, u32>, total_items: usize, cap: usize) -> Self {
        let mut entries: Vec<(String, u32)> = counts.into_iter().collect();
        if cap > 0 && entries.len() > cap {
            // Highest frequency first, key order breaks ties
            entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            entries.truncate(cap);
        }

        let mut table = FeatureTable::default();
        for (key, frequency) in entries {
            table.idf.insert(key.clone(), inverse_document_frequency(total_items, frequency));
            table.document_frequency.insert(key, frequency);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.document_frequency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.document_frequency.is_empty()
    }

    /// Number of items containing `feature` (case-insensitive)
    pub fn document_frequency(&self, feature: &str) -> Option<u32> {
        self.document_frequency.get(&normalize_feature(feature)).copied()
    }

    /// IDF of `feature` (case-insensitive)
    pub fn idf(&self, feature: &str) -> Option<f32> {
        self.idf.get(&normalize_feature(feature)).copied()
    }

    /// `(key, idf)` pairs in dimension order
    pub fn iter_idf(&self) -> impl Iterator<Item = (&str, f32)> {
        self.idf.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// `(key, document frequency)` pairs in dimension order
    pub fn iter_frequency(&self) -> impl Iterator<Item = (&str, u32)> {
        self.document_frequency.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// `ln(total / frequency)`, 0 for an unseen feature.
pub fn inverse_document_frequency(total_items: usize, document_frequency: u32) -> f32 {
    if document_frequency == 0 || total_items == 0 {
        return 0.0;
    }
    let idf = (total_items as f64 / document_frequency as f64).ln();
    idf.max(0.0) as f32
}

/// Immutable vocabulary of a catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVocabulary {
    pub genres: FeatureTable,
    pub actors: FeatureTable,
    pub directors: FeatureTable,
    pub tags: FeatureTable,
    pub decades: FeatureTable,
    pub total_items: usize,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl FeatureVocabulary {
    pub fn table(&self, class: FeatureClass) -> &FeatureTable {
        match class {
            FeatureClass::Genre => &self.genres,
            FeatureClass::Actor => &self.actors,
            FeatureClass::Director => &self.directors,
            FeatureClass::Tag => &self.tags,
            FeatureClass::Decade => &self.decades,
        }
    }

    /// Total number of categorical dimensions across all five classes
    pub fn feature_count(&self) -> usize {
        FeatureClass::ALL.iter().map(|c| self.table(*c).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

/// Configurable vocabulary construction.
///
/// Caps of 0 mean unlimited. Genres and decades are never capped.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyBuilder {
    max_actors: usize,
    max_directors: usize,
    max_tags: usize,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the vocabulary caps from a config
    pub fn from_config(config: &RecommendationConfig) -> Self {
        Self {
            max_actors: config.max_vocabulary_actors,
            max_directors: config.max_vocabulary_directors,
            max_tags: config.max_vocabulary_tags,
        }
    }

    pub fn with_max_actors(mut self, max: usize) -> Self {
        self.max_actors = max;
        self
    }

    pub fn with_max_directors(mut self, max: usize) -> Self {
        self.max_directors = max;
        self
    }

    pub fn with_max_tags(mut self, max: usize) -> Self {
        self.max_tags = max;
        self
    }

    /// Scan the catalog once and build the vocabulary
    #[instrument(skip(self, items), fields(items = items.len()))]
    pub fn build(&self, items: &[CatalogItem]) -> FeatureVocabulary {
        let counts = items
            .par_iter()
            .fold(FeatureCounts::default, |mut acc, item| {
                acc.add_item(item);
                acc
            })
            .reduce(FeatureCounts::default, FeatureCounts::merge);

        let total = items.len();
        let [genres, actors, directors, tags, decades] = counts.per_class;

        let vocabulary = FeatureVocabulary {
            genres: FeatureTable::from_counts(genres, total, 0),
            actors: FeatureTable::from_counts(actors, total, self.max_actors),
            directors: FeatureTable::from_counts(directors, total, self.max_directors),
            tags: FeatureTable::from_counts(tags, total, self.max_tags),
            decades: FeatureTable::from_counts(decades, total, 0),
            total_items: total,
            min_year: counts.min_year,
            max_year: counts.max_year,
        };

        debug!(
            "Built vocabulary: {} genres, {} actors, {} directors, {} tags, {} decades",
            vocabulary.genres.len(),
            vocabulary.actors.len(),
            vocabulary.directors.len(),
            vocabulary.tags.len(),
            vocabulary.decades.len()
        );
        vocabulary
    }
}

/// Build a vocabulary with explicit caps (0 = unlimited).
pub fn build_vocabulary(
    items: &[CatalogItem],
    max_actors: usize,
    max_directors: usize,
    max_tags: usize,
) -> FeatureVocabulary {
    VocabularyBuilder::new()
        .with_max_actors(max_actors)
        .with_max_directors(max_directors)
        .with_max_tags(max_tags)
        .build(items)
}

/// Per-thread accumulator for the parallel scan
#[derive(Default)]
struct FeatureCounts {
    per_class: [HashMap<String, u32>; 5],
    min_year: Option<i32>,
    max_year: Option<i32>,
}

impl FeatureCounts {
    fn add_item(&mut self, item: &CatalogItem) {
        for (slot, class) in FeatureClass::ALL.iter().enumerate() {
            // feature_keys is a set: each item counts once per distinct value
            for key in item.feature_keys(*class) {
                *self.per_class[slot].entry(key).or_insert(0) += 1;
            }
        }
        if let Some(year) = item.year {
            self.min_year = Some(self.min_year.map_or(year, |y| y.min(year)));
            self.max_year = Some(self.max_year.map_or(year, |y| y.max(year)));
        }
    }

    fn merge(mut self, other: FeatureCounts) -> FeatureCounts {
        for (mine, theirs) in self.per_class.iter_mut().zip(other.per_class) {
            for (key, count) in theirs {
                *mine.entry(key).or_insert(0) += count;
            }
        }
        self.min_year = match (self.min_year, other.min_year) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        self.max_year = match (self.max_year, other.max_year) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (a, b) => a.or(b),
        };
        self
    }
}
