//! # Features Crate
//!
//! Turns a media catalog into numbers.
//!
//! ## Components
//!
//! - **vector_math**: dot product, magnitude, normalization, cosine similarity
//! - **weights**: recency decay, favorite boost and rewatch boost of watch
//!   history entries
//! - **vocabulary**: document frequency + IDF tables per feature class
//!   (genre, actor, director, tag, decade)
//! - **embedding**: binary-TF x IDF item embeddings with rating dimensions
//!
//! ## Example Usage
//!
//! ```ignore
//! use features::{EmbeddingService, VocabularyBuilder};
//!
//! let vocabulary = VocabularyBuilder::from_config(&config).build(catalog.items());
//! let embeddings = EmbeddingService::from_config(&config)
//!     .compute_embeddings(catalog.items(), &vocabulary)?;
//! ```
//!
//! Everything here is pure and recomputed from scratch for every catalog
//! snapshot; nothing is cached between cycles.

pub mod embedding;
pub mod vector_math;
pub mod vocabulary;
pub mod weights;

// Re-export main types
pub use embedding::{EmbeddingService, ItemEmbedding};
pub use vector_math::{cosine_similarity, dot_product, magnitude, normalize};
pub use vocabulary::{FeatureTable, FeatureVocabulary, VocabularyBuilder, build_vocabulary};
pub use weights::{combined_weight, exponential_decay, favorite_boost, rewatch_boost};
