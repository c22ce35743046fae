//! Server crate for the media recommendation engine.
//!
//! This crate contains the orchestrator that runs recommendation cycles
//! over a catalog snapshot: vocabulary, embeddings, profiles and ranking
//! for every user.

pub mod orchestrator;

pub use orchestrator::{
    CatalogModel, ItemRecommendation, RecommendationOrchestrator, UserRecommendations,
    current_timestamp,
};
