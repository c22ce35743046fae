//! # Engine Crate
//!
//! Turns a taste vector (or the lack of one) into a ranked list of unwatched
//! catalog items.
//!
//! ## Components
//!
//! - **traits**: `CandidateFilter`, the seam every filter plugs into
//! - **filter_pipeline**: ordered chain of filters
//! - **filters**: media type, sparse metadata, already watched, in progress,
//!   started series and abandoned series
//! - **context**: per-call snapshot of the user's watch state
//! - **cold_start**: rating-only ranking
//! - **recommender**: `RecommendationEngine`, which picks the path and scores
//!
//! ## Example Usage
//!
//! ```ignore
//! use engine::RecommendationEngine;
//!
//! let engine = RecommendationEngine::new(&catalog, now);
//! let movies = engine.generate_recommendations(
//!     "alice",
//!     profile.as_ref(),
//!     &embeddings,
//!     catalog.items(),
//!     &config,
//!     Some(MediaKind::Movie),
//!     config.movie_recommendation_count,
//! )?;
//! ```

pub mod cold_start;
pub mod context;
pub mod filter_pipeline;
pub mod filters;
pub mod recommender;
pub mod traits;

pub use cold_start::rank_by_rating;
pub use context::UserWatchState;
pub use filter_pipeline::FilterPipeline;
pub use recommender::{RecommendationEngine, ScoredRecommendation, StartMode};
pub use traits::CandidateFilter;
