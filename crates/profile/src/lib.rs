//! # Profile Crate
//!
//! Aggregates a user's fully watched items into a single taste vector.
//!
//! ## Example Usage
//!
//! ```ignore
//! use profile::UserProfileService;
//!
//! let service = UserProfileService::new(&catalog, now);
//! match service.build_user_profile("alice", &embeddings, &config)? {
//!     Some(profile) => println!("{} items shaped alice's taste", profile.watched_item_count),
//!     None => println!("alice gets cold-start recommendations"),
//! }
//! ```

pub mod user_profile;

pub use user_profile::{UserProfile, UserProfileService};
