//! Rating-only ranking for users without enough watch history.
//!
//! Candidates are ordered by community rating, then critic rating, both
//! descending, with unrated items last. Scores are `community_rating / 10`
//! so they share the [0, 1] range of personalized scores.

use crate::recommender::ScoredRecommendation;
use catalog::CatalogItem;
use std::cmp::Ordering;

/// Rank candidates by catalog rating and keep the top `max_results`.
pub fn rank_by_rating(
    candidates: Vec<&CatalogItem>,
    max_results: usize,
) -> Vec<ScoredRecommendation> {
    let mut ranked = candidates;
    // Stable: equal ratings keep catalog order
    ranked.sort_by(|a, b| {
        compare_rating_desc(a.community_rating, b.community_rating)
            .then_with(|| compare_rating_desc(a.critic_rating, b.critic_rating))
    });
    ranked.truncate(max_results);

    ranked
        .into_iter()
        .map(|item| ScoredRecommendation {
            item_id: item.id.clone(),
            score: cold_start_score(item.community_rating),
        })
        .collect()
}

/// `community_rating / 10` clamped into [0, 1]; 0 when unrated
pub fn cold_start_score(community_rating: Option<f32>) -> f32 {
    match community_rating {
        Some(r) if r.is_finite() => (r / 10.0).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Descending order with missing (or NaN) ratings last
fn compare_rating_desc(a: Option<f32>, b: Option<f32>) -> Ordering {
    let a = a.filter(|r| r.is_finite());
    let b = b.filter(|r| r.is_finite());
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
