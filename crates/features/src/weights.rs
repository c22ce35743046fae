//! Scalar weighting of watch history entries.
//!
//! The combined weight of a watched item is
//! `decay(days, half_life) -> favorite boost -> rewatch boost`, in that order.
//! Every function rejects out-of-range input instead of clamping it, and
//! never returns a non-finite weight.

use catalog::{RecommendError, Result};

/// `0.5 ^ (days_since / half_life_days)`
pub fn exponential_decay(days_since: f32, half_life_days: f32) -> Result<f32> {
    if !days_since.is_finite() || days_since < 0.0 {
        return Err(RecommendError::invalid(
            "days_since",
            format!("must be a non-negative number, got {days_since}"),
        ));
    }
    if !half_life_days.is_finite() || half_life_days <= 0.0 {
        return Err(RecommendError::invalid(
            "half_life_days",
            format!("must be positive, got {half_life_days}"),
        ));
    }
    Ok(finite_or_zero(0.5f32.powf(days_since / half_life_days)))
}

/// Multiply by `boost_factor` when the item is a favorite.
pub fn favorite_boost(weight: f32, is_favorite: bool, boost_factor: f32) -> Result<f32> {
    check_weight(weight)?;
    if !boost_factor.is_finite() || boost_factor < 0.0 {
        return Err(RecommendError::invalid(
            "boost_factor",
            format!("must be non-negative, got {boost_factor}"),
        ));
    }
    if is_favorite {
        Ok(saturate(weight * boost_factor))
    } else {
        Ok(weight)
    }
}

/// `weight * (1 + log_base(play_count))` for repeat plays.
pub fn rewatch_boost(weight: f32, play_count: u32, base: f32) -> Result<f32> {
    check_weight(weight)?;
    if play_count < 1 {
        return Err(RecommendError::invalid(
            "play_count",
            "must be at least 1",
        ));
    }
    if !base.is_finite() || base <= 1.0 {
        return Err(RecommendError::invalid(
            "base",
            format!("logarithm base must be greater than 1, got {base}"),
        ));
    }
    if play_count == 1 {
        return Ok(weight);
    }
    let factor = 1.0 + (play_count as f32).ln() / base.ln();
    Ok(saturate(weight * factor))
}

/// Compose decay, favorite boost and rewatch boost.
pub fn combined_weight(
    days_since: f32,
    half_life_days: f32,
    is_favorite: bool,
    favorite_boost_factor: f32,
    play_count: u32,
    rewatch_base: f32,
) -> Result<f32> {
    let weight = exponential_decay(days_since, half_life_days)?;
    let weight = favorite_boost(weight, is_favorite, favorite_boost_factor)?;
    rewatch_boost(weight, play_count, rewatch_base)
}

fn check_weight(weight: f32) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(RecommendError::invalid(
            "weight",
            format!("must be a non-negative number, got {weight}"),
        ));
    }
    Ok(())
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}

// Overflowing boosts saturate instead of turning into infinity.
fn saturate(value: f32) -> f32 {
    if value.is_finite() { value } else { f32::MAX }
}
