//! Dense vector algebra over `f32` slices.
//!
//! Zero denominators never produce NaN: similarity falls back to 0 and
//! normalization leaves a zero vector untouched.

use catalog::{RecommendError, Result};

/// Inner product of two equal-length vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    check_same_length(a, b)?;
    Ok(dot_unchecked(a, b))
}

/// L2 norm.
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale `v` to unit length. A zero (or non-finite) magnitude returns the
/// input unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mag = magnitude(v);
    if mag == 0.0 || !mag.is_finite() {
        return v.to_vec();
    }
    v.iter().map(|x| x / mag).collect()
}

/// In-place variant of [`normalize`].
pub fn normalize_in_place(v: &mut [f32]) {
    let mag = magnitude(v);
    if mag == 0.0 || !mag.is_finite() {
        return;
    }
    for x in v.iter_mut() {
        *x /= mag;
    }
}

/// Cosine of the angle between two non-empty, equal-length vectors.
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.is_empty() {
        return Err(RecommendError::EmptyCollection { param: "a" });
    }
    if b.is_empty() {
        return Err(RecommendError::EmptyCollection { param: "b" });
    }
    check_same_length(a, b)?;

    let denominator = magnitude(a) * magnitude(b);
    if denominator == 0.0 || !denominator.is_finite() {
        return Ok(0.0);
    }
    let similarity = dot_unchecked(a, b) / denominator;
    if similarity.is_finite() {
        Ok(similarity.clamp(-1.0, 1.0))
    } else {
        Ok(0.0)
    }
}

fn check_same_length(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(RecommendError::invalid(
            "b",
            format!("vector length {} does not match {}", b.len(), a.len()),
        ));
    }
    Ok(())
}

fn dot_unchecked(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
