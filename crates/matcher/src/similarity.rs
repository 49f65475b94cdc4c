use crate::normalize::location_tokens;
use crate::types::MatchError;

/// Cosine similarity of two equal-length vectors.
///
/// Sums are accumulated in `f64`, so any non-zero vector scores exactly `1.0`
/// against itself. A zero-norm input yields `0.0`. Mismatched lengths are an
/// error rather than a silent truncation.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, MatchError> {
    if a.len() != b.len() {
        return Err(MatchError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm = (norm_a * norm_b).sqrt();
    if norm == 0.0 {
        return Ok(0.0);
    }
    Ok(((dot / norm) as f32).clamp(-1.0, 1.0))
}

/// Token overlap of two locations: shared tokens divided by the larger token
/// set. Either side empty after normalization gives `0.0`.
pub fn location_similarity(a: &str, b: &str) -> f32 {
    let left = location_tokens(a);
    let right = location_tokens(b);
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(&right).count();
    shared as f32 / left.len().max(right.len()) as f32
}

/// Case-insensitive, whitespace-trimmed category equality.
pub fn category_match(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}
