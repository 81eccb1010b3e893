// Vector operations: cosine similarity and hybrid score fusion.

/// Cosine similarity between two vectors. Returns 0.0–1.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let x = f64::from(*x);
        let y = f64::from(*y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if !denom.is_finite() || denom < f64::EPSILON {
        return 0.0;
    }

    let raw = dot / denom;
    if !raw.is_finite() {
        return 0.0;
    }

    #[allow(clippy::cast_possible_truncation)]
    let sim = raw.clamp(0.0, 1.0) as f32;
    sim
}

/// Weighted fusion of a similarity score and an exact-match score.
///
/// With `keyword_weight > vector_weight` every exact match outranks every
/// similarity-only hit, since both inputs are clamped to 0.0–1.0.
pub fn hybrid_score(
    vector_score: f32,
    keyword_score: f32,
    vector_weight: f32,
    keyword_weight: f32,
) -> f32 {
    vector_weight * vector_score.clamp(0.0, 1.0) + keyword_weight * keyword_score.clamp(0.0, 1.0)
}
