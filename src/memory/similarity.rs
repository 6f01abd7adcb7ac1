//! Cosine similarity and the in-process vector scoring strategy.
//!
//! Sources whose backend cannot rank by vector (the desk) score candidates here.

use crate::error::MemoryError;

/// Cosine similarity between two equal-length vectors.
///
/// Returns `0.0` when either vector has zero magnitude.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, MemoryError> {
    if a.len() != b.len() {
        return Err(MemoryError::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Scores a stored vector against the query vector.
pub trait VectorScorer: Send + Sync {
    fn score(&self, query: &[f32], candidate: &[f32]) -> Result<f64, MemoryError>;
}

/// [`VectorScorer`] backed by [`cosine_similarity`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CosineScorer;

impl VectorScorer for CosineScorer {
    fn score(&self, query: &[f32], candidate: &[f32]) -> Result<f64, MemoryError> {
        cosine_similarity(query, candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let a = [0.3f32, -1.2, 4.0, 0.0];
        let s = cosine_similarity(&a, &a).unwrap();
        assert!((s - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        let s = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(s.abs() < 1e-12);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        let s = cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]).unwrap();
        assert!((s + 1.0).abs() < 1e-9);
    }

    #[test]
    fn similarity_is_symmetric() {
        let a = [0.1f32, 0.7, -0.2, 0.9];
        let b = [0.5f32, -0.1, 0.3, 0.2];
        assert_eq!(
            cosine_similarity(&a, &b).unwrap(),
            cosine_similarity(&b, &a).unwrap()
        );
    }

    #[test]
    fn zero_vector_scores_zero() {
        let zero = [0.0f32; 4];
        let b = [1.0f32, 2.0, 3.0, 4.0];
        assert_eq!(cosine_similarity(&zero, &b).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&b, &zero).unwrap(), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero).unwrap(), 0.0);
    }

    #[test]
    fn length_mismatch_is_an_error() {
        let err = cosine_similarity(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            MemoryError::DimensionMismatch { left: 2, right: 1 }
        ));
    }

    #[test]
    fn scale_does_not_matter() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [10.0f32, 20.0, 30.0];
        let s = CosineScorer.score(&a, &b).unwrap();
        assert!((s - 1.0).abs() < 1e-9);
    }
}
