use crate::embedding::Embedding;
use crate::embedding::vector::l2_norm;

pub trait SimilarityScorer {
    /// Similarity in `[-1.0, 1.0]`. Must be symmetric.
    fn similarity(&self, a: &Embedding, b: &Embedding) -> f32;
}

/// Cosine similarity.
#[derive(Debug, Default, Clone, Copy)]
pub struct CosineSimilarity;

impl SimilarityScorer for CosineSimilarity {
    fn similarity(&self, a: &Embedding, b: &Embedding) -> f32 {
        cosine_similarity(a.as_slice(), b.as_slice())
    }
}

/// Dot product over the product of norms.
///
/// Returns 0.0 when either norm is zero or the lengths differ.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let norms = l2_norm(a) * l2_norm(b);
    if norms == 0.0 {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let score = (dot / norms).clamp(-1.0, 1.0);
    debug_assert!((-1.0..=1.0).contains(&score), "score {score} out of range [-1.0, 1.0]");
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.2, 0.4, 0.0, 1.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]), 0.0);
    }

    #[test]
    fn mismatched_dimensions_score_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn symmetric() {
        let a = [0.3, -1.2, 4.0, 0.01];
        let b = [2.2, 0.5, -0.7, 3.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn unnormalized_inputs_are_handled() {
        let scorer = CosineSimilarity;
        let a = Embedding::from_raw(vec![3.0, 4.0]);
        let b = Embedding::from_raw(vec![6.0, 8.0]);
        assert!((scorer.similarity(&a, &b) - 1.0).abs() < 1e-6);
    }
}
