use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Fixed dimensionality for the stand-in embedding. A real provider would
/// return a much larger vector; the dimension is irrelevant to correctness
/// here since both sides of every comparison come from the same function.
const DIMENSIONS: usize = 128;

/// A deterministic, dependency-free embedding: each whitespace token is
/// hashed into one of `DIMENSIONS` buckets and accumulated, then the vector
/// is L2-normalized. This stands in for a provider-side embedding call
/// behind the `EmbeddingModel` trait below, so semantic search is
/// exercisable and reproducible without network access.
pub fn embed(text: &str) -> Vec<f32> {
    let mut buckets = vec![0f32; DIMENSIONS];

    for token in text.to_lowercase().split_whitespace() {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        let bucket = (hasher.finish() as usize) % DIMENSIONS;
        buckets[bucket] += 1.0;
    }

    let norm: f32 = buckets.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for b in buckets.iter_mut() {
            *b /= norm;
        }
    }
    buckets
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Abstraction point for swapping in a live embedding provider without
/// touching the Vector Store's query logic.
pub trait EmbeddingModel: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
}

pub struct HashEmbeddingModel;

impl EmbeddingModel for HashEmbeddingModel {
    fn embed(&self, text: &str) -> Vec<f32> {
        embed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_embeds_identically() {
        let a = embed("lightning bolt deals damage");
        let b = embed("lightning bolt deals damage");
        assert_eq!(a, b);
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn unrelated_text_is_less_similar_than_identical_text() {
        let a = embed("lightning bolt deals three damage to any target");
        let b = embed("lightning bolt deals three damage to any target");
        let c = embed("counter target spell unless its controller pays two");
        assert!(cosine_similarity(&a, &b) > cosine_similarity(&a, &c));
    }
}
