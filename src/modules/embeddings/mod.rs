//! Text embedding providers and vector math

mod hashing_embedder;

use async_trait::async_trait;

use crate::modules::llm::ProviderError;

pub use hashing_embedder::HashingEmbedder;

/// Trait for generating text embeddings
///
/// Implementations:
/// - `OpenAiClient`: OpenAI-compatible `/embeddings` endpoint
/// - `HashingEmbedder`: local feature hashing, no network
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError>;

    /// Generate embeddings for multiple texts, in input order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

/// Cosine similarity between two vectors.
///
/// Vectors of different length (e.g. produced by different embedders) score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
