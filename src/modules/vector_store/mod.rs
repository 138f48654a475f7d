//! Chunk storage and similarity search
//!
//! Chunks are scoped to their owner; searches never cross users. Ranking is
//! brute-force cosine similarity computed in Rust over the caller's chunks.

#[cfg(test)]
mod memory_store;
mod pg_store;

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::modules::embeddings::cosine_similarity;

#[cfg(test)]
pub use memory_store::InMemoryVectorStore;
pub use pg_store::PgVectorStore;

/// A chunk of document text with its embedding
#[derive(Debug, Clone, FromRow)]
pub struct ChunkRecord {
    pub id: Uuid,
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub chunk_index: i32,
    pub content: String,
    /// Label shown to clients, `{filename}_chunk_{index}`
    pub source: String,
    pub embedding: Vec<f32>,
}

impl ChunkRecord {
    pub fn source_label(filename: &str, index: usize) -> String {
        format!("{}_chunk_{}", filename, index)
    }
}

/// Search hit
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    /// Cosine similarity, higher is more similar
    pub similarity: f32,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Atomically replace every chunk of `document_id` with `chunks`
    async fn replace_document_chunks(
        &self,
        document_id: Uuid,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), AppError>;

    /// Delete all chunks for a document, returning how many were removed
    async fn delete_document(&self, document_id: Uuid) -> Result<u64, AppError>;

    /// Top `top_k` chunks owned by `user_id`, most similar first
    async fn search(
        &self,
        user_id: Uuid,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, AppError>;

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError>;

    /// A few chunk source labels for diagnostics
    async fn sample_sources(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>, AppError>;

    /// Get store name for logging
    fn name(&self) -> &str;
}

/// Score `chunks` against the query and keep the best `top_k`.
///
/// The sort is stable, so equal scores keep their input order.
pub(crate) fn rank_chunks(
    query_embedding: &[f32],
    chunks: Vec<ChunkRecord>,
    top_k: usize,
) -> Vec<ScoredChunk> {
    let mut scored: Vec<ScoredChunk> = chunks
        .into_iter()
        .map(|chunk| {
            let similarity = cosine_similarity(query_embedding, &chunk.embedding);
            ScoredChunk { chunk, similarity }
        })
        .collect();

    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    scored.truncate(top_k);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(index: i32, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v4(),
            document_id: Uuid::nil(),
            user_id: Uuid::nil(),
            chunk_index: index,
            content: format!("chunk {}", index),
            source: ChunkRecord::source_label("a.txt", index as usize),
            embedding,
        }
    }

    #[test]
    fn test_rank_chunks_orders_by_similarity() {
        let chunks = vec![
            chunk(0, vec![0.0, 1.0]),
            chunk(1, vec![1.0, 0.0]),
            chunk(2, vec![0.7, 0.7]),
        ];
        let ranked = rank_chunks(&[1.0, 0.0], chunks, 2);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.chunk_index, 1);
        assert_eq!(ranked[1].chunk.chunk_index, 2);
        assert!(ranked[0].similarity >= ranked[1].similarity);
    }

    #[test]
    fn test_rank_chunks_keeps_input_order_on_ties() {
        let chunks = vec![chunk(0, vec![1.0]), chunk(1, vec![1.0]), chunk(2, vec![1.0])];
        let ranked = rank_chunks(&[1.0], chunks, 4);
        let order: Vec<i32> = ranked.iter().map(|s| s.chunk.chunk_index).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_source_label() {
        assert_eq!(ChunkRecord::source_label("report.pdf", 3), "report.pdf_chunk_3");
    }
}
