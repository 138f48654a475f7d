use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{rank_chunks, ChunkRecord, ScoredChunk, VectorStore};
use crate::core::error::AppError;

/// Vector store kept in process memory, keyed by document id.
///
/// Insertion order of documents is preserved so tie-breaking matches the
/// Postgres store (oldest document first, then chunk index).
#[derive(Default)]
pub struct InMemoryVectorStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    order: Vec<Uuid>,
    chunks: HashMap<Uuid, Vec<ChunkRecord>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn replace_document_chunks(
        &self,
        document_id: Uuid,
        mut chunks: Vec<ChunkRecord>,
    ) -> Result<(), AppError> {
        chunks.sort_by_key(|c| c.chunk_index);
        let mut inner = self.inner.write().await;
        if !inner.chunks.contains_key(&document_id) {
            inner.order.push(document_id);
        }
        inner.chunks.insert(document_id, chunks);
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64, AppError> {
        let mut inner = self.inner.write().await;
        inner.order.retain(|id| *id != document_id);
        Ok(inner
            .chunks
            .remove(&document_id)
            .map(|c| c.len() as u64)
            .unwrap_or(0))
    }

    async fn search(
        &self,
        user_id: Uuid,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, AppError> {
        let inner = self.inner.read().await;
        let candidates: Vec<ChunkRecord> = inner
            .order
            .iter()
            .filter_map(|id| inner.chunks.get(id))
            .flatten()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        Ok(rank_chunks(query_embedding, candidates, top_k))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .chunks
            .values()
            .flatten()
            .filter(|c| c.user_id == user_id)
            .count() as i64)
    }

    async fn sample_sources(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .order
            .iter()
            .filter_map(|id| inner.chunks.get(id))
            .flatten()
            .filter(|c| c.user_id == user_id)
            .take(limit)
            .map(|c| c.source.clone())
            .collect())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(document_id: Uuid, user_id: Uuid, index: i32, embedding: Vec<f32>) -> ChunkRecord {
        ChunkRecord {
            id: Uuid::new_v4(),
            document_id,
            user_id,
            chunk_index: index,
            content: format!("content {}", index),
            source: ChunkRecord::source_label("doc.txt", index as usize),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_replace_does_not_duplicate_chunks() {
        let store = InMemoryVectorStore::new();
        let (doc, user) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .replace_document_chunks(doc, vec![chunk(doc, user, 0, vec![1.0]), chunk(doc, user, 1, vec![1.0])])
            .await
            .unwrap();
        store
            .replace_document_chunks(doc, vec![chunk(doc, user, 0, vec![1.0])])
            .await
            .unwrap();

        assert_eq!(store.count_for_user(user).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_search_is_scoped_to_user() {
        let store = InMemoryVectorStore::new();
        let (doc_a, doc_b) = (Uuid::new_v4(), Uuid::new_v4());
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .replace_document_chunks(doc_a, vec![chunk(doc_a, alice, 0, vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .replace_document_chunks(doc_b, vec![chunk(doc_b, bob, 0, vec![1.0, 0.0])])
            .await
            .unwrap();

        let hits = store.search(alice, &[1.0, 0.0], 4).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.document_id, doc_a);
    }

    #[tokio::test]
    async fn test_delete_document_removes_chunks() {
        let store = InMemoryVectorStore::new();
        let (doc, user) = (Uuid::new_v4(), Uuid::new_v4());
        store
            .replace_document_chunks(doc, vec![chunk(doc, user, 0, vec![1.0]), chunk(doc, user, 1, vec![0.5])])
            .await
            .unwrap();

        assert_eq!(store.delete_document(doc).await.unwrap(), 2);
        assert_eq!(store.count_for_user(user).await.unwrap(), 0);
        assert!(store.search(user, &[1.0], 4).await.unwrap().is_empty());
        assert_eq!(store.delete_document(doc).await.unwrap(), 0);
    }
}
