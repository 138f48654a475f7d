use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::documents::services::chunking::TextChunker;
use crate::modules::embeddings::Embedder;
use crate::modules::vector_store::{ChunkRecord, VectorStore};

/// Texts per embedding request
const EMBED_BATCH_SIZE: usize = 64;

/// Chunks, embeds and stores a document's extracted text
pub struct IndexingService {
    documents: Arc<dyn DocumentRepository>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    chunker: TextChunker,
}

impl IndexingService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        chunker: TextChunker,
    ) -> Self {
        Self {
            documents,
            vector_store,
            embedder,
            chunker,
        }
    }

    /// Index one document, recording failures on the document itself
    pub async fn process(&self, document_id: Uuid) {
        if let Err(e) = self.index_document(document_id).await {
            warn!(%document_id, "Indexing failed: {}", e);
            if let Err(mark_err) = self.documents.mark_failed(document_id, &e.to_string()).await {
                error!(%document_id, "Failed to record indexing failure: {:?}", mark_err);
            }
        }
    }

    /// Returns the number of chunks written. A document deleted before the
    /// job runs is skipped.
    pub async fn index_document(&self, document_id: Uuid) -> Result<usize> {
        let Some(document) = self.documents.find_by_id(document_id).await? else {
            debug!(%document_id, "Document no longer exists, skipping indexing");
            return Ok(0);
        };

        let pieces = self.chunker.split(&document.content);
        if pieces.is_empty() {
            return Err(AppError::BadRequest(
                "Document contains no indexable text".to_string(),
            ));
        }

        let mut embeddings = Vec::with_capacity(pieces.len());
        for batch in pieces.chunks(EMBED_BATCH_SIZE) {
            embeddings.extend(self.embedder.embed_batch(batch).await?);
        }

        let chunks: Vec<ChunkRecord> = pieces
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (content, embedding))| ChunkRecord {
                id: Uuid::new_v4(),
                document_id: document.id,
                user_id: document.user_id,
                chunk_index: index as i32,
                source: ChunkRecord::source_label(&document.filename, index),
                content,
                embedding,
            })
            .collect();
        let chunk_count = chunks.len();

        self.vector_store
            .replace_document_chunks(document.id, chunks)
            .await?;

        if !self
            .documents
            .mark_indexed(document.id, chunk_count as i32)
            .await?
        {
            // Deleted while we were embedding
            self.vector_store.delete_document(document.id).await?;
            return Ok(0);
        }

        info!(
            %document_id,
            embedder = self.embedder.name(),
            store = self.vector_store.name(),
            "Indexed document into {} chunks",
            chunk_count
        );
        Ok(chunk_count)
    }
}
