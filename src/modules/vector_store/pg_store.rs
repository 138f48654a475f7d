use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{rank_chunks, ChunkRecord, ScoredChunk, VectorStore};
use crate::core::error::AppError;

/// Chunks persisted in the `document_chunks` table as `REAL[]` embeddings
pub struct PgVectorStore {
    pool: PgPool,
}

impl PgVectorStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VectorStore for PgVectorStore {
    async fn replace_document_chunks(
        &self,
        document_id: Uuid,
        chunks: Vec<ChunkRecord>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await?;

        for chunk in &chunks {
            sqlx::query(
                r#"
                INSERT INTO document_chunks
                    (id, document_id, user_id, chunk_index, content, source, embedding)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(chunk.id)
            .bind(chunk.document_id)
            .bind(chunk.user_id)
            .bind(chunk.chunk_index)
            .bind(&chunk.content)
            .bind(&chunk.source)
            .bind(&chunk.embedding)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM document_chunks WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn search(
        &self,
        user_id: Uuid,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredChunk>, AppError> {
        let candidates = sqlx::query_as::<_, ChunkRecord>(
            r#"
            SELECT c.id, c.document_id, c.user_id, c.chunk_index, c.content, c.source, c.embedding
            FROM document_chunks c
            JOIN documents d ON d.id = c.document_id
            WHERE c.user_id = $1
            ORDER BY d.uploaded_at ASC, c.chunk_index ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rank_chunks(query_embedding, candidates, top_k))
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM document_chunks WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn sample_sources(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>, AppError> {
        let sources: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT c.source
            FROM document_chunks c
            JOIN documents d ON d.id = c.document_id
            WHERE c.user_id = $1
            ORDER BY d.uploaded_at ASC, c.chunk_index ASC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
