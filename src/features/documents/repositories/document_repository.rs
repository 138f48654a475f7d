use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::documents::models::{Document, DocumentStatus, NewDocument};

/// Per-user document counts for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub total: i64,
    pub indexed: i64,
}

/// Persistence for document metadata and extracted text
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn insert(&self, doc: NewDocument) -> Result<Document>;

    /// Documents owned by `user_id`, newest first
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>>;

    /// A document, only if owned by `user_id`
    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>>;

    /// Returns false if nothing matched
    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool>;

    async fn mark_indexed(&self, id: Uuid, chunk_count: i32) -> Result<bool>;

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool>;

    /// Ids of documents still waiting for indexing, oldest first
    async fn list_pending_ids(&self) -> Result<Vec<Uuid>>;

    async fn stats_for_user(&self, user_id: Uuid) -> Result<DocumentStats>;
}

const DOCUMENT_COLUMNS: &str = "id, user_id, filename, file_type, file_size, storage_key, \
     content, status, chunk_count, error_message, uploaded_at";

pub struct PgDocumentRepository {
    pool: PgPool,
}

impl PgDocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DocumentStatus,
        chunk_count: i32,
        error_message: Option<&str>,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = $2, chunk_count = $3, error_message = $4
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(chunk_count)
        .bind(error_message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentRepository for PgDocumentRepository {
    async fn insert(&self, doc: NewDocument) -> Result<Document> {
        let query = format!(
            r#"
            INSERT INTO documents (id, user_id, filename, file_type, file_size, storage_key, content)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            DOCUMENT_COLUMNS
        );

        let document = sqlx::query_as::<_, Document>(&query)
            .bind(doc.id)
            .bind(doc.user_id)
            .bind(&doc.filename)
            .bind(doc.file_type.as_str())
            .bind(doc.file_size)
            .bind(&doc.storage_key)
            .bind(&doc.content)
            .fetch_one(&self.pool)
            .await?;
        Ok(document)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Document>> {
        let query = format!(
            "SELECT {} FROM documents WHERE user_id = $1 ORDER BY uploaded_at DESC, id DESC",
            DOCUMENT_COLUMNS
        );
        let documents = sqlx::query_as::<_, Document>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(documents)
    }

    async fn find_for_user(&self, id: Uuid, user_id: Uuid) -> Result<Option<Document>> {
        let query = format!(
            "SELECT {} FROM documents WHERE id = $1 AND user_id = $2",
            DOCUMENT_COLUMNS
        );
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>> {
        let query = format!("SELECT {} FROM documents WHERE id = $1", DOCUMENT_COLUMNS);
        let document = sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(document)
    }

    async fn delete_for_user(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        // document_chunks rows go with the ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_indexed(&self, id: Uuid, chunk_count: i32) -> Result<bool> {
        self.set_status(id, DocumentStatus::Indexed, chunk_count, None)
            .await
    }

    async fn mark_failed(&self, id: Uuid, error_message: &str) -> Result<bool> {
        self.set_status(id, DocumentStatus::Failed, 0, Some(error_message))
            .await
    }

    async fn list_pending_ids(&self) -> Result<Vec<Uuid>> {
        let ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM documents WHERE status = 'pending' ORDER BY uploaded_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn stats_for_user(&self, user_id: Uuid) -> Result<DocumentStats> {
        let (total, indexed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'indexed')
            FROM documents
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(DocumentStats { total, indexed })
    }
}
