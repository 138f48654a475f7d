use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::qa::models::{NewQueryLog, QueryLog};

#[async_trait]
pub trait QueryLogRepository: Send + Sync {
    async fn insert(&self, log: NewQueryLog) -> Result<QueryLog>;

    /// The user's records, newest first
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<QueryLog>>;
}

pub struct PgQueryLogRepository {
    pool: PgPool,
}

impl PgQueryLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLogRepository for PgQueryLogRepository {
    async fn insert(&self, log: NewQueryLog) -> Result<QueryLog> {
        let record = sqlx::query_as::<_, QueryLog>(
            r#"
            INSERT INTO query_logs (id, user_id, question, response, response_time, source_documents)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, question, response, response_time, source_documents, timestamp
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(log.user_id)
        .bind(&log.question)
        .bind(&log.response)
        .bind(log.response_time)
        .bind(&log.source_documents)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<QueryLog>> {
        let records = sqlx::query_as::<_, QueryLog>(
            r#"
            SELECT id, question, response, response_time, source_documents, timestamp
            FROM query_logs
            WHERE user_id = $1
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
