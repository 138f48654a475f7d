use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for answered questions (append-only)
#[derive(Debug, Clone, FromRow)]
pub struct QueryLog {
    pub id: Uuid,
    pub question: String,
    pub response: String,
    /// Seconds spent on retrieval and generation
    pub response_time: f64,
    /// JSON array of chunk source labels, `NULL` when nothing was retrieved
    pub source_documents: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQueryLog {
    pub user_id: Uuid,
    pub question: String,
    pub response: String,
    pub response_time: f64,
    pub source_documents: Option<String>,
}
