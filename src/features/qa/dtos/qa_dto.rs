use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::qa::models::QueryLog;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AskQuestionDto {
    #[validate(length(min = 1, max = 2000, message = "Question must be 1-2000 characters"))]
    #[schema(example = "What was the revenue in Q3?")]
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnswerResponseDto {
    pub answer: String,
    /// Seconds spent on retrieval and generation
    pub response_time: f64,
    /// Source labels of the chunks the answer was grounded on
    pub source_documents: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QueryLogResponseDto {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub question: String,
    pub response: String,
    pub response_time: f64,
    /// JSON-encoded list of source labels
    pub source_documents: Option<String>,
}

impl From<QueryLog> for QueryLogResponseDto {
    fn from(log: QueryLog) -> Self {
        Self {
            id: log.id,
            timestamp: log.timestamp,
            question: log.question,
            response: log.response,
            response_time: log.response_time,
            source_documents: log.source_documents,
        }
    }
}

/// Retrieval diagnostics for the caller
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IndexStatusDto {
    pub has_documents: bool,
    pub document_count: i64,
    pub indexed_documents: i64,
    pub chunk_count: i64,
    pub sample_sources: Vec<String>,
}
