use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Database model for uploaded documents
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_type: String,
    pub file_size: i64,
    pub storage_key: String,
    /// Extracted plain text
    pub content: String,
    pub status: String,
    pub chunk_count: i32,
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// Insert payload for a freshly uploaded document
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub filename: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub storage_key: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdf,
    Txt,
}

impl FileType {
    pub const ALLOWED: [&'static str; 2] = ["pdf", "txt"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "pdf",
            FileType::Txt => "txt",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            FileType::Pdf => "application/pdf",
            FileType::Txt => "text/plain; charset=utf-8",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pdf" => Some(FileType::Pdf),
            "txt" => Some(FileType::Txt),
            _ => None,
        }
    }
}

/// Indexing lifecycle: `pending` until the worker has chunked and embedded it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Indexed,
    Failed,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Indexed => "indexed",
            DocumentStatus::Failed => "failed",
        }
    }

    /// Unknown values are treated as pending
    pub fn parse(value: &str) -> Self {
        match value {
            "indexed" => DocumentStatus::Indexed,
            "failed" => DocumentStatus::Failed,
            _ => DocumentStatus::Pending,
        }
    }
}
