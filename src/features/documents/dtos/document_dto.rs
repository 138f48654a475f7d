use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::documents::models::{Document, DocumentStatus, FileType};

/// Multipart form for document upload (OpenAPI only)
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentDto {
    /// PDF or plain-text file, at most 10MB
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentResponseDto {
    pub id: Uuid,
    pub filename: String,
    pub file_type: FileType,
    /// Size of the uploaded file in bytes
    pub file_size: i64,
    pub status: DocumentStatus,
    pub chunk_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl From<Document> for DocumentResponseDto {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            file_type: FileType::parse(&doc.file_type).unwrap_or(FileType::Txt),
            status: DocumentStatus::parse(&doc.status),
            filename: doc.filename,
            file_size: doc.file_size,
            chunk_count: doc.chunk_count,
            error_message: doc.error_message,
            uploaded_at: doc.uploaded_at,
        }
    }
}
