use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::dtos::DocumentResponseDto;
use crate::features::documents::models::{FileType, NewDocument};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::documents::services::extraction_service::{self, ExtractedFile};
use crate::features::documents::workers::IndexingQueue;
use crate::modules::storage::ObjectStorage;
use crate::modules::vector_store::VectorStore;
use crate::shared::constants::MIN_CONTENT_LENGTH;

const MAX_FILENAME_LENGTH: usize = 255;

/// Service for document upload, listing and deletion
pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    vector_store: Arc<dyn VectorStore>,
    storage: Arc<dyn ObjectStorage>,
    queue: IndexingQueue,
    max_upload_size: usize,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        vector_store: Arc<dyn VectorStore>,
        storage: Arc<dyn ObjectStorage>,
        queue: IndexingQueue,
        max_upload_size: usize,
    ) -> Self {
        Self {
            documents,
            vector_store,
            storage,
            queue,
            max_upload_size,
        }
    }

    pub fn max_upload_size(&self) -> usize {
        self.max_upload_size
    }

    pub fn too_large_error(&self) -> AppError {
        AppError::TooLarge(format!(
            "File size too large. Maximum size is {}MB.",
            self.max_upload_size / (1024 * 1024)
        ))
    }

    /// Validate, extract, store and enqueue an uploaded file.
    ///
    /// Every check runs before anything is written, so a rejected upload
    /// leaves no trace.
    pub async fn upload(
        &self,
        user_id: Uuid,
        filename: Option<&str>,
        data: Vec<u8>,
    ) -> Result<DocumentResponseDto> {
        if data.len() > self.max_upload_size {
            return Err(self.too_large_error());
        }
        if data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty.".to_string()));
        }

        let file_size = data.len() as i64;
        let ExtractedFile {
            file_type,
            text: content,
            data,
        } = extraction_service::extract_text(data).await?;

        if content.trim().chars().count() < MIN_CONTENT_LENGTH {
            return Err(AppError::BadRequest(
                "File content is too short or empty.".to_string(),
            ));
        }

        let document_id = Uuid::now_v7();
        let filename = sanitize_filename(filename, file_type.as_str());
        let storage_key = self.storage.document_key(
            &user_id.to_string(),
            &document_id.to_string(),
            file_type.as_str(),
        );

        self.storage
            .upload(&storage_key, data, file_type.content_type())
            .await?;

        let inserted = self
            .documents
            .insert(NewDocument {
                id: document_id,
                user_id,
                filename,
                file_type,
                file_size,
                storage_key: storage_key.clone(),
                content,
            })
            .await;

        let document = match inserted {
            Ok(document) => document,
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    warn!("Failed to remove orphaned object '{}': {}", storage_key, cleanup);
                }
                return Err(e);
            }
        };

        self.queue.enqueue(document.id);

        info!(
            document_id = %document.id,
            %user_id,
            file_type = file_type.as_str(),
            file_size,
            storage = self.storage.name(),
            "Document uploaded"
        );

        Ok(document.into())
    }

    pub async fn list(&self, user_id: Uuid) -> Result<Vec<DocumentResponseDto>> {
        let documents = self.documents.list_by_user(user_id).await?;
        Ok(documents.into_iter().map(Into::into).collect())
    }

    pub async fn get(&self, user_id: Uuid, document_id: Uuid) -> Result<DocumentResponseDto> {
        self.documents
            .find_for_user(document_id, user_id)
            .await?
            .map(Into::into)
            .ok_or_else(not_found)
    }

    /// Remove the document, its chunks and its stored file
    pub async fn delete(&self, user_id: Uuid, document_id: Uuid) -> Result<()> {
        let document = self
            .documents
            .find_for_user(document_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let removed_chunks = self.vector_store.delete_document(document.id).await?;

        if !self.documents.delete_for_user(document.id, user_id).await? {
            return Err(not_found());
        }

        if let Err(e) = self.storage.delete(&document.storage_key).await {
            warn!(
                "Document {} deleted but its file '{}' could not be removed: {}",
                document.id, document.storage_key, e
            );
        }

        info!(%document_id, removed_chunks, "Document deleted");
        Ok(())
    }

    /// The original uploaded file with its filename and content type
    pub async fn download(
        &self,
        user_id: Uuid,
        document_id: Uuid,
    ) -> Result<(String, FileType, Vec<u8>)> {
        let document = self
            .documents
            .find_for_user(document_id, user_id)
            .await?
            .ok_or_else(not_found)?;

        let file_type = FileType::parse(&document.file_type).unwrap_or(FileType::Txt);
        let data = self.storage.download(&document.storage_key).await?;
        Ok((document.filename, file_type, data))
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Document not found".to_string())
}

/// Keep only the final path component of a client-supplied filename
fn sanitize_filename(filename: Option<&str>, extension: &str) -> String {
    let name = filename
        .and_then(|f| f.rsplit(['/', '\\']).next())
        .map(str::trim)
        .filter(|f| !f.is_empty() && *f != "." && *f != "..");

    match name {
        Some(name) => name.chars().take(MAX_FILENAME_LENGTH).collect(),
        None => format!("document.{}", extension),
    }
}
