use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::AppError;
use crate::features::auth::models::AuthenticatedUser;
use crate::features::documents::dtos::{DocumentResponseDto, UploadDocumentDto};
use crate::features::documents::services::DocumentService;
use crate::shared::types::{ErrorResponse, MessageResponse};

fn multipart_error(service: &DocumentService, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return service.too_large_error();
    }
    debug!("Failed to read multipart data: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e.body_text()))
}

/// Unparseable ids cannot name an existing document
fn parse_document_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("Document not found".to_string()))
}

/// List the caller's documents, newest first
#[utoipa::path(
    get,
    path = "/documents/",
    tag = "documents",
    responses(
        (status = 200, description = "Documents owned by the caller", body = Vec<DocumentResponseDto>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
) -> Result<Json<Vec<DocumentResponseDto>>, AppError> {
    let documents = service.list(user.user_id).await?;
    Ok(Json(documents))
}

/// Upload a document
///
/// Accepts multipart/form-data with a single `file` field. The type is
/// detected from the file content: PDF or plain text.
#[utoipa::path(
    post,
    path = "/documents/upload",
    tag = "documents",
    request_body(
        content = UploadDocumentDto,
        content_type = "multipart/form-data",
        description = "PDF or plain-text file, at most 10MB",
    ),
    responses(
        (status = 201, description = "Document stored and queued for indexing", body = DocumentResponseDto),
        (status = 400, description = "Missing file, empty or unreadable content", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentResponseDto>), AppError> {
    let mut file: Option<(Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&service, e))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            let file_name = field.file_name().map(|s| s.to_string());
            let data = field
                .bytes()
                .await
                .map_err(|e| multipart_error(&service, e))?;
            file = Some((file_name, data.to_vec()));
        } else {
            debug!("Ignoring unknown field: {}", field_name);
        }
    }

    let (file_name, data) =
        file.ok_or_else(|| AppError::BadRequest("File is required".to_string()))?;

    let document = service
        .upload(user.user_id, file_name.as_deref(), data)
        .await?;

    Ok((StatusCode::CREATED, Json(document)))
}

/// Get one of the caller's documents
#[utoipa::path(
    get,
    path = "/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document metadata", body = DocumentResponseDto),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponseDto>, AppError> {
    let document_id = parse_document_id(&id)?;
    let document = service.get(user.user_id, document_id).await?;
    Ok(Json(document))
}

/// Delete a document with its indexed chunks and stored file
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document deleted", body = MessageResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let document_id = parse_document_id(&id)?;
    service.delete(user.user_id, document_id).await?;
    Ok(Json(MessageResponse::new("Document deleted successfully")))
}

/// Download the original uploaded file
#[utoipa::path(
    get,
    path = "/documents/{id}/file",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "The uploaded file, as PDF or plain text"),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let document_id = parse_document_id(&id)?;
    let (filename, file_type, data) = service.download(user.user_id, document_id).await?;

    // Non-ASCII names cannot go into a plain header value
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        filename.replace(['"', '\\'], "")
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(file_type.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}
