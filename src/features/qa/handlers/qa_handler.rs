use axum::{extract::State, Json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::models::AuthenticatedUser;
use crate::features::qa::dtos::{
    AnswerResponseDto, AskQuestionDto, IndexStatusDto, QueryLogResponseDto,
};
use crate::features::qa::services::QaService;
use crate::shared::types::ErrorResponse;

/// Ask a question about your uploaded documents
///
/// Retrieves the most relevant chunks of the caller's documents and answers
/// from them. Questions asking for a summary get a summary instead.
#[utoipa::path(
    post,
    path = "/qa/ask",
    tag = "qa",
    request_body = AskQuestionDto,
    responses(
        (status = 200, description = "Answer with its sources", body = AnswerResponseDto),
        (status = 400, description = "Invalid question or no documents uploaded", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 429, description = "Model provider rate limit", body = ErrorResponse),
        (status = 502, description = "Model provider error", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn ask_question(
    user: AuthenticatedUser,
    State(service): State<Arc<QaService>>,
    AppJson(dto): AppJson<AskQuestionDto>,
) -> Result<Json<AnswerResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let answer = service.ask(user.user_id, &dto.question).await?;
    Ok(Json(answer))
}

/// The caller's question history, newest first
#[utoipa::path(
    get,
    path = "/qa/history",
    tag = "qa",
    responses(
        (status = 200, description = "Answered questions", body = Vec<QueryLogResponseDto>),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_history(
    user: AuthenticatedUser,
    State(service): State<Arc<QaService>>,
) -> Result<Json<Vec<QueryLogResponseDto>>> {
    let history = service.history(user.user_id).await?;
    Ok(Json(history))
}

/// Indexing diagnostics for the caller's documents
#[utoipa::path(
    get,
    path = "/qa/index-status",
    tag = "qa",
    responses(
        (status = 200, description = "Document and chunk counts", body = IndexStatusDto),
        (status = 401, description = "Authentication required", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_index_status(
    user: AuthenticatedUser,
    State(service): State<Arc<QaService>>,
) -> Result<Json<IndexStatusDto>> {
    let status = service.index_status(user.user_id).await?;
    Ok(Json(status))
}
