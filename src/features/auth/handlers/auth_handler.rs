use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, TokenResponseDto, UserResponseDto,
};
use crate::features::auth::models::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ErrorResponse;
use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use validator::Validate;

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(StatusCode, Json<UserResponseDto>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.register(dto).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Exchange email and password for an access token
#[utoipa::path(
    post,
    path = "/auth/token",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = TokenResponseDto),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<Json<TokenResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let token = service.login(dto).await?;
    Ok(Json(token))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = UserResponseDto),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    tag = "auth",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<UserResponseDto>> {
    let user = service.current_user(&user).await?;
    Ok(Json(user))
}
