use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use crate::core::error::AppError;
use crate::features::auth::models::AuthenticatedUser;

/// `Json<T>` whose failures come back as the usual `{detail}` error body.
///
/// Well-formed JSON of the wrong shape (missing or mistyped fields) is a
/// `Validation` error and also lists the problem under `errors`.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(err) => {
                AppError::Validation(format!("Invalid request body: {}", err.body_text()))
            }
            JsonRejection::JsonSyntaxError(err) => {
                AppError::BadRequest(format!("Malformed JSON: {}", err.body_text()))
            }
            JsonRejection::MissingJsonContentType(_) => {
                AppError::BadRequest("Expected `Content-Type: application/json`".to_string())
            }
            other => AppError::BadRequest(other.body_text()),
        }
    }
}

/// The caller, as placed in request extensions by `auth_middleware`
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
    }
}
