use crate::features::auth::handlers;
use crate::features::auth::services::AuthService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/token", post(handlers::login))
        .with_state(service)
}

/// Protected auth routes (require a bearer token)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/auth/me", get(handlers::get_me))
        .with_state(service)
}
