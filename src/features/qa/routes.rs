use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::qa::handlers::{ask_question, get_history, get_index_status};
use crate::features::qa::services::QaService;

/// Create routes for the qa feature
pub fn routes(service: Arc<QaService>) -> Router {
    Router::new()
        .route("/qa/ask", post(ask_question))
        .route("/qa/history", get(get_history))
        .route("/qa/index-status", get(get_index_status))
        .with_state(service)
}
