use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::documents::handlers::{
    delete_document, download_document, get_document, list_documents, upload_document,
};
use crate::features::documents::services::DocumentService;

/// Headroom over the file limit for multipart framing
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Create routes for the documents feature
pub fn routes(service: Arc<DocumentService>) -> Router {
    let body_limit = service.max_upload_size() + MULTIPART_OVERHEAD;

    Router::new()
        .route("/documents/", get(list_documents))
        .route("/documents", get(list_documents))
        .route(
            "/documents/upload",
            post(upload_document).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route(
            "/documents/{id}",
            get(get_document).delete(delete_document),
        )
        .route("/documents/{id}/file", get(download_document))
        .with_state(service)
}
