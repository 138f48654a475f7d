use axum::{middleware::from_fn_with_state, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::middleware;
use crate::features::auth::routes as auth_routes;
use crate::features::auth::services::{AuthService, TokenService};
use crate::features::documents::{routes as documents_routes, DocumentService};
use crate::features::qa::{routes as qa_routes, QaService};

/// Shared services the HTTP layer dispatches to
#[derive(Clone)]
pub struct AppServices {
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub documents: Arc<DocumentService>,
    pub qa: Arc<QaService>,
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Document QA API",
        "version": env!("CARGO_PKG_VERSION"),
        "docs": "/swagger-ui/",
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// All API routes. Everything except `/`, `/health` and the token
/// endpoints requires a bearer token.
pub fn api_router(services: AppServices) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(documents_routes(services.documents))
        .merge(qa_routes(services.qa))
        .route_layer(from_fn_with_state(
            services.tokens,
            middleware::auth_middleware,
        ));

    let public_routes = Router::new()
        .merge(auth_routes::public_routes(services.auth))
        .route("/", get(root))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}

/// CORS, request ids and request tracing around `router`
pub fn with_http_layers(router: Router, cors_allowed_origins: Vec<String>) -> Router {
    router
        .layer(middleware::cors_layer(cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::Value;

    use crate::shared::constants::{MAX_UPLOAD_SIZE, NO_DOCUMENTS_MESSAGE};
    use crate::shared::test_helpers::TestContext;

    const REPORT: &[u8] = b"Quarterly revenue reached 4.2 million dollars.\n\n\
        The engineering team shipped three releases this quarter.";

    #[tokio::test]
    async fn test_health_and_root_are_public() {
        let ctx = TestContext::new();

        let health = ctx.server.get("/health").await;
        health.assert_status_ok();
        assert_eq!(health.json::<Value>()["status"], "healthy");

        let root = ctx.server.get("/").await;
        root.assert_status_ok();
        assert!(root.json::<Value>()["docs"].is_string());
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let ctx = TestContext::new();

        for path in ["/documents/", "/qa/history", "/qa/index-status", "/auth/me"] {
            let response = ctx.server.get(path).await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert!(response.json::<Value>()["detail"].is_string());
        }

        ctx.server
            .get("/documents/")
            .authorization_bearer("not-a-jwt")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_upload_index_and_ask() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;

        let upload = ctx.upload(&token, "report.txt", REPORT.to_vec()).await;
        upload.assert_status(StatusCode::CREATED);
        let document = upload.json::<Value>();
        assert_eq!(document["filename"], "report.txt");
        assert_eq!(document["file_type"], "txt");
        assert_eq!(document["status"], "pending");

        assert_eq!(ctx.run_indexing().await, 1);

        let list = ctx
            .server
            .get("/documents/")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["status"], "indexed");
        assert_eq!(list[0]["chunk_count"], 1);

        let answer = ctx.ask(&token, "What was the quarterly revenue?").await;
        answer.assert_status_ok();
        let body = answer.json::<Value>();
        assert!(body["answer"]
            .as_str()
            .unwrap()
            .contains("Quarterly revenue reached 4.2 million dollars."));
        assert_eq!(body["source_documents"][0], "report.txt_chunk_0");
        assert!(body["response_time"].as_f64().unwrap() >= 0.0);

        let history = ctx
            .server
            .get("/qa/history")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["question"], "What was the quarterly revenue?");
        assert_eq!(history[0]["source_documents"], "[\"report.txt_chunk_0\"]");
    }

    #[tokio::test]
    async fn test_ask_without_documents() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;

        let response = ctx.ask(&token, "What is in my files?").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["detail"], NO_DOCUMENTS_MESSAGE);

        let history = ctx
            .server
            .get("/qa/history")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;

        let unsupported = ctx.upload(&token, "image.png", vec![0x89, 0x00, 0x01]).await;
        unsupported.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let too_large = ctx
            .upload(&token, "big.txt", vec![b'a'; MAX_UPLOAD_SIZE + 1])
            .await;
        too_large.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            too_large.json::<Value>()["detail"],
            "File size too large. Maximum size is 10MB."
        );

        let over_body_limit = ctx
            .upload(&token, "huge.txt", vec![b'a'; MAX_UPLOAD_SIZE + 2 * 1024 * 1024])
            .await;
        over_body_limit.assert_status(StatusCode::PAYLOAD_TOO_LARGE);

        let list = ctx
            .server
            .get("/documents/")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        assert!(list.is_empty());
    }

    /// Uploads one batch and returns how many requests were rejected with a `detail` body
    async fn upload_batch(ctx: &TestContext, token: &str, batch: &[(&str, Vec<u8>)]) -> usize {
        let mut rejected = 0;
        for (filename, data) in batch {
            let response = ctx.upload(token, filename, data.clone()).await;
            let status = response.status_code();
            if status.is_client_error() {
                assert!(response.json::<Value>()["detail"].is_string());
                rejected += 1;
            } else {
                assert_eq!(status, StatusCode::CREATED);
            }
        }
        rejected
    }

    #[tokio::test]
    async fn test_mixed_batch_keeps_only_valid_files() {
        let ctx = TestContext::new();
        let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        let oversize = vec![b'a'; MAX_UPLOAD_SIZE + 1];

        let valid_first = vec![
            ("a.txt", REPORT.to_vec()),
            ("b.txt", b"Second plain text file.".to_vec()),
            ("image.png", png.clone()),
            ("c.txt", b"Third plain text file.".to_vec()),
            ("big.txt", oversize.clone()),
        ];
        let invalid_first = vec![
            ("big.txt", oversize),
            ("a.txt", REPORT.to_vec()),
            ("image.png", png),
            ("b.txt", b"Second plain text file.".to_vec()),
            ("c.txt", b"Third plain text file.".to_vec()),
        ];

        for batch in [valid_first, invalid_first] {
            let token = ctx.register_and_login().await;
            assert_eq!(upload_batch(&ctx, &token, &batch).await, 2);

            let list = ctx
                .server
                .get("/documents/")
                .authorization_bearer(&token)
                .await
                .json::<Vec<Value>>();
            let mut names: Vec<&str> = list
                .iter()
                .map(|d| d["filename"].as_str().unwrap())
                .collect();
            names.sort_unstable();
            assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
        }
    }

    #[tokio::test]
    async fn test_documents_are_private() {
        let ctx = TestContext::new();
        let alice = ctx.register_and_login().await;
        let bob = ctx.register_and_login().await;

        let document = ctx
            .upload(&alice, "alice.txt", REPORT.to_vec())
            .await
            .json::<Value>();
        let path = format!("/documents/{}", document["id"].as_str().unwrap());

        ctx.server
            .get(&path)
            .authorization_bearer(&bob)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        ctx.server
            .delete(&path)
            .authorization_bearer(&bob)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        ctx.server
            .get("/documents/not-a-uuid")
            .authorization_bearer(&alice)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let bob_list = ctx
            .server
            .get("/documents/")
            .authorization_bearer(&bob)
            .await
            .json::<Vec<Value>>();
        assert!(bob_list.is_empty());

        ctx.server
            .get(&path)
            .authorization_bearer(&alice)
            .await
            .assert_status_ok();

        let file_path = format!("{}/file", path);
        ctx.server
            .get(&file_path)
            .authorization_bearer(&bob)
            .await
            .assert_status(StatusCode::NOT_FOUND);
        let file = ctx.server.get(&file_path).authorization_bearer(&alice).await;
        file.assert_status_ok();
        assert_eq!(file.as_bytes().as_ref(), REPORT);
        assert_eq!(file.header("content-type"), "text/plain; charset=utf-8");
    }

    #[tokio::test]
    async fn test_delete_document() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;

        let document = ctx
            .upload(&token, "report.txt", REPORT.to_vec())
            .await
            .json::<Value>();
        ctx.run_indexing().await;
        let path = format!("/documents/{}", document["id"].as_str().unwrap());

        ctx.ask(&token, "What was the quarterly revenue?")
            .await
            .assert_status_ok();

        let deleted = ctx.server.delete(&path).authorization_bearer(&token).await;
        deleted.assert_status_ok();
        assert_eq!(
            deleted.json::<Value>()["message"],
            "Document deleted successfully"
        );

        ctx.server
            .delete(&path)
            .authorization_bearer(&token)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let status = ctx
            .server
            .get("/qa/index-status")
            .authorization_bearer(&token)
            .await
            .json::<Value>();
        assert_eq!(status["has_documents"], false);
        assert_eq!(status["chunk_count"], 0);

        ctx.ask(&token, "What was the revenue?")
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        let history = ctx
            .server
            .get("/qa/history")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["question"], "What was the quarterly revenue?");
        assert_eq!(history[0]["source_documents"], "[\"report.txt_chunk_0\"]");
    }

    #[tokio::test]
    async fn test_history_newest_first() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;
        ctx.upload(&token, "report.txt", REPORT.to_vec()).await;
        ctx.run_indexing().await;

        for question in ["first question", "second question", "third question"] {
            ctx.ask(&token, question).await.assert_status_ok();
        }

        let history = ctx
            .server
            .get("/qa/history")
            .authorization_bearer(&token)
            .await
            .json::<Vec<Value>>();
        let questions: Vec<&str> = history
            .iter()
            .map(|h| h["question"].as_str().unwrap())
            .collect();
        assert_eq!(
            questions,
            vec!["third question", "second question", "first question"]
        );
    }

    #[tokio::test]
    async fn test_invalid_question_is_rejected() {
        let ctx = TestContext::new();
        let token = ctx.register_and_login().await;

        ctx.ask(&token, "").await.assert_status(StatusCode::BAD_REQUEST);
        ctx.server
            .post("/qa/ask")
            .authorization_bearer(&token)
            .json(&serde_json::json!({ "query": "wrong field" }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}
