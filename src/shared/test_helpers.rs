//! In-process application wiring for HTTP-level tests

use axum_test::multipart::{MultipartForm, Part};
use axum_test::{TestResponse, TestServer};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::core::config::{AuthConfig, LlmConfig, RagConfig};
use crate::core::router::{api_router, AppServices};
use crate::features::auth::repositories::InMemoryUserRepository;
use crate::features::auth::{AuthService, PasswordHasher, TokenService};
use crate::features::documents::repositories::InMemoryDocumentRepository;
use crate::features::documents::services::TextChunker;
use crate::features::documents::{
    DocumentRepository, DocumentService, IndexingQueue, IndexingService, IndexingWorker,
};
use crate::features::qa::repositories::InMemoryQueryLogRepository;
use crate::features::qa::{AnswerGenerator, QaService};
use crate::modules::embeddings::{Embedder, HashingEmbedder};
use crate::modules::storage::InMemoryObjectStorage;
use crate::modules::vector_store::{InMemoryVectorStore, VectorStore};
use crate::shared::constants::MAX_UPLOAD_SIZE;

pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret-that-is-long-enough-for-hs256".to_string(),
        access_token_ttl: Duration::from_secs(30 * 60),
        jwt_leeway: Duration::from_secs(0),
    }
}

/// No API key, so answers are generated extractively
pub fn test_llm_config() -> LlmConfig {
    LlmConfig {
        api_key: None,
        base_url: "http://localhost:0/v1".to_string(),
        chat_model: "test-chat".to_string(),
        embedding_model: "test-embedding".to_string(),
        max_tokens: 1000,
        temperature: 0.7,
        summary_max_tokens: 1500,
        summary_temperature: 0.3,
        request_timeout: Duration::from_secs(1),
    }
}

/// The full router over in-memory backends.
///
/// Indexing does not run in the background: call [`TestContext::run_indexing`]
/// to process queued uploads deterministically.
pub struct TestContext {
    pub server: TestServer,
    worker: Mutex<IndexingWorker>,
}

impl TestContext {
    pub fn new() -> Self {
        let rag = RagConfig::default();
        let documents: Arc<dyn DocumentRepository> = Arc::new(InMemoryDocumentRepository::new());
        let vector_store: Arc<dyn VectorStore> = Arc::new(InMemoryVectorStore::new());
        let embedder: Arc<dyn Embedder> =
            Arc::new(HashingEmbedder::new(rag.local_embedding_dimensions));

        let tokens = Arc::new(TokenService::new(&test_auth_config()));
        let auth = Arc::new(AuthService::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::clone(&tokens),
            PasswordHasher::new(1_000),
        ));

        let (queue, receiver) = IndexingQueue::channel();
        let indexing = Arc::new(IndexingService::new(
            Arc::clone(&documents),
            Arc::clone(&vector_store),
            Arc::clone(&embedder),
            TextChunker::new(rag.chunk_size, rag.chunk_overlap),
        ));

        let document_service = Arc::new(DocumentService::new(
            Arc::clone(&documents),
            Arc::clone(&vector_store),
            Arc::new(InMemoryObjectStorage::new()),
            queue,
            MAX_UPLOAD_SIZE,
        ));
        let qa = Arc::new(QaService::new(
            documents,
            vector_store,
            embedder,
            AnswerGenerator::new(None, &test_llm_config()),
            Arc::new(InMemoryQueryLogRepository::new()),
            rag.top_k,
        ));

        let app = api_router(AppServices {
            auth,
            tokens,
            documents: document_service,
            qa,
        });

        Self {
            server: TestServer::new(app).expect("failed to start test server"),
            worker: Mutex::new(IndexingWorker::new(receiver, indexing)),
        }
    }

    /// Process every upload queued so far
    pub async fn run_indexing(&self) -> usize {
        self.worker.lock().await.drain().await
    }

    /// Register a fresh user and return a bearer token for it
    pub async fn register_and_login(&self) -> String {
        let email: String = SafeEmail().fake();
        self.server
            .post("/auth/register")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await
            .assert_status(axum::http::StatusCode::CREATED);

        let response = self
            .server
            .post("/auth/token")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["access_token"]
            .as_str()
            .expect("token response has no access_token")
            .to_string()
    }

    pub async fn upload(&self, token: &str, filename: &str, data: Vec<u8>) -> TestResponse {
        let form = MultipartForm::new().add_part(
            "file",
            Part::bytes(data)
                .file_name(filename.to_string())
                .mime_type("application/octet-stream"),
        );
        self.server
            .post("/documents/upload")
            .authorization_bearer(token)
            .multipart(form)
            .await
    }

    pub async fn ask(&self, token: &str, question: &str) -> TestResponse {
        self.server
            .post("/qa/ask")
            .authorization_bearer(token)
            .json(&json!({ "question": question }))
            .await
    }
}
