mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::router::{api_router, with_http_layers, AppServices};
use crate::core::{database, middleware};
use crate::features::auth::{AuthService, PasswordHasher, PgUserRepository, TokenService};
use crate::features::documents::services::TextChunker;
use crate::features::documents::{
    DocumentRepository, DocumentService, IndexingQueue, IndexingService, IndexingWorker,
    PgDocumentRepository,
};
use crate::features::qa::{AnswerGenerator, PgQueryLogRepository, QaService};
use crate::modules::embeddings::{Embedder, HashingEmbedder};
use crate::modules::llm::{ChatModel, OpenAiClient};
use crate::modules::storage::{InMemoryObjectStorage, MinIOClient, ObjectStorage};
use crate::modules::vector_store::{PgVectorStore, VectorStore};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // Raw file storage
    let storage: Arc<dyn ObjectStorage> = if config.minio.enabled {
        let minio_client = MinIOClient::new(config.minio.clone())
            .await
            .map_err(|e| anyhow::anyhow!("Failed to initialize MinIO client: {}", e))?;
        minio_client
            .ensure_bucket_exists()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to ensure MinIO bucket exists: {}", e))?;
        tracing::info!(
            "MinIO client initialized for bucket: {}",
            minio_client.bucket_name()
        );
        Arc::new(minio_client)
    } else {
        tracing::warn!("MinIO disabled, uploaded files are kept in memory only");
        Arc::new(InMemoryObjectStorage::new())
    };

    // Model providers
    let openai = OpenAiClient::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to create LLM client: {}", e))?
        .map(Arc::new);
    let (chat, embedder): (Option<Arc<dyn ChatModel>>, Arc<dyn Embedder>) = match openai {
        Some(client) => {
            tracing::info!(
                "LLM provider configured (chat: {}, embeddings: {})",
                config.llm.chat_model,
                config.llm.embedding_model
            );
            let chat: Arc<dyn ChatModel> = client.clone();
            (Some(chat), client)
        }
        None => {
            tracing::warn!(
                "No LLM API key configured, using local embeddings and extractive answers"
            );
            (
                None,
                Arc::new(HashingEmbedder::new(config.rag.local_embedding_dimensions)),
            )
        }
    };

    // Repositories
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let documents: Arc<dyn DocumentRepository> = Arc::new(PgDocumentRepository::new(pool.clone()));
    let vector_store: Arc<dyn VectorStore> = Arc::new(PgVectorStore::new(pool.clone()));
    let query_logs = Arc::new(PgQueryLogRepository::new(pool.clone()));

    // Auth
    let token_service = Arc::new(TokenService::new(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        users,
        Arc::clone(&token_service),
        PasswordHasher::default(),
    ));
    tracing::info!("Auth service initialized");

    // Indexing pipeline
    let (indexing_queue, indexing_receiver) = IndexingQueue::channel();
    let indexing_service = Arc::new(IndexingService::new(
        Arc::clone(&documents),
        Arc::clone(&vector_store),
        Arc::clone(&embedder),
        TextChunker::new(config.rag.chunk_size, config.rag.chunk_overlap),
    ));
    IndexingWorker::requeue_pending(documents.as_ref(), &indexing_queue).await?;
    let indexing_worker = IndexingWorker::new(indexing_receiver, indexing_service);
    tokio::spawn(async move {
        indexing_worker.run().await;
    });
    tracing::info!(
        "Document indexing worker spawned (embedder: {}, {} dimensions)",
        embedder.name(),
        embedder.dimensions()
    );

    let document_service = Arc::new(DocumentService::new(
        Arc::clone(&documents),
        Arc::clone(&vector_store),
        storage,
        indexing_queue,
        config.app.max_upload_size,
    ));

    let qa_service = Arc::new(QaService::new(
        documents,
        vector_store,
        embedder,
        AnswerGenerator::new(chat, &config.llm),
        query_logs,
        config.rag.top_k,
    ));
    tracing::info!("Document and QA services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    let services = AppServices {
        auth: auth_service,
        tokens: token_service,
        documents: document_service,
        qa: qa_service,
    };

    let app = with_http_layers(
        Router::new().merge(swagger).merge(api_router(services)),
        config.app.cors_allowed_origins.clone(),
    );

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    socket.set_nodelay(true)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
