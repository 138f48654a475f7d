use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub swagger: SwaggerConfig,
    pub minio: MinIOConfig,
    pub llm: LlmConfig,
    pub rag: RagConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub max_upload_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

/// Local JWT issuing and validation settings
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_ttl: Duration,
    pub jwt_leeway: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for uploaded document files
#[derive(Debug, Clone)]
pub struct MinIOConfig {
    /// When false, uploaded files are kept in process memory only
    pub enabled: bool,
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Access key for authentication
    pub access_key: String,
    /// Secret key for authentication
    pub secret_key: String,
    /// Bucket name for storing files
    pub bucket: String,
    /// AWS region (for S3 compatibility)
    pub region: String,
    /// Prefix under which document files are stored
    pub prefix: String,
}

/// OpenAI-compatible provider settings for chat completions and embeddings
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Without a key the service runs with local embeddings and extractive answers
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub summary_max_tokens: u32,
    pub summary_temperature: f32,
    pub request_timeout: Duration,
}

/// Retrieval settings: chunking, top-k and the local embedder dimension
#[derive(Debug, Clone)]
pub struct RagConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub local_embedding_dimensions: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            minio: MinIOConfig::from_env()?,
            llm: LlmConfig::from_env()?,
            rag: RagConfig::from_env()?,
        })
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, String> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| format!("{} must be a valid number", key)),
        _ => Ok(default),
    }
}

fn parse_bool_env(key: &str, default: bool) -> Result<bool, String> {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_lowercase().as_str() {
            "" => Ok(default),
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("{} must be true or false", key)),
        },
        Err(_) => Ok(default),
    }
}

impl AppConfig {
    const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024; // 10MB

    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "8000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size = parse_env("MAX_UPLOAD_SIZE", Self::DEFAULT_MAX_UPLOAD_SIZE)?;

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            max_upload_size,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        Ok(Self {
            url,
            max_connections: parse_env("DB_MAX_CONNECTIONS", Self::DEFAULT_MAX_CONNECTIONS)?,
            min_connections: parse_env("DB_MIN_CONNECTIONS", Self::DEFAULT_MIN_CONNECTIONS)?,
            acquire_timeout_secs: parse_env(
                "DB_ACQUIRE_TIMEOUT_SECS",
                Self::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
            idle_timeout_secs: parse_env("DB_IDLE_TIMEOUT_SECS", Self::DEFAULT_IDLE_TIMEOUT_SECS)?,
            max_lifetime_secs: parse_env("DB_MAX_LIFETIME_SECS", Self::DEFAULT_MAX_LIFETIME_SECS)?,
        })
    }
}

impl AuthConfig {
    const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: u64 = 30;
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 30;
    const MIN_SECRET_LENGTH: usize = 16;

    pub fn from_env() -> Result<Self, String> {
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| "JWT_SECRET environment variable is required".to_string())?;

        if jwt_secret.len() < Self::MIN_SECRET_LENGTH {
            return Err(format!(
                "JWT_SECRET must be at least {} characters",
                Self::MIN_SECRET_LENGTH
            ));
        }

        let expire_minutes = parse_env(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            Self::DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        let leeway_secs = parse_env("JWT_LEEWAY", Self::DEFAULT_JWT_LEEWAY_SECS)?;

        Ok(Self {
            jwt_secret,
            access_token_ttl: Duration::from_secs(expire_minutes * 60),
            jwt_leeway: Duration::from_secs(leeway_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title =
            env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Document QA API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "1.0.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION").unwrap_or_else(|_| {
            "Question answering over uploaded documents with retrieval-augmented generation"
                .to_string()
        });

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl MinIOConfig {
    pub fn from_env() -> Result<Self, String> {
        let enabled = parse_bool_env("MINIO_ENABLED", true)?;

        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());
        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "docqa-documents".to_string());
        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let prefix = env::var("MINIO_PREFIX").unwrap_or_else(|_| "documents".to_string());

        Ok(Self {
            enabled,
            endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            prefix,
        })
    }
}

impl LlmConfig {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";
    const DEFAULT_CHAT_MODEL: &'static str = "gpt-3.5-turbo";
    const DEFAULT_EMBEDDING_MODEL: &'static str = "text-embedding-3-small";
    const DEFAULT_MAX_TOKENS: u32 = 1000;
    const DEFAULT_TEMPERATURE: f32 = 0.7;
    const DEFAULT_SUMMARY_MAX_TOKENS: u32 = 1500;
    const DEFAULT_SUMMARY_TEMPERATURE: f32 = 0.3;
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("OPENAI_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| Self::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let chat_model =
            env::var("OPENAI_CHAT_MODEL").unwrap_or_else(|_| Self::DEFAULT_CHAT_MODEL.to_string());
        let embedding_model = env::var("OPENAI_EMBEDDING_MODEL")
            .unwrap_or_else(|_| Self::DEFAULT_EMBEDDING_MODEL.to_string());

        let timeout_secs = parse_env(
            "LLM_REQUEST_TIMEOUT_SECS",
            Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_key,
            base_url,
            chat_model,
            embedding_model,
            max_tokens: parse_env("LLM_MAX_TOKENS", Self::DEFAULT_MAX_TOKENS)?,
            temperature: parse_env("LLM_TEMPERATURE", Self::DEFAULT_TEMPERATURE)?,
            summary_max_tokens: parse_env(
                "LLM_SUMMARY_MAX_TOKENS",
                Self::DEFAULT_SUMMARY_MAX_TOKENS,
            )?,
            summary_temperature: parse_env(
                "LLM_SUMMARY_TEMPERATURE",
                Self::DEFAULT_SUMMARY_TEMPERATURE,
            )?,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl RagConfig {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_CHUNK_OVERLAP: usize = 200;
    pub const DEFAULT_TOP_K: usize = 4;
    pub const DEFAULT_LOCAL_EMBEDDING_DIMENSIONS: usize = 384;

    pub fn from_env() -> Result<Self, String> {
        let chunk_size = parse_env("RAG_CHUNK_SIZE", Self::DEFAULT_CHUNK_SIZE)?;
        let chunk_overlap = parse_env("RAG_CHUNK_OVERLAP", Self::DEFAULT_CHUNK_OVERLAP)?;
        let top_k = parse_env("RAG_TOP_K", Self::DEFAULT_TOP_K)?;
        let local_embedding_dimensions = parse_env(
            "RAG_LOCAL_EMBEDDING_DIMENSIONS",
            Self::DEFAULT_LOCAL_EMBEDDING_DIMENSIONS,
        )?;

        if chunk_size == 0 {
            return Err("RAG_CHUNK_SIZE must be greater than zero".to_string());
        }
        if chunk_overlap >= chunk_size {
            return Err("RAG_CHUNK_OVERLAP must be smaller than RAG_CHUNK_SIZE".to_string());
        }
        if top_k == 0 {
            return Err("RAG_TOP_K must be greater than zero".to_string());
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
            top_k,
            local_embedding_dimensions,
        })
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            chunk_overlap: Self::DEFAULT_CHUNK_OVERLAP,
            top_k: Self::DEFAULT_TOP_K,
            local_embedding_dimensions: Self::DEFAULT_LOCAL_EMBEDDING_DIMENSIONS,
        }
    }
}
