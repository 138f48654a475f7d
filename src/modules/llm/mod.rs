//! Chat-completion providers used for answer generation

mod openai_client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::error::AppError;

pub use openai_client::OpenAiClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options for a single completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Errors raised by remote model providers (chat and embeddings)
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { status: 429, ref message }
                if message.contains("insufficient_quota") =>
            {
                AppError::ServiceUnavailable(
                    "Model provider quota exceeded. Please try again later.".to_string(),
                )
            }
            ProviderError::Api { status: 429, .. } => AppError::RateLimitExceeded(
                "Model provider rate limit exceeded. Please wait and try again.".to_string(),
            ),
            other => AppError::ExternalServiceError(other.to_string()),
        }
    }
}

/// Trait for chat-completion models
///
/// Implementations:
/// - `OpenAiClient`: any OpenAI-compatible `/chat/completions` endpoint
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion over `messages` and return the assistant text
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, ProviderError>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
