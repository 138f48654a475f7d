use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ChatMessage, ChatModel, CompletionOptions, ProviderError};
use crate::core::config::LlmConfig;
use crate::modules::embeddings::Embedder;

/// Client for OpenAI-compatible chat completion and embedding endpoints
pub struct OpenAiClient {
    http: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    embedding_model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Returns `None` when no API key is configured
    pub fn from_config(config: &LlmConfig) -> Result<Option<Self>, ProviderError> {
        let Some(api_key) = config.api_key.clone() else {
            return Ok(None);
        };

        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Some(Self {
            http,
            api_key,
            base_url: config.base_url.clone(),
            chat_model: config.chat_model.clone(),
            embedding_model: config.embedding_model.clone(),
        }))
    }

    async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ProviderError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, message });
        }

        Ok(resp.json::<R>().await?)
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: CompletionOptions,
    ) -> Result<String, ProviderError> {
        let body = ChatCompletionRequest {
            model: &self.chat_model,
            messages,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        };

        let response: ChatCompletionResponse = self.post_json("/chat/completions", &body).await?;
        let content = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".into()))?;

        debug!(model = %self.chat_model, chars = content.len(), "Chat completion received");
        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, ProviderError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| ProviderError::InvalidResponse("empty embedding response".into()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let response: EmbeddingResponse = self.post_json("/embeddings", &body).await?;
        if response.data.len() != texts.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }

        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimensions(&self) -> usize {
        match self.embedding_model.as_str() {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }

    fn name(&self) -> &str {
        "openai"
    }
}
