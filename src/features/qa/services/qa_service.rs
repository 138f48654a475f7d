use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::documents::repositories::DocumentRepository;
use crate::features::qa::dtos::{AnswerResponseDto, IndexStatusDto, QueryLogResponseDto};
use crate::features::qa::models::NewQueryLog;
use crate::features::qa::repositories::QueryLogRepository;
use crate::features::qa::services::AnswerGenerator;
use crate::modules::embeddings::Embedder;
use crate::modules::vector_store::VectorStore;
use crate::shared::constants::{
    MAX_QUESTION_LENGTH, NO_DOCUMENTS_MESSAGE, NO_RELEVANT_CONTEXT_MESSAGE,
};

const SAMPLE_SOURCES: usize = 3;

/// Retrieval-augmented question answering over a user's documents
pub struct QaService {
    documents: Arc<dyn DocumentRepository>,
    vector_store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    generator: AnswerGenerator,
    logs: Arc<dyn QueryLogRepository>,
    top_k: usize,
}

impl QaService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        generator: AnswerGenerator,
        logs: Arc<dyn QueryLogRepository>,
        top_k: usize,
    ) -> Self {
        Self {
            documents,
            vector_store,
            embedder,
            generator,
            logs,
            top_k,
        }
    }

    /// Answer a question from the caller's own documents and log the exchange.
    ///
    /// Fails with `NoDocuments` (and logs nothing) when the user has not
    /// uploaded anything yet.
    pub async fn ask(&self, user_id: Uuid, question: &str) -> Result<AnswerResponseDto> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::Validation("Question cannot be empty".to_string()));
        }
        if question.chars().count() > MAX_QUESTION_LENGTH {
            return Err(AppError::Validation(format!(
                "Question must be at most {} characters",
                MAX_QUESTION_LENGTH
            )));
        }

        let stats = self.documents.stats_for_user(user_id).await?;
        if stats.total == 0 {
            return Err(AppError::NoDocuments(NO_DOCUMENTS_MESSAGE.to_string()));
        }

        let started = Instant::now();

        let query_embedding = self.embedder.embed(question).await?;
        let hits = self
            .vector_store
            .search(user_id, &query_embedding, self.top_k)
            .await?;

        debug!(
            user_id = %user_id,
            hits = hits.len(),
            embedder = self.embedder.name(),
            "Retrieved context"
        );

        let (answer, sources) = if hits.is_empty() {
            (NO_RELEVANT_CONTEXT_MESSAGE.to_string(), Vec::new())
        } else {
            let answer = self.generator.generate(question, &hits).await;
            let mut sources: Vec<String> = Vec::with_capacity(hits.len());
            for hit in &hits {
                if !sources.contains(&hit.chunk.source) {
                    sources.push(hit.chunk.source.clone());
                }
            }
            (answer, sources)
        };

        let response_time = started.elapsed().as_secs_f64();

        let source_documents = if sources.is_empty() {
            None
        } else {
            Some(
                serde_json::to_string(&sources)
                    .map_err(|e| AppError::Internal(format!("Failed to encode sources: {}", e)))?,
            )
        };

        self.logs
            .insert(NewQueryLog {
                user_id,
                question: question.to_string(),
                response: answer.clone(),
                response_time,
                source_documents,
            })
            .await?;

        info!(
            user_id = %user_id,
            sources = sources.len(),
            response_time,
            "Answered question"
        );

        Ok(AnswerResponseDto {
            answer,
            response_time,
            source_documents: sources,
        })
    }

    /// The caller's answered questions, newest first
    pub async fn history(&self, user_id: Uuid) -> Result<Vec<QueryLogResponseDto>> {
        let logs = self.logs.list_by_user(user_id).await?;
        Ok(logs.into_iter().map(QueryLogResponseDto::from).collect())
    }

    pub async fn index_status(&self, user_id: Uuid) -> Result<IndexStatusDto> {
        let stats = self.documents.stats_for_user(user_id).await?;
        let chunk_count = self.vector_store.count_for_user(user_id).await?;
        let sample_sources = self
            .vector_store
            .sample_sources(user_id, SAMPLE_SOURCES)
            .await?;

        Ok(IndexStatusDto {
            has_documents: stats.total > 0,
            document_count: stats.total,
            indexed_documents: stats.indexed,
            chunk_count,
            sample_sources,
        })
    }
}
