use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::config::LlmConfig;
use crate::modules::llm::{ChatMessage, ChatModel, CompletionOptions};
use crate::modules::vector_store::ScoredChunk;
use crate::shared::constants::FALLBACK_NO_MATCH_MESSAGE;
use crate::shared::prompts::render_template;
use crate::shared::validation::{is_summary_request, tokenize};

/// Characters kept per excerpt in extractive answers
const EXCERPT_CHARS: usize = 200;
const MAX_EXCERPTS: usize = 3;
const SUMMARY_SENTENCES: usize = 5;
/// Shorter question words are too common to be useful keywords
const MIN_KEYWORD_CHARS: usize = 4;

#[derive(Serialize)]
struct PromptChunk<'a> {
    source: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct PromptContext<'a> {
    chunks: Vec<PromptChunk<'a>>,
}

impl<'a> PromptContext<'a> {
    fn new(chunks: &'a [ScoredChunk]) -> Self {
        Self {
            chunks: chunks
                .iter()
                .map(|c| PromptChunk {
                    source: &c.chunk.source,
                    content: &c.chunk.content,
                })
                .collect(),
        }
    }
}

/// Turns retrieved chunks into an answer.
///
/// Uses the chat model when one is configured. Without one, or when the
/// provider fails, it answers extractively from the chunks themselves.
pub struct AnswerGenerator {
    chat: Option<Arc<dyn ChatModel>>,
    answer_options: CompletionOptions,
    summary_options: CompletionOptions,
}

impl AnswerGenerator {
    pub fn new(chat: Option<Arc<dyn ChatModel>>, config: &LlmConfig) -> Self {
        Self {
            chat,
            answer_options: CompletionOptions {
                max_tokens: config.max_tokens,
                temperature: config.temperature,
            },
            summary_options: CompletionOptions {
                max_tokens: config.summary_max_tokens,
                temperature: config.summary_temperature,
            },
        }
    }

    pub async fn generate(&self, question: &str, chunks: &[ScoredChunk]) -> String {
        if is_summary_request(question) {
            self.summarize(chunks).await
        } else {
            self.answer(question, chunks).await
        }
    }

    async fn answer(&self, question: &str, chunks: &[ScoredChunk]) -> String {
        let Some(chat) = &self.chat else {
            return extractive_answer(question, chunks);
        };

        let messages = match render_template("qa/answer_system.jinja", &PromptContext::new(chunks))
        {
            Ok(system) => vec![ChatMessage::system(system), ChatMessage::user(question)],
            Err(e) => {
                warn!("Failed to render answer prompt: {}", e);
                return extractive_answer(question, chunks);
            }
        };

        match chat.complete(&messages, self.answer_options).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!(
                    provider = chat.name(),
                    model = chat.model(),
                    "Chat completion failed, answering extractively: {}",
                    e
                );
                extractive_answer(question, chunks)
            }
        }
    }

    async fn summarize(&self, chunks: &[ScoredChunk]) -> String {
        let Some(chat) = &self.chat else {
            return extractive_summary(chunks);
        };

        let context = PromptContext::new(chunks);
        let messages = match (
            render_template("qa/summary_system.jinja", &context),
            render_template("qa/summary_user.jinja", &context),
        ) {
            (Ok(system), Ok(user)) => vec![ChatMessage::system(system), ChatMessage::user(user)],
            (Err(e), _) | (_, Err(e)) => {
                warn!("Failed to render summary prompt: {}", e);
                return extractive_summary(chunks);
            }
        };

        match chat.complete(&messages, self.summary_options).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(
                    provider = chat.name(),
                    model = chat.model(),
                    "Summarization failed, summarizing extractively: {}",
                    e
                );
                extractive_summary(chunks)
            }
        }
    }
}

/// Keyword-overlap answer: up to three excerpts from chunks that mention a
/// word of the question longer than three characters
pub fn extractive_answer(question: &str, chunks: &[ScoredChunk]) -> String {
    let keywords: Vec<String> = tokenize(question)
        .into_iter()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .collect();

    let excerpts: Vec<String> = chunks
        .iter()
        .filter(|c| {
            let content = c.chunk.content.to_lowercase();
            keywords.iter().any(|k| content.contains(k.as_str()))
        })
        .take(MAX_EXCERPTS)
        .map(|c| format!("{}...", excerpt(&c.chunk.content, EXCERPT_CHARS)))
        .collect();

    debug!(keywords = keywords.len(), excerpts = excerpts.len(), "Extractive answer");

    if excerpts.is_empty() {
        FALLBACK_NO_MATCH_MESSAGE.to_string()
    } else {
        format!(
            "Based on the documents, here's what I found:\n\n{}",
            excerpts.join("\n\n")
        )
    }
}

/// Lead sentences of the retrieved text
pub fn extractive_summary(chunks: &[ScoredChunk]) -> String {
    let all_content = chunks
        .iter()
        .map(|c| c.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let lead = all_content
        .split(". ")
        .take(SUMMARY_SENTENCES)
        .collect::<Vec<_>>()
        .join(". ");

    format!("Summary of documents:\n\n{}...", lead)
}

fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
