/// Maximum accepted upload size in bytes (10MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Extracted text shorter than this (after trimming) is rejected
pub const MIN_CONTENT_LENGTH: usize = 10;

/// Maximum accepted question length in characters
pub const MAX_QUESTION_LENGTH: usize = 2000;

// =============================================================================
// QA RESPONSES
// =============================================================================

pub const NO_DOCUMENTS_MESSAGE: &str =
    "No documents uploaded yet. Please upload a document before asking questions.";

pub const NO_RELEVANT_CONTEXT_MESSAGE: &str = "I found your documents but couldn't find specific information to answer your question. Please try rephrasing your question or ask about a different topic.";

pub const FALLBACK_NO_MATCH_MESSAGE: &str = "I found some documents but couldn't find specific information to answer your question. Please try rephrasing your question or upload more relevant documents.";
