use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Matches questions asking for a summary rather than a specific answer
    /// - Matches: "Summarize the report", "give me a summary", "SUMMARISE this"
    /// - Does not match: "summaries of sales" (plural noun), "summarizer config"
    pub static ref SUMMARY_INTENT_REGEX: Regex =
        Regex::new(r"(?i)\b(summari[sz]e|summary|summarization|summarisation)\b").unwrap();

    /// Word tokens used for keyword matching and feature hashing
    pub static ref WORD_REGEX: Regex = Regex::new(r"[\p{L}\p{N}]+").unwrap();
}

/// Returns true if the question asks for a summary of the documents
pub fn is_summary_request(question: &str) -> bool {
    SUMMARY_INTENT_REGEX.is_match(question)
}

/// Lowercased word tokens of `text`
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}
