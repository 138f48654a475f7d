//! Content-based file type detection and text extraction

use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::documents::models::FileType;

const PDF_MAGIC: &[u8] = b"%PDF-";
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Sniff the upload's type from its bytes. The client-declared MIME type is ignored.
pub fn detect_file_type(data: &[u8]) -> Option<FileType> {
    if data.starts_with(PDF_MAGIC) {
        Some(FileType::Pdf)
    } else if decode_text(data).is_some() {
        Some(FileType::Txt)
    } else {
        None
    }
}

/// Decode plain text as UTF-8, falling back to Latin-1.
///
/// Returns `None` for binary data (NUL and other C0 control bytes besides
/// tab, newline, carriage return and form feed).
pub fn decode_text(data: &[u8]) -> Option<String> {
    if data.iter().any(|&b| is_binary_control(b)) {
        return None;
    }

    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(text) => Some(text.to_string()),
        Err(_) => Some(data.iter().map(|&b| b as char).collect()),
    }
}

fn is_binary_control(byte: u8) -> bool {
    byte < 0x20 && !matches!(byte, b'\t' | b'\n' | b'\r' | 0x0C)
}

/// An upload after type detection, still owning its raw bytes
#[derive(Debug)]
pub struct ExtractedFile {
    pub file_type: FileType,
    pub text: String,
    pub data: Vec<u8>,
}

/// Detect the type and extract the text of an uploaded file.
///
/// The bytes are handed back in [`ExtractedFile::data`] for storage.
pub async fn extract_text(data: Vec<u8>) -> Result<ExtractedFile> {
    let file_type = detect_file_type(&data).ok_or_else(|| {
        AppError::UnsupportedType(format!(
            "Unsupported file type. Only .{} files are supported.",
            FileType::ALLOWED.join(" and .")
        ))
    })?;

    let (text, data) = match file_type {
        FileType::Txt => (decode_text(&data).unwrap_or_default(), data),
        FileType::Pdf => extract_pdf_text(data).await?,
    };

    debug!(file_type = file_type.as_str(), chars = text.len(), "Extracted document text");
    Ok(ExtractedFile {
        file_type,
        text,
        data,
    })
}

/// PDF parsing is CPU-bound and may panic on malformed input, so it runs on
/// the blocking pool where a panic surfaces as a `JoinError`.
async fn extract_pdf_text(data: Vec<u8>) -> Result<(String, Vec<u8>)> {
    let (outcome, data) = tokio::task::spawn_blocking(move || {
        let outcome = pdf_extract::extract_text_from_mem(&data);
        (outcome, data)
    })
    .await
    .map_err(|e| AppError::BadRequest(format!("Error processing PDF file: {}", e)))?;

    let text =
        outcome.map_err(|e| AppError::BadRequest(format!("Error processing PDF file: {}", e)))?;
    Ok((text, data))
}
