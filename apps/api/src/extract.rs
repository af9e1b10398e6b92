//! Text Extractor: turns an uploaded PDF into plain text.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

const PREVIEW_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("could not read the document: {0}")]
    Unreadable(String),

    #[error("no extractable text found in the document (is it a scanned image?)")]
    NoText,
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, data: Bytes) -> Result<String, ExtractionError>;
}

/// PDF text extraction via `pdf-extract`. Runs on the blocking pool: parsing is
/// CPU-bound and the library may panic on hostile input.
#[derive(Debug, Default)]
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: Bytes) -> Result<String, ExtractionError> {
        let size = data.len();
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| ExtractionError::Unreadable(format!("extraction aborted: {e}")))?
        .map_err(ExtractionError::Unreadable)?;

        let text = require_text(text)?;
        info!("Extracted {} chars from {} byte PDF", text.len(), size);
        Ok(text)
    }
}

/// Whitespace-only output is a failure, not an empty success.
pub fn require_text(text: String) -> Result<String, ExtractionError> {
    if text.trim().is_empty() {
        warn!("Document produced no extractable text");
        return Err(ExtractionError::NoText);
    }
    Ok(text)
}

/// First 500 characters of extracted text, with `...` appended when truncated.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
