//! Document text extraction
//!
//! Turns DOCX, PDF, and plain-text uploads into a prompt-ready string. Parser
//! failures surface as [`Error::Extraction`]; a document that parses but holds
//! no text surfaces as [`Error::EmptyContent`].

pub mod docx;
pub mod pdf;

use crate::models::DocumentFormat;
use crate::prompts::TRUNCATION_MARKER;
use crate::{Error, Result};

/// Maximum number of characters forwarded to the model.
pub const MAX_DOCUMENT_CHARS: usize = 200_000;

/// Extracts, validates, and truncates the text of a document upload.
///
/// DOCX and PDF parsing run on the blocking pool.
pub async fn extract_text(format: DocumentFormat, bytes: Vec<u8>) -> Result<String> {
    if bytes.is_empty() {
        return Err(Error::EmptyContent);
    }

    let raw = match format {
        DocumentFormat::PlainText => decode_plain_text(&bytes),
        DocumentFormat::Docx => run_blocking(move || docx::extract(&bytes)).await?,
        DocumentFormat::Pdf => run_blocking(move || pdf::extract(&bytes)).await?,
    };

    if raw.trim().is_empty() {
        return Err(Error::EmptyContent);
    }

    let char_count = raw.chars().count();
    if char_count > MAX_DOCUMENT_CHARS {
        tracing::info!(
            chars = char_count,
            cap = MAX_DOCUMENT_CHARS,
            "Truncating extracted document text"
        );
    }

    Ok(truncate(&raw, MAX_DOCUMENT_CHARS))
}

async fn run_blocking<F>(f: F) -> Result<String>
where
    F: FnOnce() -> Result<String> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| Error::Extraction(format!("Extraction task failed: {}", e)))?
}

fn decode_plain_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Cuts `text` to at most `cap` characters, appending the truncation marker
/// when anything was dropped.
pub fn truncate(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + TRUNCATION_MARKER.len());
            out.push_str(&text[..byte_idx]);
            out.push_str(TRUNCATION_MARKER);
            out
        }
        None => text.to_string(),
    }
}
