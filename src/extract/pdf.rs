use crate::{Error, Result};

/// Extracts the text layer of a PDF. Malformed files can make the parser
/// panic, so a panic is reported as an extraction failure.
pub fn extract(bytes: &[u8]) -> Result<String> {
    std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| Error::Extraction("PDF parser aborted on malformed input".to_string()))?
        .map_err(|e| Error::Extraction(format!("Failed to parse PDF: {}", e)))
}
