//! Data models and structures
//!
//! Defines the per-request upload and generation types plus the
//! environment-driven configuration.

use serde::{Deserialize, Serialize};

use crate::ai::mime;
use crate::{Error, Result};

/// Maximum accepted upload size (25 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_PORT: u16 = 3000;

/// A single uploaded file. Lives only for the duration of one request.
#[derive(Debug, Clone)]
pub struct Upload {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl Upload {
    /// Declared MIME type, lowercased and without parameters.
    pub fn declared_mime(&self) -> Option<String> {
        self.content_type
            .as_deref()
            .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase())
            .filter(|ct| !ct.is_empty())
    }

    /// Lowercased file extension, if the filename has one.
    pub fn extension(&self) -> Option<String> {
        self.filename
            .as_deref()
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
    }

    /// Human-readable description of the upload's type for error messages.
    pub fn describe_type(&self) -> String {
        match (self.declared_mime(), self.filename.as_deref()) {
            (Some(mime), _) => mime,
            (None, Some(name)) => name.to_string(),
            (None, None) => "unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Docx,
    Pdf,
    PlainText,
}

/// Handling path selected for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Document(DocumentFormat),
    Image { mime_type: String },
    Audio { mime_type: String },
}

impl UploadKind {
    pub fn label(&self) -> &'static str {
        match self {
            UploadKind::Text => "text",
            UploadKind::Document(_) => "document",
            UploadKind::Image { .. } => "image",
            UploadKind::Audio { .. } => "audio",
        }
    }
}

/// Binary media embedded directly in a generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineMedia {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Prompt text plus at most one inline media blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    media: Option<InlineMedia>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            media: None,
        }
    }

    /// Builds a request carrying inline media. The MIME type must be on the
    /// image or audio allow-list.
    pub fn with_media(
        prompt: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Result<Self> {
        let mime_type = mime_type.into();
        if !mime::is_allowed_image(&mime_type) && !mime::is_allowed_audio(&mime_type) {
            return Err(Error::UnsupportedType(mime_type));
        }

        Ok(Self {
            prompt: prompt.into(),
            media: Some(InlineMedia { mime_type, bytes }),
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn media(&self) -> Option<&InlineMedia> {
        self.media.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}

/// JSON envelope returned by every API endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ApiResponse {
    Result { result: String },
    Error { error: String },
}

impl ApiResponse {
    pub fn result(text: impl Into<String>) -> Self {
        ApiResponse::Result {
            result: text.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            error: message.into(),
        }
    }
}

impl From<GenerationResult> for ApiResponse {
    fn from(result: GenerationResult) -> Self {
        ApiResponse::result(result.text)
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: Option<u64>,
    pub port: u16,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            api_key,
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            timeout_secs: parse_optional_env("GEMINI_TIMEOUT_SECS")?,
            port: parse_optional_env("PORT")?.unwrap_or(DEFAULT_PORT),
            max_upload_bytes: parse_optional_env("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
        })
    }
}

fn parse_optional_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{} has an invalid value: {}", key, raw))),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, filename: Option<&str>) -> Upload {
        Upload {
            bytes: Vec::new(),
            content_type: content_type.map(str::to_string),
            filename: filename.map(str::to_string),
        }
    }

    #[test]
    fn test_declared_mime_strips_parameters() {
        let up = upload(Some("Text/Plain; charset=utf-8"), None);
        assert_eq!(up.declared_mime().as_deref(), Some("text/plain"));
    }

    #[test]
    fn test_extension_is_lowercased() {
        assert_eq!(
            upload(None, Some("Report.DOCX")).extension().as_deref(),
            Some("docx")
        );
        assert_eq!(upload(None, Some("README")).extension(), None);
    }

    #[test]
    fn test_media_request_rejects_unlisted_mime() {
        let err = GenerationRequest::with_media("describe", "image/gif", vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(ref m) if m == "image/gif"));
    }

    #[test]
    fn test_media_request_accepts_allowed_mime() {
        let req = GenerationRequest::with_media("describe", "image/webp", vec![1]).unwrap();
        assert_eq!(req.media().unwrap().mime_type, "image/webp");
        assert_eq!(req.prompt(), "describe");
    }

    #[test]
    fn test_api_response_shapes() {
        let ok = serde_json::to_value(ApiResponse::result("ok")).unwrap();
        assert_eq!(ok, serde_json::json!({ "result": "ok" }));

        let err = serde_json::to_value(ApiResponse::error("nope")).unwrap();
        assert_eq!(err, serde_json::json!({ "error": "nope" }));
    }
}
