//! Error handling and custom error types
//!
//! Provides unified error handling across the relay using thiserror. Every
//! variant maps onto an HTTP status and a logging category so handlers can
//! return `Result<_, Error>` and let the response boundary do the rest.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("No extractable text found in the uploaded document")]
    EmptyContent,

    #[error("Upload exceeds the maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Failed to extract document text: {0}")]
    Extraction(String),

    /// Message reported by the generative API, forwarded as-is.
    #[error("{0}")]
    Upstream(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::MissingFile
            | Error::UnsupportedType(_)
            | Error::EmptyContent
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::Extraction(_)
            | Error::Upstream(_)
            | Error::Http(_)
            | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Tag used in logs to group failures by origin.
    pub fn category(&self) -> &'static str {
        match self {
            Error::MissingFile
            | Error::UnsupportedType(_)
            | Error::EmptyContent
            | Error::PayloadTooLarge { .. }
            | Error::InvalidRequest(_) => "client_input",
            Error::Extraction(_) => "extraction",
            Error::Upstream(_) | Error::Http(_) => "upstream",
            Error::Config(_) => "internal",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        let category = self.category();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!(category, status = status.as_u16(), "{}", message);
        } else {
            tracing::warn!(category, status = status.as_u16(), "{}", message);
        }

        (status, Json(ApiResponse::error(message))).into_response()
    }
}
