//! Error types for the question-answering service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for pdfqa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
///
/// Variants carrying user-facing text (`BadRequest`, `NotReady`, `NotFound`,
/// `Processing`) hold the Spanish message sent back to the frontend.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// PDF parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Uploaded file is not a PDF
    #[error("El archivo {0} no es un PDF válido")]
    InvalidFile(String),

    /// Malformed or incomplete request
    #[error("{0}")]
    BadRequest(String),

    /// A prerequisite step (upload, model initialization) has not run yet
    #[error("{0}")]
    NotReady(String),

    /// Requested file does not exist
    #[error("{0}")]
    NotFound(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Vector index error
    #[error("Vector index error: {0}")]
    VectorIndex(String),

    /// Hosted model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Translation API error
    #[error("Translation error: {0}")]
    Translation(String),

    /// A request step failed; the message already carries its context
    #[error("{0}")]
    Processing(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a vector index error
    pub fn vector_index(message: impl Into<String>) -> Self {
        Self::VectorIndex(message.into())
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create a translation error
    pub fn translation(message: impl Into<String>) -> Self {
        Self::Translation(message.into())
    }

    /// Wrap an error from a request step with a user-facing prefix
    pub fn processing(context: &str, source: impl std::fmt::Display) -> Self {
        Self::Processing(format!("{}: {}", context, source))
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    fn status_and_type(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            Error::FileParse { .. } => (StatusCode::BAD_REQUEST, "parse_error"),
            Error::InvalidFile(_) => (StatusCode::BAD_REQUEST, "invalid_file"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            Error::NotReady(_) => (StatusCode::BAD_REQUEST, "not_ready"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            Error::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, "embedding_error"),
            Error::VectorIndex(_) => (StatusCode::INTERNAL_SERVER_ERROR, "vector_index_error"),
            Error::Llm(_) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error"),
            Error::Translation(_) => (StatusCode::BAD_GATEWAY, "translation_error"),
            Error::Processing(_) => (StatusCode::INTERNAL_SERVER_ERROR, "processing_error"),
            Error::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
            Error::Json(_) => (StatusCode::BAD_REQUEST, "json_error"),
            Error::Http(_) => (StatusCode::BAD_GATEWAY, "http_error"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type) = self.status_and_type();

        if status.is_server_error() {
            tracing::error!("{} ({})", self, error_type);
        } else {
            tracing::debug!("{} ({})", self, error_type);
        }

        // The frontend reads `error` as a plain string
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "type": error_type,
        }));

        (status, body).into_response()
    }
}
