//! API routes for the PDF QA server

pub mod chat;
pub mod documents;
pub mod files;
pub mod model;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;
use crate::types::response::HealthResponse;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        // Upload - with larger body limit for PDFs
        .route(
            "/upload",
            post(upload::upload_files).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/initialize_model", post(model::initialize_model))
        .route("/chat", post(chat::chat))
        // Uploaded files
        .route("/pdf/:filename", get(files::get_pdf))
        .route("/summarize/:filename", get(files::summarize_document))
        .route("/documents", get(documents::list_documents))
        .route("/health", get(health))
        .route("/info", get(info))
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// API info endpoint
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "pdfqa",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Preguntas y respuestas sobre documentos PDF",
        "endpoints": {
            "POST /api/upload": "Upload PDFs (multipart files[]) and build the vector index",
            "POST /api/initialize_model": "Select the model and sampling settings",
            "POST /api/chat": "Ask a question about the uploaded PDFs",
            "GET /api/pdf/:filename": "Download an uploaded PDF",
            "GET /api/summarize/:filename": "Summarize an uploaded PDF",
            "GET /api/documents": "List indexed documents",
            "GET /api/health": "Service health"
        }
    }))
}

/// Reduce a client-supplied name to a bare file name
///
/// Returns `None` for names that would escape the upload folder.
pub(crate) fn sanitize_filename(name: &str) -> Option<String> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." || base.contains('\0') {
        return None;
    }
    Some(base.to_string())
}
