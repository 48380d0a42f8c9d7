//! Document registry endpoint

use axum::{extract::State, Json};

use crate::server::state::AppState;
use crate::types::response::{DocumentListResponse, DocumentSummary};

/// GET /api/documents - List documents in the current index
pub async fn list_documents(State(state): State<AppState>) -> Json<DocumentListResponse> {
    let documents: Vec<DocumentSummary> = state
        .list_documents()
        .iter()
        .map(DocumentSummary::from)
        .collect();

    Json(DocumentListResponse {
        total_count: documents.len(),
        documents,
    })
}
