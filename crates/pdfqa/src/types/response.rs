//! Response bodies for the JSON endpoints

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::{Chunk, Document};

/// Response of `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    /// Names of the files that were indexed
    pub files: Vec<String>,
}

/// Response of `POST /api/initialize_model`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeModelResponse {
    pub success: bool,
    pub message: String,
    /// Display name of the selected model
    pub model: String,
}

/// A passage the answer was grounded on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceRef {
    /// Passage text
    pub content: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// PDF filename
    pub filename: String,
}

impl From<&Chunk> for SourceRef {
    fn from(chunk: &Chunk) -> Self {
        Self {
            content: chunk.content.clone(),
            page: chunk.source.page_number,
            filename: chunk.source.filename.clone(),
        }
    }
}

/// Response of `POST /api/chat`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    /// Post-processed Spanish answer
    pub answer: String,
    /// Passages used, best first
    pub sources: Vec<SourceRef>,
}

/// Response of `GET /api/summarize/:filename`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    pub summary: String,
}

/// Response of `GET /api/health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Healthy response stamped with the current time
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Document summary for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub filename: String,
    pub total_pages: Option<u32>,
    pub total_chunks: u32,
    pub file_size: u64,
    pub content_hash: String,
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl From<&Document> for DocumentSummary {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            filename: doc.filename.clone(),
            total_pages: doc.total_pages,
            total_chunks: doc.total_chunks,
            file_size: doc.file_size,
            content_hash: doc.content_hash.clone(),
            uploaded_at: doc.uploaded_at,
        }
    }
}

/// Response of `GET /api/documents`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total_count: usize,
}
