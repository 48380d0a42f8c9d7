//! Uploaded document and chunk types with page tracking for sources

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A PDF that has been uploaded and indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID
    pub id: Uuid,
    /// Filename as stored in the upload folder
    pub filename: String,
    /// SHA-256 of the uploaded bytes
    pub content_hash: String,
    /// Total number of pages
    pub total_pages: Option<u32>,
    /// Total number of chunks created
    pub total_chunks: u32,
    /// File size in bytes
    pub file_size: u64,
    /// Upload timestamp
    pub uploaded_at: chrono::DateTime<chrono::Utc>,
}

impl Document {
    /// Create a new document record
    pub fn new(filename: String, content_hash: String, file_size: u64) -> Self {
        Self {
            id: Uuid::new_v4(),
            filename,
            content_hash,
            total_pages: None,
            total_chunks: 0,
            file_size,
            uploaded_at: chrono::Utc::now(),
        }
    }
}

/// Where a chunk came from (used for sources in chat answers)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkSource {
    /// Filename of the uploaded PDF
    pub filename: String,
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Total pages in the PDF
    pub page_count: Option<u32>,
}

impl ChunkSource {
    /// Create source info for a PDF page
    pub fn pdf(filename: impl Into<String>, page_number: u32, page_count: Option<u32>) -> Self {
        Self {
            filename: filename.into(),
            page_number,
            page_count,
        }
    }

    /// Format source for display
    pub fn format_citation(&self) -> String {
        match self.page_count {
            Some(total) => format!("{}, página {} de {}", self.filename, self.page_number, total),
            None => format!("{}, página {}", self.filename, self.page_number),
        }
    }
}

/// A chunk of text from a PDF page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text content
    pub content: String,
    /// Source information
    pub source: ChunkSource,
    /// Character position within the page text
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within the document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk
    pub fn new(
        content: String,
        source: ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            source,
            char_start,
            char_end,
            chunk_index,
        }
    }
}
