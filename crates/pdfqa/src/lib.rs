//! pdfqa: question answering over uploaded PDF documents
//!
//! Uploaded PDFs are parsed page by page, chunked, embedded and indexed in
//! memory. Questions go through a conversational retrieval chain backed by a
//! hosted (Hugging Face) or local (Ollama) model, and every answer is
//! post-processed into short, clean Spanish before it is returned.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod postprocess;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use postprocess::AnswerPipeline;
pub use server::{state::AppState, PdfQaServer};
pub use types::{
    document::{Chunk, ChunkSource, Document},
    request::{ChatRequest, InitializeModelRequest},
    response::{ChatResponse, SourceRef},
};
