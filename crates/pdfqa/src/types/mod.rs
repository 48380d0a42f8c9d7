//! Core types for the service

pub mod document;
pub mod request;
pub mod response;

pub use document::{Chunk, ChunkSource, Document};
pub use request::{ChatRequest, InitializeModelRequest};
pub use response::{ChatResponse, SourceRef};
