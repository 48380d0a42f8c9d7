//! PDF ingestion: text extraction, chunking and loading

mod chunker;
mod parser;
mod processor;

pub use chunker::TextChunker;
pub use parser::{FileParser, PageContent, ParsedDocument};
pub use processor::{IngestPipeline, LoadedDocuments, NO_CONTENT_MESSAGE};
