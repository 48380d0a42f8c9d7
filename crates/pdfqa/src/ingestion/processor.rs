//! Loading uploaded PDFs into chunks

use std::path::{Path, PathBuf};

use super::chunker::TextChunker;
use super::parser::{FileParser, ParsedDocument};
use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// Message used when none of the files produced any text
pub const NO_CONTENT_MESSAGE: &str = "No se pudo extraer contenido de los documentos PDF";

/// Documents and chunks produced by one ingestion run
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    /// One record per successfully parsed file
    pub documents: Vec<Document>,
    /// Chunks across all documents, in file and page order
    pub chunks: Vec<Chunk>,
    /// Files that could not be parsed
    pub skipped: Vec<String>,
}

/// Parse and chunk PDFs from disk
pub struct IngestPipeline {
    chunker: TextChunker,
}

impl IngestPipeline {
    /// Create a pipeline with the given chunking settings
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            chunker: TextChunker::from_config(config),
        }
    }

    /// Parse every file; failures are logged and skipped
    ///
    /// Fails only when no file produced any text.
    pub async fn load_documents(&self, paths: &[PathBuf]) -> Result<LoadedDocuments> {
        let mut loaded = LoadedDocuments::default();

        for path in paths {
            let filename = display_name(path);

            match Self::parse_file(path, &filename).await {
                Ok((parsed, file_size)) => {
                    let chunks = self.chunker.chunk_document(&filename, &parsed);

                    let mut doc = Document::new(filename.clone(), parsed.content_hash.clone(), file_size);
                    doc.total_pages = parsed.total_pages;
                    doc.total_chunks = chunks.len() as u32;

                    tracing::info!(
                        "Loaded {}: {} pages with text, {} chunks",
                        filename,
                        parsed.pages.len(),
                        chunks.len()
                    );

                    loaded.chunks.extend(chunks);
                    loaded.documents.push(doc);
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", filename, e);
                    loaded.skipped.push(filename);
                }
            }
        }

        if loaded.chunks.is_empty() {
            return Err(Error::Processing(NO_CONTENT_MESSAGE.to_string()));
        }

        Ok(loaded)
    }

    /// Read and parse one file off the async runtime
    async fn parse_file(path: &Path, filename: &str) -> Result<(ParsedDocument, u64)> {
        let data = tokio::fs::read(path).await?;
        let file_size = data.len() as u64;
        let filename = filename.to_string();

        let parsed = tokio::task::spawn_blocking(move || FileParser::parse_pdf(&filename, &data))
            .await
            .map_err(|e| Error::internal(format!("PDF parsing task failed: {}", e)))??;

        Ok((parsed, file_size))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
