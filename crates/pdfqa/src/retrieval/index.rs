//! In-memory exact vector index over document chunks

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Search result with chunk and similarity
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Squared L2 distance to the query
    pub distance: f32,
    /// `1 / (1 + distance)`, higher is better
    pub similarity: f32,
}

/// Flat index: every search scans every vector
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index from chunks and their embeddings (same order)
    pub fn build(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::vector_index("Cannot build an index without chunks"));
        }
        if chunks.len() != vectors.len() {
            return Err(Error::vector_index(format!(
                "{} chunks but {} embeddings",
                chunks.len(),
                vectors.len()
            )));
        }

        let dimensions = vectors[0].len();
        if dimensions == 0 {
            return Err(Error::vector_index("Embeddings must not be empty"));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimensions) {
            return Err(Error::vector_index(format!(
                "Vector length mismatch: {} != {}",
                bad.len(),
                dimensions
            )));
        }

        Ok(Self {
            dimensions,
            chunks,
            vectors,
        })
    }

    /// Embed every chunk with `embedder` and build the index
    pub async fn from_chunks(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        if chunks.is_empty() {
            return Err(Error::vector_index("Cannot build an index without chunks"));
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        tracing::info!("Embedding {} chunks with {}", texts.len(), embedder.name());
        let vectors = embedder.embed_batch(&texts).await?;

        Self::build(chunks, vectors)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// The `k` nearest chunks, closest first
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.dimensions {
            return Err(Error::vector_index(format!(
                "Query length mismatch: {} != {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(idx, vector)| (idx, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|left, right| left.1.total_cmp(&right.1));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(idx, distance)| SearchResult {
                chunk: self.chunks[idx].clone(),
                distance,
                similarity: 1.0 / (1.0 + distance),
            })
            .collect())
    }
}

fn squared_l2(left: &[f32], right: &[f32]) -> f32 {
    left.iter()
        .zip(right)
        .map(|(l, r)| {
            let d = l - r;
            d * d
        })
        .sum()
}
