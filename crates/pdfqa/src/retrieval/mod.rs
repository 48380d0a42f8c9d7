//! Similarity search over uploaded document chunks

mod index;

pub use index::{SearchResult, VectorIndex};
