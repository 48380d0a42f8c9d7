//! Text chunking with page and position tracking

use unicode_segmentation::UnicodeSegmentation;

use super::parser::ParsedDocument;
use crate::config::ChunkingConfig;
use crate::types::{Chunk, ChunkSource};

/// Text chunker with configurable size and overlap (both in characters)
pub struct TextChunker {
    /// Maximum chunk size
    chunk_size: usize,
    /// Overlap carried from one chunk into the next
    overlap: usize,
    /// Chunks shorter than this are dropped
    min_size: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size / 2),
            min_size: 1,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap).with_min_size(config.min_chunk_size)
    }

    /// Drop chunks shorter than `min_size` characters
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size.max(1);
        self
    }

    /// Chunk every page of a parsed PDF; indices run across the whole document
    pub fn chunk_document(&self, filename: &str, parsed: &ParsedDocument) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        for page in &parsed.pages {
            let source = ChunkSource::pdf(filename, page.page_number, parsed.total_pages);
            let page_chunks = self.chunk_text(&page.content, &source, chunks.len() as u32);
            chunks.extend(page_chunks);
        }

        chunks
    }

    /// Chunk a single page of text
    pub fn chunk_text(&self, text: &str, source: &ChunkSource, start_index: u32) -> Vec<Chunk> {
        let mut chunks = Vec::new();

        let mut current = String::new();
        let mut current_len = 0usize;
        let mut current_start = 0usize;
        let mut has_new_text = false;
        let mut chunk_index = start_index;
        let mut char_pos = 0usize;

        for piece in self.split_into_pieces(text) {
            let piece_len = piece.chars().count();

            if has_new_text && current_len + piece_len > self.chunk_size {
                if let Some(chunk) = self.make_chunk(&current, source, current_start, char_pos, chunk_index) {
                    chunks.push(chunk);
                    chunk_index += 1;
                }

                current = self.overlap_text(&current);
                current_len = current.chars().count();
                current_start = char_pos - current_len;
                has_new_text = false;
            }

            current.push_str(piece);
            current_len += piece_len;
            char_pos += piece_len;
            has_new_text = true;
        }

        if has_new_text {
            if let Some(chunk) = self.make_chunk(&current, source, current_start, char_pos, chunk_index) {
                chunks.push(chunk);
            }
        }

        chunks
    }

    fn make_chunk(
        &self,
        text: &str,
        source: &ChunkSource,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Option<Chunk> {
        let content = text.trim();
        if content.chars().count() < self.min_size {
            return None;
        }

        Some(Chunk::new(
            content.to_string(),
            source.clone(),
            char_start,
            char_end,
            chunk_index,
        ))
    }

    /// Split text on sentence bounds, hard-splitting sentences that would not
    /// fit in a chunk next to the carried overlap
    fn split_into_pieces<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let max_piece = self.chunk_size - self.overlap;

        text.split_sentence_bounds()
            .flat_map(|sentence| split_by_chars(sentence, max_piece))
            .collect()
    }

    /// Tail of a chunk to repeat at the start of the next one
    fn overlap_text(&self, text: &str) -> String {
        if self.overlap == 0 {
            return String::new();
        }

        let total = text.chars().count();
        if total <= self.overlap {
            return text.to_string();
        }

        let start = text
            .char_indices()
            .nth(total - self.overlap)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let tail = &text[start..];

        // Prefer starting at a sentence, then at a word
        if let Some(pos) = tail.find(". ") {
            if !tail[pos + 2..].trim().is_empty() {
                return tail[pos + 2..].to_string();
            }
        }
        if let Some(pos) = tail.find(' ') {
            return tail[pos + 1..].to_string();
        }

        tail.to_string()
    }
}

/// Split into pieces of at most `max_chars` characters
fn split_by_chars(text: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while rest.chars().count() > max_chars {
        let cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(cut);
        pieces.push(head);
        rest = tail;
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }

    pieces
}
