//! PDF text extraction with page tracking

use regex::{Captures, Regex};
use sha2::{Digest, Sha256};
use std::sync::{mpsc, OnceLock};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// How long the whole-document extractor may run before giving up
const EXTRACT_TIMEOUT: Duration = Duration::from_secs(60);

/// Glyph names some PDF fonts leak into extracted text, e.g. `(uni00E9)`
fn glyph_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[(<]?\buni([0-9A-F]{4})[)>]?").expect("Invalid glyph regex")
    })
}

/// Typographic characters folded to ASCII
const CHAR_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{2010}', "-"),
    ('\u{2011}', "-"),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2022}', "* "),
    ('\u{2026}', "..."),
    ('\u{00A0}', " "),
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

/// Clean up extracted text: glyph names, ligatures, NULs and blank lines
fn cleanup_pdf_text(text: &str) -> String {
    let mut result = text.replace('\0', "");

    result = glyph_pattern()
        .replace_all(&result, |caps: &Captures| {
            u32::from_str_radix(&caps[1], 16)
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned();

    for (ch, replacement) in CHAR_REPLACEMENTS {
        result = result.replace(*ch, replacement);
    }

    result
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parsed PDF with page-level text
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    /// SHA-256 of the file bytes (hex)
    pub content_hash: String,
    /// Total pages in the file
    pub total_pages: Option<u32>,
    /// Pages that produced text, in order
    pub pages: Vec<PageContent>,
}

/// Content from a single page
#[derive(Debug, Clone)]
pub struct PageContent {
    /// Page number (1-indexed)
    pub page_number: u32,
    /// Text content of the page
    pub content: String,
}

/// PDF parser
pub struct FileParser;

impl FileParser {
    /// Parse a PDF into cleaned page text
    ///
    /// Pages are read with lopdf; when that yields nothing (unusual fonts,
    /// broken xref) the whole document goes through pdf-extract instead and
    /// is attributed to page 1.
    pub fn parse_pdf(filename: &str, data: &[u8]) -> Result<ParsedDocument> {
        let content_hash = hash_bytes(data);

        let (total_pages, mut pages) = match lopdf::Document::load_mem(data) {
            Ok(doc) => {
                let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
                let pages = Self::extract_pages(&doc, &page_numbers);
                (Some(page_numbers.len() as u32), pages)
            }
            Err(e) => {
                tracing::warn!("lopdf could not load {}: {}", filename, e);
                (None, Vec::new())
            }
        };

        if pages.is_empty() {
            tracing::debug!("No page text from lopdf for {}, trying pdf-extract", filename);
            let text = cleanup_pdf_text(&Self::extract_whole_with_timeout(filename, data)?);
            if !text.is_empty() {
                pages.push(PageContent {
                    page_number: 1,
                    content: text,
                });
            }
        }

        if pages.is_empty() {
            return Err(Error::file_parse(
                filename,
                "No text content could be extracted from PDF",
            ));
        }

        tracing::debug!(
            "Parsed {}: {} pages with text out of {:?}",
            filename,
            pages.len(),
            total_pages
        );

        Ok(ParsedDocument {
            content_hash,
            total_pages: total_pages.or(Some(pages.len() as u32)),
            pages,
        })
    }

    /// Extract text page by page, skipping pages without text
    fn extract_pages(doc: &lopdf::Document, page_numbers: &[u32]) -> Vec<PageContent> {
        page_numbers
            .iter()
            .filter_map(|&page_number| match doc.extract_text(&[page_number]) {
                Ok(text) => {
                    let content = cleanup_pdf_text(&text);
                    (!content.is_empty()).then_some(PageContent {
                        page_number,
                        content,
                    })
                }
                Err(e) => {
                    tracing::debug!("Could not extract page {}: {}", page_number, e);
                    None
                }
            })
            .collect()
    }

    /// Run pdf-extract on a separate thread so a pathological font cannot hang the request
    fn extract_whole_with_timeout(filename: &str, data: &[u8]) -> Result<String> {
        let data = data.to_vec();
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            let _ = tx.send(pdf_extract::extract_text_from_mem(&data));
        });

        match rx.recv_timeout(EXTRACT_TIMEOUT) {
            Ok(Ok(text)) => {
                let _ = handle.join();
                Ok(text)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(Error::file_parse(filename, format!("pdf-extract failed: {}", e)))
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // The thread cannot be cancelled; it is left to finish on its own
                tracing::error!("PDF extraction timeout after {:?} for {}", EXTRACT_TIMEOUT, filename);
                Err(Error::file_parse(filename, "PDF extraction timed out"))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                tracing::error!("PDF extraction thread crashed for {}", filename);
                Err(Error::file_parse(filename, "PDF extraction thread crashed"))
            }
        }
    }
}

/// Hash file bytes for the document registry
fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
