//! Language detection for generated answers

use whatlang::Lang;

/// English words that betray an untranslated answer
///
/// Words that are also common Spanish ("no") are left out.
const ENGLISH_MARKERS: &[&str] = &[
    "the", "is", "are", "this", "that", "there", "flight", "departs", "at", "sorry", "cannot",
    "find", "context", "does", "not", "provide", "information", "about", "document",
    "available",
];

/// Statistical guesses below this confidence count as no detection
const MIN_CONFIDENCE: f64 = 0.05;

/// Language of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedLanguage {
    Spanish,
    English,
    Other(Lang),
    Unknown,
}

/// How a detection was made
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Trigram statistics
    Statistical,
    /// English marker word count
    Heuristic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub language: DetectedLanguage,
    pub method: DetectionMethod,
}

/// Detect the language of `text`
///
/// Takes the statistical detector's best guess, even for short text where it
/// is not confident, and falls back to [`looks_english`] only when it gives
/// no usable answer.
pub fn detect_language(text: &str) -> Detection {
    match whatlang::detect(text) {
        Some(info) if info.confidence() >= MIN_CONFIDENCE => {
            let language = match info.lang() {
                Lang::Spa => DetectedLanguage::Spanish,
                Lang::Eng => DetectedLanguage::English,
                other => DetectedLanguage::Other(other),
            };
            Detection {
                language,
                method: DetectionMethod::Statistical,
            }
        }
        _ => Detection {
            language: if looks_english(text) {
                DetectedLanguage::English
            } else {
                DetectedLanguage::Unknown
            },
            method: DetectionMethod::Heuristic,
        },
    }
}

/// Marker-word heuristic for English text
///
/// True when at least two English marker words occur, or when the text
/// contains "does not" or "no information".
pub fn looks_english(text: &str) -> bool {
    let lower = text.to_lowercase();

    let markers = lower
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| ENGLISH_MARKERS.contains(word))
        .count();

    markers >= 2 || lower.contains("does not") || lower.contains("no information")
}
