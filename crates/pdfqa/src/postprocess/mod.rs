//! Answer post-processing
//!
//! Every generated answer runs through four stages in order:
//! 1. Language normalization (translate English to Spanish)
//! 2. Refinement (three lines, no topic drift, at most 200 characters)
//! 3. Duplicate removal
//! 4. Terminal punctuation cleanup

pub mod dedup;
pub mod language;
pub mod punctuation;
pub mod refine;
pub mod translate;

use std::sync::Arc;

pub use dedup::remove_duplicated_text;
pub use language::{detect_language, looks_english, DetectedLanguage};
pub use punctuation::fix_ending_punctuation;
pub use refine::refine_answer;
pub use translate::{
    normalize_language, translate_with_mapping, GoogleTranslator, NormalizedText, OfflineTranslator,
    OutputLanguage, Translator,
};

use crate::config::TranslationConfig;
use crate::error::Result;

/// Answer used when post-processing leaves nothing to show
pub const NOT_FOUND_MESSAGE: &str = "No encuentro información sobre eso en el documento.";

/// The four-stage answer cleanup pipeline
#[derive(Clone)]
pub struct AnswerPipeline {
    translator: Arc<dyn Translator>,
}

impl AnswerPipeline {
    /// Create a pipeline around a translator
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Build the pipeline from configuration
    pub fn from_config(config: &TranslationConfig) -> Result<Self> {
        let translator: Arc<dyn Translator> = if config.enabled {
            Arc::new(GoogleTranslator::new(config)?)
        } else {
            Arc::new(OfflineTranslator)
        };
        Ok(Self::new(translator))
    }

    /// Name of the translator in use
    pub fn translator_name(&self) -> &str {
        self.translator.name()
    }

    /// Turn a raw model answer into the final Spanish answer
    ///
    /// Never fails: translation errors fall back to the phrase table.
    pub async fn process(&self, answer: &str, question: &str) -> String {
        let normalized = normalize_language(answer, self.translator.as_ref()).await;
        let refined = refine_answer(&normalized.text, question);
        let deduplicated = remove_duplicated_text(&refined);
        let cleaned = fix_ending_punctuation(&deduplicated);

        if is_blank_answer(&cleaned) {
            tracing::debug!("Post-processing left an empty answer");
            return NOT_FOUND_MESSAGE.to_string();
        }

        tracing::debug!(
            raw_chars = answer.chars().count(),
            final_chars = cleaned.chars().count(),
            language = ?normalized.language,
            "Answer post-processed"
        );

        cleaned
    }
}

/// True when only punctuation and whitespace remain
fn is_blank_answer(text: &str) -> bool {
    text.chars()
        .all(|c| c.is_whitespace() || c.is_ascii_punctuation())
}
