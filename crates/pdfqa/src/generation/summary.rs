//! Document summaries

use super::prompt::PromptBuilder;
use crate::error::{Error, Result};
use crate::ingestion::ParsedDocument;
use crate::postprocess::fix_ending_punctuation;
use crate::providers::{GenerationParams, LlmProvider};

/// Pages fed to the summarizer
pub const SUMMARY_PAGES: usize = 3;

/// Token budget for a summary
const SUMMARY_MAX_TOKENS: u32 = 512;

/// Generic summary used when no model is available
pub fn fallback_summary(filename: &str) -> String {
    format!(
        "Este es un resumen automático del documento {}. El documento contiene información \
         relevante que ha sido procesada por nuestro sistema de análisis de texto. Para obtener \
         información más detallada, puede realizar preguntas específicas a través del chatbot.",
        filename
    )
}

/// Text of the first pages of a document
pub fn leading_text(parsed: &ParsedDocument) -> String {
    parsed
        .pages
        .iter()
        .take(SUMMARY_PAGES)
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summarize `text` with the LLM
pub async fn summarize(
    llm: &dyn LlmProvider,
    params: &GenerationParams,
    filename: &str,
    text: &str,
) -> Result<String> {
    let prompt = PromptBuilder::build_summary_prompt(filename, text);
    let params = params.with_max_new_tokens(SUMMARY_MAX_TOKENS);

    let summary = llm.generate(&prompt, &params).await?;
    let summary = summary.trim();
    if summary.is_empty() {
        return Err(Error::llm("Empty summary"));
    }

    Ok(fix_ending_punctuation(summary))
}
