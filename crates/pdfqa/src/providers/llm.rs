//! LLM provider trait for answer generation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Sampling settings for one generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Backend model name
    pub model: String,
    pub temperature: f32,
    pub max_new_tokens: u32,
    pub top_k: u32,
}

impl GenerationParams {
    /// Same settings with a smaller token budget
    pub fn with_max_new_tokens(&self, max_new_tokens: u32) -> Self {
        Self {
            max_new_tokens: max_new_tokens.min(self.max_new_tokens),
            ..self.clone()
        }
    }
}

/// Trait for prompt completion
///
/// Implementations:
/// - `HuggingFaceLlm`: Hugging Face Inference text generation
/// - `OllamaLlm`: Local Ollama server
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete `prompt`, returning only the generated continuation
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;

    /// Check if the provider is reachable
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
