//! Provider abstractions for embeddings and LLM
//!
//! Trait-based so the service can switch between the hosted Hugging Face
//! Inference API and a local Ollama server.

pub mod embedding;
pub mod huggingface;
pub mod llm;
pub mod ollama;
pub mod retry;

use std::sync::Arc;

pub use embedding::EmbeddingProvider;
pub use huggingface::{HfClient, HuggingFaceEmbedder, HuggingFaceLlm};
pub use llm::{GenerationParams, LlmProvider};
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm};
pub use retry::RetryPolicy;

use crate::config::{AppConfig, BackendProvider};
use crate::error::Result;

/// Embedding and LLM providers for the configured backend
pub struct Providers {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmProvider>,
}

impl Providers {
    /// Build providers for `config.backend`
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.backend {
            BackendProvider::HuggingFace => {
                if config.llm.api_token.is_none() {
                    tracing::warn!("HF_TOKEN is not set; hosted models may reject requests");
                }
                let client = HfClient::new(&config.llm)?;
                Ok(Self {
                    embedder: Arc::new(HuggingFaceEmbedder::new(client.clone(), &config.embeddings)),
                    llm: Arc::new(HuggingFaceLlm::new(client)),
                })
            }
            BackendProvider::Ollama => {
                let client = Arc::new(OllamaClient::new(&config.llm)?);
                Ok(Self {
                    embedder: Arc::new(OllamaEmbedder::new(
                        Arc::clone(&client),
                        config.llm.ollama_embed_model.clone(),
                        &config.embeddings,
                    )),
                    llm: Arc::new(OllamaLlm::new(client)),
                })
            }
        }
    }
}
