//! Conversational retrieval chain
//!
//! Condenses follow-up questions against the conversation memory, retrieves
//! the nearest chunks and asks the LLM for a grounded answer.

use parking_lot::Mutex;
use std::sync::Arc;

use super::prompt::PromptBuilder;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, GenerationParams, LlmProvider};
use crate::retrieval::{SearchResult, VectorIndex};
use crate::types::InitializeModelRequest;

/// Message for unknown or missing model names
pub const INVALID_MODEL_MESSAGE: &str = "Modelo no válido";

/// Oldest exchanges are dropped beyond this many
const MAX_MEMORY_TURNS: usize = 10;

/// Token budget for rewriting a follow-up question
const CONDENSE_MAX_TOKENS: u32 = 256;

/// A validated model choice with its sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    /// Identifier as accepted by the API
    pub model_id: String,
    /// Short name shown to the user
    pub display_name: String,
    /// Sampling settings; `params.model` is the backend model name
    pub params: GenerationParams,
}

impl ModelSettings {
    /// Validate an initialization request against the configured models
    pub fn resolve(config: &AppConfig, request: &InitializeModelRequest) -> Result<Self> {
        let model_id = request
            .model_name
            .as_deref()
            .ok_or_else(|| Error::BadRequest(INVALID_MODEL_MESSAGE.to_string()))?;
        let spec = config
            .llm
            .find_model(model_id)
            .ok_or_else(|| Error::BadRequest(INVALID_MODEL_MESSAGE.to_string()))?;

        Ok(Self {
            model_id: spec.id.clone(),
            display_name: spec.display_name.clone(),
            params: GenerationParams {
                model: spec.backend_model_for(config.backend).to_string(),
                temperature: request.temperature.unwrap_or(config.llm.default_temperature),
                max_new_tokens: request.max_tokens.unwrap_or(config.llm.default_max_tokens),
                top_k: request.top_k.unwrap_or(config.llm.default_top_k),
            },
        })
    }
}

/// Raw chain output, before post-processing
#[derive(Debug, Clone)]
pub struct ChainResponse {
    /// Answer exactly as generated
    pub answer: String,
    /// Question used for retrieval (condensed when there was history)
    pub standalone_question: String,
    /// Retrieved chunks, closest first
    pub sources: Vec<SearchResult>,
}

/// Retrieval chain with conversation memory
pub struct ConversationalChain {
    llm: Arc<dyn LlmProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<VectorIndex>,
    settings: ModelSettings,
    k: usize,
    memory: Mutex<Vec<(String, String)>>,
}

impl ConversationalChain {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<VectorIndex>,
        settings: ModelSettings,
        k: usize,
    ) -> Self {
        Self {
            llm,
            embedder,
            index,
            settings,
            k: k.max(1),
            memory: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    /// Snapshot of the conversation memory
    pub fn history(&self) -> Vec<(String, String)> {
        self.memory.lock().clone()
    }

    /// Answer a question and remember the exchange
    pub async fn ask(&self, question: &str) -> Result<ChainResponse> {
        let history = self.history();

        let standalone_question = if history.is_empty() {
            question.to_string()
        } else {
            self.condense(question, &history).await?
        };

        let query = self.embedder.embed(&standalone_question).await?;
        let sources = self.index.search(&query, self.k)?;
        tracing::debug!(
            "Retrieved {} chunks for {:?}",
            sources.len(),
            standalone_question
        );

        let context = PromptBuilder::build_context(&sources);
        let prompt = PromptBuilder::build_answer_prompt(&standalone_question, &context, &history);
        let answer = self.llm.generate(&prompt, &self.settings.params).await?;

        self.remember(question, &answer);

        Ok(ChainResponse {
            answer,
            standalone_question,
            sources,
        })
    }

    /// Rewrite a follow-up question so it can be retrieved on its own
    async fn condense(&self, question: &str, history: &[(String, String)]) -> Result<String> {
        let prompt = PromptBuilder::build_condense_prompt(question, history);
        let params = self.settings.params.with_max_new_tokens(CONDENSE_MAX_TOKENS);
        let condensed = self.llm.generate(&prompt, &params).await?;

        let condensed = condensed.lines().next().unwrap_or("").trim();
        if condensed.is_empty() {
            Ok(question.to_string())
        } else {
            Ok(condensed.to_string())
        }
    }

    fn remember(&self, question: &str, answer: &str) {
        let mut memory = self.memory.lock();
        memory.push((question.to_string(), answer.to_string()));
        if memory.len() > MAX_MEMORY_TURNS {
            let excess = memory.len() - MAX_MEMORY_TURNS;
            memory.drain(..excess);
        }
    }
}
