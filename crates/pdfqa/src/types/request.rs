//! Request bodies for the JSON endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /api/initialize_model`
///
/// Sampling fields are optional; missing ones take the configured defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitializeModelRequest {
    /// Model identifier (must be one of the configured models)
    #[serde(default)]
    pub model_name: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
    /// Maximum new tokens per answer
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Top-k sampling
    #[serde(default)]
    pub top_k: Option<u32>,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    /// The question to answer
    #[serde(default)]
    pub question: Option<String>,
}

impl ChatRequest {
    /// Create a chat request
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: Some(question.into()),
        }
    }

    /// The question, if present and not blank
    pub fn question(&self) -> Option<&str> {
        self.question
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}
