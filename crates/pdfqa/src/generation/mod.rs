//! Answer generation: prompts, conversational chain and summaries

pub mod chain;
pub mod prompt;
pub mod summary;

pub use chain::{ChainResponse, ConversationalChain, ModelSettings, INVALID_MODEL_MESSAGE};
pub use prompt::PromptBuilder;
pub use summary::{fallback_summary, leading_text, summarize};
