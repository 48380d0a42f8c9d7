//! Configuration for the question-answering service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Environment variable pointing at a TOML configuration file
pub const CONFIG_PATH_ENV: &str = "PDFQA_CONFIG";

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pdfqa.toml";

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Model backend (Hugging Face Inference or local Ollama)
    pub backend: BackendProvider,
    /// Server configuration
    pub server: ServerConfig,
    /// Where uploaded PDFs are kept
    pub storage: StorageConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// LLM configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Answer translation configuration
    pub translation: TranslationConfig,
}

impl AppConfig {
    /// Load configuration from `PDFQA_CONFIG`, `./pdfqa.toml` or defaults,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV)
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.exists().then_some(local)
            });

        let mut config = match path {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse a TOML document; missing sections and keys fall back to defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid configuration: {}", e)))
    }

    /// Apply environment overrides using the given lookup
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("HF_TOKEN").filter(|t| !t.trim().is_empty()) {
            self.llm.api_token = Some(token);
        }

        if let Some(host) = lookup("PDFQA_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("PDFQA_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| Error::Config(format!("Invalid PDFQA_PORT: {}", port)))?;
        }

        if let Some(backend) = lookup("PDFQA_BACKEND") {
            self.backend = match backend.to_lowercase().as_str() {
                "huggingface" | "hf" => BackendProvider::HuggingFace,
                "ollama" => BackendProvider::Ollama,
                other => {
                    return Err(Error::Config(format!("Unknown PDFQA_BACKEND: {}", other)));
                }
            };
        }

        if let Some(dir) = lookup("PDFQA_UPLOAD_DIR") {
            self.storage.upload_dir = PathBuf::from(dir);
        }

        Ok(())
    }
}

/// Backend provider selection
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// Hugging Face Inference API (hosted models)
    #[default]
    HuggingFace,
    /// Local Ollama server
    Ollama,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload size in bytes (default: 100MB)
    pub max_upload_size: usize,
    /// Optional directory with the static frontend, served at `/`
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            max_upload_size: 100 * 1024 * 1024, // 100MB
            static_dir: None,
        }
    }
}

/// Upload storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory where uploaded PDFs are saved
    pub upload_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Hugging Face model used for feature extraction
    pub model: String,
    /// Embedding dimensions (768 for all-mpnet-base-v2)
    pub dimensions: usize,
    /// Batch size for embedding requests
    pub batch_size: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "sentence-transformers/all-mpnet-base-v2".to_string(),
            dimensions: 768,
            batch_size: 32,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
    /// Minimum chunk size (skip smaller chunks)
    pub min_chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1024,
            chunk_overlap: 64,
            min_chunk_size: 10,
        }
    }
}

/// A model the chatbot can be initialized with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSpec {
    /// Model identifier accepted by `/api/initialize_model`
    pub id: String,
    /// Short name shown to the user
    pub display_name: String,
    /// Model name sent to the backend when it differs from `id` (Ollama tags)
    #[serde(default)]
    pub backend_model: Option<String>,
}

impl ModelSpec {
    fn new(id: &str, display_name: &str, backend_model: &str) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            backend_model: Some(backend_model.to_string()),
        }
    }

    /// Model name to request from the configured backend
    pub fn backend_model_for(&self, backend: BackendProvider) -> &str {
        match (backend, &self.backend_model) {
            (BackendProvider::Ollama, Some(name)) => name,
            _ => &self.id,
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Hugging Face Inference base URL
    pub hf_base_url: String,
    /// Hugging Face API token (usually from `HF_TOKEN`)
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Ollama base URL
    pub ollama_base_url: String,
    /// Ollama embedding model name
    pub ollama_embed_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// Models the chatbot may be initialized with
    pub models: Vec<ModelSpec>,
    /// Default sampling temperature
    pub default_temperature: f32,
    /// Default maximum new tokens
    pub default_max_tokens: u32,
    /// Default top-k sampling
    pub default_top_k: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            hf_base_url: "https://router.huggingface.co/hf-inference".to_string(),
            api_token: None,
            ollama_base_url: "http://localhost:11434".to_string(),
            ollama_embed_model: "nomic-embed-text".to_string(),
            timeout_secs: 120,
            max_retries: 2,
            models: vec![
                ModelSpec::new("meta-llama/Meta-Llama-3-8B-Instruct", "Llama-3-8B", "llama3:8b"),
                ModelSpec::new("mistralai/Mistral-7B-Instruct-v0.2", "Mistral-7B", "mistral:7b"),
            ],
            default_temperature: 0.5,
            default_max_tokens: 2048,
            default_top_k: 3,
        }
    }
}

impl LlmConfig {
    /// Look up a configured model by id
    pub fn find_model(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.id == id)
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of chunks retrieved per question
    pub k: usize,
    /// Maximum number of sources returned to the client
    pub max_sources: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: 3, max_sources: 3 }
    }
}

/// Translation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Call the translation API at all (phrase table only when disabled)
    pub enabled: bool,
    /// Google Translate web endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://translate.googleapis.com/translate_a/single".to_string(),
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_original_service() {
        let config = AppConfig::default();
        assert_eq!(config.backend, BackendProvider::HuggingFace);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.chunking.chunk_size, 1024);
        assert_eq!(config.chunking.chunk_overlap, 64);
        assert_eq!(config.retrieval.k, 3);
        assert_eq!(config.llm.models.len(), 2);
        assert_eq!(
            config.llm.find_model("mistralai/Mistral-7B-Instruct-v0.2").map(|m| m.display_name.as_str()),
            Some("Mistral-7B")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
backend = "ollama"

[server]
port = 8088

[chunking]
chunk_overlap = 32
"#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendProvider::Ollama);
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.chunking.chunk_size, 1024);
        assert_eq!(config.chunking.chunk_overlap, 32);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = AppConfig::from_toml_str("server = 12").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("HF_TOKEN", "hf_secret"),
            ("PDFQA_PORT", "9000"),
            ("PDFQA_BACKEND", "ollama"),
            ("PDFQA_UPLOAD_DIR", "/tmp/pdfs"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.llm.api_token.as_deref(), Some("hf_secret"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.backend, BackendProvider::Ollama);
        assert_eq!(config.storage.upload_dir, PathBuf::from("/tmp/pdfs"));
    }

    #[test]
    fn test_bad_port_override_fails() {
        let mut config = AppConfig::default();
        let result = config.apply_env_overrides(|key| {
            (key == "PDFQA_PORT").then(|| "not-a-port".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_backend_model_name() {
        let config = LlmConfig::default();
        let llama = &config.models[0];
        assert_eq!(llama.backend_model_for(BackendProvider::HuggingFace), llama.id);
        assert_eq!(llama.backend_model_for(BackendProvider::Ollama), "llama3:8b");
    }
}
