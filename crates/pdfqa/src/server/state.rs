//! Application state for the PDF QA server

use dashmap::DashMap;
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::ConversationalChain;
use crate::ingestion::IngestPipeline;
use crate::postprocess::AnswerPipeline;
use crate::providers::{EmbeddingProvider, LlmProvider, Providers};
use crate::retrieval::VectorIndex;
use crate::types::Document;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: AppConfig,
    /// Embedding provider (Hugging Face or Ollama)
    embedder: Arc<dyn EmbeddingProvider>,
    /// LLM provider (Hugging Face or Ollama)
    llm: Arc<dyn LlmProvider>,
    /// PDF parsing and chunking
    ingest: IngestPipeline,
    /// Answer post-processing
    answers: AnswerPipeline,
    /// Index over the last uploaded batch
    index: RwLock<Option<Arc<VectorIndex>>>,
    /// Chain created by the last model initialization
    chain: Mutex<Option<Arc<ConversationalChain>>>,
    /// Documents in the current index, by filename
    documents: DashMap<String, Document>,
}

impl AppState {
    /// Create application state with providers for the configured backend
    pub async fn new(config: AppConfig) -> Result<Self> {
        tracing::info!("Initializing application state (backend: {:?})...", config.backend);

        tokio::fs::create_dir_all(&config.storage.upload_dir).await?;
        tracing::info!("Upload folder: {}", config.storage.upload_dir.display());

        let providers = Providers::from_config(&config)?;
        tracing::info!(
            "Providers ready (embeddings: {}, llm: {})",
            providers.embedder.name(),
            providers.llm.name()
        );

        let answers = AnswerPipeline::from_config(&config.translation)?;
        tracing::info!("Answer translation via {}", answers.translator_name());

        Ok(Self::with_providers(config, providers.embedder, providers.llm, answers))
    }

    /// Create application state from explicit providers
    pub fn with_providers(
        config: AppConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        answers: AnswerPipeline,
    ) -> Self {
        let ingest = IngestPipeline::new(&config.chunking);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                embedder,
                llm,
                ingest,
                answers,
                index: RwLock::new(None),
                chain: Mutex::new(None),
                documents: DashMap::new(),
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the embedding provider
    pub fn embedder(&self) -> Arc<dyn EmbeddingProvider> {
        Arc::clone(&self.inner.embedder)
    }

    /// Get the LLM provider
    pub fn llm(&self) -> Arc<dyn LlmProvider> {
        Arc::clone(&self.inner.llm)
    }

    /// Get the ingestion pipeline
    pub fn ingest(&self) -> &IngestPipeline {
        &self.inner.ingest
    }

    /// Get the answer post-processing pipeline
    pub fn answers(&self) -> &AnswerPipeline {
        &self.inner.answers
    }

    /// Folder where uploads are stored
    pub fn upload_dir(&self) -> &Path {
        &self.inner.config.storage.upload_dir
    }

    /// Path of an uploaded file
    pub fn upload_path(&self, filename: &str) -> PathBuf {
        self.upload_dir().join(filename)
    }

    /// Current vector index, if documents were uploaded
    pub fn index(&self) -> Option<Arc<VectorIndex>> {
        self.inner.index.read().clone()
    }

    /// Replace the index and document registry after an upload
    ///
    /// The previous chain searched the old index, so it is dropped.
    pub async fn replace_index(&self, index: VectorIndex, documents: Vec<Document>) {
        let mut chain = self.inner.chain.lock().await;
        if chain.take().is_some() {
            tracing::info!("Chatbot reset; initialize the model again");
        }

        *self.inner.index.write() = Some(Arc::new(index));

        self.inner.documents.clear();
        for doc in documents {
            self.inner.documents.insert(doc.filename.clone(), doc);
        }
    }

    /// Current conversational chain, if the model was initialized
    pub async fn chain(&self) -> Option<Arc<ConversationalChain>> {
        self.inner.chain.lock().await.clone()
    }

    /// Install a new chain, discarding the previous conversation
    pub async fn set_chain(&self, chain: ConversationalChain) {
        *self.inner.chain.lock().await = Some(Arc::new(chain));
    }

    /// Whether the chatbot can answer questions
    pub async fn is_ready(&self) -> bool {
        self.inner.chain.lock().await.is_some()
    }

    /// Documents in the current index, newest first
    pub fn list_documents(&self) -> Vec<Document> {
        let mut docs: Vec<Document> = self
            .inner
            .documents
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then_with(|| a.filename.cmp(&b.filename)));
        docs
    }

    /// Check that the embedding and LLM backends respond
    ///
    /// Failed health checks count as unavailable.
    pub async fn check_backend(&self) -> BackendHealth {
        let (embeddings, llm) = tokio::join!(
            self.inner.embedder.health_check(),
            self.inner.llm.health_check()
        );

        BackendHealth {
            embeddings: health_ok(self.inner.embedder.name(), embeddings),
            llm: health_ok(self.inner.llm.name(), llm),
        }
    }
}

/// Availability of the model backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendHealth {
    pub embeddings: bool,
    pub llm: bool,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.embeddings && self.llm
    }
}

fn health_ok(provider: &str, result: Result<bool>) -> bool {
    match result {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!("Health check of {} failed: {}", provider, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::generation::ModelSettings;
    use crate::postprocess::OfflineTranslator;
    use crate::providers::GenerationParams;
    use crate::types::{Chunk, ChunkSource, InitializeModelRequest};
    use async_trait::async_trait;

    struct NullProvider;

    #[async_trait]
    impl EmbeddingProvider for NullProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0])
        }

        fn dimensions(&self) -> usize {
            1
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    #[async_trait]
    impl LlmProvider for NullProvider {
        async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Err(Error::llm("unavailable"))
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(false)
        }

        fn name(&self) -> &str {
            "null"
        }
    }

    fn state() -> AppState {
        AppState::with_providers(
            AppConfig::default(),
            Arc::new(NullProvider),
            Arc::new(NullProvider),
            AnswerPipeline::new(Arc::new(OfflineTranslator)),
        )
    }

    fn index() -> VectorIndex {
        let chunk = Chunk::new("texto".into(), ChunkSource::pdf("a.pdf", 1, Some(1)), 0, 5, 0);
        VectorIndex::build(vec![chunk], vec![vec![1.0]]).unwrap()
    }

    fn chain(state: &AppState) -> ConversationalChain {
        let request = InitializeModelRequest {
            model_name: Some("mistralai/Mistral-7B-Instruct-v0.2".to_string()),
            ..Default::default()
        };
        ConversationalChain::new(
            state.llm(),
            state.embedder(),
            state.index().unwrap(),
            ModelSettings::resolve(state.config(), &request).unwrap(),
            3,
        )
    }

    #[tokio::test]
    async fn test_new_upload_resets_chain() {
        let state = state();
        assert!(state.index().is_none());
        assert!(!state.is_ready().await);

        state
            .replace_index(index(), vec![Document::new("a.pdf".into(), "h".into(), 10)])
            .await;
        state.set_chain(chain(&state)).await;
        assert!(state.is_ready().await);

        state
            .replace_index(index(), vec![Document::new("b.pdf".into(), "h".into(), 10)])
            .await;
        assert!(!state.is_ready().await);
        let docs = state.list_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].filename, "b.pdf");
    }

    struct BrokenProvider;

    #[async_trait]
    impl EmbeddingProvider for BrokenProvider {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(Error::embedding("down"))
        }

        fn dimensions(&self) -> usize {
            1
        }

        async fn health_check(&self) -> Result<bool> {
            Err(Error::embedding("connection refused"))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_check_backend_reports_each_provider() {
        let health = state().check_backend().await;
        assert_eq!(
            health,
            BackendHealth {
                embeddings: true,
                llm: false
            }
        );
        assert!(!health.is_healthy());

        let state = AppState::with_providers(
            AppConfig::default(),
            Arc::new(BrokenProvider),
            Arc::new(NullProvider),
            AnswerPipeline::new(Arc::new(OfflineTranslator)),
        );
        assert!(!state.check_backend().await.embeddings);
    }
}
