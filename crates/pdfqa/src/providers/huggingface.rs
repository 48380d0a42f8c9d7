//! Hugging Face Inference providers for embeddings and text generation

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{GenerationParams, LlmProvider};
use super::retry::RetryPolicy;

/// HTTP client shared by the Hugging Face providers
#[derive(Clone)]
pub struct HfClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
}

#[derive(Serialize)]
struct FeatureExtractionRequest<'a> {
    inputs: &'a [String],
    options: InferenceOptions,
}

/// Sentence models return one vector per input; raw encoders return one per token
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureExtractionResponse {
    Pooled(Vec<Vec<f32>>),
    TokenLevel(Vec<Vec<Vec<f32>>>),
}

#[derive(Serialize)]
struct TextGenerationRequest<'a> {
    inputs: &'a str,
    parameters: TextGenerationParameters,
    options: InferenceOptions,
}

#[derive(Serialize)]
struct TextGenerationParameters {
    temperature: f32,
    max_new_tokens: u32,
    top_k: u32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Many(Vec<GeneratedText>),
    One(GeneratedText),
}

impl HfClient {
    /// Create a client from the LLM configuration
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()?;

        Ok(Self {
            client,
            base_url: config.hf_base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            retry: RetryPolicy::new(config.max_retries),
        })
    }

    /// Override the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// POST a JSON body with retries, mapping failures through `to_error`
    async fn post_json<B, R>(
        &self,
        path: &str,
        body: &B,
        what: &str,
        to_error: fn(String) -> Error,
    ) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.base_url, path);
        let url = &url;
        let client = &self.client;
        let token = self.token.as_deref();

        self.retry
            .run(what, || async move {
                let mut request = client.post(url).json(body);
                if let Some(token) = token {
                    request = request.bearer_auth(token);
                }

                let response = request
                    .send()
                    .await
                    .map_err(|e| to_error(format!("{} request failed: {}", what, e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(to_error(format!("{} failed: HTTP {} - {}", what, status, body)));
                }

                response
                    .json::<R>()
                    .await
                    .map_err(|e| to_error(format!("Failed to parse {} response: {}", what, e)))
            })
            .await
    }

    /// True when the inference endpoint answers at all
    async fn reachable(&self) -> Result<bool> {
        match self.client.get(&self.base_url).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::debug!("Hugging Face endpoint unreachable: {}", e);
                Ok(false)
            }
        }
    }
}

/// Feature-extraction embedder (sentence-transformers models)
pub struct HuggingFaceEmbedder {
    client: HfClient,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl HuggingFaceEmbedder {
    /// Create an embedder for the configured model
    pub fn new(client: HfClient, config: &EmbeddingConfig) -> Self {
        Self {
            client,
            model: config.model.clone(),
            dimensions: config.dimensions,
            batch_size: config.batch_size.max(1),
        }
    }

    async fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = FeatureExtractionRequest {
            inputs: texts,
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        let path = format!("models/{}/pipeline/feature-extraction", self.model);

        let response: FeatureExtractionResponse = self
            .client
            .post_json(&path, &request, "Embedding", Error::Embedding)
            .await?;

        let embeddings = match response {
            FeatureExtractionResponse::Pooled(vectors) => vectors,
            FeatureExtractionResponse::TokenLevel(tokens) => tokens.iter().map(|t| mean_pool(t)).collect(),
        };

        if embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embeddings.len()
            )));
        }

        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimensions) {
            return Err(Error::embedding(format!(
                "Expected {} dimensions from {}, got {}",
                self.dimensions,
                self.model,
                bad.len()
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embeddings = self.embed_chunk(&[text.to_string()]).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.embed_chunk(batch).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.reachable().await
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}

/// Average token vectors into one sentence vector
fn mean_pool(tokens: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = tokens.first() else {
        return Vec::new();
    };

    let mut pooled = vec![0.0f32; first.len()];
    for token in tokens {
        for (acc, value) in pooled.iter_mut().zip(token) {
            *acc += value;
        }
    }

    let count = tokens.len() as f32;
    pooled.iter_mut().for_each(|v| *v /= count);
    pooled
}

/// Text-generation provider for hosted instruct models
pub struct HuggingFaceLlm {
    client: HfClient,
}

impl HuggingFaceLlm {
    pub fn new(client: HfClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LlmProvider for HuggingFaceLlm {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        tracing::info!("Generating with Hugging Face model: {}", params.model);

        let request = TextGenerationRequest {
            inputs: prompt,
            parameters: TextGenerationParameters {
                temperature: params.temperature,
                max_new_tokens: params.max_new_tokens,
                top_k: params.top_k,
                return_full_text: false,
            },
            options: InferenceOptions {
                wait_for_model: true,
            },
        };
        let path = format!("models/{}", params.model);

        let response: TextGenerationResponse = self
            .client
            .post_json(&path, &request, "Generation", Error::Llm)
            .await?;

        let text = match response {
            TextGenerationResponse::Many(mut items) => {
                if items.is_empty() {
                    return Err(Error::llm("Empty generation response"));
                }
                items.swap_remove(0).generated_text
            }
            TextGenerationResponse::One(item) => item.generated_text,
        };

        Ok(text.trim().to_string())
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.reachable().await
    }

    fn name(&self) -> &str {
        "huggingface"
    }
}
