//! Model initialization endpoint

use axum::{extract::State, Json};

use crate::error::{Error, Result};
use crate::generation::{ConversationalChain, ModelSettings};
use crate::server::state::AppState;
use crate::types::{response::InitializeModelResponse, InitializeModelRequest};

/// POST /api/initialize_model - Create the conversational chain
pub async fn initialize_model(
    State(state): State<AppState>,
    Json(request): Json<InitializeModelRequest>,
) -> Result<Json<InitializeModelResponse>> {
    let index = state.index().ok_or_else(|| {
        Error::NotReady("Primero debe crear la base de datos vectorial".to_string())
    })?;

    let settings = ModelSettings::resolve(state.config(), &request)?;
    let model = settings.display_name.clone();

    tracing::info!(
        "Initializing {} (temperature {}, max tokens {}, top-k {})",
        settings.params.model,
        settings.params.temperature,
        settings.params.max_new_tokens,
        settings.params.top_k
    );

    let chain = ConversationalChain::new(
        state.llm(),
        state.embedder(),
        index,
        settings,
        state.config().retrieval.k,
    );
    state.set_chain(chain).await;

    Ok(Json(InitializeModelResponse {
        success: true,
        message: "Chatbot inicializado exitosamente".to_string(),
        model,
    }))
}
