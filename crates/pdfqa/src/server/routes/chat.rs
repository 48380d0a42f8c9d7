//! Chat endpoint

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{
    response::{ChatResponse, SourceRef},
    ChatRequest,
};

/// POST /api/chat - Answer a question about the uploaded PDFs
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let chain = state
        .chain()
        .await
        .ok_or_else(|| Error::NotReady("Primero debe inicializar el chatbot".to_string()))?;

    let question = request
        .question()
        .ok_or_else(|| Error::BadRequest("No se proporcionó ninguna pregunta".to_string()))?;

    let start = Instant::now();
    tracing::info!("Question: \"{}\"", question);

    let response = chain
        .ask(question)
        .await
        .map_err(|e| Error::processing("Error al procesar la consulta", e))?;

    let answer = state.answers().process(&response.answer, question).await;

    let sources: Vec<SourceRef> = response
        .sources
        .iter()
        .take(state.config().retrieval.max_sources)
        .map(|result| SourceRef::from(&result.chunk))
        .collect();

    tracing::info!(
        "Answered in {:.1}s with {} source(s)",
        start.elapsed().as_secs_f64(),
        sources.len()
    );

    Ok(Json(ChatResponse {
        success: true,
        answer,
        sources,
    }))
}
