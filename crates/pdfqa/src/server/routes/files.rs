//! Uploaded file endpoints: PDF preview and summaries

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::path::PathBuf;

use super::sanitize_filename;
use crate::error::{Error, Result};
use crate::generation::{fallback_summary, leading_text, summarize};
use crate::ingestion::FileParser;
use crate::server::state::AppState;
use crate::types::response::SummaryResponse;

const NOT_FOUND_MESSAGE: &str = "Archivo no encontrado";

/// Resolve a stored upload, rejecting names outside the upload folder
async fn stored_file(state: &AppState, filename: &str) -> Result<(String, PathBuf)> {
    let name = sanitize_filename(filename)
        .filter(|name| name == filename)
        .ok_or_else(|| Error::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    let path = state.upload_path(&name);
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Ok((name, path)),
        _ => Err(Error::NotFound(NOT_FOUND_MESSAGE.to_string())),
    }
}

/// GET /api/pdf/:filename - Serve an uploaded PDF
pub async fn get_pdf(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse> {
    let (name, path) = stored_file(&state, &filename).await?;
    let data = tokio::fs::read(&path).await?;

    tracing::debug!("Serving {} ({} bytes)", name, data.len());

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename=\"{}\"", name)),
        ],
        data,
    ))
}

/// GET /api/summarize/:filename - Summarize the first pages of an upload
///
/// Uses the initialized model when there is one; otherwise, or when the
/// model fails, answers with a generic summary naming the file.
pub async fn summarize_document(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<SummaryResponse>> {
    let (name, path) = stored_file(&state, &filename).await?;

    let data = tokio::fs::read(&path).await?;
    let parse_name = name.clone();
    let parsed = tokio::task::spawn_blocking(move || FileParser::parse_pdf(&parse_name, &data))
        .await
        .map_err(|e| Error::internal(format!("PDF parsing task failed: {}", e)))?
        .map_err(|e| Error::processing("Error al generar el resumen", e))?;

    let text = leading_text(&parsed);

    let summary = match state.chain().await {
        Some(chain) => {
            let llm = state.llm();
            match summarize(llm.as_ref(), &chain.settings().params, &name, &text).await {
                Ok(summary) => summary,
                Err(e) => {
                    tracing::warn!("Summary generation failed for {}: {}", name, e);
                    fallback_summary(&name)
                }
            }
        }
        None => fallback_summary(&name),
    };

    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}
