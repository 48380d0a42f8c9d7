//! PDF upload endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};
use std::path::PathBuf;
use std::time::Instant;

use super::sanitize_filename;
use crate::error::{Error, Result};
use crate::retrieval::VectorIndex;
use crate::server::state::AppState;
use crate::types::response::UploadResponse;

/// Multipart field carrying the PDFs
const FILES_FIELD: &str = "files[]";

/// POST /api/upload - Save PDFs and rebuild the vector index
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    let start = Instant::now();
    let mut found_field = false;
    let mut saved: Vec<(String, PathBuf)> = Vec::new();

    tokio::fs::create_dir_all(state.upload_dir()).await?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        Error::BadRequest(format!("No se pudo leer el formulario: {}", e))
    })? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        found_field = true;

        let raw_name = field.file_name().unwrap_or("").to_string();
        if raw_name.is_empty() {
            continue;
        }

        let filename = match sanitize_filename(&raw_name) {
            Some(name) if name.to_lowercase().ends_with(".pdf") => name,
            _ => return Err(Error::InvalidFile(raw_name)),
        };

        let data = field.bytes().await.map_err(|e| {
            Error::BadRequest(format!("No se pudo leer el archivo {}: {}", filename, e))
        })?;

        let path = state.upload_path(&filename);
        tokio::fs::write(&path, &data).await?;
        tracing::info!("Saved {} ({} bytes)", filename, data.len());

        if !saved.iter().any(|(name, _)| name == &filename) {
            saved.push((filename, path));
        }
    }

    if !found_field {
        return Err(Error::BadRequest("No se encontraron archivos".to_string()));
    }
    if saved.is_empty() {
        return Err(Error::BadRequest("No se pudieron guardar los archivos".to_string()));
    }

    let paths: Vec<PathBuf> = saved.iter().map(|(_, path)| path.clone()).collect();
    rebuild_index(&state, &paths)
        .await
        .map_err(|e| Error::processing("Error al procesar documentos", e))?;

    tracing::info!(
        "Vector index built from {} file(s) in {:.1}s",
        saved.len(),
        start.elapsed().as_secs_f64()
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "Base de datos vectorial creada exitosamente".to_string(),
        files: saved.into_iter().map(|(name, _)| name).collect(),
    }))
}

/// Parse, chunk and embed the files, then swap in the new index
async fn rebuild_index(state: &AppState, paths: &[PathBuf]) -> Result<()> {
    let loaded = state.ingest().load_documents(paths).await?;
    if !loaded.skipped.is_empty() {
        tracing::warn!("Files without extractable text: {:?}", loaded.skipped);
    }

    let embedder = state.embedder();
    let index = VectorIndex::from_chunks(loaded.chunks, embedder.as_ref()).await?;
    tracing::info!("Indexed {} chunks ({} dimensions)", index.len(), index.dimensions());

    state.replace_index(index, loaded.documents).await;
    Ok(())
}
