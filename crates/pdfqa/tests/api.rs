//! End-to-end tests of the HTTP API with mock model providers

mod common;

use axum::http::{header, StatusCode};
use serde_json::json;

use common::*;

const MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

async fn upload_itinerary(app: &axum::Router) {
    let response = send(app, upload_request("files[]", &[("viaje.pdf", itinerary_pdf())])).await;
    assert_eq!(response.status(), StatusCode::OK);
}

async fn initialize(app: &axum::Router) {
    let response = send(app, post_json("/api/initialize_model", json!({ "model_name": MODEL }))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");

    let response = send(&app, get("/ready")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = body_json(send(&app, get("/api/health")).await).await;
    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_chat_requires_initialized_model() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, post_json("/api/chat", json!({ "question": "¿Hora?" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Primero debe inicializar el chatbot");
}

#[tokio::test]
async fn test_initialize_requires_upload() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, post_json("/api/initialize_model", json!({ "model_name": MODEL }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Primero debe crear la base de datos vectorial"
    );
}

#[tokio::test]
async fn test_upload_rejects_non_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, upload_request("files[]", &[("notas.txt", b"hola".to_vec())])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "El archivo notas.txt no es un PDF válido"
    );
}

#[tokio::test]
async fn test_upload_without_files() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, upload_request("documento", &[("viaje.pdf", itinerary_pdf())])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No se encontraron archivos");

    let response = send(&app, upload_request("files[]", &[("", itinerary_pdf())])).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "No se pudieron guardar los archivos");
}

#[tokio::test]
async fn test_upload_unreadable_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, upload_request("files[]", &[("roto.pdf", b"not a pdf".to_vec())])).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_json(response).await["error"],
        "Error al procesar documentos: No se pudo extraer contenido de los documentos PDF"
    );
}

#[tokio::test]
async fn test_upload_indexes_documents() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, upload_request("files[]", &[("viaje.pdf", itinerary_pdf())])).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Base de datos vectorial creada exitosamente");
    assert_eq!(body["files"], json!(["viaje.pdf"]));
    assert!(dir.path().join("viaje.pdf").exists());

    let body = body_json(send(&app, get("/api/documents")).await).await;
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["documents"][0]["filename"], "viaje.pdf");
    assert_eq!(body["documents"][0]["total_pages"], 2);
}

#[tokio::test]
async fn test_initialize_rejects_unknown_model() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());
    upload_itinerary(&app).await;

    let response = send(&app, post_json("/api/initialize_model", json!({ "model_name": "gpt2" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Modelo no válido");
}

#[tokio::test]
async fn test_chat_flow() {
    let dir = tempfile::tempdir().unwrap();
    let (app, llm) = test_app(dir.path());
    upload_itinerary(&app).await;

    let response = send(
        &app,
        post_json(
            "/api/initialize_model",
            json!({ "model_name": MODEL, "temperature": 0.2, "max_tokens": 512, "top_k": 5 }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Chatbot inicializado exitosamente");
    assert_eq!(body["model"], "Mistral-7B");

    assert_eq!(send(&app, get("/ready")).await.status(), StatusCode::OK);

    let response = send(&app, post_json("/api/chat", json!({ "question": "¿A qué hora sale el flight?" }))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["answer"], "El vuelo sale a las 10 de la mañana.");

    let sources = body["sources"].as_array().unwrap();
    assert!(!sources.is_empty() && sources.len() <= 3);
    assert_eq!(sources[0]["filename"], "viaje.pdf");
    assert_eq!(sources[0]["page"], 1);
    assert!(sources[0]["content"].as_str().unwrap().contains("flight"));

    // The follow-up is condensed before retrieval
    let body = body_json(send(&app, post_json("/api/chat", json!({ "question": "¿Y el hotel?" }))).await).await;
    assert_eq!(body["sources"][0]["page"], 2);
    assert!(llm
        .prompts
        .lock()
        .iter()
        .any(|p| p.ends_with("Pregunta independiente:")));
}

#[tokio::test]
async fn test_chat_requires_question() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());
    upload_itinerary(&app).await;
    initialize(&app).await;

    for body in [json!({}), json!({ "question": "   " })] {
        let response = send(&app, post_json("/api/chat", body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No se proporcionó ninguna pregunta");
    }
}

#[tokio::test]
async fn test_new_upload_resets_chatbot() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());
    upload_itinerary(&app).await;
    initialize(&app).await;

    upload_itinerary(&app).await;
    assert_eq!(send(&app, get("/ready")).await.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = send(&app, post_json("/api/chat", json!({ "question": "¿Hora?" }))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pdf_preview() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());
    upload_itinerary(&app).await;

    let response = send(&app, get("/api/pdf/viaje.pdf")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(body_bytes(response).await, itinerary_pdf_on_disk(dir.path()));

    let response = send(&app, get("/api/pdf/otro.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Archivo no encontrado");

    let response = send(&app, get("/api/pdf/..%2Fviaje.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

fn itinerary_pdf_on_disk(dir: &std::path::Path) -> Vec<u8> {
    std::fs::read(dir.join("viaje.pdf")).unwrap()
}

#[tokio::test]
async fn test_summary_without_model_is_generic() {
    let dir = tempfile::tempdir().unwrap();
    let (app, llm) = test_app(dir.path());
    upload_itinerary(&app).await;

    let response = send(&app, get("/api/summarize/viaje.pdf")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert!(body["summary"]
        .as_str()
        .unwrap()
        .starts_with("Este es un resumen automático del documento viaje.pdf."));
    assert!(llm.prompts.lock().is_empty());
}

#[tokio::test]
async fn test_summary_with_model() {
    let dir = tempfile::tempdir().unwrap();
    let (app, llm) = test_app(dir.path());
    upload_itinerary(&app).await;
    initialize(&app).await;

    let body = body_json(send(&app, get("/api/summarize/viaje.pdf")).await).await;
    assert_eq!(body["summary"], format!("{}.", SUMMARY));

    let prompts = llm.prompts.lock();
    assert!(prompts[0].contains("flight departs"));
    assert!(prompts[0].contains("viaje.pdf"));
}

#[tokio::test]
async fn test_summary_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _) = test_app(dir.path());

    let response = send(&app, get("/api/summarize/nada.pdf")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
