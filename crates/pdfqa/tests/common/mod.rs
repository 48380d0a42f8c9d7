//! Shared fixtures for the API tests

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Object, Stream};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

use pdfqa::config::AppConfig;
use pdfqa::postprocess::{AnswerPipeline, OfflineTranslator};
use pdfqa::providers::{EmbeddingProvider, GenerationParams, LlmProvider};
use pdfqa::{AppState, PdfQaServer, Result};

pub const ANSWER: &str = "El vuelo sale a las 10 de la mañana..";
pub const SUMMARY: &str = "Itinerario de viaje con vuelo y hotel";

/// Embeds by keyword so retrieval is predictable
pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_lowercase();
        Ok(vec![
            if text.contains("flight") { 1.0 } else { 0.0 },
            if text.contains("hotel") { 1.0 } else { 0.0 },
            0.1,
        ])
    }

    fn dimensions(&self) -> usize {
        3
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// Canned model that records every prompt
#[derive(Default)]
pub struct ScriptedLlm {
    pub prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if prompt.ends_with("Resumen:") {
            Ok(SUMMARY.to_string())
        } else if prompt.ends_with("Pregunta independiente:") {
            Ok("When is the hotel check-in?".to_string())
        } else {
            Ok(ANSWER.to_string())
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// A router over mock providers storing uploads in `upload_dir`
pub fn test_app(upload_dir: &Path) -> (Router, Arc<ScriptedLlm>) {
    let mut config = AppConfig::default();
    config.storage.upload_dir = upload_dir.to_path_buf();

    let llm = Arc::new(ScriptedLlm::default());
    let state = AppState::with_providers(
        config,
        Arc::new(KeywordEmbedder),
        llm.clone(),
        AnswerPipeline::new(Arc::new(OfflineTranslator)),
    );

    (PdfQaServer::with_state(state).build_router(), llm)
}

/// Send one request through the router
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart upload request with one part per file under `field`
pub fn upload_request(field: &str, files: &[(&str, Vec<u8>)]) -> Request<Body> {
    const BOUNDARY: &str = "pdfqa-test-boundary";

    let mut body = Vec::new();
    for (name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/pdf\r\n\r\n",
                BOUNDARY, field, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Minimal PDF with one line of text per page
pub fn build_pdf(pages: &[&str]) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids = Vec::new();
    for text in pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Count" => pages.len() as i64,
        "Kids" => kids,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}

pub fn itinerary_pdf() -> Vec<u8> {
    build_pdf(&[
        "The flight departs at 10 AM from gate 4",
        "Hotel check-in is at 3 PM near the old town",
    ])
}
