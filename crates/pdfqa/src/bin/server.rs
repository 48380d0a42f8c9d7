//! PDF QA server binary
//!
//! Run with: cargo run -p pdfqa --bin pdfqa-server

use pdfqa::{config::AppConfig, server::PdfQaServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfqa=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                         PDF QA                            ║
║          Preguntas y respuestas sobre documentos PDF      ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let config = AppConfig::load()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Backend: {:?}", config.backend);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Chunk size: {} (overlap {})", config.chunking.chunk_size, config.chunking.chunk_overlap);
    tracing::info!(
        "  - Models: {}",
        config
            .llm
            .models
            .iter()
            .map(|m| m.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!("  - Translation API: {}", if config.translation.enabled { "on" } else { "off" });

    // Create and start server
    let server = PdfQaServer::new(config).await?;

    // Check the model backend
    tracing::info!("Checking model backend...");
    let health = server.state().check_backend().await;
    if health.is_healthy() {
        tracing::info!("Model backend is reachable");
    } else {
        if !health.embeddings {
            tracing::warn!("Embedding backend not available; uploads will fail until it is");
        }
        if !health.llm {
            tracing::warn!("LLM backend not available; chat will fail until it is");
        }
        tracing::warn!("Check HF_TOKEN for Hugging Face, or run `ollama serve` for the Ollama backend");
    }

    println!("\nServer starting...");
    println!("  API: http://{}/api", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload           - Upload PDFs");
    println!("  POST /api/initialize_model - Select the model");
    println!("  POST /api/chat             - Ask questions");
    println!("  GET  /api/documents        - List documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
