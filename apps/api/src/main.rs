mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::extraction::extractor::LlmResumeExtractor;
use crate::extraction::pipeline::PipelineSettings;
use crate::extraction::schema::{self, RESUME_FIELDS};
use crate::extraction::store::BatchStore;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeLens v{}", env!("CARGO_PKG_VERSION"));

    // A malformed field table would break every batch, so refuse to start.
    schema::validate(RESUME_FIELDS).context("Resume field table is invalid")?;
    info!("Resume schema loaded ({} fields)", RESUME_FIELDS.len());

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_api_url.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let extractor = Arc::new(LlmResumeExtractor::new(llm, RESUME_FIELDS));

    let settings = PipelineSettings {
        document_timeout: Duration::from_secs(config.document_timeout_secs),
        emit_partial_records: config.emit_partial_records,
        scratch_root: config
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir),
        max_member_bytes: config.max_archive_member_bytes,
    };
    std::fs::create_dir_all(&settings.scratch_root).with_context(|| {
        format!(
            "Cannot create scratch directory {}",
            settings.scratch_root.display()
        )
    })?;
    info!(
        "Pipeline: timeout {}s per document, partial records {}",
        config.document_timeout_secs, config.emit_partial_records
    );

    // Build app state
    let state = AppState {
        extractor,
        fields: RESUME_FIELDS,
        settings: Arc::new(settings),
        batches: BatchStore::new(config.max_retained_batches),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
