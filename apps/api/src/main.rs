mod cli;
mod config;
mod document;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
#[cfg(test)]
mod testing;
mod workflow;

use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Args;
use crate::config::Config;
use crate::document::PdfExtractor;
use crate::llm_client::OllamaClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::machine::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Configuration is resolved once here and injected everywhere else
    let config = Config::from_env(&args)?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ATS Pro v{}", env!("CARGO_PKG_VERSION"));

    let llm = OllamaClient::new(config.ollama_url.clone())?;
    info!(
        "Inference client initialized (endpoint: {}, default model: {})",
        llm.base_url(),
        config.default_model
    );

    let state = AppState {
        session: Arc::new(Mutex::new(Session::new(config.default_model.clone()))),
        llm: Arc::new(llm),
        extractor: Arc::new(PdfExtractor),
        config: config.clone(),
    };

    // Browser front ends are served from other origins
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
