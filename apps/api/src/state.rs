use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::document::DocumentExtractor;
use crate::llm_client::Inference;
use crate::workflow::machine::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The one live session. Never locked across an inference call.
    pub session: Arc<Mutex<Session>>,
    /// Pluggable inference backend. Default: `OllamaClient` at the resolved base URL.
    pub llm: Arc<dyn Inference>,
    pub extractor: Arc<dyn DocumentExtractor>,
    pub config: Config,
}
