//! Shared stubs for handler and workflow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::document::{DocumentError, DocumentExtractor};
use crate::llm_client::{Inference, InferenceError};
use crate::state::AppState;
use crate::workflow::machine::Session;

type Reply = Box<dyn Fn(&str) -> Result<Value, InferenceError> + Send + Sync>;

/// Inference stub: answers every call through `reply(model)` and counts calls.
pub struct StubInference {
    reply: Reply,
    pub calls: AtomicUsize,
}

impl StubInference {
    pub fn new(
        reply: impl Fn(&str) -> Result<Value, InferenceError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Inference for StubInference {
    async fn generate(&self, model: &str, _prompt: &str) -> Result<Value, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.reply)(model)
    }
}

/// Extractor stub returning fixed pages for any input.
pub struct StubExtractor(pub Vec<String>);

impl DocumentExtractor for StubExtractor {
    fn extract_pages(&self, _data: &[u8]) -> Result<Vec<String>, DocumentError> {
        Ok(self.0.clone())
    }
}

pub fn analysis_json() -> Value {
    json!({
        "overallScore": 83,
        "skillsMatch": 91.5,
        "experienceRelevance": 77,
        "keywordMatch": 64,
        "educationAlignment": 100,
        "missingSkills": ["Kafka"],
        "suggestions": ["Mention on-call ownership"],
        "summary": "Strong fit for the platform role."
    })
}

pub fn state_with(llm: Arc<StubInference>, pages: Vec<&str>) -> AppState {
    AppState {
        session: Arc::new(Mutex::new(Session::new("llama3"))),
        llm,
        extractor: Arc::new(StubExtractor(
            pages.into_iter().map(String::from).collect(),
        )),
        config: Config {
            ollama_url: "http://localhost:11434".to_string(),
            default_model: "llama3".to_string(),
            port: 8080,
            rust_log: "info".to_string(),
        },
    }
}
