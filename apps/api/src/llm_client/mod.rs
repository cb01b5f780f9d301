//! Inference client: the single point of entry for calls to the local Ollama server.
//!
//! ARCHITECTURAL RULE: No other module may talk to the inference server directly.
//! Workflow code depends on the `Inference` trait, never on `OllamaClient`.
//!
//! One request per call. No retries and no client-side timeout: a slow local
//! model is allowed to take as long as it needs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model '{model}' not found. Run 'ollama pull {model}' in your terminal.")]
    ModelNotFound { model: String },

    #[error(
        "Ollama connection refused: {endpoint} is unreachable. \
        Ensure Ollama is running and OLLAMA_ORIGINS='*' is configured."
    )]
    TransportUnreachable {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Ollama Error: {status_text} (HTTP {status})")]
    Protocol { status: u16, status_text: String },

    #[error(
        "Model '{model}' did not return valid JSON. \
        Try again or select a different model."
    )]
    MalformedResponse { model: String, detail: String },
}

impl InferenceError {
    fn malformed(model: &str, detail: impl ToString) -> Self {
        InferenceError::MalformedResponse {
            model: model.to_string(),
            detail: detail.to_string(),
        }
    }

    /// Diagnostic detail not shown to the user.
    pub fn detail(&self) -> Option<&str> {
        match self {
            InferenceError::MalformedResponse { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

/// Anything that can turn a prompt into a JSON value for a named model.
/// `AppState` carries an `Arc<dyn Inference>`; tests swap in a stub.
#[async_trait]
pub trait Inference: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Value, InferenceError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    format: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: Option<Value>,
    eval_count: Option<u64>,
    total_duration: Option<u64>,
}

/// HTTP client for an Ollama-compatible `/api/generate` endpoint.
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .build()
                .context("Failed to build HTTP client")?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Inference for OllamaClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<Value, InferenceError> {
        let endpoint = format!("{}{}", self.base_url, GENERATE_PATH);
        let request_body = GenerateRequest {
            model,
            prompt,
            stream: false,
            format: "json",
        };

        debug!("Calling {} with model {}", endpoint, model);

        let response = self
            .client
            .post(&endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|source| InferenceError::TransportUnreachable {
                endpoint: self.base_url.clone(),
                source,
            })?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(InferenceError::ModelNotFound {
                model: model.to_string(),
            });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Inference server returned {}: {}", status, body);
            return Err(InferenceError::Protocol {
                status: status.as_u16(),
                status_text: status
                    .canonical_reason()
                    .unwrap_or("Unknown status")
                    .to_string(),
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::malformed(model, e))?;

        debug!(
            "Inference call succeeded: eval_count={:?}, total_duration_ns={:?}",
            generated.eval_count, generated.total_duration
        );

        let payload = generated
            .response
            .ok_or_else(|| InferenceError::malformed(model, "missing `response` field"))?;

        parse_payload(model, payload)
    }
}

/// Calls the model and deserializes its JSON payload into `T`.
/// A payload that parses but does not fit `T` is reported as malformed too.
pub async fn generate_json<T: DeserializeOwned>(
    llm: &dyn Inference,
    model: &str,
    prompt: &str,
) -> Result<T, InferenceError> {
    let value = llm.generate(model, prompt).await?;
    serde_json::from_value(value).map_err(|e| {
        warn!("Model {} returned JSON outside the requested schema: {}", model, e);
        InferenceError::malformed(model, e)
    })
}

/// Unwraps the embedded `response`: a JSON string is parsed, an object is used as is.
fn parse_payload(model: &str, payload: Value) -> Result<Value, InferenceError> {
    match payload {
        Value::String(text) => serde_json::from_str(strip_json_fences(&text)).map_err(|e| {
            warn!("Model {} returned unparseable JSON: {}", model, e);
            InferenceError::malformed(model, e)
        }),
        value @ (Value::Object(_) | Value::Array(_)) => Ok(value),
        other => Err(InferenceError::malformed(
            model,
            format!("unexpected response payload: {other}"),
        )),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
