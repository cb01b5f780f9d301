use anyhow::{Context, Result};

use crate::cli::Args;
use crate::models::catalog::DEFAULT_MODEL;

/// Default Ollama endpoint when neither a runtime nor an environment override is set.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Placeholder left behind when the container entrypoint did not template the runtime URL.
pub const OLLAMA_URL_PLACEHOLDER: &str = "__OLLAMA_URL__";

/// Environment keys consulted for the endpoint, in order.
const OLLAMA_URL_ENV_KEYS: [&str; 2] = ["NEXT_PUBLIC_OLLAMA_URL", "OLLAMA_URL"];

/// Application configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub ollama_url: String,
    pub default_model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env(args: &Args) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let env_url = OLLAMA_URL_ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok())
            .find(|value| !value.trim().is_empty());

        let port = match args.port {
            Some(port) => port,
            None => std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
        };

        Ok(Config {
            ollama_url: resolve_ollama_url(args.ollama_url.as_deref(), env_url.as_deref()),
            default_model: std::env::var("ATS_DEFAULT_MODEL")
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            port,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Picks the inference endpoint: runtime override, then environment, then the default.
///
/// A runtime value that is blank or still equal to [`OLLAMA_URL_PLACEHOLDER`] is ignored.
pub fn resolve_ollama_url(runtime: Option<&str>, env: Option<&str>) -> String {
    let runtime = runtime
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != OLLAMA_URL_PLACEHOLDER);
    let env = env.map(str::trim).filter(|v| !v.is_empty());

    runtime
        .or(env)
        .unwrap_or(DEFAULT_OLLAMA_URL)
        .trim_end_matches('/')
        .to_string()
}
