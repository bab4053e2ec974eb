use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub anthropic_api_key: String,
    /// Webhook for generation audit records. Unset → records are discarded.
    pub audit_log_url: Option<String>,
    /// Webhook for consent records. Unset → records are discarded.
    pub consent_log_url: Option<String>,
    /// Unset → sessions are kept in memory.
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub rubric_dir: PathBuf,
    /// Retries on 429/5xx/transport errors per model call. 0 disables retrying.
    pub llm_max_retries: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: require_env("OPENAI_API_KEY")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            audit_log_url: optional_env("AUDIT_LOG_URL"),
            consent_log_url: optional_env("CONSENT_LOG_URL"),
            redis_url: optional_env("REDIS_URL"),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            rubric_dir: optional_env("RUBRIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("rubrics")),
            llm_max_retries: parse_env("LLM_MAX_RETRIES", 0)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values both count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
