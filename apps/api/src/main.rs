mod audit;
mod config;
mod errors;
mod generation;
mod llm_client;
mod routes;
mod session;
mod state;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::audit::{AuditLogger, DiscardSink, LogSink, WebhookSink};
use crate::config::Config;
use crate::generation::assembler::PromptAssembler;
use crate::generation::evaluator::LlmEvaluator;
use crate::generation::pipeline::Pipeline;
use crate::generation::rubrics::RubricStore;
use crate::llm_client::anthropic::AnthropicClient;
use crate::llm_client::openai::OpenAiClient;
use crate::routes::build_router;
use crate::session::{InMemorySessionStore, RedisSessionStore, SessionStore};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing API keys)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hiring API v{}", env!("CARGO_PKG_VERSION"));

    // Model clients: drafting and refinement on one vendor, evaluation on the other
    let generator = Arc::new(OpenAiClient::new(
        config.openai_api_key.clone(),
        config.llm_max_retries,
    )?);
    let evaluator_llm = Arc::new(AnthropicClient::new(
        config.anthropic_api_key.clone(),
        config.llm_max_retries,
    )?);
    info!(
        "LLM clients initialized (generation: {}, evaluation: {}, max retries: {})",
        llm_client::openai::MODEL,
        llm_client::anthropic::MODEL,
        config.llm_max_retries
    );

    // Session store
    let sessions: Arc<dyn SessionStore> = match &config.redis_url {
        Some(url) => {
            let client = redis::Client::open(url.as_str())?;
            info!("Redis session store initialized (ttl {}s)", config.session_ttl_secs);
            Arc::new(RedisSessionStore::new(client, config.session_ttl_secs))
        }
        None => {
            warn!("REDIS_URL not set; sessions are kept in memory and lost on restart");
            Arc::new(InMemorySessionStore::default())
        }
    };

    // Audit and consent log delivery
    let (audit, _audit_worker) = AuditLogger::spawn(
        log_sink(config.audit_log_url.as_deref(), "audit"),
        log_sink(config.consent_log_url.as_deref(), "consent"),
    );

    let rubrics = RubricStore::new(config.rubric_dir.clone());
    info!("Loading rubrics from {}", rubrics.dir().display());

    let pipeline = Pipeline::new(
        PromptAssembler::default(),
        generator,
        Arc::new(LlmEvaluator::new(evaluator_llm)),
        audit.clone(),
    );

    // Build app state
    let state = AppState {
        pipeline: Arc::new(pipeline),
        sessions,
        rubrics: Arc::new(rubrics),
        audit,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn log_sink(url: Option<&str>, name: &str) -> Arc<dyn LogSink> {
    match url {
        Some(url) => {
            info!("Delivering {name} log entries to webhook");
            Arc::new(WebhookSink::new(url))
        }
        None => {
            warn!("No {name} log endpoint configured; entries will be discarded");
            Arc::new(DiscardSink)
        }
    }
}
