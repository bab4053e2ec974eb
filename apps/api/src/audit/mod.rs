//! Audit logging: fire-and-forget delivery of flat records to a remote
//! append-only log (a spreadsheet webhook in production).
//!
//! Callers hand entries to `AuditLogger::submit`, which never blocks and never
//! fails. A background worker drains the queue and delivers each entry to the
//! sink for its kind. Delivery failures are logged and dropped; nothing retries.

use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::generation::task::Task;
use crate::llm_client::TokenUsage;

/// One generation request, flattened for a spreadsheet row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub task: Task,
    pub user_input: String,
    pub initial_output: String,
    pub evaluator_feedback: String,
    pub evaluator_score: Option<u8>,
    pub refined_output: String,
    pub token_counts: TokenUsage,
    pub user_summary: String,
    pub model_comparison: String,
    pub model_judgement: Option<u8>,
}

/// A user agreeing to the terms of use.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsentRecord {
    pub timestamp: DateTime<Utc>,
    pub email: String,
    pub consent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogEntry {
    Generation(AuditRecord),
    Consent(ConsentRecord),
}

impl LogEntry {
    fn kind(&self) -> &'static str {
        match self {
            LogEntry::Generation(_) => "generation",
            LogEntry::Consent(_) => "consent",
        }
    }
}

/// Destination for log entries.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<()>;
}

/// POSTs each entry as JSON. Any non-2xx status is an error.
pub struct WebhookSink {
    client: reqwest::Client,
    url: String,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl LogSink for WebhookSink {
    async fn append(&self, entry: &LogEntry) -> Result<()> {
        let response = self.client.post(&self.url).json(entry).send().await?;
        let status = response.status();
        if !status.is_success() {
            bail!("log webhook returned {status}");
        }
        Ok(())
    }
}

/// Used when no webhook is configured.
pub struct DiscardSink;

#[async_trait]
impl LogSink for DiscardSink {
    async fn append(&self, entry: &LogEntry) -> Result<()> {
        debug!("No log endpoint configured; discarding {} entry", entry.kind());
        Ok(())
    }
}

/// Cheap-to-clone handle onto the log queue.
#[derive(Clone)]
pub struct AuditLogger {
    tx: mpsc::UnboundedSender<LogEntry>,
}

impl AuditLogger {
    /// Starts the delivery worker. It exits once every `AuditLogger` clone is dropped
    /// and the queue is drained.
    pub fn spawn(
        generation_sink: Arc<dyn LogSink>,
        consent_sink: Arc<dyn LogSink>,
    ) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<LogEntry>();

        let handle = tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                let sink = match entry {
                    LogEntry::Generation(_) => &generation_sink,
                    LogEntry::Consent(_) => &consent_sink,
                };
                if let Err(e) = sink.append(&entry).await {
                    warn!("Failed to deliver {} log entry: {e:#}", entry.kind());
                }
            }
            debug!("Audit log worker stopped");
        });

        (Self { tx }, handle)
    }

    pub fn submit(&self, entry: LogEntry) {
        if self.tx.send(entry).is_err() {
            warn!("Audit log worker is gone; dropping entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSink;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn consent(email: &str) -> LogEntry {
        LogEntry::Consent(ConsentRecord {
            timestamp: Utc::now(),
            email: email.to_string(),
            consent: "agreed".to_string(),
        })
    }

    fn generation() -> LogEntry {
        LogEntry::Generation(AuditRecord {
            timestamp: Utc::now(),
            task: Task::JobDescription,
            user_input: "notes".to_string(),
            initial_output: "draft".to_string(),
            evaluator_feedback: "tighten".to_string(),
            evaluator_score: Some(3),
            refined_output: "final".to_string(),
            token_counts: TokenUsage::new(10, 20),
            user_summary: "X".to_string(),
            model_comparison: "Y".to_string(),
            model_judgement: Some(4),
        })
    }

    #[tokio::test]
    async fn test_worker_routes_entries_by_kind() {
        let generation_sink = Arc::new(RecordingSink::default());
        let consent_sink = Arc::new(RecordingSink::default());
        let (logger, handle) = AuditLogger::spawn(generation_sink.clone(), consent_sink.clone());

        logger.submit(consent("a@example.com"));
        logger.submit(generation());
        logger.submit(consent("b@example.com"));
        drop(logger);
        handle.await.unwrap();

        assert_eq!(generation_sink.entries().len(), 1);
        let consents = consent_sink.entries();
        assert_eq!(consents.len(), 2);
        assert!(matches!(&consents[1], LogEntry::Consent(c) if c.email == "b@example.com"));
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_stop_worker() {
        let failing = Arc::new(RecordingSink::failing());
        let consent_sink = Arc::new(RecordingSink::default());
        let (logger, handle) = AuditLogger::spawn(failing.clone(), consent_sink.clone());

        logger.submit(generation());
        logger.submit(consent("after@example.com"));
        drop(logger);
        handle.await.unwrap();

        assert_eq!(failing.entries().len(), 1);
        assert_eq!(consent_sink.entries().len(), 1);
    }

    #[tokio::test]
    async fn test_webhook_posts_flat_record() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/log"))
            .and(body_partial_json(json!({
                "kind": "generation",
                "task": "job_description",
                "evaluator_score": 3,
                "model_judgement": 4,
                "token_counts": {"prompt_tokens": 10, "completion_tokens": 20}
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/log", server.uri()));
        sink.append(&generation()).await.unwrap();
    }

    #[tokio::test]
    async fn test_webhook_non_success_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(server.uri());
        let err = sink.append(&consent("c@example.com")).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }
}
