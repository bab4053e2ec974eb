use std::sync::Arc;

use crate::audit::AuditLogger;
use crate::generation::pipeline::Pipeline;
use crate::generation::rubrics::RubricStore;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    /// In-memory by default; Redis when REDIS_URL is set.
    pub sessions: Arc<dyn SessionStore>,
    pub rubrics: Arc<RubricStore>,
    /// Consent records go through here; generation records go through the pipeline's clone.
    pub audit: AuditLogger,
}
