//! Axum route handlers for the consent gate.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::audit::{ConsentRecord, LogEntry};
use crate::errors::AppError;
use crate::session::SessionContext;
use crate::state::AppState;

/// Recorded in the consent log when a user accepts the terms.
pub const CONSENT_ACCEPTED: &str = "I have read and agree to the terms of use";

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub email: String,
    pub agreed: bool,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub session_id: Uuid,
}

/// POST /api/v1/consent
///
/// Records the user's agreement and opens a session. The returned `session_id`
/// must be sent as `x-session-id` on every generation request.
pub async fn handle_consent(
    State(state): State<AppState>,
    Json(request): Json<ConsentRequest>,
) -> Result<Json<ConsentResponse>, AppError> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "A valid email address is required".to_string(),
        ));
    }
    if !request.agreed {
        return Err(AppError::Validation(
            "You must agree to the terms of use to continue".to_string(),
        ));
    }

    let session = SessionContext {
        session_id: Uuid::new_v4(),
        email: email.to_string(),
        consented_at: Utc::now(),
    };

    state
        .sessions
        .put(&session)
        .await
        .map_err(|e| AppError::Internal(e.into()))?;

    state.audit.submit(LogEntry::Consent(ConsentRecord {
        timestamp: session.consented_at,
        email: session.email.clone(),
        consent: CONSENT_ACCEPTED.to_string(),
    }));

    info!("Consent recorded, session {} opened", session.session_id);

    Ok(Json(ConsentResponse {
        session_id: session.session_id,
    }))
}
