//! Sessions: the explicit record that a user has accepted the terms of use.
//!
//! A session exists only after consent, so holding a `SessionContext` is the proof
//! that the consent step completed. Handlers receive it as an extractor argument.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

pub mod handlers;

/// Header carrying the session id issued by `POST /api/v1/consent`.
pub const SESSION_HEADER: &str = "x-session-id";

const REDIS_KEY_PREFIX: &str = "hiring-api:session:";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub email: String,
    pub consented_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Session serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn put(&self, session: &SessionContext) -> Result<(), SessionError>;
    async fn get(&self, session_id: Uuid) -> Result<Option<SessionContext>, SessionError>;
}

/// Process-local store. Sessions live until restart.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<Uuid, SessionContext>>,
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn put(&self, session: &SessionContext) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .insert(session.session_id, session.clone());
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<SessionContext>, SessionError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }
}

/// Redis-backed store; sessions expire after `ttl_secs`.
pub struct RedisSessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    fn key(session_id: Uuid) -> String {
        format!("{REDIS_KEY_PREFIX}{session_id}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn put(&self, session: &SessionContext) -> Result<(), SessionError> {
        let value = serde_json::to_string(session)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(Self::key(session.session_id), value, self.ttl_secs)
            .await?;
        Ok(())
    }

    async fn get(&self, session_id: Uuid) -> Result<Option<SessionContext>, SessionError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = conn.get(Self::key(session_id)).await?;
        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(SessionError::from)
    }
}

/// Resolves the `x-session-id` header to a stored session, or rejects with 403.
#[async_trait]
impl FromRequestParts<AppState> for SessionContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::ConsentRequired)?;

        let session_id = Uuid::parse_str(raw.trim())
            .map_err(|_| AppError::Validation(format!("{SESSION_HEADER} must be a UUID")))?;

        state
            .sessions
            .get(session_id)
            .await
            .map_err(|e| AppError::Internal(e.into()))?
            .ok_or(AppError::ConsentRequired)
    }
}
