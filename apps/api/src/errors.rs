use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Unprocessable entity: {0}")]
    UnprocessableEntity(String),

    #[error("Consent required")]
    ConsentRequired,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Configuration(msg) => AppError::Configuration(msg),
            PipelineError::Upstream(e) => AppError::Upstream(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Configuration(msg) => {
                (StatusCode::BAD_REQUEST, "CONFIGURATION_ERROR", msg.clone())
            }
            AppError::UnprocessableEntity(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UNPROCESSABLE_ENTITY",
                msg.clone(),
            ),
            AppError::ConsentRequired => (
                StatusCode::FORBIDDEN,
                "CONSENT_REQUIRED",
                "Please accept the terms of use before generating content".to_string(),
            ),
            AppError::Upstream(msg) => {
                tracing::error!("Upstream model error: {msg}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "An error occurred while generating content. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmError;

    #[tokio::test]
    async fn test_upstream_detail_is_not_exposed() {
        let err: AppError = PipelineError::Upstream(LlmError::Api {
            status: 401,
            message: "Incorrect API key provided: sk-abc".to_string(),
        })
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("UPSTREAM_ERROR"));
        assert!(!body.contains("sk-abc"));
        assert!(!body.contains("Incorrect API key"));
    }

    #[test]
    fn test_configuration_maps_to_bad_request() {
        let err: AppError = PipelineError::Configuration("unknown task".to_string()).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_consent_required_is_forbidden() {
        assert_eq!(
            AppError::ConsentRequired.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
