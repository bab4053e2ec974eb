//! Axum route handlers for the Generation API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::generation::pipeline::{PipelineRequest, PipelineRun};
use crate::generation::task::{Task, UnknownTask};
use crate::session::SessionContext;
use crate::state::AppState;

const EMPTY_NOTES_MESSAGE: &str = "Please provide text or upload a file with valid content.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub task: String,
    pub user_notes: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub task: Task,
    #[serde(flatten)]
    pub run: PipelineRun,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskInfo {
    pub slug: &'static str,
    pub label: &'static str,
    pub progress_text: &'static str,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/tasks
pub async fn handle_list_tasks() -> Json<Vec<TaskInfo>> {
    Json(
        Task::ALL
            .into_iter()
            .map(|t| TaskInfo {
                slug: t.slug(),
                label: t.label(),
                progress_text: t.progress_text(),
            })
            .collect(),
    )
}

/// POST /api/v1/generate
///
/// Runs the full pipeline on pasted notes.
pub async fn handle_generate(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    run_generation(&state, &session, &request.task, request.user_notes).await
}

/// POST /api/v1/generate/upload
///
/// Multipart form with a `task` field and a plain-text `file` field holding the notes.
pub async fn handle_generate_upload(
    State(state): State<AppState>,
    session: SessionContext,
    mut multipart: Multipart,
) -> Result<Json<GenerateResponse>, AppError> {
    let mut task: Option<String> = None;
    let mut notes: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("task") => {
                task = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::Validation(format!("Unreadable task field: {e}")))?,
                );
            }
            Some("file") => {
                let content_type = field.content_type().map(str::to_string);
                if let Some(ct) = content_type.as_deref() {
                    if !ct.starts_with("text/plain") {
                        return Err(AppError::UnprocessableEntity(format!(
                            "Unsupported file type '{ct}'; upload a plain-text file"
                        )));
                    }
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Unreadable file field: {e}")))?;
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    AppError::UnprocessableEntity("Uploaded file is not valid UTF-8 text".to_string())
                })?;
                notes = Some(text);
            }
            _ => {}
        }
    }

    let task = task.ok_or_else(|| AppError::Validation("task field is required".to_string()))?;
    run_generation(&state, &session, &task, notes.unwrap_or_default()).await
}

/// Shared by both generation endpoints: validate, load the rubric, run the pipeline.
async fn run_generation(
    state: &AppState,
    session: &SessionContext,
    task_name: &str,
    user_notes: String,
) -> Result<Json<GenerateResponse>, AppError> {
    let task: Task = task_name
        .parse()
        .map_err(|e: UnknownTask| AppError::Configuration(e.to_string()))?;

    if user_notes.trim().is_empty() {
        return Err(AppError::Validation(EMPTY_NOTES_MESSAGE.to_string()));
    }

    info!(
        "Session {} requested '{}' ({} chars of notes)",
        session.session_id,
        task,
        user_notes.len()
    );

    let rubric = state.rubrics.load(task).await;
    let warnings: Vec<String> = rubric.warning.into_iter().collect();

    let run = state
        .pipeline
        .run(PipelineRequest {
            task,
            user_notes,
            rubric_text: rubric.text,
        })
        .await?;

    Ok(Json(GenerateResponse {
        task,
        run,
        warnings,
    }))
}
