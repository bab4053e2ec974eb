// Hiring-content generation engine.
// Implements: prompt assembly, drafting, self-judgement gate, independent evaluation,
// refinement, and output sanitizing. All model calls go through llm_client.

use thiserror::Error;

use crate::llm_client::LlmError;

pub mod assembler;
pub mod evaluator;
pub mod handlers;
pub mod judgement;
pub mod pipeline;
pub mod prompts;
pub mod refiner;
pub mod rubrics;
pub mod sanitizer;
pub mod task;

/// Failures that stop a pipeline run. Parse problems are never errors here.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream model call failed: {0}")]
    Upstream(#[from] LlmError),
}
