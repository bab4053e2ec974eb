//! Generation pipeline. Orchestrates one request end to end.
//!
//! Flow: assemble → generate → extract self-judgement → gate →
//!       evaluate (second model) → refine → re-check → sanitize.
//!
//! Strictly sequential: every call depends on the previous call's output.
//! Nothing retries at this level. Audit delivery happens off the request path.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::audit::{AuditLogger, AuditRecord, LogEntry};
use crate::generation::assembler::PromptAssembler;
use crate::generation::evaluator::{Evaluator, EvaluatorVerdict};
use crate::generation::judgement::{extract, should_reject, EvaluationSummary};
use crate::generation::refiner::refine;
use crate::generation::sanitizer::sanitize;
use crate::generation::task::Task;
use crate::generation::PipelineError;
use crate::llm_client::prompts::{is_confidentiality_reply, CONFIDENTIALITY_MESSAGE};
use crate::llm_client::{TextGenerator, TokenUsage};

/// Inputs for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub task: Task,
    pub user_notes: String,
    pub rubric_text: String,
}

/// Where a rejected request was stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    /// The model answered with the confidentiality message instead of a draft.
    ModelDeclined,
    /// The initial draft's self-judgement was at or below the threshold.
    SelfCheck,
    /// The refined draft's self-judgement was at or below the threshold.
    RefinedSelfCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Rejected {
        stage: GateStage,
        message: String,
        summary: EvaluationSummary,
    },
    Completed {
        output: String,
        summary: EvaluationSummary,
        verdict: EvaluatorVerdict,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineRun {
    #[serde(flatten)]
    pub outcome: PipelineOutcome,
    /// Generation-model tokens across the draft and refinement calls.
    pub usage: TokenUsage,
}

/// Owns the collaborators the pipeline calls into.
pub struct Pipeline {
    assembler: PromptAssembler,
    generator: Arc<dyn TextGenerator>,
    evaluator: Arc<dyn Evaluator>,
    audit: AuditLogger,
}

impl Pipeline {
    pub fn new(
        assembler: PromptAssembler,
        generator: Arc<dyn TextGenerator>,
        evaluator: Arc<dyn Evaluator>,
        audit: AuditLogger,
    ) -> Self {
        Self {
            assembler,
            generator,
            evaluator,
            audit,
        }
    }

    /// Runs the full pipeline for one request.
    ///
    /// Steps:
    /// 1. assemble() → PromptBundle
    /// 2. generator.generate() → initial draft (upstream failure aborts)
    /// 3. extract() + should_reject() → stop with the confidentiality message on a low judgement
    /// 4. evaluator.evaluate() → verdict (never fails)
    /// 5. refine() → revised draft (upstream failure aborts)
    /// 6. extract() + should_reject() on the revised draft
    /// 7. sanitize() → final output
    pub async fn run(&self, request: PipelineRequest) -> Result<PipelineRun, PipelineError> {
        let task = request.task;

        // Step 1: Assemble prompt
        let bundle = self
            .assembler
            .assemble(task, &request.user_notes, &request.rubric_text)?;

        // Step 2: Initial draft
        info!("Generating initial draft for '{task}'");
        let initial = self.generator.generate(&bundle.system, &bundle.user).await?;
        let mut usage = initial.usage;

        // Step 3: Self-judgement gate
        let summary = extract(&initial.raw_text);
        info!(
            "Initial self-judgement: {:?} (markers found: {})",
            summary.judgement_score,
            !summary.is_empty()
        );

        let declined = is_confidentiality_reply(&initial.raw_text);
        if declined || should_reject(&summary) {
            let stage = if declined {
                GateStage::ModelDeclined
            } else {
                GateStage::SelfCheck
            };
            info!("Request rejected at {stage:?}; evaluator and refinement skipped");
            self.record(
                &request,
                &initial.raw_text,
                &EvaluatorVerdict::default(),
                "",
                usage,
                &summary,
            );
            return Ok(rejected(stage, summary, usage));
        }

        // Step 4: Independent evaluation
        let verdict = self
            .evaluator
            .evaluate(&initial.raw_text, &request.rubric_text)
            .await;

        // Step 5: Refinement
        info!("Refining draft for '{task}'");
        let refined = refine(
            self.generator.as_ref(),
            &bundle,
            &initial.raw_text,
            &verdict.feedback_text,
        )
        .await?;
        usage = usage.combine(refined.usage);

        self.record(
            &request,
            &initial.raw_text,
            &verdict,
            &refined.raw_text,
            usage,
            &summary,
        );

        // Step 6: Re-check the refined draft with the same extractor
        let refined_summary = extract(&refined.raw_text);
        if should_reject(&refined_summary) {
            info!(
                "Refined draft self-judgement {:?} rejected",
                refined_summary.judgement_score
            );
            return Ok(rejected(GateStage::RefinedSelfCheck, refined_summary, usage));
        }

        // Step 7: Sanitize
        let output = sanitize(&refined.raw_text);
        info!(
            "Pipeline completed for '{task}': evaluator_score={:?}, output_chars={}, tokens={:?}",
            verdict.score,
            output.len(),
            usage.total()
        );

        Ok(PipelineRun {
            outcome: PipelineOutcome::Completed {
                output,
                summary,
                verdict,
            },
            usage,
        })
    }

    fn record(
        &self,
        request: &PipelineRequest,
        initial_output: &str,
        verdict: &EvaluatorVerdict,
        refined_output: &str,
        usage: TokenUsage,
        summary: &EvaluationSummary,
    ) {
        self.audit.submit(LogEntry::Generation(AuditRecord {
            timestamp: Utc::now(),
            task: request.task,
            user_input: request.user_notes.clone(),
            initial_output: initial_output.to_string(),
            evaluator_feedback: verdict.feedback_text.clone(),
            evaluator_score: verdict.score,
            refined_output: refined_output.to_string(),
            token_counts: usage,
            user_summary: summary.user_summary.clone(),
            model_comparison: summary.model_comparison.clone(),
            model_judgement: summary.judgement_score,
        }));
    }
}

fn rejected(stage: GateStage, summary: EvaluationSummary, usage: TokenUsage) -> PipelineRun {
    PipelineRun {
        outcome: PipelineOutcome::Rejected {
            stage,
            message: CONFIDENTIALITY_MESSAGE.trim().to_string(),
            summary,
        },
        usage,
    }
}
