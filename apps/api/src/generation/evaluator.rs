//! Evaluator: a second, independent model grades the draft against the rubric.
//!
//! Fails soft: any transport or parse problem produces an empty verdict and the
//! pipeline carries on to refinement.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generation::judgement::MAX_JUDGEMENT;
use crate::generation::prompts::{EVALUATOR_PROMPT_TEMPLATE, EVALUATOR_SYSTEM, NO_RUBRIC_TEXT};
use crate::llm_client::TextGenerator;

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"Score:\s*(\d)").unwrap());
static FEEDBACK_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)Feedback:\s*(.*)").unwrap());

/// The evaluator's grade. `score` may be `None` even when the call succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluatorVerdict {
    pub score: Option<u8>,
    pub feedback_text: String,
}

#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Never fails; problems degrade to `EvaluatorVerdict::default()`.
    async fn evaluate(&self, draft_text: &str, rubric_text: &str) -> EvaluatorVerdict;
}

/// Evaluator backed by a text-generation model.
pub struct LlmEvaluator {
    llm: Arc<dyn TextGenerator>,
}

impl LlmEvaluator {
    pub fn new(llm: Arc<dyn TextGenerator>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    async fn evaluate(&self, draft_text: &str, rubric_text: &str) -> EvaluatorVerdict {
        let rubric = if rubric_text.trim().is_empty() {
            NO_RUBRIC_TEXT
        } else {
            rubric_text
        };
        let prompt = EVALUATOR_PROMPT_TEMPLATE
            .replace("{rubric}", rubric)
            .replace("{draft}", draft_text);

        match self.llm.generate(EVALUATOR_SYSTEM, &prompt).await {
            Ok(result) => {
                let verdict = parse_verdict(&result.raw_text);
                if verdict.score.is_none() {
                    warn!("Evaluator reply carried no parseable score");
                }
                info!("Evaluator score: {:?}", verdict.score);
                verdict
            }
            Err(e) => {
                warn!("Evaluator call failed, continuing without feedback: {e}");
                EvaluatorVerdict::default()
            }
        }
    }
}

/// Pulls `Score: <digit>` and the feedback text out of an evaluator reply.
/// Feedback is whatever follows `Feedback:`, or the whole reply if that label is absent.
pub fn parse_verdict(text: &str) -> EvaluatorVerdict {
    let score = SCORE_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|s| *s <= MAX_JUDGEMENT);

    let feedback_text = FEEDBACK_PATTERN
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| text.trim().to_string());

    EvaluatorVerdict {
        score,
        feedback_text,
    }
}
