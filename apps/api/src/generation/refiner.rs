//! Refinement: the drafting model revises its own draft using the evaluator's feedback.

use crate::generation::assembler::PromptBundle;
use crate::generation::prompts::{NO_FEEDBACK_TEXT, REFINE_PROMPT_TEMPLATE};
use crate::llm_client::{GenerationResult, LlmError, TextGenerator};

/// Re-issues a generation call with the original system instructions and a user
/// turn holding the draft plus feedback. Empty feedback still produces a call.
pub async fn refine(
    llm: &dyn TextGenerator,
    bundle: &PromptBundle,
    draft_text: &str,
    evaluator_feedback: &str,
) -> Result<GenerationResult, LlmError> {
    llm.generate(&bundle.system, &refine_user_content(draft_text, evaluator_feedback))
        .await
}

fn refine_user_content(draft_text: &str, evaluator_feedback: &str) -> String {
    let feedback = if evaluator_feedback.trim().is_empty() {
        NO_FEEDBACK_TEXT
    } else {
        evaluator_feedback.trim()
    };
    REFINE_PROMPT_TEMPLATE
        .replace("{draft}", draft_text)
        .replace("{feedback}", feedback)
}
