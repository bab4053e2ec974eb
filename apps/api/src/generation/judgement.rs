//! Self-judgement extraction and the relevance gate.
//!
//! The drafting model is asked to open its reply with three marker lines:
//!
//! ```text
//! >>User Summary: ...
//! >>Model Comparison: ...
//! >>Model Judgement: <0-5>
//! ```
//!
//! Model output is free text, so extraction is lenient: a missing marker yields an
//! empty field and an unparseable judgement yields `None`. Neither is an error.
//! The same `extract` runs on the initial draft and on the refined draft.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Judgements at or below this value reject the request.
pub const REJECT_THRESHOLD: u8 = 2;
pub const MAX_JUDGEMENT: u8 = 5;

static USER_SUMMARY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*>>[ \t]*User Summary:(.*)$").unwrap());

static MODEL_COMPARISON_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*>>[ \t]*Model Comparison:(.*)$").unwrap());

// Accepts both "Judgement" and "Judgment".
static MODEL_JUDGEMENT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?mi)^[ \t]*>>[ \t]*Model Judge?ment:(.*)$").unwrap());

static FIRST_INTEGER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());

/// The model's self-assessment of how well the request matches the task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub user_summary: String,
    pub model_comparison: String,
    /// 0–5 when present.
    pub judgement_score: Option<u8>,
}

impl EvaluationSummary {
    /// True when none of the markers were found.
    pub fn is_empty(&self) -> bool {
        self.user_summary.is_empty()
            && self.model_comparison.is_empty()
            && self.judgement_score.is_none()
    }
}

/// Extracts the three marker fields, searching for each after the previous one.
pub fn extract(text: &str) -> EvaluationSummary {
    let mut cursor = 0;
    let user_summary = capture_line(&USER_SUMMARY_PATTERN, text, &mut cursor);
    let model_comparison = capture_line(&MODEL_COMPARISON_PATTERN, text, &mut cursor);
    let judgement_line = capture_line(&MODEL_JUDGEMENT_PATTERN, text, &mut cursor);

    EvaluationSummary {
        user_summary,
        model_comparison,
        judgement_score: parse_judgement(&judgement_line),
    }
}

/// Returns the trimmed rest of the marker's line, advancing `cursor` past it.
/// A miss returns an empty string and leaves `cursor` where it was.
fn capture_line(pattern: &Regex, text: &str, cursor: &mut usize) -> String {
    match pattern.captures_at(text, *cursor) {
        Some(caps) => {
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(*cursor);
            *cursor = whole;
            caps.get(1)
                .map(|m| m.as_str().trim().to_string())
                .unwrap_or_default()
        }
        None => String::new(),
    }
}

/// First (signed) integer on the line, kept only if it falls in 0..=5.
pub fn parse_judgement(line: &str) -> Option<u8> {
    FIRST_INTEGER_PATTERN
        .find(line)
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .and_then(|score| u8::try_from(score).ok())
        .filter(|score| *score <= MAX_JUDGEMENT)
}

/// True iff a judgement is present and at or below the threshold.
/// A missing judgement never rejects.
pub fn should_reject(summary: &EvaluationSummary) -> bool {
    matches!(summary.judgement_score, Some(score) if score <= REJECT_THRESHOLD)
}
