//! In-process fakes for the pipeline's collaborators.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::audit::{LogEntry, LogSink};
use crate::generation::evaluator::{Evaluator, EvaluatorVerdict};
use crate::llm_client::{GenerationResult, LlmError, TextGenerator, TokenUsage};

/// Replays canned replies in order. `Err(status)` becomes an `LlmError::Api`.
/// Each successful reply reports 10 prompt and 5 completion tokens.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, u16>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGenerator {
    pub fn new(responses: Vec<Result<String, u16>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `(system, user_content)` for every call made so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(
        &self,
        system: &str,
        user_content: &str,
    ) -> Result<GenerationResult, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((system.to_string(), user_content.to_string()));

        match self.responses.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(GenerationResult {
                raw_text: text,
                usage: TokenUsage::new(10, 5),
            }),
            Some(Err(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            None => Err(LlmError::EmptyContent),
        }
    }
}

/// Returns the same verdict every time and counts calls.
pub struct FixedEvaluator {
    verdict: EvaluatorVerdict,
    calls: AtomicUsize,
    last_rubric: Mutex<Option<String>>,
}

impl FixedEvaluator {
    pub fn new(verdict: EvaluatorVerdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
            last_rubric: Mutex::new(None),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_rubric(&self) -> Option<String> {
        self.last_rubric.lock().unwrap().clone()
    }
}

#[async_trait]
impl Evaluator for FixedEvaluator {
    async fn evaluate(&self, _draft_text: &str, rubric_text: &str) -> EvaluatorVerdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_rubric.lock().unwrap() = Some(rubric_text.to_string());
        self.verdict.clone()
    }
}

/// Keeps every entry it receives; optionally reports failure after recording.
#[derive(Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<LogEntry>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn append(&self, entry: &LogEntry) -> anyhow::Result<()> {
        self.entries.lock().unwrap().push(entry.clone());
        if self.fail {
            anyhow::bail!("sink unavailable");
        }
        Ok(())
    }
}
