//! The closed set of hiring-content tasks the service supports.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the four supported generation modes. Chosen once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    JobDescription,
    InterviewQuestions,
    ResponseGuides,
    CandidateEvaluation,
}

#[derive(Debug, Error)]
#[error("unknown task '{0}'")]
pub struct UnknownTask(pub String);

impl Task {
    pub const ALL: [Task; 4] = [
        Task::JobDescription,
        Task::InterviewQuestions,
        Task::ResponseGuides,
        Task::CandidateEvaluation,
    ];

    /// Human-facing name, as shown in the task picker and substituted into prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Task::JobDescription => "Write a job description",
            Task::InterviewQuestions => "Build interview questions",
            Task::ResponseGuides => "Create response guides",
            Task::CandidateEvaluation => "Evaluate candidate responses",
        }
    }

    /// Stable identifier used in JSON and rubric file names.
    pub fn slug(&self) -> &'static str {
        match self {
            Task::JobDescription => "job_description",
            Task::InterviewQuestions => "interview_questions",
            Task::ResponseGuides => "response_guides",
            Task::CandidateEvaluation => "candidate_evaluation",
        }
    }

    pub fn progress_text(&self) -> &'static str {
        match self {
            Task::JobDescription => "Drafting your job description...",
            Task::InterviewQuestions => "Building your interview questions...",
            Task::ResponseGuides => "Creating your response guides...",
            Task::CandidateEvaluation => "Evaluating your candidate's responses...",
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts either the slug or the label (case-insensitive).
impl FromStr for Task {
    type Err = UnknownTask;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Task::ALL
            .into_iter()
            .find(|t| t.slug() == needle || t.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownTask(needle.to_string()))
    }
}
