//! Prompt assembly: builds the drafting instructions for one task.

use std::collections::HashMap;

use serde::Serialize;

use crate::generation::prompts::{fragments_for, TaskFragments, MASTER_INSTRUCTIONS, NO_RUBRIC_TEXT};
use crate::generation::task::Task;
use crate::generation::PipelineError;
use crate::llm_client::prompts::{CONFIDENTIALITY_MESSAGE, FINAL_OUTPUT_ONLY};

/// Named slots in the master template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Task,
    Overview,
    LookFors,
    Format,
    Confidentiality,
    Rubric,
}

impl Placeholder {
    pub const ALL: [Placeholder; 6] = [
        Placeholder::Task,
        Placeholder::Overview,
        Placeholder::LookFors,
        Placeholder::Format,
        Placeholder::Confidentiality,
        Placeholder::Rubric,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Placeholder::Task => "[TASK]",
            Placeholder::Overview => "[task_overview]",
            Placeholder::LookFors => "[look_fors]",
            Placeholder::Format => "[task_format]",
            Placeholder::Confidentiality => "[confidentiality_message]",
            Placeholder::Rubric => "[rubric]",
        }
    }
}

/// Fully substituted instructions for one request. Never mutated after assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromptBundle {
    pub task: Task,
    /// System-role instructions, reused verbatim by the refinement call.
    pub system: String,
    /// User-role content: the user's notes under a `USER NOTES:` header.
    pub user: String,
}

/// Holds the master template and the fragment table it is filled from.
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    template: &'static str,
    fragments: HashMap<Task, TaskFragments>,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::with_fragments(
            MASTER_INSTRUCTIONS,
            Task::ALL.into_iter().map(|t| (t, fragments_for(t))).collect(),
        )
    }
}

impl PromptAssembler {
    pub fn with_fragments(template: &'static str, fragments: HashMap<Task, TaskFragments>) -> Self {
        Self {
            template,
            fragments,
        }
    }

    /// Substitutes the task's fragments into the master template.
    ///
    /// Fails with `PipelineError::Configuration` when the task has no fragment set.
    /// Placeholders the fragment set does not provide stay in the text unchanged.
    pub fn assemble(
        &self,
        task: Task,
        user_notes: &str,
        rubric_text: &str,
    ) -> Result<PromptBundle, PipelineError> {
        let fragments = self.fragments.get(&task).ok_or_else(|| {
            PipelineError::Configuration(format!("no prompt fragments configured for '{task}'"))
        })?;

        let rubric = if rubric_text.trim().is_empty() {
            NO_RUBRIC_TEXT
        } else {
            rubric_text.trim()
        };

        let mut system = self.template.to_string();
        for placeholder in Placeholder::ALL {
            let value = match placeholder {
                Placeholder::Task => Some(task.label()),
                Placeholder::Overview => fragments.overview,
                Placeholder::LookFors => fragments.look_fors,
                Placeholder::Format => fragments.format,
                Placeholder::Confidentiality => Some(CONFIDENTIALITY_MESSAGE.trim()),
                Placeholder::Rubric => Some(rubric),
            };
            if let Some(value) = value {
                system = system.replace(placeholder.token(), value.trim());
            }
        }

        system.push_str("\n\n");
        system.push_str(FINAL_OUTPUT_ONLY);

        Ok(PromptBundle {
            task,
            system,
            user: format!("USER NOTES:\n{user_notes}"),
        })
    }
}
