//! Rubric files, one plain-text file per task: `<rubric_dir>/<task_slug>.txt`.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::generation::task::Task;

/// A rubric as loaded for one request. A missing file is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedRubric {
    pub text: String,
    /// User-visible note when the rubric could not be read.
    pub warning: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RubricStore {
    dir: PathBuf,
}

impl RubricStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, task: Task) -> PathBuf {
        self.dir.join(format!("{}.txt", task.slug()))
    }

    pub async fn load(&self, task: Task) -> LoadedRubric {
        let path = self.path_for(task);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                debug!("Loaded rubric {} ({} bytes)", path.display(), text.len());
                LoadedRubric {
                    text,
                    warning: None,
                }
            }
            Err(e) => {
                warn!("Rubric {} unavailable: {e}", path.display());
                LoadedRubric {
                    text: String::new(),
                    warning: Some(format!(
                        "No rubric is available for '{}'; content was generated without one.",
                        task.label()
                    )),
                }
            }
        }
    }
}
