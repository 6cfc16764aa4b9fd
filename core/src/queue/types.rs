use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::executor::TaskOutcome;

use super::transitions::TaskTransition;

/// Per-row status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Waiting,
    InProgress,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Waiting => "Waiting...",
            Self::InProgress => "Installing...",
            Self::Succeeded => "Completed",
            Self::Failed => "Error",
        }
    }

    pub fn is_terminal(self) -> bool {
        TaskTransition::is_terminal(self)
    }
}

/// One row of the checklist the operator picks from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionItem {
    pub identifier: String,
    pub checked: bool,
}

impl SelectionItem {
    pub fn checked(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            checked: true,
        }
    }

    pub fn unchecked(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            checked: false,
        }
    }

    /// Rows for a preset list, all checked (the page renders "select all" on).
    pub fn all_checked<I, S>(identifiers: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        identifiers.into_iter().map(Self::checked).collect()
    }
}

/// One queue entry.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    identifier: String,
    auto_activate: bool,
    status: TaskStatus,
    result_message: Option<String>,
}

impl Task {
    pub fn new(identifier: impl Into<String>, auto_activate: bool) -> Self {
        Self {
            identifier: identifier.into(),
            auto_activate,
            status: TaskStatus::Waiting,
            result_message: None,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn auto_activate(&self) -> bool {
        self.auto_activate
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Only set once the task has settled.
    pub fn result_message(&self) -> Option<&str> {
        self.result_message.as_deref()
    }

    pub(crate) fn begin(&mut self) -> Result<(), TransitionError> {
        TaskTransition::validate(self.status, TaskStatus::InProgress)?;
        self.status = TaskStatus::InProgress;
        Ok(())
    }

    pub(crate) fn settle(&mut self, outcome: &TaskOutcome) -> Result<(), TransitionError> {
        let next = if outcome.is_success() {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed
        };
        TaskTransition::validate(self.status, next)?;
        self.status = next;
        self.result_message = Some(outcome.message().to_string());
        Ok(())
    }
}

/// The ordered run. Tasks are fixed when the queue is built.
#[derive(Debug, Clone, Serialize)]
pub struct Queue {
    run_id: String,
    tasks: Vec<Task>,
    cursor: usize,
    auto_activate: bool,
    is_running: bool,
}

impl Queue {
    pub(crate) fn new(run_id: String, tasks: Vec<Task>, auto_activate: bool) -> Self {
        Self {
            run_id,
            tasks,
            cursor: 0,
            auto_activate,
            is_running: true,
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn auto_activate(&self) -> bool {
        self.auto_activate
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.tasks.len()
    }

    pub fn task(&self, identifier: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.identifier == identifier)
    }

    pub fn in_progress_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::InProgress)
            .count()
    }

    pub(crate) fn task_mut(&mut self, index: usize) -> Option<&mut Task> {
        self.tasks.get_mut(index)
    }

    pub(crate) fn advance_cursor(&mut self) {
        if self.cursor < self.tasks.len() {
            self.cursor += 1;
        }
    }

    pub(crate) fn stop(&mut self) {
        self.is_running = false;
    }

    pub fn summary(&self) -> QueueSummary {
        let (succeeded, failed) = self.tasks.iter().fold((0, 0), |(s, f), t| {
            (
                s + usize::from(t.status == TaskStatus::Succeeded),
                f + usize::from(t.status == TaskStatus::Failed),
            )
        });
        QueueSummary {
            total: self.tasks.len(),
            succeeded,
            failed,
        }
    }
}

/// Final tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl QueueSummary {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0 && self.succeeded == self.total
    }
}
