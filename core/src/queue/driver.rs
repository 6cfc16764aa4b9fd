use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use crate::error::QueueError;
use crate::executor::{ExecuteRequest, TaskExecutor, TaskOutcome};

use super::controls::Controls;
use super::log::QueueLog;
use super::render::{QueueEvent, QueueRenderer};
use super::types::{Queue, QueueSummary, SelectionItem, Task};

/// Result of one `advance()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Task `index` settled; the cursor moved past it.
    Advanced { index: usize, outcome: TaskOutcome },
    /// The cursor reached the end and the run was finalized.
    Finished(QueueSummary),
}

/// Client-side driver of the sequential install queue.
///
/// Owns the page state it mutates (controls and log) so the whole run can be
/// observed without a UI. `advance` takes `&mut self` and awaits the executor
/// before returning, so at most one task is ever in flight.
pub struct QueueDriver {
    executor: Arc<dyn TaskExecutor>,
    renderers: Vec<Arc<dyn QueueRenderer>>,
    queue: Option<Queue>,
    controls: Controls,
    log: QueueLog,
    started_at: Option<Instant>,
    finalized: bool,
}

impl QueueDriver {
    pub fn new(executor: Arc<dyn TaskExecutor>) -> Self {
        Self {
            executor,
            renderers: Vec::new(),
            queue: None,
            controls: Controls::default(),
            log: QueueLog::default(),
            started_at: None,
            finalized: false,
        }
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn QueueRenderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn log(&self) -> &QueueLog {
        &self.log
    }

    pub fn queue(&self) -> Option<&Queue> {
        self.queue.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.finalized
    }

    /// Build the queue from the checked rows, in display order.
    ///
    /// An empty selection fails with [`QueueError::EmptyQueue`] and leaves
    /// controls and log untouched.
    pub fn start(&mut self, selection: &[SelectionItem], auto_activate: bool) -> Result<&Queue, QueueError> {
        if self.queue.is_some() {
            return Err(QueueError::AlreadyStarted);
        }

        let mut seen = HashSet::new();
        let tasks: Vec<Task> = selection
            .iter()
            .filter(|item| item.checked)
            .filter(|item| seen.insert(item.identifier.as_str()))
            .map(|item| Task::new(item.identifier.clone(), auto_activate))
            .collect();

        if tasks.is_empty() {
            return Err(QueueError::EmptyQueue);
        }

        let run_id = Uuid::new_v4().to_string();
        let identifiers: Vec<String> = tasks.iter().map(|t| t.identifier().to_string()).collect();

        self.controls.lock();
        let line = self.log.starting(tasks.len()).clone();
        self.started_at = Some(Instant::now());

        tracing::info!(
            target: "packager.queue",
            run_id = %run_id,
            tasks = tasks.len(),
            auto_activate,
            executor = self.executor.name(),
            "queue started"
        );

        self.emit(&QueueEvent::QueueStart {
            run_id: run_id.clone(),
            identifiers,
            auto_activate,
            line,
        });

        Ok(&*self.queue.insert(Queue::new(run_id, tasks, auto_activate)))
    }

    /// Run exactly one task. The queue is finalized as soon as the last task
    /// settles; calling again afterwards just returns the summary.
    pub async fn advance(&mut self) -> Result<Step, QueueError> {
        let queue = self.queue.as_mut().ok_or(QueueError::NotStarted)?;
        if queue.is_exhausted() {
            return Ok(Step::Finished(self.finalize()));
        }

        let index = queue.cursor();
        let run_id = queue.run_id().to_string();
        let request = {
            let Some(task) = queue.task_mut(index) else {
                return Ok(Step::Finished(self.finalize()));
            };
            task.begin()?;
            ExecuteRequest::new(task.identifier(), task.auto_activate())
        };

        let line = self.log.processing(&request.identifier).clone();
        self.emit(&QueueEvent::TaskStart {
            run_id: run_id.clone(),
            index,
            identifier: request.identifier.clone(),
            line,
        });

        let started = Instant::now();
        let outcome = match self.executor.execute(&request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    target: "packager.queue",
                    run_id = %run_id,
                    slug = %request.identifier,
                    error = %err,
                    "executor call failed"
                );
                TaskOutcome::failed(err.to_string())
            }
        };
        let duration_ms = started.elapsed().as_millis() as u64;

        let queue = self.queue.as_mut().ok_or(QueueError::NotStarted)?;
        if let Some(task) = queue.task_mut(index) {
            task.settle(&outcome)?;
        }
        queue.advance_cursor();

        let line = if outcome.is_success() {
            self.log.succeeded(&request.identifier, outcome.message())
        } else {
            self.log.failed(&request.identifier, outcome.message())
        }
        .clone();

        tracing::debug!(
            target: "packager.queue",
            run_id = %run_id,
            index,
            slug = %request.identifier,
            success = outcome.is_success(),
            duration_ms,
            "task settled"
        );

        self.emit(&QueueEvent::TaskComplete {
            run_id,
            index,
            identifier: request.identifier,
            outcome: outcome.clone(),
            duration_ms,
            line,
        });

        // 最后一个任务落定即结束，不等下一次 advance
        if self.queue.as_ref().is_some_and(Queue::is_exhausted) {
            self.finalize();
        }

        Ok(Step::Advanced { index, outcome })
    }

    /// Drive the queue to the end. Failures do not stop the loop.
    pub async fn run(&mut self) -> Result<QueueSummary, QueueError> {
        loop {
            if let Step::Finished(summary) = self.advance().await? {
                return Ok(summary);
            }
        }
    }

    /// Relabel the start control and log completion. Idempotent.
    fn finalize(&mut self) -> QueueSummary {
        let Some(queue) = self.queue.as_mut() else {
            return QueueSummary::default();
        };
        let summary = queue.summary();
        if self.finalized {
            return summary;
        }

        queue.stop();
        let run_id = queue.run_id().to_string();
        self.finalized = true;
        self.controls.finish();
        let line = self.log.processed().clone();
        let duration_ms = self
            .started_at
            .map(|t| t.elapsed().as_millis() as u64)
            .unwrap_or(0);

        tracing::info!(
            target: "packager.queue",
            run_id = %run_id,
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            duration_ms,
            "queue finished"
        );

        self.emit(&QueueEvent::QueueFinished {
            run_id,
            summary,
            duration_ms,
            line,
        });

        summary
    }

    fn emit(&self, event: &QueueEvent) {
        for renderer in &self.renderers {
            renderer.render(event);
        }
    }
}
