use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use super::render::{QueueEvent, QueueRenderer};

/// Visual progress monitor for a queue run
///
/// One overall bar plus a spinner for the task currently in flight. There is
/// never more than one spinner because the queue never runs two tasks at once.
pub struct ProgressMonitor {
    multi: MultiProgress,
    overall: Mutex<ProgressBar>,
    current: Mutex<Option<ProgressBar>>,
    enabled: bool,
}

impl ProgressMonitor {
    /// Create a new progress monitor
    ///
    /// # Arguments
    ///
    /// * `enabled` - Whether to draw anything (disabled for jsonl output)
    pub fn new(enabled: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            overall: Mutex::new(ProgressBar::hidden()),
            current: Mutex::new(None),
            enabled,
        }
    }

    fn start(&self, total_tasks: usize) {
        let bar = self.multi.add(ProgressBar::new(total_tasks as u64));
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} plugins ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("█▓▒░  "));
        }
        bar.set_message("Starting...");
        if let Ok(mut overall) = self.overall.lock() {
            *overall = bar;
        }
    }

    fn begin_task(&self, identifier: &str) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner:.green} {msg}") {
            bar.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
        }
        bar.set_message(format!("⏳ {}", identifier));
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut current) = self.current.lock() {
            if let Some(previous) = current.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn complete_task(&self, identifier: &str, success: bool, duration_ms: u64) {
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                let icon = if success { "✅" } else { "❌" };
                bar.finish_with_message(format!("{} {} ({}ms)", icon, identifier, duration_ms));
            }
        }
        if let Ok(overall) = self.overall.lock() {
            overall.inc(1);
        }
    }

    fn finish(&self, all_succeeded: bool) {
        let msg = if all_succeeded {
            "✅ All plugins processed"
        } else {
            "⚠ Processed with errors"
        };
        if let Ok(overall) = self.overall.lock() {
            overall.finish_with_message(msg.to_string());
        }
    }
}

impl QueueRenderer for ProgressMonitor {
    fn name(&self) -> &str {
        "progress"
    }

    fn render(&self, event: &QueueEvent) {
        if !self.enabled {
            return;
        }

        match event {
            QueueEvent::QueueStart { identifiers, .. } => self.start(identifiers.len()),
            QueueEvent::TaskStart { identifier, .. } => self.begin_task(identifier),
            QueueEvent::TaskComplete {
                identifier,
                outcome,
                duration_ms,
                ..
            } => self.complete_task(identifier, outcome.is_success(), *duration_ms),
            QueueEvent::QueueFinished { summary, .. } => self.finish(summary.all_succeeded()),
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        // Ensure a dangling spinner is cleaned up
        if let Ok(mut current) = self.current.lock() {
            if let Some(bar) = current.take() {
                bar.finish_and_clear();
            }
        }
    }
}
