use std::io::Write;

use packager_core::api::{LogKind, LogLine, QueueEvent, QueueRenderer};

/// Prints the queue log as it grows, colouring ✅/❌ lines.
pub struct ConsoleRenderer {
    ansi: bool,
    results_only: bool,
}

impl ConsoleRenderer {
    /// `results_only` hides the start/processing lines, used while a progress
    /// bar is already showing them.
    pub fn new(ansi: bool, results_only: bool) -> Self {
        Self { ansi, results_only }
    }

    fn format_line(&self, line: &LogLine) -> Option<String> {
        if self.results_only && matches!(line.kind, LogKind::Info | LogKind::Progress) {
            return None;
        }
        let code = match line.kind.color() {
            Some("green") => "32",
            Some("red") => "31",
            _ => return Some(line.text.clone()),
        };
        if self.ansi {
            Some(format!("\x1b[{code}m{}\x1b[0m", line.text))
        } else {
            Some(line.text.clone())
        }
    }

    fn format_event(&self, event: &QueueEvent) -> Option<String> {
        match event {
            // the summary tally closes the run, whatever the filter
            QueueEvent::QueueFinished { summary, line, .. } => Some(format!(
                "{} ({} ok, {} failed, {} total)",
                line.text, summary.succeeded, summary.failed, summary.total
            )),
            other => self.format_line(other.line()),
        }
    }
}

impl QueueRenderer for ConsoleRenderer {
    fn name(&self) -> &str {
        "console"
    }

    fn render(&self, event: &QueueEvent) {
        if let Some(text) = self.format_event(event) {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packager_core::api::{QueueSummary, TaskOutcome};

    fn complete(outcome: TaskOutcome, text: &str, kind: LogKind) -> QueueEvent {
        QueueEvent::TaskComplete {
            run_id: "r".into(),
            index: 0,
            identifier: "alpha".into(),
            outcome,
            duration_ms: 3,
            line: LogLine {
                kind,
                text: text.into(),
            },
        }
    }

    #[test]
    fn test_success_line_is_green() {
        let r = ConsoleRenderer::new(true, false);
        let event = complete(TaskOutcome::succeeded("ok"), "✅ alpha: ok", LogKind::Success);
        assert_eq!(
            r.format_event(&event).unwrap(),
            "\x1b[32m✅ alpha: ok\x1b[0m"
        );
    }

    #[test]
    fn test_plain_without_ansi() {
        let r = ConsoleRenderer::new(false, false);
        let event = complete(TaskOutcome::failed("nope"), "❌ alpha: nope", LogKind::Failure);
        assert_eq!(r.format_event(&event).unwrap(), "❌ alpha: nope");
    }

    #[test]
    fn test_results_only_hides_progress_lines() {
        let r = ConsoleRenderer::new(false, true);
        let start = QueueEvent::TaskStart {
            run_id: "r".into(),
            index: 0,
            identifier: "alpha".into(),
            line: LogLine {
                kind: LogKind::Progress,
                text: "🔄 Processing: alpha...".into(),
            },
        };
        assert!(r.format_event(&start).is_none());

        let finished = QueueEvent::QueueFinished {
            run_id: "r".into(),
            summary: QueueSummary {
                total: 2,
                succeeded: 1,
                failed: 1,
            },
            duration_ms: 9,
            line: LogLine {
                kind: LogKind::Info,
                text: "🎉 The selected plugins have been processed.".into(),
            },
        };
        assert_eq!(
            r.format_event(&finished).unwrap(),
            "🎉 The selected plugins have been processed. (1 ok, 1 failed, 2 total)"
        );
    }
}
