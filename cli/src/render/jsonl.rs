use chrono::Local;
use packager_core::api::{QueueEvent, QueueRenderer};
use serde_json::{json, Value};

/// One JSON object per queue event on stdout.
pub struct JsonlRenderer {
    pretty_print: bool,
}

impl JsonlRenderer {
    pub fn new(pretty_print: bool) -> Self {
        Self { pretty_print }
    }

    fn event_to_json(&self, event: &QueueEvent) -> Value {
        let ts = Local::now().to_rfc3339();
        match event {
            QueueEvent::QueueStart {
                run_id,
                identifiers,
                auto_activate,
                line,
            } => json!({
                "v": 1,
                "event_type": "queue.start",
                "ts": ts,
                "run_id": run_id,
                "message": line.text,
                "metadata": {
                    "total_tasks": identifiers.len(),
                    "identifiers": identifiers,
                    "auto_activate": auto_activate,
                }
            }),
            QueueEvent::TaskStart {
                run_id,
                index,
                identifier,
                line,
            } => json!({
                "v": 1,
                "event_type": "task.start",
                "ts": ts,
                "run_id": run_id,
                "task_id": identifier,
                "message": line.text,
                "metadata": {
                    "index": index,
                }
            }),
            QueueEvent::TaskComplete {
                run_id,
                index,
                identifier,
                outcome,
                duration_ms,
                line,
            } => json!({
                "v": 1,
                "event_type": "task.end",
                "ts": ts,
                "run_id": run_id,
                "task_id": identifier,
                "message": line.text,
                "metadata": {
                    "index": index,
                    "success": outcome.is_success(),
                    "result": outcome.message(),
                    "duration_ms": duration_ms,
                }
            }),
            QueueEvent::QueueFinished {
                run_id,
                summary,
                duration_ms,
                line,
            } => json!({
                "v": 1,
                "event_type": "queue.end",
                "ts": ts,
                "run_id": run_id,
                "message": line.text,
                "metadata": {
                    "total_tasks": summary.total,
                    "succeeded": summary.succeeded,
                    "failed": summary.failed,
                    "duration_ms": duration_ms,
                }
            }),
        }
    }
}

impl QueueRenderer for JsonlRenderer {
    fn name(&self) -> &str {
        "jsonl"
    }

    fn render(&self, event: &QueueEvent) {
        let value = self.event_to_json(event);
        let line = if self.pretty_print {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        };
        match line {
            Ok(line) => println!("{line}"),
            Err(e) => tracing::warn!(target: "packager.render", error = %e, "jsonl encode failed"),
        }
    }
}
