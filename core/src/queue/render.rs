use crate::executor::TaskOutcome;

use super::log::LogLine;
use super::types::QueueSummary;

/// 队列渲染器插件（控制输出格式）
pub trait QueueRenderer: Send + Sync {
    fn name(&self) -> &str;
    fn render(&self, event: &QueueEvent);
}

/// 渲染事件（统一事件类型）
#[derive(Debug, Clone)]
pub enum QueueEvent {
    QueueStart {
        run_id: String,
        identifiers: Vec<String>,
        auto_activate: bool,
        line: LogLine,
    },
    TaskStart {
        run_id: String,
        index: usize,
        identifier: String,
        line: LogLine,
    },
    TaskComplete {
        run_id: String,
        index: usize,
        identifier: String,
        outcome: TaskOutcome,
        duration_ms: u64,
        line: LogLine,
    },
    QueueFinished {
        run_id: String,
        summary: QueueSummary,
        duration_ms: u64,
        line: LogLine,
    },
}

impl QueueEvent {
    pub fn run_id(&self) -> &str {
        match self {
            Self::QueueStart { run_id, .. }
            | Self::TaskStart { run_id, .. }
            | Self::TaskComplete { run_id, .. }
            | Self::QueueFinished { run_id, .. } => run_id,
        }
    }

    /// The log line this event appended.
    pub fn line(&self) -> &LogLine {
        match self {
            Self::QueueStart { line, .. }
            | Self::TaskStart { line, .. }
            | Self::TaskComplete { line, .. }
            | Self::QueueFinished { line, .. } => line,
        }
    }
}
