use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Progress,
    Success,
    Failure,
}

impl LogKind {
    /// Display colour of the line.
    pub fn color(self) -> Option<&'static str> {
        match self {
            Self::Success => Some("green"),
            Self::Failure => Some("red"),
            Self::Info | Self::Progress => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub kind: LogKind,
    pub text: String,
}

/// Append-only run log shown under the checklist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueueLog {
    lines: Vec<LogLine>,
}

impl QueueLog {
    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Success and failure lines only, in emission order.
    pub fn result_lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines
            .iter()
            .filter(|l| matches!(l.kind, LogKind::Success | LogKind::Failure))
    }

    pub(crate) fn starting(&mut self, count: usize) -> &LogLine {
        self.push(
            LogKind::Info,
            format!("🏁 Starting installation of {count} selected plugins..."),
        )
    }

    pub(crate) fn processing(&mut self, identifier: &str) -> &LogLine {
        self.push(LogKind::Progress, format!("🔄 Processing: {identifier}..."))
    }

    pub(crate) fn succeeded(&mut self, identifier: &str, message: &str) -> &LogLine {
        self.push(LogKind::Success, format!("✅ {identifier}: {message}"))
    }

    pub(crate) fn failed(&mut self, identifier: &str, message: &str) -> &LogLine {
        self.push(LogKind::Failure, format!("❌ {identifier}: {message}"))
    }

    pub(crate) fn processed(&mut self) -> &LogLine {
        self.push(
            LogKind::Info,
            "🎉 The selected plugins have been processed.".to_string(),
        )
    }

    fn push(&mut self, kind: LogKind, text: String) -> &LogLine {
        self.lines.push(LogLine { kind, text });
        // just pushed
        &self.lines[self.lines.len() - 1]
    }
}
