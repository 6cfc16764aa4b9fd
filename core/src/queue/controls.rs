use serde::Serialize;

/// Label shown on the start control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartLabel {
    Start,
    Installing,
    Finished,
}

impl StartLabel {
    pub fn text(self) -> &'static str {
        match self {
            Self::Start => "🚀 Start Selected Installation",
            Self::Installing => "⏳ Installing...",
            Self::Finished => "✅ Finished!",
        }
    }
}

/// Enabled/disabled state of the checklist and the start control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub selection_enabled: bool,
    pub start_enabled: bool,
    pub start_label: StartLabel,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            selection_enabled: true,
            start_enabled: true,
            start_label: StartLabel::Start,
        }
    }
}

impl Controls {
    pub(crate) fn lock(&mut self) {
        self.selection_enabled = false;
        self.start_enabled = false;
        self.start_label = StartLabel::Installing;
    }

    /// The start control stays disabled: a finished queue is not restartable.
    pub(crate) fn finish(&mut self) {
        self.selection_enabled = false;
        self.start_enabled = false;
        self.start_label = StartLabel::Finished;
    }

    pub fn is_locked(&self) -> bool {
        !self.selection_enabled && !self.start_enabled
    }
}
