use serde::{Deserialize, Serialize};

pub const DEFAULT_PRESET_ID: &str = "default";
pub const DEFAULT_PRESET_NAME: &str = "Default";

/// A named, ordered list of plugin slugs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub plugins: Vec<String>,
}

impl Preset {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            plugins: Vec::new(),
        }
    }

    pub fn default_preset() -> Self {
        Self::new(DEFAULT_PRESET_ID, DEFAULT_PRESET_NAME)
    }

    /// Match by id, or by name ignoring case.
    pub fn matches(&self, key: &str) -> bool {
        self.id == key || self.name.eq_ignore_ascii_case(key.trim())
    }

    /// Append slugs that are not yet listed. Returns how many were added.
    pub fn append_unique<I>(&mut self, slugs: I) -> usize
    where
        I: IntoIterator<Item = String>,
    {
        let before = self.plugins.len();
        for slug in slugs {
            if !self.plugins.contains(&slug) {
                self.plugins.push(slug);
            }
        }
        self.plugins.len() - before
    }
}

/// Snapshot of the active preset handed to the queue driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivePreset {
    pub name: String,
    pub plugins: Vec<String>,
}

impl From<&Preset> for ActivePreset {
    fn from(p: &Preset) -> Self {
        Self {
            name: p.name.clone(),
            plugins: p.plugins.clone(),
        }
    }
}
