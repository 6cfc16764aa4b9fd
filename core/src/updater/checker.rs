use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};

use super::manifest::{ManifestSource, RemoteManifest};

/// Homepage reported alongside update offers.
pub const PROJECT_URL: &str = "https://github.com/spockyto/WP-packager";
pub const DISPLAY_NAME: &str = "Packager";

/// An update the host should offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOffer {
    pub slug: String,
    pub entry: String,
    pub new_version: String,
    pub tested: Option<String>,
    pub package: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    Available(UpdateOffer),
    UpToDate { slug: String, current_version: String },
}

impl UpdateStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// "View details" payload built from the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginInfo {
    pub name: String,
    pub slug: String,
    pub version: String,
    pub tested: Option<String>,
    pub last_updated: Option<String>,
    pub description: String,
    pub changelog: String,
    pub download_link: String,
}

#[derive(Debug, Clone)]
struct LastCheck {
    at: DateTime<Utc>,
    status: UpdateStatus,
}

/// Explicit poll-and-compare against a [`ManifestSource`].
pub struct UpdateChecker {
    source: Arc<dyn ManifestSource>,
    slug: String,
    current_version: String,
    last: RwLock<Option<LastCheck>>,
}

impl UpdateChecker {
    pub fn new(
        source: Arc<dyn ManifestSource>,
        slug: impl Into<String>,
        current_version: impl Into<String>,
    ) -> Self {
        Self {
            source,
            slug: slug.into(),
            current_version: current_version.into(),
            last: RwLock::new(None),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    /// `<slug>/<slug>.php`
    pub fn entry(&self) -> String {
        format!("{0}/{0}.php", self.slug)
    }

    /// Fetch the manifest and compare. The result is remembered for
    /// [`UpdateChecker::last_status`].
    pub async fn check(&self) -> anyhow::Result<UpdateStatus> {
        let remote = self.source.fetch().await?;
        let status = self.evaluate(&remote);

        tracing::info!(
            target: "packager.updater",
            source = self.source.name(),
            current = %self.current_version,
            remote = %remote.version,
            available = status.is_available(),
            "update check finished"
        );

        if let Ok(mut last) = self.last.write() {
            *last = Some(LastCheck {
                at: Utc::now(),
                status: status.clone(),
            });
        }
        Ok(status)
    }

    /// Status and time of the most recent successful check.
    pub fn last_status(&self) -> Option<(DateTime<Utc>, UpdateStatus)> {
        let last = self.last.read().ok()?;
        last.as_ref().map(|l| (l.at, l.status.clone()))
    }

    pub fn evaluate(&self, remote: &RemoteManifest) -> UpdateStatus {
        if compare_versions(&self.current_version, &remote.version) == Ordering::Less {
            UpdateStatus::Available(UpdateOffer {
                slug: self.slug.clone(),
                entry: self.entry(),
                new_version: remote.version.clone(),
                tested: remote.tested.clone(),
                package: remote.download_url.clone(),
                url: PROJECT_URL.to_string(),
            })
        } else {
            UpdateStatus::UpToDate {
                slug: self.slug.clone(),
                current_version: self.current_version.clone(),
            }
        }
    }

    /// Details view for our own slug; `None` for any other slug.
    pub async fn plugin_info(&self, slug: &str) -> anyhow::Result<Option<PluginInfo>> {
        if slug != self.slug {
            return Ok(None);
        }
        let remote = self.source.fetch().await?;
        Ok(Some(PluginInfo {
            name: DISPLAY_NAME.to_string(),
            slug: self.slug.clone(),
            version: remote.version,
            tested: remote.tested,
            last_updated: remote.last_updated,
            description: remote.sections.description,
            changelog: remote.sections.changelog,
            download_link: remote.download_url,
        }))
    }
}

/// Compare dotted versions. Short forms are padded ("1.2" == "1.2.0") and a
/// leading "v" is ignored; anything semver rejects falls back to comparing
/// numeric segments.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (lenient_semver(a), lenient_semver(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => numeric_segments(a).cmp(&numeric_segments(b)),
    }
}

fn lenient_semver(raw: &str) -> Option<Version> {
    let raw = raw.trim().trim_start_matches(['v', 'V']);
    if let Ok(v) = Version::parse(raw) {
        return Some(v);
    }
    let (core, rest) = match raw.find(['-', '+']) {
        Some(i) => raw.split_at(i),
        None => (raw, ""),
    };
    let parts = core.split('.').count();
    if parts == 0 || parts >= 3 {
        return None;
    }
    let padded = format!("{core}{}{rest}", ".0".repeat(3 - parts));
    Version::parse(&padded).ok()
}

fn numeric_segments(raw: &str) -> Vec<u64> {
    raw.split(|c: char| !c.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().unwrap_or(u64::MAX))
        .collect()
}
