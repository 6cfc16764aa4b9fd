//! Self-update checking against a remote version manifest.

mod checker;
mod manifest;

pub use checker::{
    compare_versions, PluginInfo, UpdateChecker, UpdateOffer, UpdateStatus, DISPLAY_NAME,
    PROJECT_URL,
};
pub use manifest::{ManifestSections, ManifestSource, RemoteManifest};
