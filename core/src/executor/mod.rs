//! Task Executor: install (and optionally activate) one plugin per call
//!
//! The executor is stateless per call. It resolves a slug through a
//! [`PackageRepository`], hands the download to a [`PluginHost`], and folds
//! every sub-case into a two-valued [`TaskOutcome`]:
//!
//! ```text
//! authorize ─✗→ Failed("no permission")
//!   ↓
//! lookup    ─✗→ Failed("not found in repository")
//!   ↓
//! install   ─✗→ Failed(host message)      (folder_exists is not an error)
//!   ↓
//! activate? ─✗→ Failed("installed but failed to activate: …")
//!   ↓
//! Succeeded(…)
//! ```

mod install;
pub mod messages;
pub mod traits;
pub mod types;

pub use install::{CallerBoundExecutor, InstallExecutor};
pub use traits::{PackageRepository, PluginHost, TaskExecutor};
pub use types::*;
