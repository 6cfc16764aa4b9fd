//! Human-readable outcome messages shared by the server and its clients.

pub const NO_PERMISSION: &str = "No permission to install plugins.";
pub const NOT_FOUND: &str = "Plugin not found in repository.";
pub const ACTIVATION_FAILED_PREFIX: &str = "Installed but failed to activate: ";
pub const INSTALLED_AND_ACTIVATED: &str = "Completed: installed and activated.";
pub const INSTALLED_FALLBACK_ACTIVATION: &str =
    "Completed: installed (activation attempted via fallback).";
pub const INSTALLED_MANUAL_ACTIVATION: &str = "Completed: installed; manual activation required.";
