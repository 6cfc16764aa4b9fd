//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `packager_core::api` instead of reaching into internal modules.

pub use crate::access::{
    AccessGuard, Caller, NonceRegistry, EXPORT_NONCE, IMPORT_NONCE, INSTALL_ACTION, INSTALL_NONCE,
};
pub use crate::config::{
    get_packager_data_dir, load_default, AccessConfig, AppConfig, HostConfig, HttpServerConfig,
    LoggingConfig, QueueConfig, RepositoryConfig, StoreConfig, UpdaterConfig, EXPORT_FILE_NAME,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::error::{
    CliError, ExecuteError, QueueError, SlugError, StoreError, TransferError, TransitionError,
};
pub use crate::executor::{
    entry_slug, messages, CallerBoundExecutor, ExecuteRequest, ExecuteResponse, HostError,
    HostErrorCode, InstallExecutor, InstalledPlugin, OutcomeDecodeError, PackageDescriptor,
    PackageRepository, PluginHost, RepositoryError, TaskExecutor, TaskOutcome,
};
pub use crate::preset::{
    autoload_default, export_active, import_into, installed_slugs, join_slug_list,
    normalize_slug, parse_slug_list, ActivePreset, ExportDocument, Preset, PresetStore,
};
pub use crate::queue::{
    Controls, LogKind, LogLine, ProgressMonitor, Queue, QueueDriver, QueueEvent, QueueLog,
    QueueRenderer, QueueSummary, SelectionItem, StartLabel, Step, Task, TaskStatus,
};
pub use crate::store::{KeyValueStore, MemoryStore, OptionsUpdate};
pub use crate::updater::{
    compare_versions, ManifestSections, ManifestSource, PluginInfo, RemoteManifest,
    UpdateChecker, UpdateOffer, UpdateStatus,
};
