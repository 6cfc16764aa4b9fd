//! Presets: named, ordered slug lists with exactly one active at a time.

mod model;
mod slug;
mod store;
mod transfer;

pub use model::{ActivePreset, Preset, DEFAULT_PRESET_ID, DEFAULT_PRESET_NAME};
pub use slug::{installed_slugs, join_slug_list, normalize_slug, parse_slug_list};
pub use store::{PresetStore, ACTIVE_PRESET_KEY, PRESETS_KEY};
pub use transfer::{autoload_default, export_active, import_into, ExportDocument};
