pub mod local;

pub use local::{LocalPluginHost, ACTIVE_PLUGINS_KEY};
