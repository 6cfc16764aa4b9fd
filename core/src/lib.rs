pub mod access;
pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod preset;
pub mod queue;
pub mod store;
pub mod updater;
