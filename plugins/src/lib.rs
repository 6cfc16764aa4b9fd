pub mod factory;
pub mod host;
pub mod http;
pub mod repository;
pub mod services;
pub mod store;
pub mod updater;
