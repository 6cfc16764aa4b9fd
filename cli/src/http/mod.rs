//! HTTP服务器模块 - 暴露 task endpoint 与 preset 导入导出 API

pub mod client;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod validation;

pub use models::*;
pub use server::*;
pub use state::*;
