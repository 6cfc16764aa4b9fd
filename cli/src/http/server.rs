//! HTTP服务器生命周期管理

use super::{
    middleware::{create_middleware_stack, request_logger},
    routes::create_router,
    AppState,
};
use crate::commands::cli::HttpServerArgs;
use axum::middleware;
use packager_core::api::{AppContext, CliError, UpdateChecker};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{info, warn};
use uuid::Uuid;

/// HTTP服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            request_timeout_secs: 120,
        }
    }
}

/// 获取服务器状态文件目录
fn get_servers_dir() -> Result<PathBuf, CliError> {
    let home = dirs::home_dir()
        .ok_or_else(|| CliError::Command("Cannot find home directory".to_string()))?;
    let servers_dir = home.join(".packager").join("servers");
    fs::create_dir_all(&servers_dir)
        .map_err(|e| CliError::Command(format!("Failed to create servers directory: {e}")))?;
    Ok(servers_dir)
}

/// 写入服务器状态文件
fn write_state_file(session_id: &str, port: u16, host: &str) -> Result<(), CliError> {
    let servers_dir = get_servers_dir()?;
    let state_file = servers_dir.join("packager.state");

    let state = serde_json::json!({
        "session_id": session_id,
        "port": port,
        "pid": std::process::id(),
        "url": format!("http://{}:{}", host, port),
        "started_at": chrono::Local::now().to_rfc3339()
    });

    let body = serde_json::to_string_pretty(&state)
        .map_err(|e| CliError::Command(format!("Failed to encode state file: {e}")))?;
    fs::write(&state_file, body)
        .map_err(|e| CliError::Command(format!("Failed to write state file: {e}")))?;

    tracing::info!("State file written to: {}", state_file.display());
    Ok(())
}

/// 处理 serve 命令
pub async fn handle_http_server(args: HttpServerArgs, ctx: &AppContext) -> Result<(), CliError> {
    let session_id = args
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // 合并配置：CLI 参数优先，配置文件作为默认值
    let config = &ctx.cfg().http_server;

    // 如果 CLI 参数与默认值相同，则使用配置文件中的值
    let port = if args.port == 8080 {
        config.port
    } else {
        args.port
    };

    let host = if args.host == "127.0.0.1" {
        config.host.clone()
    } else {
        args.host.clone()
    };

    let services = ctx.build_services().await?;

    // Default-file autoload happens once, before the first page snapshot
    let presets = services.presets();
    if let Some(path) = ctx.cfg().default_import_file() {
        if let Some(preset) = packager_core::api::autoload_default(&presets, &path).await? {
            info!(
                preset = %preset.id,
                plugins = preset.plugins.len(),
                "Configuration loaded automatically from default file"
            );
        }
    }

    let (shutdown_tx, _) = broadcast::channel(1);

    let state = AppState::new(session_id.clone(), services, ctx.cfg().clone(), shutdown_tx);

    if ctx.cfg().updater.enabled {
        spawn_update_poll(
            state.updater.clone(),
            ctx.cfg().updater.interval_secs,
            state.shutdown_tx.subscribe(),
        );
    }

    write_state_file(&session_id, port, &host)?;

    let server_config = ServerConfig {
        host,
        port,
        request_timeout_secs: config.request_timeout_secs,
    };

    start_server_with_config(session_id, server_config, state)
        .await
        .map_err(|e: Box<dyn std::error::Error + Send + Sync>| CliError::Command(e.to_string()))?;

    Ok(())
}

/// Single periodic update poll, registered once per server.
fn spawn_update_poll(
    checker: Arc<UpdateChecker>,
    interval_secs: u64,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(60)));
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = checker.check().await {
                        warn!(target: "packager.updater", error = %e, "update check failed");
                    }
                }
                _ = shutdown_rx.recv() => break,
            }
        }
    });
}

/// 使用自定义配置启动HTTP服务器
pub async fn start_server_with_config(
    session_id: String,
    config: ServerConfig,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!(
        "Starting HTTP server on {}:{} (session: {})",
        config.host, config.port, session_id
    );

    let router = create_router(state.clone());

    let app = router
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack(config.request_timeout_secs));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let mut shutdown_rx = state.shutdown_tx.subscribe();

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal from API");
                }
                _ = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }

            info!("Starting graceful shutdown...");
        })
        .await?;

    // stop the update poll as well
    let _ = state.shutdown_tx.send(());
    info!("Server shutdown complete");

    let servers_dir = get_servers_dir()?;
    let state_file_path = servers_dir.join("packager.state");
    if let Err(e) = fs::remove_file(&state_file_path) {
        warn!("Failed to remove state file: {}", e);
    } else {
        info!("State file removed: {}", state_file_path.display());
    }

    Ok(())
}

/// 等待 SIGTERM 信号（Unix系统）
#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            std::future::pending::<()>().await
        }
    }
}

/// Windows 系统不支持 SIGTERM，使用空操作
#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await
}
