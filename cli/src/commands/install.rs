//! `packager install`: drive the queue over the active preset.

use std::sync::Arc;

use packager_core::api::{
    autoload_default, AccessGuard, AppContext, CliError, ProgressMonitor, QueueDriver, QueueError,
    SelectionItem, TaskExecutor,
};

use crate::commands::cli::{InstallArgs, OutputFormat};
use crate::http::client::RemoteClient;
use crate::render::{ConsoleRenderer, JsonlRenderer};

/// Checklist rows for `plugins`; `--only` narrows, `--exclude` unchecks.
pub fn build_selection(plugins: &[String], only: &[String], exclude: &[String]) -> Vec<SelectionItem> {
    let wanted = |slug: &str| only.is_empty() || only.iter().any(|o| o.trim() == slug);
    let dropped = |slug: &str| exclude.iter().any(|e| e.trim() == slug);

    plugins
        .iter()
        .map(|slug| SelectionItem {
            identifier: slug.clone(),
            checked: wanted(slug) && !dropped(slug),
        })
        .collect()
}

pub async fn handle_install(args: InstallArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let cfg = ctx.cfg();

    let (executor, plugins, default_activate): (Arc<dyn TaskExecutor>, Vec<String>, bool) =
        match args.remote.as_deref() {
            Some(url) => {
                let mut client =
                    RemoteClient::new(url, args.api_key.clone(), cfg.http_server.request_timeout_secs)?;
                let boot = client.bootstrap().await?;
                tracing::info!(
                    target: "packager.install",
                    server = %url,
                    preset = %boot.preset.name,
                    "remote page snapshot loaded"
                );
                let executor: Arc<dyn TaskExecutor> = Arc::new(client);
                (executor, boot.preset.plugins, boot.auto_activate)
            }
            None => {
                let services = ctx.build_services().await?;
                let presets = services.presets();
                if let Some(path) = cfg.default_import_file() {
                    if autoload_default(&presets, &path).await?.is_some() {
                        eprintln!("Configuration loaded automatically from {}", path.display());
                    }
                }
                let snapshot = presets.active_snapshot().await?;
                tracing::info!(
                    target: "packager.install",
                    preset = %snapshot.name,
                    plugins = snapshot.plugins.len(),
                    "active preset snapshot taken"
                );

                let guard = Arc::new(AccessGuard::new(&cfg.access));
                let executor = services.executor(guard.clone());
                let bound: Arc<dyn TaskExecutor> = Arc::new(executor.bind(guard.local_operator()));
                (bound, snapshot.plugins, cfg.queue.auto_activate)
            }
        };

    let auto_activate = default_activate && !args.no_activate;
    let selection = build_selection(&plugins, &args.only, &args.exclude);

    let mut driver = QueueDriver::new(executor);
    driver = match args.format {
        OutputFormat::Text => {
            let progress = !args.no_progress
                && cfg.queue.progress_bar
                && atty::is(atty::Stream::Stderr);
            driver
                .with_renderer(Arc::new(ProgressMonitor::new(progress)))
                .with_renderer(Arc::new(ConsoleRenderer::new(
                    atty::is(atty::Stream::Stdout),
                    progress,
                )))
        }
        OutputFormat::Jsonl => driver.with_renderer(Arc::new(JsonlRenderer::new(false))),
    };

    match driver.start(&selection, auto_activate) {
        Ok(_) => {}
        Err(QueueError::EmptyQueue) => {
            eprintln!("{}", QueueError::EmptyQueue);
            return Ok(2);
        }
        Err(e) => return Err(e.into()),
    }

    let summary = driver.run().await?;
    tracing::info!(
        target: "packager.install",
        total = summary.total,
        succeeded = summary.succeeded,
        failed = summary.failed,
        "queue finished"
    );

    Ok(if summary.all_succeeded() { 0 } else { 1 })
}
