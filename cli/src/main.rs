use clap::Parser;
use packager_cli::commands::{self, cli};
use packager_cli::http;
use packager_core::api::{AppContext, CliError, LoggingConfig};
use packager_plugins::services::PluginServicesFactory;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
    std::sync::OnceLock::new();

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{e}");
            exit_code_for_error(&e)
        }
    };

    std::process::exit(exit);
}

async fn real_main() -> Result<i32, CliError> {
    let args = cli::Args::parse();
    let cfg = match args.config.as_deref() {
        Some(path) => packager_core::config::load_from(Path::new(path)).and_then(|cfg| {
            let data_dir = packager_core::config::get_packager_data_dir()?;
            packager_core::config::finish(cfg, &data_dir)
        }),
        None => packager_core::config::load_default(),
    }
    .map_err(|e| CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(CliError::Command)?;

    let ctx = AppContext::new(cfg, Some(Arc::new(PluginServicesFactory)));
    dispatch(args.command, ctx).await
}

fn exit_code_for_error(e: &CliError) -> i32 {
    // 0: success
    // 1: queue finished with failed tasks (returned as a normal exit code)
    // 11: config error
    // 20: IO / command error
    // 50: internal/uncategorized
    match e {
        CliError::Config(_) => 11,
        CliError::Io(_) => 20,
        CliError::Command(_) => 20,
        CliError::Transfer(_) => 20,
        CliError::Store(_) => 50,
        CliError::Queue(_) => 50,
        CliError::Anyhow(_) => 50,
    }
}

async fn dispatch(cmd: cli::Commands, ctx: AppContext) -> Result<i32, CliError> {
    match cmd {
        cli::Commands::Serve(server_args) => {
            http::handle_http_server(server_args, &ctx).await?;
            Ok(0)
        }
        cli::Commands::Install(install_args) => commands::install::handle_install(install_args, &ctx).await,
        cli::Commands::Preset(preset_cmd) => commands::preset::handle_preset(preset_cmd, &ctx).await,
        cli::Commands::Export(export_args) => commands::transfer::handle_export(export_args, &ctx).await,
        cli::Commands::Import(import_args) => commands::transfer::handle_import(import_args, &ctx).await,
        cli::Commands::Installed => commands::preset::handle_installed(&ctx).await,
        cli::Commands::CheckUpdate(update_args) => {
            commands::update::handle_check_update(update_args, &ctx).await
        }
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("packager"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("packager.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        let _ = LOG_GUARD.set(guard);
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
