//! `packager export` / `packager import`.

use std::path::Path;

use packager_core::api::{export_active, import_into, AppContext, CliError};

use crate::commands::cli::{ExportArgs, ImportArgs};

pub async fn handle_export(args: ExportArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let doc = export_active(&services.presets()).await?;
    let json = doc.to_json_pretty()?;

    match args.output.as_deref() {
        Some(path) => {
            tokio::fs::write(Path::new(path), json.as_bytes()).await?;
            tracing::info!(
                target: "packager.preset",
                file = %path,
                plugins = doc.plugins.len(),
                "preset exported"
            );
            eprintln!("Exported '{}' ({} plugins) to {}", doc.name, doc.plugins.len(), path);
        }
        None => println!("{json}"),
    }
    Ok(0)
}

pub async fn handle_import(args: ImportArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let bytes = tokio::fs::read(Path::new(&args.file)).await?;
    let preset = import_into(&services.presets(), &bytes).await?;
    println!(
        "Configuration imported successfully! '{}' now lists {} plugins.",
        preset.name,
        preset.plugins.len()
    );
    Ok(0)
}
