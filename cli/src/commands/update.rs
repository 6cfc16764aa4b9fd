//! `packager check-update`

use packager_core::api::{AppContext, CliError, PluginInfo, UpdateStatus};

use crate::commands::cli::CheckUpdateArgs;

pub async fn handle_check_update(args: CheckUpdateArgs, ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let checker = services.update_checker(ctx.cfg());

    if args.info {
        let info = checker.plugin_info(checker.slug()).await?;
        if let Some(info) = info {
            print!("{}", format_plugin_info(&info));
        }
        return Ok(0);
    }

    let status = checker.check().await?;
    println!("{}", format_status(&status));
    Ok(0)
}

pub fn format_status(status: &UpdateStatus) -> String {
    match status {
        UpdateStatus::Available(offer) => {
            let mut line = format!(
                "Update available for {}: {} ({})",
                offer.slug, offer.new_version, offer.package
            );
            if let Some(tested) = &offer.tested {
                line.push_str(&format!(", tested up to {tested}"));
            }
            line
        }
        UpdateStatus::UpToDate {
            slug,
            current_version,
        } => format!("{slug} {current_version} is up to date"),
    }
}

pub fn format_plugin_info(info: &PluginInfo) -> String {
    let mut out = format!("{} ({}) {}\n", info.name, info.slug, info.version);
    if let Some(tested) = &info.tested {
        out.push_str(&format!("Tested up to: {tested}\n"));
    }
    if let Some(updated) = &info.last_updated {
        out.push_str(&format!("Last updated: {updated}\n"));
    }
    out.push_str(&format!("Download: {}\n", info.download_link));
    if !info.description.is_empty() {
        out.push_str(&format!("\n{}\n", info.description));
    }
    if !info.changelog.is_empty() {
        out.push_str(&format!("\nChangelog:\n{}\n", info.changelog));
    }
    out
}
