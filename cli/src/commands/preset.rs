//! `packager preset ...` and `packager installed`.

use std::collections::BTreeMap;

use packager_core::api::{
    installed_slugs, join_slug_list, parse_slug_list, AppContext, CliError, InstalledPlugin,
    Preset, TransferError,
};

use crate::commands::cli::PresetCommand;

pub async fn handle_preset(cmd: PresetCommand, ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let presets = services.presets();

    match cmd {
        PresetCommand::List => {
            let all = presets.list().await?;
            let active = presets.active().await?;
            print!("{}", format_preset_list(&all, &active.id));
        }
        PresetCommand::Show => {
            let active = presets.active().await?;
            println!("{} ({})", active.name, active.id);
            println!("{}", join_slug_list(&active.plugins));
        }
        PresetCommand::Create { name, switch } => {
            let created = presets.create(&name).await?;
            if switch {
                presets.switch(&created.id).await?;
            }
            println!("Preset '{}' created (id: {})", created.name, created.id);
        }
        PresetCommand::Rename { preset, new_name } => {
            let renamed = presets.rename(&preset, &new_name).await?;
            println!("Preset '{}' renamed to '{}'", renamed.id, renamed.name);
        }
        PresetCommand::Delete { preset } => {
            let active = presets.delete(&preset).await?;
            println!("Preset deleted; active preset is now '{}'", active.name);
        }
        PresetCommand::Switch { preset } => {
            let active = presets.switch(&preset).await?;
            println!("Active preset: '{}'", active.name);
        }
        PresetCommand::Set { slugs } => {
            let slugs = parse_slug_list(&slugs).map_err(TransferError::from)?;
            let updated = presets.set_active_plugins(slugs).await?;
            println!("List saved ({} plugins)", updated.plugins.len());
        }
        PresetCommand::AddInstalled => {
            let installed = services
                .host
                .list_installed()
                .await
                .map_err(|e| CliError::Command(e.to_string()))?;
            let slugs = installed_slugs(&installed, &ctx.cfg().host.self_slug);
            let added = presets.append_active_plugins(slugs).await?;
            println!("{added} installed plugins added to the active list");
        }
    }

    Ok(0)
}

pub async fn handle_installed(ctx: &AppContext) -> Result<i32, CliError> {
    let services = ctx.build_services().await?;
    let installed = services
        .host
        .list_installed()
        .await
        .map_err(|e| CliError::Command(e.to_string()))?;
    print!("{}", format_installed(&installed));
    Ok(0)
}

pub fn format_preset_list(presets: &[Preset], active_id: &str) -> String {
    let mut out = String::new();
    for p in presets {
        let marker = if p.id == active_id { "*" } else { " " };
        out.push_str(&format!(
            "{} {} ({}) - {} plugins\n",
            marker,
            p.name,
            p.id,
            p.plugins.len()
        ));
    }
    out
}

pub fn format_installed(installed: &BTreeMap<String, InstalledPlugin>) -> String {
    let mut out = String::new();
    for (entry, plugin) in installed {
        let state = if plugin.active { "active" } else { "inactive" };
        let version = plugin.version.as_deref().unwrap_or("-");
        out.push_str(&format!("{entry}\t{}\t{version}\t{state}\n", plugin.name));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_preset_list_marks_active() {
        let mut shop = Preset::new("shop", "Shop");
        shop.plugins = vec!["woo".into(), "stripe".into()];
        let presets = vec![Preset::default_preset(), shop];

        assert_eq!(
            format_preset_list(&presets, "shop"),
            "  Default (default) - 0 plugins\n* Shop (shop) - 2 plugins\n"
        );
    }

    #[test]
    fn test_format_installed() {
        let mut installed = BTreeMap::new();
        installed.insert(
            "akismet/akismet.php".to_string(),
            InstalledPlugin {
                name: "Akismet".into(),
                version: Some("5.3".into()),
                active: true,
            },
        );
        installed.insert(
            "hello.php".to_string(),
            InstalledPlugin {
                name: "Hello Dolly".into(),
                version: None,
                active: false,
            },
        );

        assert_eq!(
            format_installed(&installed),
            "akismet/akismet.php\tAkismet\t5.3\tactive\nhello.php\tHello Dolly\t-\tinactive\n"
        );
    }
}
