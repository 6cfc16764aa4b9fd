use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Jsonl,
}

#[derive(Parser, Debug)]
#[command(name = "packager", version, about = "Install your favourite plugins in a chain")]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of ~/.packager/config.toml
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct HttpServerArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8080)]
    pub port: u16,

    #[arg(long)]
    pub session_id: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct InstallArgs {
    /// Only queue these slugs (comma separated); other rows stay unchecked.
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Uncheck these slugs (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Install without activating.
    #[arg(long)]
    pub no_activate: bool,

    /// Drive a running `packager serve` instead of installing locally.
    #[arg(long)]
    pub remote: Option<String>,

    /// API key presented to the remote server.
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Disable the progress bar.
    #[arg(long)]
    pub no_progress: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PresetCommand {
    /// List presets, marking the active one.
    List,
    /// Print the active preset.
    Show,
    /// Create an empty preset.
    Create {
        name: String,
        /// Make the new preset active.
        #[arg(long)]
        switch: bool,
    },
    Rename {
        preset: String,
        new_name: String,
    },
    Delete {
        preset: String,
    },
    Switch {
        preset: String,
    },
    /// Replace the active list with a comma separated slug list.
    Set {
        slugs: String,
    },
    /// Append the slugs of currently installed plugins to the active list.
    AddInstalled,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ExportArgs {
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub output: Option<String>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct ImportArgs {
    pub file: String,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct CheckUpdateArgs {
    /// Show the plugin-info view built from the manifest.
    #[arg(long)]
    pub info: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP server exposing the task endpoint.
    Serve(HttpServerArgs),
    /// Install the active preset one plugin at a time.
    Install(InstallArgs),
    #[command(subcommand)]
    Preset(PresetCommand),
    Export(ExportArgs),
    Import(ImportArgs),
    /// List plugins present in the plugins directory.
    Installed,
    CheckUpdate(CheckUpdateArgs),
}
