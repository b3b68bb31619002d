//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;

/// Rows-per-page choices for `list`.
pub const PAGE_SIZES: [usize; 5] = [5, 10, 20, 50, 100];

/// gm - Administration tool for OIDC group-to-role mappings.
#[derive(Debug, Parser)]
#[command(name = "gm")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Server URL (overrides config).
    #[arg(short, long, env = "GM_SERVER_URL")]
    pub server: Option<String>,

    /// API token (overrides config).
    #[arg(long, env = "GM_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Output format (overrides config).
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the committed mappings.
    List(ListArgs),

    /// Show the identity configuration details.
    Show,

    /// Add a single mapping.
    Add(AddArgs),

    /// Add mappings from CSV-like lines.
    BulkAdd(BulkAddArgs),

    /// Update a mapping.
    Update(UpdateArgs),

    /// Delete a mapping.
    Delete(DeleteArgs),

    /// Export the configuration as a JSON backup.
    Export(ExportArgs),

    /// Configuration management.
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Arguments for `list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page to show (1-based).
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page (5, 10, 20, 50 or 100).
    #[arg(long, default_value = "10", value_parser = parse_page_size)]
    pub per_page: usize,
}

/// Arguments for `add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Mapping name.
    #[arg(long)]
    pub name: String,

    /// External group reference.
    #[arg(long)]
    pub group_ref: Option<String>,

    /// External group name (defaults to the mapping name).
    #[arg(long)]
    pub group_name: Option<String>,

    /// Comma-separated role ids.
    #[arg(long)]
    pub roles: Option<String>,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for `bulk-add`.
#[derive(Debug, Args)]
pub struct BulkAddArgs {
    /// File with one mapping per line (stdin if not specified).
    ///
    /// Line format: group_ref,group_name,name,role_id,role_id...
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for `update`.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Mapping id.
    pub id: String,

    /// New name.
    #[arg(long)]
    pub name: Option<String>,

    /// New external group reference.
    #[arg(long)]
    pub group_ref: Option<String>,

    /// New external group name.
    #[arg(long)]
    pub group_name: Option<String>,

    /// Replacement comma-separated role ids (empty to clear).
    #[arg(long)]
    pub roles: Option<String>,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for `delete`.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Mapping id.
    pub id: String,

    /// Skip confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for `export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Directory to write the backup to (overrides config).
    #[arg(short, long)]
    pub dir: Option<PathBuf>,
}

/// Config commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Initialize configuration interactively.
    Init,
}

fn parse_page_size(raw: &str) -> Result<usize, String> {
    let size: usize = raw.parse().map_err(|_| format!("not a number: {raw}"))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("must be one of {PAGE_SIZES:?}"))
    }
}
