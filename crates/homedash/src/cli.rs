//! Clap derive structures for the `homedash` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homedash -- one-shot and live views over your home-lab services
#[derive(Debug, Parser)]
#[command(
    name = "homedash",
    version,
    about = "Aggregate media, download, container, and system state from the terminal",
    long_about = "Polls the services configured in your config file (media request\n\
        managers, *arr libraries, Docker/Portainer, download clients, Glances,\n\
        calendars, RSS feeds, market data) and renders their normalized state.\n\
        One failing service never hides the others.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path (defaults to the platform config dir)
    #[arg(long, short = 'c', env = "HOMEDASH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOMEDASH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every configured source once and show a health summary
    #[command(alias = "st")]
    Status,

    /// Fetch one source and show its items
    Show(ShowArgs),

    /// Run the polling scheduler and print updates until interrupted
    Watch(WatchArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Source id (e.g. "radarr", "qbittorrent"; see `homedash status`)
    pub source: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this long (e.g. "90s", "5m"); runs until Ctrl-C otherwise
    #[arg(long, value_parser = humantime::parse_duration)]
    pub duration: Option<std::time::Duration>,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a commented starter config
    Init,
    /// Print the config file path
    Path,
    /// Load and validate the configuration
    Check,
}
