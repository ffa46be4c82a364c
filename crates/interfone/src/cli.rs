//! Clap derive structures for the `interfone` CLI.
//!
//! Defines the complete command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// interfone -- manage a SIP intercom directory and its exchange config
#[derive(Debug, Parser)]
#[command(
    name = "interfone",
    version,
    about = "Manage an intercom directory and keep the exchange in sync",
    long_about = "Edits the apartment/resident directory, synthesizes the\n\
        exchange's credential and routing files from it, and reconciles the\n\
        directory with live registration/channel telemetry.",
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
    /// Config file (defaults to the platform config dir)
    #[arg(long, env = "INTERFONE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory file (overrides the configured path)
    #[arg(long, env = "INTERFONE_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', default_value = "table", global = true)]
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
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
    /// YAML
    Yaml,
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
    /// Manage apartments (dial targets)
    #[command(alias = "ap", alias = "a")]
    Apartments(ApartmentsArgs),

    /// Manage residents (SIP identities inside an apartment)
    #[command(alias = "res", alias = "r")]
    Residents(ResidentsArgs),

    /// Synthesize artifacts, write them, and reload the exchange
    Apply,

    /// One-shot dashboard: directory joined with live status
    #[command(alias = "dash")]
    Dashboard,

    /// Live dashboard, re-rendered on a fixed interval
    Watch(WatchArgs),

    /// Exchange reachability and telemetry summary
    Status,

    /// Inspect or initialize the configuration
    Config(ConfigArgs),
}

// ── apartments ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ApartmentsArgs {
    #[command(subcommand)]
    pub command: ApartmentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ApartmentsCommand {
    /// List apartments in canonical order
    #[command(alias = "ls")]
    List,

    /// Create an apartment
    Create {
        /// Display name (e.g. "Block A / Apt 101")
        #[arg(long)]
        label: String,

        /// Extension the front desk dials (digits)
        #[arg(long, short = 'e')]
        extension: String,

        /// Ring strategy: sequential or parallel
        #[arg(long, short = 's', default_value = "sequential")]
        strategy: String,

        /// Total ring time in seconds (config default when omitted)
        #[arg(long)]
        ring_seconds: Option<u32>,
    },

    /// Change an apartment's ring strategy / ring time
    SetStrategy {
        /// Apartment extension
        extension: String,

        /// New strategy: sequential or parallel
        strategy: String,

        /// New total ring time in seconds
        #[arg(long)]
        ring_seconds: Option<u32>,
    },

    /// Remove an apartment and all of its residents
    #[command(alias = "rm")]
    Remove {
        /// Apartment extension
        extension: String,
    },
}

// ── residents ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ResidentsArgs {
    #[command(subcommand)]
    pub command: ResidentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResidentsCommand {
    /// List one apartment's residents with live status
    #[command(alias = "ls")]
    List {
        /// Apartment extension
        extension: String,
    },

    /// Add a resident to an apartment
    Add {
        /// Apartment extension
        extension: String,

        /// Resident display name
        #[arg(long, short = 'n')]
        name: String,

        /// SIP identity (synthesized from the apartment extension
        /// when omitted)
        #[arg(long, short = 'i')]
        identity: Option<String>,

        /// SIP secret (generated when omitted)
        #[arg(long)]
        secret: Option<String>,

        /// Ring priority -- lower rings first under sequential
        #[arg(long, short = 'p', default_value_t = 100)]
        priority: i32,
    },

    /// Remove a resident
    #[command(alias = "rm")]
    Remove {
        /// Resident SIP identity
        identity: String,
    },
}

// ── watch / config ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (config default when omitted)
    #[arg(long, short = 'i')]
    pub interval: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file path
    Path,

    /// Show the resolved configuration
    Show,

    /// Write a default config file
    Init,
}
