//! CLI argument definitions for the MFDS reconciler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "mfds-reconcile",
    version,
    about = "Reconcile drug product names against the MFDS approval registry",
    long_about = "Match free-text drug product names to MFDS registry records and report,\n\
                  per product, whether it is the original of its ingredient group and\n\
                  how many generics share that ingredient."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file (registry path, artifact tokens, name separator).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Prefix log lines with timestamps.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Reconcile an input product list against the registry.
    Run(RunArgs),

    /// List cleaned English keys that may need a confirmed translation.
    Keys(KeysArgs),

    /// Show ingredient group statistics for an ingredient search.
    Ingredient(IngredientArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Input CSV with a product column (제품명/product) and optional 순번.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Registry CSV export (falls back to MFDS_REGISTRY, then the config file).
    #[arg(long = "registry", value_name = "CSV")]
    pub registry: Option<PathBuf>,

    /// Two-column CSV of confirmed English to Korean product names.
    #[arg(long = "translations", value_name = "CSV")]
    pub translations: Option<PathBuf>,

    /// Final table destination (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Unmatched table destination.
    #[arg(long = "unmatched", value_name = "PATH")]
    pub unmatched: Option<PathBuf>,

    /// Output format for the written tables.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: OutputFormatArg,

    /// Exit with status 2 when any row is unmatched.
    #[arg(long = "fail-on-unmatched")]
    pub fail_on_unmatched: bool,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Parser)]
pub struct KeysArgs {
    /// Input CSV with a product column.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,
}

#[derive(Parser)]
pub struct IngredientArgs {
    /// Korean or English ingredient text to search for.
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Registry CSV export (falls back to MFDS_REGISTRY, then the config file).
    #[arg(long = "registry", value_name = "CSV")]
    pub registry: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
