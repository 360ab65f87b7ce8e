//! CLI command definitions and argument parsing.

use clap::{ArgAction, Args, Parser, Subcommand};
use meridian_engine::Scope;
use std::path::PathBuf;

/// Meridian - check and repair cross-domain relationships in a YAML corpus.
#[derive(Debug, Parser)]
#[command(name = "meridian")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Corpus root directory (one subdirectory per domain)
    #[arg(long, global = true, env = "MERIDIAN_CORPUS")]
    pub corpus: Option<PathBuf>,

    /// Schema definition file (TOML); the built-in schemas are used if omitted
    #[arg(long, global = true, env = "MERIDIAN_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report every violation in the corpus
    Validate(ValidateArgs),

    /// Repair auto-repairable violations, then re-validate
    Repair(RepairArgs),

    /// Show field coverage and per-document confidence scores
    Score(ScoreArgs),
}

/// Severity limits shared by validate and repair.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct ThresholdArgs {
    /// Critical violations tolerated before exiting non-zero
    #[arg(long)]
    pub max_critical: Option<usize>,

    /// High violations tolerated before exiting non-zero
    #[arg(long)]
    pub max_high: Option<usize>,
}

/// Arguments for the validate command.
#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Domain to check, or "all"
    #[arg(default_value = "all")]
    pub scope: Scope,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

/// Arguments for the repair command.
#[derive(Debug, Args)]
pub struct RepairArgs {
    /// Domain to repair, or "all"
    #[arg(default_value = "all")]
    pub scope: Scope,

    /// Compute the repair without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Worker threads (0 = one per core)
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Leave slugs that disagree with their URL as they are
    #[arg(long)]
    pub keep_mismatched_slugs: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,
}

/// Arguments for the score command.
#[derive(Debug, Args)]
pub struct ScoreArgs {
    /// Domain to score, or "all"
    #[arg(default_value = "all")]
    pub scope: Scope,

    /// List only documents failing the completeness gate
    #[arg(long)]
    pub failing: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
