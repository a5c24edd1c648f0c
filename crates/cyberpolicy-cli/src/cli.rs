//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cyberpolicy - Extract cybercrime policy rules from per-country document collections.
#[derive(Debug, Parser)]
#[command(name = "cyberpolicy")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CYBERPOLICY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract rules from every document under the policies directory
    Run(RunArgs),

    /// List the documents that would be processed, by country
    Locate(LocateArgs),

    /// Show how a document would be split into batches
    Plan(PlanArgs),

    /// Summarize a rule collection written by a previous run
    Show(ShowArgs),

    /// Print the effective configuration
    Config(ConfigArgs),
}

/// Arguments for the run command.
#[derive(Debug, Parser)]
pub struct RunArgs {
    /// Root directory with one subdirectory per country
    #[arg(short, long)]
    pub policies: Option<PathBuf>,

    /// Rule collection output file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write skipped page ranges to this file
    #[arg(long)]
    pub skipped_report: Option<PathBuf>,

    /// Word budget per batch
    #[arg(long)]
    pub max_words: Option<usize>,

    /// Attempts per batch before it is skipped
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Use smaller batches, more attempts and longer backoff (sampling settings are kept)
    #[arg(long)]
    pub thorough: bool,

    /// Model identifier
    #[arg(short, long)]
    pub model: Option<String>,

    /// Chat-completions endpoint base URL
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key (defaults to the variable named by llm.api_key_env)
    #[arg(long)]
    pub api_key: Option<String>,
}

/// Arguments for the locate command.
#[derive(Debug, Parser)]
pub struct LocateArgs {
    /// Root directory with one subdirectory per country
    #[arg(short, long)]
    pub policies: Option<PathBuf>,
}

/// Arguments for the plan command.
#[derive(Debug, Parser)]
pub struct PlanArgs {
    /// Document to split
    pub document: PathBuf,

    /// Word budget per batch
    #[arg(long)]
    pub max_words: Option<usize>,
}

/// Arguments for the show command.
#[derive(Debug, Parser)]
pub struct ShowArgs {
    /// Rule collection file
    pub file: Option<PathBuf>,

    /// Only list rules for this country
    #[arg(short = 'C', long)]
    pub country: Option<String>,
}

/// Arguments for the config command.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    /// Save the effective configuration to the config file path
    #[arg(long)]
    pub write: bool,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
        }
    }
}
