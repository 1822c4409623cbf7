//! Command-line argument definitions.

use crate::output::OutputFormat;
use clap::Parser;
use std::path::PathBuf;

/// Analyze post-mortem notes into themes, unrecoverable lines, and
/// recommendations.
#[derive(Debug, Parser)]
#[command(name = "debrief", version, about)]
pub struct Cli {
    /// Path to the post-mortem text file (UTF-8)
    pub file: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Model identifier override
    #[arg(long, env = "DEBRIEF_MODEL")]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f64>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show full diagnostic detail on failure
    #[arg(long)]
    pub verbose: bool,
}
