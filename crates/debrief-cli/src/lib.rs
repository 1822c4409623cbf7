//! Debrief CLI library.
//!
//! This library provides the core functionality for the debrief command-line
//! interface: argument parsing, environment-backed settings, and output
//! formatting for analysis reports and pipeline failures.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;

pub use cli::Cli;
pub use config::Settings;
pub use error::{CliError, Result};
pub use output::{Formatter, OutputFormat};
