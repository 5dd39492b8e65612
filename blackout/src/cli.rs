// blackout/src/cli.rs
//! This file defines the command-line interface (CLI) for the blackout
//! application, including all available commands and their arguments.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "blackout",
    author = "Meridian Security",
    version = env!("CARGO_PKG_VERSION"),
    about = "Detect and destructively redact sensitive content in PDF files",
    long_about = "Blackout scans the text of PDF documents for sensitive content such as \
email addresses, Social Security Numbers, and payment card numbers, then destroys the \
matched text in place and covers it with opaque rectangles. The redacted output carries \
no recoverable trace of the original content.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress all informational messages.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational messages.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG for this run).
    #[arg(long, short = 'd', global = true, help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `blackout` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Redacts a PDF file, destroying sensitive content in place.
    #[command(about = "Redacts a PDF file, writing a sanitized copy alongside a summary.")]
    Redact(RedactCommand),

    /// Scans a PDF for sensitive content and reports what would be redacted.
    #[command(about = "Scans a PDF and reports detected sensitive content without writing output.")]
    Scan(ScanCommand),
}

/// Arguments for the `redact` command.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    /// Path to the input PDF file.
    #[arg(value_name = "FILE", help = "Path to the input PDF file.")]
    pub input: PathBuf,

    /// Write the redacted PDF to this path instead of `<input>.redacted.pdf`.
    #[arg(long, short = 'o', value_name = "FILE", help = "Write the redacted PDF to this path.")]
    pub output: Option<PathBuf>,

    /// Path to a custom detection rules file (YAML), merged over the defaults.
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom detection rules file (YAML).")]
    pub config: Option<PathBuf>,

    /// Explicitly enable these opt-in rule names (comma-separated).
    #[arg(long, short = 'e', value_delimiter = ',', help = "Explicitly enable these opt-in rule names (comma-separated).")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// Suppress the redaction summary.
    #[arg(long = "no-summary", help = "Suppress the redaction summary.")]
    pub no_summary: bool,

    /// Print the full processing report as JSON to stdout.
    #[arg(long, help = "Print the full processing report as JSON to stdout.")]
    pub json: bool,
}

/// Arguments for the `scan` command.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Path to the input PDF file.
    #[arg(value_name = "FILE", help = "Path to the input PDF file.")]
    pub input: PathBuf,

    /// Path to a custom detection rules file (YAML), merged over the defaults.
    #[arg(long = "config", value_name = "FILE", help = "Path to a custom detection rules file (YAML).")]
    pub config: Option<PathBuf>,

    /// Explicitly enable these opt-in rule names (comma-separated).
    #[arg(long, short = 'e', value_delimiter = ',', help = "Explicitly enable these opt-in rule names (comma-separated).")]
    pub enable: Vec<String>,

    /// Explicitly disable these rule names (comma-separated).
    #[arg(long, short = 'x', value_delimiter = ',', help = "Explicitly disable these rule names (comma-separated).")]
    pub disable: Vec<String>,

    /// Print the full processing report as JSON to stdout.
    #[arg(long, help = "Print the full processing report as JSON to stdout.")]
    pub json: bool,

    /// Show the matched text verbatim instead of a redacted placeholder.
    #[arg(long = "sample-matches", help = "Show matched text verbatim instead of a redacted placeholder.")]
    pub sample_matches: bool,

    /// Exit non-zero if the number of detections exceeds this threshold.
    #[arg(long = "fail-over-threshold", value_name = "N", help = "Exit with a non-zero code if the number of detections exceeds this threshold.")]
    pub fail_over_threshold: Option<usize>,
}
