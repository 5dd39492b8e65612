// blackout/src/commands/redact.rs
//! Redact command implementation: full destructive processing of a PDF file.

use anyhow::{Context, Result};
use blackout_core::redact_document_bytes;
use log::info;
use std::fs;
use std::path::PathBuf;

use crate::cli::RedactCommand;
use crate::commands::{load_rules, print_json_report, print_summary};

/// Default output path: the input path with a `.redacted.pdf` suffix.
fn default_output_path(input: &PathBuf) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    input.with_file_name(format!("{}.redacted.pdf", stem))
}

pub fn run(cmd: &RedactCommand, quiet: bool) -> Result<()> {
    let config = load_rules(&cmd.config, &cmd.enable, &cmd.disable)?;

    let document_bytes = fs::read(&cmd.input)
        .with_context(|| format!("Failed to read input file {}", cmd.input.display()))?;
    let document_id = cmd.input.display().to_string();

    let result = redact_document_bytes(config, &document_bytes, &document_id)?;

    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&cmd.input));
    fs::write(&output_path, &result.redacted_bytes)
        .with_context(|| format!("Failed to write output file {}", output_path.display()))?;
    info!(
        "Wrote {} redacted byte(s) to {}.",
        result.redacted_bytes.len(),
        output_path.display()
    );

    if cmd.json {
        print_json_report(&result)?;
    } else if !cmd.no_summary && !quiet {
        print_summary(&result)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_appends_suffix() {
        let input = PathBuf::from("/tmp/statement.pdf");
        assert_eq!(
            default_output_path(&input),
            PathBuf::from("/tmp/statement.redacted.pdf")
        );
    }

    #[test]
    fn test_default_output_path_without_extension() {
        let input = PathBuf::from("report");
        assert_eq!(default_output_path(&input), PathBuf::from("report.redacted.pdf"));
    }
}
