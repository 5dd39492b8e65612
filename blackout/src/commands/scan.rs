// blackout/src/commands/scan.rs
//! Scan command implementation: runs the full pipeline but discards the
//! rewritten document, reporting only what would be redacted.

use anyhow::{anyhow, Context, Result};
use blackout_core::{redact_document_bytes, redact_sensitive};
use comfy_table::{presets::UTF8_FULL, Table};
use std::fs;

use crate::cli::ScanCommand;
use crate::commands::{load_rules, print_json_report};

pub fn run(cmd: &ScanCommand, quiet: bool) -> Result<()> {
    let config = load_rules(&cmd.config, &cmd.enable, &cmd.disable)?;

    let document_bytes = fs::read(&cmd.input)
        .with_context(|| format!("Failed to read input file {}", cmd.input.display()))?;
    let document_id = cmd.input.display().to_string();

    let result = redact_document_bytes(config, &document_bytes, &document_id)?;

    if cmd.json {
        print_json_report(&result)?;
    } else if !quiet {
        print_detections(&result, cmd.sample_matches)?;
    }

    if let Some(threshold) = cmd.fail_over_threshold {
        if result.summary.total_redactions > threshold {
            return Err(anyhow!(
                "Detected {} sensitive item(s), over the threshold of {}",
                result.summary.total_redactions,
                threshold
            ));
        }
    }

    Ok(())
}

/// Renders one row per detection to stdout.
fn print_detections(result: &blackout_core::ProcessingResult, sample_matches: bool) -> Result<()> {
    if result.blocks.is_empty() {
        println!("No sensitive content detected in {} page(s).", result.total_pages);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Page", "Category", "Confidence", "Match"]);

    for block in &result.blocks {
        let shown = if sample_matches {
            block.original_text.clone()
        } else {
            redact_sensitive(&block.original_text)
        };
        table.add_row(vec![
            block.page_number.to_string(),
            block.category.to_string(),
            format!("{:.2}", block.confidence),
            shown,
        ]);
    }

    println!("{table}");
    println!(
        "{} detection(s) across {} of {} page(s).",
        result.summary.total_redactions,
        result.summary.pages_affected,
        result.total_pages
    );

    for page in &result.skipped_pages {
        println!("page {} skipped: {}", page.page_number, page.reason);
    }

    Ok(())
}
