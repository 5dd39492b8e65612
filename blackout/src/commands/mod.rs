// blackout/src/commands/mod.rs
//! Command implementations and the helpers they share: rule loading,
//! summary rendering, and exit-code mapping.

pub mod redact;
pub mod scan;

use anyhow::{Context, Result};
use blackout_core::{
    merge_rules, BlackoutError, DetectionConfig, ProcessingResult,
};
use comfy_table::{presets::UTF8_FULL, Table};
use is_terminal::IsTerminal;
use log::info;
use owo_colors::OwoColorize;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;

/// Exit code for engine-side failures.
pub const EXIT_FAILURE: i32 = 1;
/// Exit code for invalid input documents.
pub const EXIT_INVALID_INPUT: i32 = 2;

/// Builds the active rule set: defaults, optional user file merged over
/// them, then enable/disable filtering.
pub fn load_rules(
    config_path: &Option<PathBuf>,
    enable: &[String],
    disable: &[String],
) -> Result<DetectionConfig> {
    let default_config =
        DetectionConfig::load_default_rules().context("Failed to load default rules")?;

    let user_config = match config_path {
        Some(path) => Some(
            DetectionConfig::load_from_file(path)
                .with_context(|| format!("Failed to load rules from {}", path.display()))?,
        ),
        None => None,
    };

    let mut config = merge_rules(default_config, user_config);
    config.set_active_rules(enable, disable);
    info!("Active rule set has {} rule(s).", config.rules.len());
    Ok(config)
}

/// Maps a pipeline error onto the process exit code.
///
/// Validation errors (the input document is at fault) exit with
/// `EXIT_INVALID_INPUT`; everything else exits with `EXIT_FAILURE`.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<BlackoutError>() {
        Some(e) if e.is_validation() => EXIT_INVALID_INPUT,
        _ => EXIT_FAILURE,
    }
}

/// Renders the human-readable redaction summary to stderr.
pub fn print_summary(result: &ProcessingResult) -> Result<()> {
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    let summary = &result.summary;

    let heading = "Redaction Summary";
    if color {
        writeln!(stderr, "\n{}", heading.bold().cyan())?;
    } else {
        writeln!(stderr, "\n{}", heading)?;
    }

    if summary.total_redactions == 0 {
        writeln!(stderr, "No sensitive content detected.")?;
        return Ok(());
    }

    let mut rows: Vec<(String, usize)> = summary
        .redactions_by_reason
        .iter()
        .map(|(category, count)| (category.to_string(), *count))
        .collect();
    rows.sort();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Category", "Count"]);
    for (category, count) in rows {
        table.add_row(vec![category, count.to_string()]);
    }
    writeln!(stderr, "{table}")?;

    let pages: BTreeSet<u32> = result.blocks.iter().map(|b| b.page_number).collect();
    let pages: Vec<String> = pages.into_iter().map(|p| p.to_string()).collect();
    writeln!(
        stderr,
        "Total redactions: {} across page(s) {}",
        summary.total_redactions,
        pages.join(", ")
    )?;

    if let Some(stats) = &summary.confidence_scores {
        writeln!(
            stderr,
            "Confidence: avg {:.2}, min {:.2}, max {:.2}",
            stats.average, stats.minimum, stats.maximum
        )?;
    }

    if !result.skipped_pages.is_empty() {
        let msg = format!("{} page(s) could not be scanned:", result.skipped_pages.len());
        if color {
            writeln!(stderr, "{}", msg.yellow())?;
        } else {
            writeln!(stderr, "{}", msg)?;
        }
        for page in &result.skipped_pages {
            writeln!(stderr, "  page {}: {}", page.page_number, page.reason)?;
        }
    }

    Ok(())
}

/// Serializes the full processing report to stdout as JSON.
pub fn print_json_report(result: &ProcessingResult) -> Result<()> {
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    serde_json::to_writer_pretty(&mut writer, result)
        .context("Failed to serialize processing report")?;
    writeln!(writer)?;
    Ok(())
}
