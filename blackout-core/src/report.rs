// blackout-core/src/report.rs
//! Provides core data structures for detections, redaction blocks, and run
//! summaries, plus the sensitive-data logging helpers used across the
//! `blackout-core` library.

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::config::SensitiveCategory;

use lazy_static::lazy_static;
use sha2::{Digest, Sha256};

lazy_static! {
    /// A static boolean that is initialized once to determine if PII is allowed in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("BLACKOUT_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// A single pattern match found in a run of extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// The category of sensitive content that matched.
    pub category: SensitiveCategory,
    /// The matched text.
    pub text: String,
    /// Final confidence score in [0.0, 1.0], after any checksum boost.
    pub confidence: f64,
    /// Byte offset of the match start within the scanned text.
    pub start: usize,
    /// Byte offset of the match end within the scanned text.
    pub end: usize,
    /// Stable hash of the matched sample, safe to log and persist.
    #[serde(default)]
    pub sample_hash: Option<String>,
}

/// A rectangular region of a page scheduled for (or already subjected to)
/// redaction.
///
/// Coordinates are in PDF user space with the origin at the bottom-left of
/// the page; `y` is the text baseline of the matched span.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionBlock {
    /// 1-based page number the block sits on.
    pub page_number: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Why this region was redacted.
    pub category: SensitiveCategory,
    /// Confidence of the underlying detection.
    pub confidence: f64,
    /// The text that was destroyed. Never logged without the PII gate.
    pub original_text: String,
    /// Whether the destructive rewrite of this block's page succeeded.
    pub applied: bool,
}

/// Aggregate confidence statistics over a set of redaction blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStats {
    pub average: f64,
    pub minimum: f64,
    pub maximum: f64,
}

/// Summary of a full processing run, suitable for JSON serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionSummary {
    /// Total number of redaction blocks produced.
    pub total_redactions: usize,
    /// Block counts keyed by category.
    pub redactions_by_reason: HashMap<SensitiveCategory, usize>,
    /// Number of distinct pages carrying at least one block.
    pub pages_affected: usize,
    /// Confidence statistics; `None` when there were no blocks.
    pub confidence_scores: Option<ConfidenceStats>,
}

/// A page that could not be scanned and was skipped rather than failing the
/// whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedPage {
    /// 1-based page number.
    pub page_number: u32,
    /// Human-readable reason the page was skipped.
    pub reason: String,
}

/// The complete outcome of processing one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingResult {
    /// Caller-supplied identifier for the document, echoed back verbatim.
    pub document_id: String,
    /// Total number of pages in the document.
    pub total_pages: usize,
    /// Every redaction block, in page order then detection order.
    pub blocks: Vec<RedactionBlock>,
    /// Aggregate summary over `blocks`.
    pub summary: RedactionSummary,
    /// Pages that could not be scanned.
    pub skipped_pages: Vec<SkippedPage>,
    /// Wall-clock processing time in seconds.
    pub processing_time_seconds: f64,
    /// When processing finished.
    pub created_at: DateTime<Utc>,
    /// The redacted document bytes. Kept out of serialized output.
    #[serde(skip)]
    pub redacted_bytes: Vec<u8>,
}

/// Builds a `RedactionSummary` from a slice of redaction blocks.
pub fn summarize(blocks: &[RedactionBlock]) -> RedactionSummary {
    let mut redactions_by_reason: HashMap<SensitiveCategory, usize> = HashMap::new();
    let mut pages_affected: BTreeSet<u32> = BTreeSet::new();

    for block in blocks {
        *redactions_by_reason.entry(block.category).or_insert(0) += 1;
        pages_affected.insert(block.page_number);
    }

    let confidence_scores = if blocks.is_empty() {
        None
    } else {
        let scores: Vec<f64> = blocks.iter().map(|b| b.confidence).collect();
        let sum: f64 = scores.iter().sum();
        let minimum = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let maximum = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        Some(ConfidenceStats {
            average: sum / scores.len() as f64,
            minimum,
            maximum,
        })
    };

    RedactionSummary {
        total_redactions: blocks.len(),
        redactions_by_reason,
        pages_affected: pages_affected.len(),
        confidence_scores,
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(sensitive_content: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        sensitive_content.to_string()
    } else {
        redact_sensitive(sensitive_content)
    }
}

pub fn log_detection_debug(module_path: &str, rule_name: &str, sensitive_content: &str) {
    debug!(
        "{} Detection: Rule='{}', Match='{}'",
        module_path,
        rule_name,
        get_loggable_content(sensitive_content)
    );
}

pub fn canonical_sample_hash(rule_id: &str, snippet: &str) -> String {
    let normalized = snippet
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut hasher = Sha256::new();
    hasher.update(rule_id.as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(page: u32, category: SensitiveCategory, confidence: f64) -> RedactionBlock {
        RedactionBlock {
            page_number: page,
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 12.0,
            category,
            confidence,
            original_text: "x".to_string(),
            applied: true,
        }
    }

    #[test]
    fn test_redact_sensitive_short_string() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]".to_string());
    }

    #[test]
    fn test_redact_sensitive_long_string() {
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]".to_string());
    }

    #[test]
    fn test_canonical_sample_hash_consistency() {
        let h1 = canonical_sample_hash("email", "Test@Example.COM ");
        let h2 = canonical_sample_hash("email", "test@example.com");
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_summarize_empty_has_no_stats() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_redactions, 0);
        assert_eq!(summary.pages_affected, 0);
        assert!(summary.confidence_scores.is_none());
    }

    #[test]
    fn test_summarize_counts_and_pages() {
        let blocks = vec![
            block(2, SensitiveCategory::Email, 0.95),
            block(1, SensitiveCategory::Ssn, 0.90),
            block(2, SensitiveCategory::Email, 0.95),
        ];
        let summary = summarize(&blocks);
        assert_eq!(summary.total_redactions, 3);
        assert_eq!(summary.pages_affected, 2);
        assert_eq!(summary.redactions_by_reason[&SensitiveCategory::Email], 2);
        assert_eq!(summary.redactions_by_reason[&SensitiveCategory::Ssn], 1);

        let stats = summary.confidence_scores.unwrap();
        assert!((stats.minimum - 0.90).abs() < 1e-9);
        assert!((stats.maximum - 0.95).abs() < 1e-9);
        assert!((stats.average - (0.95 + 0.90 + 0.95) / 3.0).abs() < 1e-9);
    }
}
