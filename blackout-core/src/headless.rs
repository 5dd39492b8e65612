// blackout-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for using the redaction pipeline in headless mode.
//! Provides a helper for a full, one-shot redaction of in-memory PDF bytes.

use crate::config::DetectionConfig;
use crate::engine::DetectionEngine;
use crate::engines::regex_engine::RegexDetector;
use crate::errors::BlackoutError;
use crate::pdf::DocumentRedactor;
use crate::report::ProcessingResult;

/// Fully processes a PDF document: detection, destructive redaction, and
/// reporting. This function is the primary entry point for non-interactive
/// (headless) use.
///
/// # Arguments
///
/// * `config` - The merged DetectionConfig (defaults + optional user overrides).
/// * `document_bytes` - The raw PDF bytes to process.
/// * `document_id` - A stable identifier for the input (file path or pseudo id).
pub fn redact_document_bytes(
    config: DetectionConfig,
    document_bytes: &[u8],
    document_id: &str,
) -> Result<ProcessingResult, BlackoutError> {
    let engine: Box<dyn DetectionEngine> = Box::new(
        RegexDetector::new(config)
            .map_err(|e| BlackoutError::Fatal(format!("{:#}", e)))?,
    );
    let redactor = DocumentRedactor::new(engine);
    redactor.process(document_bytes, document_id)
}
