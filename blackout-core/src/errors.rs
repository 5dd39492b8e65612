//! errors.rs - Custom error types for the blackout-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! The two variants callers care most about are `Validation` (the input
//! document is at fault and the failure maps to a client-facing "bad
//! request") and `Processing` (the engine is at fault and the failure maps
//! to a server-side error).
//!
//! License: MIT OR APACHE 2.0

use log::error;
use thiserror::Error;

/// This enum represents all possible error types in the `blackout-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BlackoutError {
    /// The input document is invalid: unsupported format, corrupted
    /// structure, password protection, or zero pages. User actionable.
    #[error("{0}")]
    Validation(String),

    /// An unexpected engine fault during scan, apply, or serialization.
    /// The message is user-friendly; the raw diagnostic goes to the log.
    #[error("{0}")]
    Processing(String),

    #[error("Failed to compile detection rule '{0}': {1}")]
    RuleCompilation(String, regex::Error),

    #[error("Rule '{0}': pattern length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A fatal error occurred: {0}")]
    Fatal(String),
}

impl BlackoutError {
    /// Builds a `Validation` error from any displayable message.
    pub fn validation(message: impl Into<String>) -> Self {
        BlackoutError::Validation(message.into())
    }

    /// Builds a `Processing` error from a raw diagnostic.
    ///
    /// The raw diagnostic is logged at error level and then rewritten into a
    /// user-friendly message: diagnostics mentioning memory become "too
    /// large or complex", diagnostics mentioning a timeout become
    /// "processing timed out". Everything else keeps the diagnostic text.
    pub fn processing(diagnostic: impl AsRef<str>) -> Self {
        let diagnostic = diagnostic.as_ref();
        error!("Document processing failed: {}", diagnostic);

        let lowered = diagnostic.to_lowercase();
        let message = if lowered.contains("memory") {
            "PDF file is too large or complex to process".to_string()
        } else if lowered.contains("timeout") {
            "PDF processing timed out - file may be too complex".to_string()
        } else {
            format!("Unable to process PDF file: {}", diagnostic)
        };
        BlackoutError::Processing(message)
    }

    /// Returns true when the error is attributable to the caller's input
    /// rather than the engine. Upstream layers use this for the 4xx/5xx
    /// split.
    pub fn is_validation(&self) -> bool {
        matches!(self, BlackoutError::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_rewrites_memory_diagnostic() {
        let err = BlackoutError::processing("mupdf: out of memory in page 4");
        assert_eq!(
            err.to_string(),
            "PDF file is too large or complex to process"
        );
        assert!(!err.is_validation());
    }

    #[test]
    fn test_processing_rewrites_timeout_diagnostic() {
        let err = BlackoutError::processing("worker Timeout after 30s");
        assert_eq!(
            err.to_string(),
            "PDF processing timed out - file may be too complex"
        );
    }

    #[test]
    fn test_processing_preserves_other_diagnostics() {
        let err = BlackoutError::processing("broken xref");
        assert_eq!(err.to_string(), "Unable to process PDF file: broken xref");
    }

    #[test]
    fn test_validation_is_validation() {
        assert!(BlackoutError::validation("no pages").is_validation());
    }
}
