// blackout-core/src/lib.rs
//! # Blackout Core Library
//!
//! `blackout-core` provides the fundamental, platform-independent logic for
//! detecting and destructively redacting sensitive content in PDF documents.
//! It defines the core data structures for detection rules, provides
//! mechanisms for compiling these rules, and implements a pluggable
//! `DetectionEngine` trait over which the PDF pipeline runs.
//!
//! The library is designed to be pure and stateless, focusing solely on the
//! transformation of input bytes based on defined rules, without concerns
//! for I/O or application-specific state management.
//!
//! ## Modules
//!
//! * `config`: Defines `DetectionRule`s and `DetectionConfig` for specifying sensitive patterns.
//! * `detectors`: Contains the rule compilation and caching pipeline.
//! * `validators`: Provides programmatic validation for specific data types.
//! * `report`: Defines data structures for detections, blocks, and run summaries.
//! * `engine`: Defines the `DetectionEngine` trait, enabling a modular design.
//! * `engines`: Contains concrete implementations of the `DetectionEngine` trait.
//! * `pdf`: The PDF layer: text extraction, destructive rewriting, and orchestration.
//! * `headless`: Convenience wrapper for one-shot, non-interactive use.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use blackout_core::{DetectionConfig, redact_document_bytes};
//! use anyhow::Result;
//!
//! fn main() -> Result<()> {
//!     // 1. Load the built-in detection rules.
//!     let config = DetectionConfig::load_default_rules()?;
//!
//!     // 2. Read a PDF and process it in a single, headless call.
//!     let input = std::fs::read("statement.pdf")?;
//!     let result = redact_document_bytes(config, &input, "statement.pdf")?;
//!
//!     // 3. The redacted bytes and a full report come back together.
//!     std::fs::write("statement.redacted.pdf", &result.redacted_bytes)?;
//!     println!("{} redactions applied.", result.summary.total_redactions);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations that reflect on the input document return
//! [`BlackoutError`], split into `Validation` (caller's input is at fault)
//! and `Processing` (the engine is at fault). Internal plumbing uses
//! `anyhow::Error`.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod detectors;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod pdf;
pub mod report;
pub mod validators;

/// Re-exports the public configuration types and functions for managing detection rules.
pub use config::{
    merge_rules, validate_rules, DetectionConfig, DetectionRule, SensitiveCategory,
    MAX_PATTERN_LENGTH,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::BlackoutError;

/// Re-exports types related to the core detection engine trait.
pub use engine::DetectionEngine;

/// Re-exports the concrete `RegexDetector` implementation.
pub use engines::regex_engine::{RegexDetector, LUHN_CONFIDENCE_BOOST};

/// Re-exports the reporting types produced by a processing run.
pub use report::{
    canonical_sample_hash, redact_sensitive, summarize, ConfidenceStats, Detection,
    ProcessingResult, RedactionBlock, RedactionSummary, SkippedPage,
};

/// Re-exports the document-level pipeline.
pub use pdf::DocumentRedactor;

/// Re-exports the one-shot, non-interactive entry point.
pub use headless::redact_document_bytes;

// Re-export key types from the detectors::compiler module for advanced usage.
pub use detectors::compiler::{compile_rules, CompiledRule, CompiledRules};
