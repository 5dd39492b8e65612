// blackout-core/src/engine.rs
//! Defines the core DetectionEngine trait.
//!
//! The `DetectionEngine` trait provides a pluggable interface for different
//! detection methods. This module defines the contract that all such engines
//! must adhere to, ensuring a consistent and interchangeable core API for
//! `blackout`.
//!
//! License: MIT OR APACHE 2.0

use crate::config::DetectionConfig;
use crate::detectors::compiler::CompiledRules;
use crate::report::Detection;

/// A trait that defines the core functionality of a detection engine.
///
/// This trait decouples the document-level redaction pipeline from the
/// specific implementation of a detection method, allowing for different
/// engines to be used interchangeably.
pub trait DetectionEngine: Send + Sync {
    /// Scans the provided text for sensitive content.
    ///
    /// Returns every match found, in rule order then position order, with a
    /// final confidence score attached. Detection itself is infallible: a
    /// rule that produces no matches simply contributes nothing.
    ///
    /// # Arguments
    /// * `text` - The extracted text to scan.
    fn detect(&self, text: &str) -> Vec<Detection>;

    /// Returns a reference to the `CompiledRules` used by the engine.
    ///
    /// This is used by external components, such as the statistics output,
    /// to access and display information about the rules without needing
    /// to recompile them.
    fn compiled_rules(&self) -> &CompiledRules;

    /// Returns a reference to the engine's configuration.
    fn config(&self) -> &DetectionConfig;
}
