//! Concrete `DetectionEngine` implementations.

pub mod regex_engine;
