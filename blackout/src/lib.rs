// blackout/src/lib.rs
//! # Blackout CLI Application
//!
//! This crate provides the command-line interface for the Blackout redaction
//! engine. The heavy lifting lives in `blackout-core`; this crate handles
//! argument parsing, rule-set assembly, output files, and reporting.

pub mod cli;
pub mod commands;
pub mod logger;
