//! compiler.rs - Manages the compilation and caching of detection rules.
//!
//! This module provides a thread-safe, cached mechanism to convert a
//! `DetectionConfig` into `CompiledRules`, which are optimized for
//! efficient scanning. It uses a global, shared cache to avoid
//! redundant compilation.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

use crate::config::{DetectionConfig, DetectionRule, SensitiveCategory, MAX_PATTERN_LENGTH};
use crate::errors::BlackoutError;

/// Represents a single compiled detection rule.
///
/// This struct holds a compiled regular expression along with the scoring
/// metadata needed to turn its matches into detections.
#[derive(Debug)]
pub struct CompiledRule {
    /// The compiled regular expression used for matching.
    pub regex: Regex,
    /// The unique name of the detection rule.
    pub name: String,
    /// The category matches of this rule are reported under.
    pub category: SensitiveCategory,
    /// Confidence assigned to a bare match of this rule's pattern.
    pub base_confidence: f64,
    /// A flag indicating if this rule's matches are eligible for a
    /// checksum-based confidence boost.
    pub programmatic_validation: bool,
}

/// Represents a collection of all compiled rules for efficient scanning.
///
/// This struct acts as the primary container for the set of rules that will
/// be applied during a detection pass.
#[derive(Debug)]
pub struct CompiledRules {
    /// A vector of `CompiledRule` instances ready for application, kept in
    /// the order the source configuration listed them.
    pub rules: Vec<CompiledRule>,
}

lazy_static! {
    /// A thread-safe, global cache for compiled rules.
    /// The key is a hash of the serialized `DetectionConfig`.
    static ref COMPILED_RULES_CACHE: RwLock<HashMap<u64, Arc<CompiledRules>>> = RwLock::new(HashMap::new());
}

/// Hashes the `DetectionConfig` to create a stable, unique key for the cache.
///
/// To ensure determinism, the rules are sorted by name before hashing.
fn hash_config(config: &DetectionConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    let mut rules_to_hash = config.rules.clone();

    // Sort rules to ensure a deterministic hash key.
    rules_to_hash.sort_by(|a, b| a.name.cmp(&b.name));

    rules_to_hash.hash(&mut hasher);
    hasher.finish()
}

/// Compiles a list of `DetectionRule`s into `CompiledRules` for efficient matching.
/// This is the low-level function that performs the actual regex compilation.
pub fn compile_rules(rules_to_compile: Vec<DetectionRule>) -> Result<CompiledRules, BlackoutError> {
    debug!("Starting compilation of {} rules.", rules_to_compile.len());

    let mut compiled_rules = Vec::new();
    let mut compilation_errors = Vec::new();

    for rule in rules_to_compile {
        match rule.pattern.as_ref() {
            Some(pattern) => {
                debug!(
                    "Attempting to compile rule: '{}' with pattern '{:?}'",
                    &rule.name, pattern
                );

                if pattern.len() > MAX_PATTERN_LENGTH {
                    compilation_errors.push(BlackoutError::PatternLengthExceeded(
                        rule.name,
                        pattern.len(),
                        MAX_PATTERN_LENGTH,
                    ));
                    continue;
                }

                let regex_result = RegexBuilder::new(pattern)
                    .size_limit(10 * (1 << 20)) // 10 MB limit for compiled regex
                    .build();

                match regex_result {
                    Ok(regex) => {
                        debug!("Rule '{}' compiled successfully.", &rule.name);
                        compiled_rules.push(CompiledRule {
                            regex,
                            name: rule.name,
                            category: rule.category,
                            base_confidence: rule.base_confidence,
                            programmatic_validation: rule.programmatic_validation,
                        });
                    }
                    Err(e) => {
                        compilation_errors.push(BlackoutError::RuleCompilation(rule.name, e));
                    }
                }
            }
            None => {
                warn!("Skipping rule '{}' because its pattern is missing.", &rule.name);
                continue;
            }
        }
    }

    if !compilation_errors.is_empty() {
        let error_message = compilation_errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<String>>()
            .join("\n");
        Err(BlackoutError::Fatal(format!(
            "Failed to compile {} rule(s):\n{}",
            compilation_errors.len(),
            error_message
        )))
    } else {
        debug!(
            "Finished compiling rules. Total compiled: {}.",
            compiled_rules.len()
        );
        Ok(CompiledRules { rules: compiled_rules })
    }
}

/// Gets a `CompiledRules` instance from the cache or compiles them if not found.
///
/// This is the public entry point for retrieving compiled rules. It returns an `Arc`
/// to a `CompiledRules` instance, allowing for cheap sharing.
pub fn get_or_compile_rules(config: &DetectionConfig) -> Result<Arc<CompiledRules>> {
    let cache_key = hash_config(config);

    // Attempt to acquire a read lock first.
    {
        let cache = COMPILED_RULES_CACHE.read().unwrap();
        if let Some(rules) = cache.get(&cache_key) {
            debug!("Serving compiled rules from cache for key: {}", &cache_key);
            return Ok(Arc::clone(rules));
        }
    } // Read lock is released here.

    // Not in cache, so we compile.
    debug!("Compiled rules not found in cache. Compiling now.");
    let compiled = compile_rules(config.rules.clone())?;
    let compiled_arc = Arc::new(compiled);

    // Acquire a write lock to insert the new rules.
    COMPILED_RULES_CACHE
        .write()
        .unwrap()
        .insert(cache_key, Arc::clone(&compiled_arc));

    debug!("Successfully compiled and cached rules for key: {}", &cache_key);
    Ok(compiled_arc)
}
