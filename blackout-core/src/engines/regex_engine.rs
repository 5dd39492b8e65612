// blackout-core/src/engines/regex_engine.rs
//! A `DetectionEngine` implementation that uses regular expressions to
//! identify sensitive data and score each match.
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{DetectionConfig, DetectionRule, SensitiveCategory};
use crate::detectors::compiler::{get_or_compile_rules, CompiledRule, CompiledRules};
use crate::engine::DetectionEngine;
use crate::report::{canonical_sample_hash, log_detection_debug, Detection};
use crate::validators;

/// Confidence added to a card-like match whose digits pass the Luhn check.
pub const LUHN_CONFIDENCE_BOOST: f64 = 0.10;

#[derive(Debug)]
pub struct RegexDetector {
    compiled_rules: Arc<CompiledRules>,
    config: DetectionConfig,
}

impl RegexDetector {
    pub fn new(config: DetectionConfig) -> Result<Self> {
        let compiled_rules = get_or_compile_rules(&config)
            .context("Failed to compile detection rules for RegexDetector")?;

        Ok(Self { compiled_rules, config })
    }

    /// Computes the final confidence for one match of `rule`.
    ///
    /// Card-like rules flagged for programmatic validation earn a boost when
    /// the matched digits pass the Luhn checksum; a failing checksum leaves
    /// the base confidence untouched. Scores are clamped to [0.0, 1.0].
    fn score_match(&self, rule: &CompiledRule, matched_text: &str) -> f64 {
        let mut confidence = rule.base_confidence;
        if rule.programmatic_validation
            && rule.category == SensitiveCategory::CreditCard
            && validators::is_valid_card_number(matched_text)
        {
            confidence += LUHN_CONFIDENCE_BOOST;
        }
        confidence.clamp(0.0, 1.0)
    }
}

impl DetectionEngine for RegexDetector {
    fn detect(&self, text: &str) -> Vec<Detection> {
        let rules_by_name: HashMap<&str, &DetectionRule> = self
            .config
            .rules
            .iter()
            .map(|rule| (rule.name.as_str(), rule))
            .collect();

        let mut detections = Vec::new();

        for compiled_rule in &self.compiled_rules.rules {
            if let Some(rule_config) = rules_by_name.get(compiled_rule.name.as_str()) {
                if let Some(false) = rule_config.enabled {
                    continue;
                }
                for m in compiled_rule.regex.find_iter(text) {
                    let matched_text = m.as_str();
                    log_detection_debug(module_path!(), &compiled_rule.name, matched_text);

                    detections.push(Detection {
                        category: compiled_rule.category,
                        text: matched_text.to_string(),
                        confidence: self.score_match(compiled_rule, matched_text),
                        start: m.start(),
                        end: m.end(),
                        sample_hash: Some(canonical_sample_hash(&compiled_rule.name, matched_text)),
                    });
                }
            }
        }

        detections
    }

    fn compiled_rules(&self) -> &CompiledRules {
        &self.compiled_rules
    }

    fn config(&self) -> &DetectionConfig {
        &self.config
    }
}
