//! Configuration management for `blackout-core`.
//!
//! This module defines the core data structures for detection rules and the
//! closed set of sensitive-content categories. It handles
//! serialization/deserialization of YAML rule sets and provides utilities
//! for loading, merging, filtering, and validating them.
//!
//! License: MIT OR Apache-2.0

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

/// The closed set of sensitive-content categories a rule can report.
///
/// Only `email`, `ssn`, `credit_card`, `phone_number`, `date_of_birth`, and
/// `account_number` carry default patterns; `address`, `name`, and `custom`
/// exist for manually authored rules and are never produced by the built-in
/// rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitiveCategory {
    Email,
    Ssn,
    CreditCard,
    PhoneNumber,
    DateOfBirth,
    Address,
    Name,
    AccountNumber,
    Custom,
}

impl SensitiveCategory {
    /// Stable string form used in summaries and analytics rows.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensitiveCategory::Email => "email",
            SensitiveCategory::Ssn => "ssn",
            SensitiveCategory::CreditCard => "credit_card",
            SensitiveCategory::PhoneNumber => "phone_number",
            SensitiveCategory::DateOfBirth => "date_of_birth",
            SensitiveCategory::Address => "address",
            SensitiveCategory::Name => "name",
            SensitiveCategory::AccountNumber => "account_number",
            SensitiveCategory::Custom => "custom",
        }
    }
}

impl Default for SensitiveCategory {
    fn default() -> Self {
        SensitiveCategory::Custom
    }
}

impl fmt::Display for SensitiveCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a single detection rule used by the regex engine.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DetectionRule {
    /// Unique identifier for the rule (e.g., "credit_card").
    pub name: String,
    /// Human-readable description of what the rule targets.
    pub description: Option<String>,
    /// The category this rule reports its matches under.
    pub category: SensitiveCategory,
    /// The regex pattern string.
    pub pattern: Option<String>,
    /// Confidence assigned to a bare match of this pattern, in [0.0, 1.0].
    pub base_confidence: f64,
    /// If true, a checksum validator may adjust the confidence of matches
    /// (currently the Luhn check for card-like numbers).
    pub programmatic_validation: bool,
    /// If true, the rule is disabled unless explicitly enabled.
    pub opt_in: bool,
    /// Explicit override for enabling/disabling the rule.
    pub enabled: Option<bool>,
    /// Security severity level (e.g., "high", "medium").
    pub severity: Option<String>,
    /// Metadata tags for categorization.
    pub tags: Option<Vec<String>>,
}

impl Hash for DetectionRule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.description.hash(state);
        self.category.hash(state);
        self.pattern.hash(state);
        self.base_confidence.to_bits().hash(state);
        self.programmatic_validation.hash(state);
        self.opt_in.hash(state);
        self.enabled.hash(state);
        self.severity.hash(state);
    }
}

impl Default for DetectionRule {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            category: SensitiveCategory::Custom,
            pattern: None,
            base_confidence: 0.50,
            programmatic_validation: false,
            opt_in: false,
            enabled: None,
            severity: None,
            tags: None,
        }
    }
}

/// Represents the top-level rule-set configuration for Blackout.
#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct DetectionConfig {
    /// A list of regex-based detection rules, in match-priority order.
    pub rules: Vec<DetectionRule>,
}

impl DetectionConfig {
    /// Loads detection rules from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading custom rules from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: DetectionConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        validate_rules(&config.rules)?;
        info!("Loaded {} rules from file {}.", config.rules.len(), path.display());

        Ok(config)
    }

    /// Loads the built-in detection rules from the embedded configuration.
    pub fn load_default_rules() -> Result<Self> {
        debug!("Loading default rules from embedded string...");
        let default_yaml = include_str!("../config/default_rules.yaml");
        let config: DetectionConfig =
            serde_yml::from_str(default_yaml).context("Failed to parse default rules")?;

        debug!("Loaded {} default rules.", config.rules.len());
        Ok(config)
    }

    /// Filters active rules based on enable/disable lists provided via CLI.
    pub fn set_active_rules(&mut self, enable_rules: &[String], disable_rules: &[String]) {
        let enable_set: HashSet<&str> = enable_rules.iter().map(String::as_str).collect();
        let disable_set: HashSet<&str> = disable_rules.iter().map(String::as_str).collect();

        debug!("Initial rules count before filtering: {}", self.rules.len());

        let all_rule_names: HashSet<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();

        for rule_name in enable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `enable_rules` list does not exist.", rule_name);
        }

        for rule_name in disable_set.difference(&all_rule_names) {
            warn!("Rule '{}' in `disable_rules` list does not exist.", rule_name);
        }

        self.rules.retain(|rule| {
            let rule_name_str = rule.name.as_str();
            !disable_set.contains(rule_name_str)
                && (!rule.opt_in || enable_set.contains(rule_name_str))
        });

        debug!("Final active rules count after filtering: {}", self.rules.len());
    }
}

/// Merges user-defined rules with defaults. User rules win on name collision.
///
/// The merged rule list is sorted by name so the resulting table (and the
/// order blocks are reported in) is deterministic regardless of map
/// iteration order.
pub fn merge_rules(
    default_config: DetectionConfig,
    user_config: Option<DetectionConfig>,
) -> DetectionConfig {
    debug!(
        "merge_rules called. Initial default rules count: {}",
        default_config.rules.len()
    );

    let mut final_rules_map: HashMap<String, DetectionRule> = default_config
        .rules
        .into_iter()
        .map(|rule| (rule.name.clone(), rule))
        .collect();

    if let Some(user_cfg) = user_config {
        debug!("User config provided. Merging {} user rules.", user_cfg.rules.len());
        for user_rule in user_cfg.rules {
            final_rules_map.insert(user_rule.name.clone(), user_rule);
        }
    }

    let mut final_rules: Vec<DetectionRule> = final_rules_map.into_values().collect();
    final_rules.sort_by(|a, b| a.name.cmp(&b.name));
    debug!("Final total rules after merge: {}", final_rules.len());

    DetectionConfig { rules: final_rules }
}

/// Validates rule integrity (names, regex compilation, confidence range).
pub fn validate_rules(rules: &[DetectionRule]) -> Result<()> {
    let mut rule_names = HashSet::new();
    let mut errors = Vec::new();

    for rule in rules {
        if rule.name.is_empty() {
            errors.push("A rule has an empty `name` field.".to_string());
        } else if !rule_names.insert(rule.name.clone()) {
            errors.push(format!("Duplicate rule name found: '{}'.", rule.name));
        }

        if !(0.0..=1.0).contains(&rule.base_confidence) {
            errors.push(format!(
                "Rule '{}' has a `base_confidence` of {} outside [0.0, 1.0].",
                rule.name, rule.base_confidence
            ));
        }

        let pattern = match &rule.pattern {
            Some(p) => p,
            None => {
                errors.push(format!("Rule '{}' is missing the `pattern` field.", rule.name));
                continue;
            }
        };

        if pattern.is_empty() {
            errors.push(format!("Rule '{}' has an empty `pattern` field.", rule.name));
        }

        if let Err(e) = Regex::new(pattern) {
            errors.push(format!("Rule '{}' has an invalid regex pattern: {}", rule.name, e));
        }
    }

    if !errors.is_empty() {
        let full_error_message = format!("Rule validation failed:\n{}", errors.join("\n"));
        Err(anyhow!(full_error_message))
    } else {
        Ok(())
    }
}
