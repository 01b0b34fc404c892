//! Types for environment validation
//!
//! Findings are plain data: nothing in the validator raises an error.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of configuration values passed into the validator
pub type EnvSnapshot = HashMap<String, String>;

/// Why a variable was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingKind {
    Missing,
    Placeholder,
    /// Set, but not in the expected resource-name shape
    Malformed,
}

/// Result of checking a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Valid,
    Missing,
    Placeholder { reason: String },
}

impl Classification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Classification::Valid)
    }
}

/// A configuration problem with remediation text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Name of the configuration key
    pub variable: String,
    /// Raw value observed (empty when absent)
    pub current_value: String,
    pub kind: FindingKind,
    /// What the user should do about it
    pub suggestion: String,
    /// Which rule flagged a placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationFinding {
    pub fn missing(variable: &str) -> Self {
        Self {
            variable: variable.to_string(),
            current_value: String::new(),
            kind: FindingKind::Missing,
            suggestion: format!("Set {} in your .env file", variable),
            reason: None,
        }
    }

    pub fn placeholder(variable: &str, value: &str, reason: String) -> Self {
        Self {
            variable: variable.to_string(),
            current_value: value.to_string(),
            kind: FindingKind::Placeholder,
            suggestion: format!("Replace placeholder value with actual {}", variable),
            reason: Some(reason),
        }
    }

    pub fn malformed(variable: &str, value: &str, suggestion: &str) -> Self {
        Self {
            variable: variable.to_string(),
            current_value: value.to_string(),
            kind: FindingKind::Malformed,
            suggestion: suggestion.to_string(),
            reason: None,
        }
    }

    /// Record the offending value
    pub fn with_value(mut self, value: &str) -> Self {
        self.current_value = value.to_string();
        self
    }

    /// Override the remediation text
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

/// Outcome of validating a list of required variables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub all_valid: bool,
    pub findings: Vec<ValidationFinding>,
}

impl ValidationOutcome {
    pub fn from_findings(findings: Vec<ValidationFinding>) -> Self {
        Self {
            all_valid: findings.is_empty(),
            findings,
        }
    }

    /// Merge in findings from an additional check (e.g. a path check)
    pub fn push(&mut self, finding: ValidationFinding) {
        self.findings.push(finding);
        self.all_valid = false;
    }
}
