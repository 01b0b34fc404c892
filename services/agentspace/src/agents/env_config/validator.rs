//! Environment Validator
//!
//! Classifies configuration values as valid, missing, or left-over
//! placeholders from `.env.example`.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::debug;

use super::rules::PlaceholderRules;
use super::types::{Classification, EnvSnapshot, ValidationFinding, ValidationOutcome};

/// Variables needed to deploy the agent engine
pub const DEPLOY_REQUIRED_VARS: &[&str] = &[
    "GCP_PROJECT_ID",
    "GCP_LOCATION",
    "GCP_STAGING_BUCKET",
    "CHRONICLE_PROJECT_ID",
    "CHRONICLE_CUSTOMER_ID",
    "CHRONICLE_SERVICE_ACCOUNT_PATH",
    "SOAR_URL",
    "SOAR_API_KEY",
    "GTI_API_KEY",
    "RAG_CORPUS_ID",
];

/// Variables needed to register the agent with AgentSpace
pub const AGENTSPACE_REQUIRED_VARS: &[&str] = &[
    "GCP_PROJECT_ID",
    "GCP_PROJECT_NUMBER",
    "AGENTSPACE_APP_ID",
    "AGENT_ENGINE_RESOURCE_NAME",
    "GCP_LOCATION",
];

/// Variables needed for IAM setup and verification
pub const IAM_REQUIRED_VARS: &[&str] = &["GCP_PROJECT_ID", "GCP_PROJECT_NUMBER"];

static RAG_CORPUS_ID_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^projects/[^/]+/locations/[^/]+/ragCorpora/[a-zA-Z0-9_-]+$")
        .expect("RAG corpus pattern must compile")
});

/// Classify a value against the standard placeholder table
pub fn classify(variable: &str, value: &str) -> Classification {
    classify_with(PlaceholderRules::standard(), variable, value)
}

/// Classify a value against an explicit rule set
pub fn classify_with(rules: &PlaceholderRules, variable: &str, value: &str) -> Classification {
    if value.is_empty() {
        return Classification::Missing;
    }

    match rules.find_match(variable, value) {
        Some(hit) => Classification::Placeholder {
            reason: hit.reason(),
        },
        None => Classification::Valid,
    }
}

/// Validate required variables in input order
pub fn validate(required: &[&str], env: &EnvSnapshot) -> ValidationOutcome {
    validate_with(PlaceholderRules::standard(), required, env)
}

pub fn validate_with(
    rules: &PlaceholderRules,
    required: &[&str],
    env: &EnvSnapshot,
) -> ValidationOutcome {
    let findings = required
        .iter()
        .filter_map(|variable| {
            let value = env.get(*variable).map(String::as_str).unwrap_or("");
            finding_for(rules, variable, value)
        })
        .collect::<Vec<_>>();

    debug!(
        required = required.len(),
        findings = findings.len(),
        "Environment validation complete"
    );

    ValidationOutcome::from_findings(findings)
}

fn finding_for(rules: &PlaceholderRules, variable: &str, value: &str) -> Option<ValidationFinding> {
    match classify_with(rules, variable, value) {
        Classification::Valid => None,
        Classification::Missing => Some(ValidationFinding::missing(variable)),
        Classification::Placeholder { reason } => {
            Some(ValidationFinding::placeholder(variable, value, reason))
        }
    }
}

/// Validate a variable that names a file.
///
/// A placeholder path is reported as a placeholder, never as a missing file.
pub fn validate_path(variable: &str, path: &str) -> Option<ValidationFinding> {
    match classify(variable, path) {
        Classification::Placeholder { reason } => {
            let what = variable.to_lowercase().replace('_', " ");
            Some(
                ValidationFinding::placeholder(variable, path, reason)
                    .with_suggestion(format!("Replace with actual path to your {}", what)),
            )
        }
        Classification::Missing => Some(ValidationFinding::missing(variable)),
        Classification::Valid if !Path::new(path).exists() => Some(
            ValidationFinding::missing(variable)
                .with_value(path)
                .with_suggestion(format!("File does not exist: {}", path)),
        ),
        Classification::Valid => None,
    }
}

/// Check the shape of a RAG corpus resource name
pub fn validate_rag_corpus_id(value: &str) -> Option<ValidationFinding> {
    if RAG_CORPUS_ID_FORMAT.is_match(value) {
        return None;
    }

    Some(ValidationFinding::malformed(
        "RAG_CORPUS_ID",
        value,
        "Expected format: projects/PROJECT_ID/locations/LOCATION/ragCorpora/CORPUS_ID",
    ))
}

/// Required-variable validation plus the RAG corpus format check and
/// file-path checks.
///
/// A variable already reported by an earlier check is not checked again.
pub fn check(required: &[&str], path_vars: &[&str], env: &EnvSnapshot) -> ValidationOutcome {
    let mut outcome = validate(required, env);
    let flagged = |outcome: &ValidationOutcome, var: &str| {
        outcome.findings.iter().any(|f| f.variable == var)
    };

    if required.contains(&"RAG_CORPUS_ID") && !flagged(&outcome, "RAG_CORPUS_ID") {
        if let Some(finding) = env
            .get("RAG_CORPUS_ID")
            .and_then(|value| validate_rag_corpus_id(value))
        {
            outcome.push(finding);
        }
    }

    for var in path_vars {
        if flagged(&outcome, var) {
            continue;
        }
        let value = env.get(*var).map(String::as_str).unwrap_or("");
        if let Some(finding) = validate_path(var, value) {
            outcome.push(finding);
        }
    }

    outcome
}
