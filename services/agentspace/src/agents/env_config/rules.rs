//! Placeholder Rules
//!
//! Known example values shipped in `.env.example`. A variable still holding
//! one of these means the template was copied without being filled in.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Exact placeholder values, keyed by variable name
const EXACT_PLACEHOLDERS: &[(&str, &[&str])] = &[
    ("GCP_PROJECT_ID", &["your-project-id"]),
    ("GCP_PROJECT_NUMBER", &["123456789012"]),
    ("GCP_STAGING_BUCKET", &["gs://your-staging-bucket"]),
    (
        "CHRONICLE_PROJECT_ID",
        &["your-gcp-project-id", "your-project-id"],
    ),
    ("CHRONICLE_CUSTOMER_ID", &["your-customer-uuid"]),
    (
        "CHRONICLE_SERVICE_ACCOUNT_PATH",
        &["/path/to/service-account.json"],
    ),
    (
        "SOAR_URL",
        &["https://your-instance.siemplify-soar.com:443"],
    ),
    ("SOAR_API_KEY", &["your-soar-api-key"]),
    ("GTI_API_KEY", &["your-virustotal-api-key"]),
    (
        "RAG_CORPUS_ID",
        &["projects/your-project-id/locations/us-central1/ragCorpora/1234567890"],
    ),
    ("AGENTSPACE_APP_ID", &["your-app-id"]),
    ("AGENTSPACE_AGENT_ID", &["your-agent-id"]),
];

/// Patterns applied to every value regardless of variable name
const PATTERN_PLACEHOLDERS: &[(&str, &str)] = &[
    (r"your-[a-z-]+", "placeholder pattern 'your-...'"),
    (r"/path/to/", "placeholder path '/path/to/...'"),
    (r"123456789012", "example project number"),
];

static STANDARD_RULES: Lazy<PlaceholderRules> = Lazy::new(|| {
    let mut rules = PlaceholderRules::empty();
    for (variable, values) in EXACT_PLACEHOLDERS {
        for value in values.iter() {
            rules = rules.exact(variable, value);
        }
    }
    for (pattern, description) in PATTERN_PLACEHOLDERS {
        // Literal table above; a failure here is a programming error
        rules = rules
            .pattern(pattern, description)
            .expect("built-in placeholder pattern must compile");
    }
    rules
});

/// A regex rule matched anywhere inside a value
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub regex: Regex,
    pub description: String,
}

/// What a rule set found in a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceholderMatch {
    /// Value equals a known placeholder for that variable
    Exact(String),
    /// Value matched a pattern rule; carries the rule description
    Pattern(String),
}

impl PlaceholderMatch {
    /// Human-readable reason used in findings
    pub fn reason(&self) -> String {
        match self {
            PlaceholderMatch::Exact(placeholder) => {
                format!("matches known placeholder: '{}'", placeholder)
            }
            PlaceholderMatch::Pattern(description) => format!("contains {}", description),
        }
    }
}

/// Exact-match table plus ordered pattern rules.
///
/// Exact matches are checked first, then patterns in declaration order.
/// The first hit wins.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderRules {
    exact: HashMap<String, Vec<String>>,
    patterns: Vec<PatternRule>,
}

impl PlaceholderRules {
    /// A rule set that never matches
    pub fn empty() -> Self {
        Self::default()
    }

    /// The process-wide rule table built from `.env.example`
    pub fn standard() -> &'static PlaceholderRules {
        &STANDARD_RULES
    }

    /// Register a literal placeholder for one variable
    pub fn exact(mut self, variable: &str, placeholder: &str) -> Self {
        self.exact
            .entry(variable.to_string())
            .or_default()
            .push(placeholder.to_string());
        self
    }

    /// Append a pattern rule
    pub fn pattern(mut self, pattern: &str, description: &str) -> Result<Self, regex::Error> {
        self.patterns.push(PatternRule {
            regex: Regex::new(pattern)?,
            description: description.to_string(),
        });
        Ok(self)
    }

    /// Find the first rule that flags `value` for `variable`
    pub fn find_match(&self, variable: &str, value: &str) -> Option<PlaceholderMatch> {
        if let Some(placeholder) = self
            .exact
            .get(variable)
            .and_then(|known| known.iter().find(|p| p.as_str() == value))
        {
            return Some(PlaceholderMatch::Exact(placeholder.clone()));
        }

        self.patterns
            .iter()
            .find(|rule| rule.regex.is_match(value))
            .map(|rule| PlaceholderMatch::Pattern(rule.description.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rules_loaded() {
        let rules = PlaceholderRules::standard();
        assert_eq!(rules.patterns.len(), 3);
        assert_eq!(
            rules.find_match("AGENTSPACE_APP_ID", "your-app-id"),
            Some(PlaceholderMatch::Exact("your-app-id".to_string()))
        );
    }

    #[test]
    fn test_exact_match_beats_pattern() {
        // Also matches the 123456789012 pattern
        let rules = PlaceholderRules::standard();
        let hit = rules.find_match("GCP_PROJECT_NUMBER", "123456789012").unwrap();
        assert_eq!(
            hit.reason(),
            "matches known placeholder: '123456789012'"
        );
    }

    #[test]
    fn test_patterns_apply_in_declaration_order() {
        let rules = PlaceholderRules::empty()
            .pattern("abc", "first")
            .unwrap()
            .pattern("a", "second")
            .unwrap();

        assert_eq!(
            rules.find_match("ANY", "xxabcxx"),
            Some(PlaceholderMatch::Pattern("first".to_string()))
        );
        assert_eq!(
            rules.find_match("ANY", "a"),
            Some(PlaceholderMatch::Pattern("second".to_string()))
        );
        assert_eq!(rules.find_match("ANY", "zzz"), None);
    }

    #[test]
    fn test_exact_rule_scoped_to_variable() {
        let rules = PlaceholderRules::empty().exact("SOAR_URL", "https://example");
        assert!(rules.find_match("SOAR_URL", "https://example").is_some());
        assert!(rules.find_match("OTHER", "https://example").is_none());
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(PlaceholderRules::empty().pattern("(unclosed", "bad").is_err());
    }
}
