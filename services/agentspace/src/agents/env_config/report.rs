//! Validation report formatting

use super::types::{FindingKind, ValidationFinding};

/// Longest value shown verbatim in a report line
const MAX_VALUE_DISPLAY: usize = 50;

/// Format findings into a grouped, human-readable report.
///
/// Returns an empty string when there is nothing to report.
pub fn format_report(findings: &[ValidationFinding]) -> String {
    if findings.is_empty() {
        return String::new();
    }

    let mut lines = vec!["Environment variable validation failed:\n".to_string()];

    let of_kind = |kind: FindingKind| {
        findings
            .iter()
            .filter(move |f| f.kind == kind)
            .collect::<Vec<_>>()
    };

    let missing = of_kind(FindingKind::Missing);
    if !missing.is_empty() {
        lines.push("Missing required variables:".to_string());
        for finding in missing {
            lines.push(format!("  - {}", finding.variable));
        }
        lines.push(String::new());
    }

    let placeholders = of_kind(FindingKind::Placeholder);
    if !placeholders.is_empty() {
        lines.push(
            "Variables contain placeholder values from .env.example (must be updated):"
                .to_string(),
        );
        for finding in placeholders {
            lines.push(format!(
                "  - {}: '{}'",
                finding.variable,
                truncate(&finding.current_value, MAX_VALUE_DISPLAY)
            ));
        }
        lines.push(String::new());
    }

    let malformed = of_kind(FindingKind::Malformed);
    if !malformed.is_empty() {
        lines.push("Variables have an invalid format:".to_string());
        for finding in malformed {
            lines.push(format!(
                "  - {}: '{}' ({})",
                finding.variable,
                truncate(&finding.current_value, MAX_VALUE_DISPLAY),
                finding.suggestion
            ));
        }
        lines.push(String::new());
    }

    lines.extend(
        [
            "Action required:",
            "1. Copy .env.example to .env (if you haven't already)",
            "2. Edit .env and replace ALL placeholder values with your actual configuration",
            "3. Refer to .env.example comments for guidance on each variable",
        ]
        .map(String::from),
    );

    lines.join("\n")
}

/// Shorten `value` to `max` characters, ending in `...` when cut
pub fn truncate(value: &str, max: usize) -> String {
    if value.chars().count() > max {
        let kept: String = value.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        assert_eq!(format_report(&[]), "");
    }

    #[test]
    fn test_groups_missing_before_placeholders() {
        let findings = vec![
            ValidationFinding::placeholder(
                "GCP_PROJECT_ID",
                "your-project-id",
                "matches known placeholder: 'your-project-id'".to_string(),
            ),
            ValidationFinding::missing("SOAR_API_KEY"),
        ];

        let report = format_report(&findings);
        let missing_at = report.find("Missing required variables:").unwrap();
        let placeholder_at = report
            .find("Variables contain placeholder values")
            .unwrap();

        assert!(missing_at < placeholder_at);
        assert!(report.contains("\n  - SOAR_API_KEY\n"));
        assert!(report.contains("\n  - GCP_PROJECT_ID: 'your-project-id'\n"));
        assert!(report.ends_with("3. Refer to .env.example comments for guidance on each variable"));
    }

    #[test]
    fn test_only_present_groups_rendered() {
        let report = format_report(&[ValidationFinding::missing("GCP_LOCATION")]);
        assert!(report.starts_with("Environment variable validation failed:\n\nMissing required variables:\n  - GCP_LOCATION\n"));
        assert!(!report.contains("Variables contain placeholder values"));
        assert!(!report.contains("invalid format"));
    }

    #[test]
    fn test_long_values_truncated() {
        let long = format!("your-{}", "x".repeat(60));
        let findings = vec![ValidationFinding::placeholder(
            "SOAR_URL",
            &long,
            "contains placeholder pattern 'your-...'".to_string(),
        )];

        let report = format_report(&findings);
        let expected = format!("  - SOAR_URL: '{}...'", &long[..47]);
        assert!(report.contains(&expected));
    }

    #[test]
    fn test_truncate_boundaries() {
        let exactly_fifty = "a".repeat(50);
        assert_eq!(truncate(&exactly_fifty, 50), exactly_fifty);
        assert_eq!(truncate(&"a".repeat(51), 50), format!("{}...", "a".repeat(47)));
        // Counts characters, not bytes
        assert_eq!(truncate(&"é".repeat(51), 50), format!("{}...", "é".repeat(47)));
    }
}
