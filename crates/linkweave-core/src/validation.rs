//! Rule validation.
//!
//! Checks what the file format cannot express on its own: non-empty names,
//! targets, pattern lists and values, plus regexes that will not compile.
//! The engine never re-validates; it just skips what it cannot use.

use crate::models::{LinkRule, PatternKind};
use serde::{Deserialize, Serialize};

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message (not a problem)
    Info,
    /// Warning (the rule loads, but part of it will be ignored)
    Warning,
    /// Error (the rule set is rejected)
    Error,
}

impl Severity {
    /// Check if this severity is considered a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Error)
    }
}

/// A validation issue found in a rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Name of the offending rule (`unnamed` when empty)
    pub rule: String,
    pub message: String,
    /// Index of the offending pattern within its rule
    pub pattern: Option<usize>,
}

impl ValidationIssue {
    pub fn new(severity: Severity, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            rule: rule.into(),
            message: message.into(),
            pattern: None,
        }
    }

    pub fn with_pattern(mut self, index: usize) -> Self {
        self.pattern = Some(index);
        self
    }
}

/// Result of validating a rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed (no errors)
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
    pub summary: ValidationSummary,
}

/// Summary of validation results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub info_count: usize,
    pub warning_count: usize,
    pub error_count: usize,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            passed: true,
            issues: Vec::new(),
            summary: ValidationSummary::default(),
        }
    }

    /// Add an issue to the report
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        match issue.severity {
            Severity::Info => self.summary.info_count += 1,
            Severity::Warning => self.summary.warning_count += 1,
            Severity::Error => {
                self.summary.error_count += 1;
                self.passed = false;
            }
        }
        self.issues.push(issue);
    }

    /// Get issues by severity
    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == severity)
            .collect()
    }

    /// Check if there are any failures
    pub fn has_failures(&self) -> bool {
        !self.passed
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for loaded rule sets
pub struct RuleValidator;

impl RuleValidator {
    pub fn validate(rules: &[LinkRule]) -> ValidationReport {
        let mut report = ValidationReport::new();
        for rule in rules {
            Self::validate_rule(rule, &mut report);
        }
        report
    }

    fn validate_rule(rule: &LinkRule, report: &mut ValidationReport) {
        let name = if rule.name.trim().is_empty() {
            "unnamed"
        } else {
            rule.name.as_str()
        };

        if rule.name.trim().is_empty() || rule.target_template.trim().is_empty() {
            report.add_issue(ValidationIssue::new(
                Severity::Error,
                name,
                format!(
                    "Invalid link configuration: missing required fields in \"{}\"",
                    name
                ),
            ));
        }

        if rule.patterns.is_empty() {
            report.add_issue(ValidationIssue::new(
                Severity::Error,
                name,
                format!("No patterns defined for link \"{}\"", name),
            ));
        }

        for (index, pattern) in rule.patterns.iter().enumerate() {
            if pattern.value.is_empty() {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Error,
                        name,
                        format!("Invalid pattern in link \"{}\": empty value", name),
                    )
                    .with_pattern(index),
                );
                continue;
            }

            match pattern.kind {
                PatternKind::Regex => {
                    if let Err(e) = regex::Regex::new(&pattern.value) {
                        report.add_issue(
                            ValidationIssue::new(
                                Severity::Warning,
                                name,
                                format!("Invalid regex pattern {:?}: {}", pattern.value, e),
                            )
                            .with_pattern(index),
                        );
                    }
                }
                PatternKind::Text | PatternKind::Line => {
                    if pattern.highlight_group.is_some() {
                        report.add_issue(
                            ValidationIssue::new(
                                Severity::Info,
                                name,
                                "highlightGroup only applies to regex patterns",
                            )
                            .with_pattern(index),
                        );
                    }
                }
            }

            if pattern.kind == PatternKind::Line && pattern.case_sensitive == Some(false) {
                report.add_issue(
                    ValidationIssue::new(
                        Severity::Info,
                        name,
                        "line patterns always match case-sensitively",
                    )
                    .with_pattern(index),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LinkKind, Pattern};

    #[test]
    fn test_valid_rule_passes() {
        let rules = vec![
            LinkRule::new("Docs", LinkKind::Url, "https://docs").with_pattern(Pattern::text("docs")),
        ];
        let report = RuleValidator::validate(&rules);
        assert!(report.passed);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_fields_fail() {
        let rules = vec![LinkRule::new("", LinkKind::Url, "").with_pattern(Pattern::text("x"))];
        let report = RuleValidator::validate(&rules);
        assert!(report.has_failures());
        assert_eq!(report.issues[0].rule, "unnamed");
    }

    #[test]
    fn test_empty_value_fails() {
        let rules = vec![LinkRule::new("A", LinkKind::File, "a.txt").with_pattern(Pattern::text(""))];
        let report = RuleValidator::validate(&rules);
        assert_eq!(report.summary.error_count, 1);
        assert_eq!(report.issues[0].pattern, Some(0));
    }

    #[test]
    fn test_bad_regex_is_only_a_warning() {
        let rules = vec![
            LinkRule::new("A", LinkKind::Url, "https://a")
                .with_pattern(Pattern::regex("(unclosed"))
                .with_pattern(Pattern::text("a").with_highlight_group(1)),
        ];
        let report = RuleValidator::validate(&rules);
        assert!(report.passed);
        assert_eq!(report.issues_by_severity(Severity::Warning).len(), 1);
        assert_eq!(report.issues_by_severity(Severity::Info).len(), 1);
    }
}
