//! Validation report accumulated while loading a file
//!
//! The checker only records messages. Nothing recorded here ever aborts a
//! load; callers inspect the report afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Severe,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("INFO"),
            Severity::Warning => f.write_str("WARNING"),
            Severity::Severe => f.write_str("SEVERE"),
        }
    }
}

/// One validation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
}

/// Ordered accumulator of validation issues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checker {
    issues: Vec<ValidationIssue>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    pub fn severe(&mut self, message: impl Into<String>) {
        self.push(Severity::Severe, message.into());
    }

    fn push(&mut self, severity: Severity, message: String) {
        debug!("{}: {}", severity, message);
        self.issues.push(ValidationIssue { severity, message });
    }

    /// All issues in the order they were recorded
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Issues at the given severity
    pub fn issues_with(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues_with(severity).count()
    }

    pub fn has_severe(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Severe)
    }

    /// Check whether any issue at or above `severity` mentions `needle`
    pub fn mentions(&self, severity: Severity, needle: &str) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity >= severity && i.message.contains(needle))
    }

    /// Append the issues of another checker (multi-file validation)
    pub fn merge(&mut self, other: Checker) {
        self.issues.extend(other.issues);
    }

    /// Plain-text report, one issue per line
    pub fn report(&self) -> String {
        let mut out = String::new();
        for issue in &self.issues {
            out.push_str(&format!("{}\t{}\n", issue.severity, issue.message));
        }
        out
    }

    /// One-line summary of the issue counts
    pub fn summary(&self) -> String {
        format!(
            "{} severe, {} warning(s), {} info",
            self.count(Severity::Severe),
            self.count(Severity::Warning),
            self.count(Severity::Info)
        )
    }
}
