//! Validation results, detailed reports and batch summaries.

use super::rule::FieldErrorKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The outcome of validating one form submission.
///
/// Holds at most one message per field. `fault` is only set when an engine
/// fault was surfaced under [`FaultPolicy::FailClosed`](super::FaultPolicy).
///
/// # Examples
///
/// ```rust
/// use form_guard::core::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// result.add_error("email", "Email is required");
/// result.add_error("email", "Email must be a valid email address");
///
/// assert!(!result.valid);
/// assert_eq!(result.error("email"), Some("Email is required"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True when no field failed and no fault was surfaced
    pub valid: bool,
    /// Field name to its single error message
    pub errors: BTreeMap<String, String>,
    /// Engine fault message, present only under the fail-closed policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationResult {
    /// Creates a passing result with no errors.
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: BTreeMap::new(),
            fault: None,
        }
    }

    /// Creates the fail-open result returned when the engine itself faults.
    pub fn fail_open() -> Self {
        Self::new()
    }

    /// Creates the fail-closed result for an engine fault.
    pub fn faulted(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: BTreeMap::new(),
            fault: Some(message.into()),
        }
    }

    /// Records an error for a field. The first error recorded for a field wins.
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_insert_with(|| message.into());
        self.valid = false;
    }

    /// Returns the error for a field, if any.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }

    /// Returns true if the result carries an engine fault.
    pub fn is_fault(&self) -> bool {
        self.fault.is_some()
    }

    /// Returns the number of failing fields.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

/// One field failure with the rule and error kind that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Name of the failing field
    pub field: String,
    /// Rule type that failed, as written in the template (`required` for the required check)
    pub rule: String,
    /// Error category
    pub kind: FieldErrorKind,
    /// Message reported for the field
    pub message: String,
}

/// Counters collected while validating one submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationMetrics {
    /// Fields declared in the template
    pub total_fields: usize,
    /// Fields evaluated in the current scope
    pub evaluated_fields: usize,
    /// Fields skipped because they do not apply to the scope
    pub not_applicable_fields: usize,
    /// Evaluated fields that passed
    pub passed_fields: usize,
    /// Evaluated fields that failed
    pub failed_fields: usize,
    /// Rules that ran
    pub rules_evaluated: usize,
    /// Rules that had nothing to check, were inactive, unknown or unresolved
    pub rules_skipped: usize,
    /// Rules that faulted and were skipped
    pub rule_faults: usize,
    /// Wall-clock duration of the call in milliseconds
    pub execution_time_ms: u64,
}

impl ValidationMetrics {
    /// Fraction of evaluated fields that passed, as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.evaluated_fields == 0 {
            100.0
        } else {
            (self.passed_fields as f64 / self.evaluated_fields as f64) * 100.0
        }
    }
}

/// A detailed validation report: the result plus issues and metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// The plain result
    pub result: ValidationResult,
    /// Field failures in template order
    pub issues: Vec<ValidationIssue>,
    /// Evaluation counters
    pub metrics: ValidationMetrics,
}

impl ValidationReport {
    /// Creates an empty, passing report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a field failure. Later issues for an already failing field are ignored.
    pub fn add_issue(&mut self, issue: ValidationIssue) {
        if self.result.error(&issue.field).is_some() {
            return;
        }
        self.result.add_error(issue.field.clone(), issue.message.clone());
        self.issues.push(issue);
    }

    /// Returns true if no field failed.
    pub fn is_valid(&self) -> bool {
        self.result.valid
    }

    /// Returns the issues of a given kind.
    pub fn issues_of_kind(&self, kind: FieldErrorKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }
}

impl From<ValidationReport> for ValidationResult {
    fn from(report: ValidationReport) -> Self {
        report.result
    }
}

/// The result of one row in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    /// Row number as shown to the uploader
    pub row: usize,
    /// Detailed outcome of the row
    pub report: ValidationReport,
}

impl RowResult {
    /// Returns true if the row passed.
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }
}

/// Totals across a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Rows validated
    pub total_rows: usize,
    /// Rows without errors
    pub valid_rows: usize,
    /// Rows with at least one error or a fault
    pub invalid_rows: usize,
    /// Failure count per field name
    pub errors_by_field: BTreeMap<String, usize>,
    /// Wall-clock duration of the batch in milliseconds
    pub execution_time_ms: u64,
}

/// Per-row results of a bulk upload, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Rows in input order
    pub rows: Vec<RowResult>,
    /// Totals across all rows
    pub summary: BatchSummary,
}

impl BatchReport {
    /// Returns true if every row passed.
    pub fn all_valid(&self) -> bool {
        self.summary.invalid_rows == 0
    }

    /// Returns the rows that failed.
    pub fn invalid_rows(&self) -> impl Iterator<Item = &RowResult> {
        self.rows.iter().filter(|row| !row.is_valid())
    }
}
