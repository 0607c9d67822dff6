//! Result formatting for validation reports and bulk upload previews.
//!
//! # Examples
//!
//! ```rust
//! use form_guard::core::{ValidationIssue, ValidationReport, FieldErrorKind};
//! use form_guard::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
//!
//! let mut report = ValidationReport::new();
//! report.add_issue(ValidationIssue {
//!     field: "email".to_string(),
//!     rule: "required".to_string(),
//!     kind: FieldErrorKind::MissingRequiredValue,
//!     message: "Email is required".to_string(),
//! });
//!
//! let output = HumanFormatter::with_config(FormatterConfig::minimal().with_issues(true))
//!     .format(&report)
//!     .unwrap();
//! assert!(output.contains("Email is required"));
//! ```

use crate::core::{BatchReport, ValidationIssue, ValidationReport};
use crate::prelude::*;
use serde_json::{json, Value};
use std::fmt::{self, Write};

/// What the formatters include in their output.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Field and rule counters
    pub metrics: bool,
    /// Per-field failures
    pub issues: bool,
    /// Cap on listed failures per report; `None` lists all
    pub issue_limit: Option<usize>,
    /// ANSI colors in human output
    pub colors: bool,
    /// List passing rows in batch output
    pub valid_rows: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            metrics: true,
            issues: true,
            issue_limit: None,
            colors: true,
            valid_rows: false,
        }
    }
}

impl FormatterConfig {
    /// Only the verdict and error count.
    pub fn minimal() -> Self {
        Self {
            metrics: false,
            issues: false,
            issue_limit: None,
            colors: false,
            valid_rows: false,
        }
    }

    /// No colors and at most 50 failures per report, for log files and pipelines.
    pub fn plain() -> Self {
        Self {
            issue_limit: Some(50),
            colors: false,
            ..Self::default()
        }
    }

    /// Sets whether counters are included.
    pub fn with_metrics(mut self, include: bool) -> Self {
        self.metrics = include;
        self
    }

    /// Sets whether per-field failures are included.
    pub fn with_issues(mut self, include: bool) -> Self {
        self.issues = include;
        self
    }

    /// Lists at most `limit` failures per report.
    pub fn with_issue_limit(mut self, limit: usize) -> Self {
        self.issue_limit = Some(limit);
        self
    }

    /// Sets whether human output is colored.
    pub fn with_colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    /// Sets whether batch output lists passing rows.
    pub fn with_valid_rows(mut self, show: bool) -> Self {
        self.valid_rows = show;
        self
    }

    fn visible_issues<'a>(&self, issues: &'a [ValidationIssue]) -> &'a [ValidationIssue] {
        if !self.issues {
            return &[];
        }
        let limit = self.issue_limit.unwrap_or(issues.len()).min(issues.len());
        &issues[..limit]
    }
}

/// Renders reports as text.
pub trait ResultFormatter {
    /// Formats the report of one submission.
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats the per-row results of a bulk upload.
    fn format_batch(&self, batch: &BatchReport) -> Result<String>;
}

/// Formats validation reports as structured JSON.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::ValidationReport;
/// use form_guard::formatters::{JsonFormatter, ResultFormatter};
///
/// let output = JsonFormatter::new().with_pretty(false).format(&ValidationReport::new()).unwrap();
/// assert!(output.contains(r#""valid":true"#));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Pretty JSON with every section.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Pretty JSON with the given sections.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Switches between indented and single-line JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn report_value(&self, report: &ValidationReport) -> Result<Value> {
        let mut value = json!({
            "valid": report.result.valid,
            "errors": report.result.errors,
        });
        if let Some(fault) = &report.result.fault {
            value["fault"] = json!(fault);
        }
        if self.config.issues {
            value["issues"] = serde_json::to_value(self.config.visible_issues(&report.issues))?;
        }
        if self.config.metrics {
            value["metrics"] = serde_json::to_value(&report.metrics)?;
        }
        Ok(value)
    }

    fn render(&self, value: &Value) -> Result<String> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.map_err(|e| GuardError::Internal(format!("Failed to serialize result to JSON: {e}")))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let value = self.report_value(report)?;
        self.render(&value)
    }

    fn format_batch(&self, batch: &BatchReport) -> Result<String> {
        let mut rows = Vec::new();
        for row in &batch.rows {
            if row.is_valid() && !self.config.valid_rows {
                continue;
            }
            let mut value = self.report_value(&row.report)?;
            value["row"] = json!(row.row);
            rows.push(value);
        }
        let value = json!({
            "summary": serde_json::to_value(&batch.summary)?,
            "rows": rows,
        });
        self.render(&value)
    }
}

/// Formats validation reports for console output.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::ValidationReport;
/// use form_guard::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
///
/// let formatter = HumanFormatter::with_config(FormatterConfig::default().with_colors(false));
/// let output = formatter.format(&ValidationReport::new()).unwrap();
/// assert!(output.contains("Validation PASSED"));
/// ```
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Colored output with every section.
    pub fn new() -> Self {
        Self::with_config(FormatterConfig::default())
    }

    /// Output with the given sections.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(&self, text: &str, color: &str) -> String {
        if self.config.colors {
            format!("\x1b[{color}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn write_report(&self, output: &mut String, report: &ValidationReport) -> fmt::Result {
        let config = &self.config;

        if report.is_valid() {
            writeln!(output, "✅ {}", self.paint("Validation PASSED", "32"))?;
        } else {
            writeln!(output, "❌ {}", self.paint("Validation FAILED", "31"))?;
        }
        if let Some(fault) = &report.result.fault {
            writeln!(output, "   Engine fault: {fault}")?;
        }

        if config.metrics {
            let metrics = &report.metrics;
            writeln!(output)?;
            writeln!(output, "📊 Summary Statistics:")?;
            writeln!(
                output,
                "   Fields Evaluated: {} of {} ({} not applicable)",
                metrics.evaluated_fields, metrics.total_fields, metrics.not_applicable_fields
            )?;
            writeln!(
                output,
                "   ✅ Passed: {}",
                self.paint(&metrics.passed_fields.to_string(), "32")
            )?;
            writeln!(
                output,
                "   ❌ Failed: {}",
                self.paint(&metrics.failed_fields.to_string(), "31")
            )?;
            writeln!(
                output,
                "   Rules: {} evaluated, {} skipped, {} faulted",
                metrics.rules_evaluated, metrics.rules_skipped, metrics.rule_faults
            )?;
            writeln!(output, "   Success Rate: {:.1}%", metrics.success_rate())?;
            writeln!(output, "   Execution Time: {}ms", metrics.execution_time_ms)?;
        }

        let issues = config.visible_issues(&report.issues);
        if !issues.is_empty() {
            writeln!(output)?;
            writeln!(output, "🔍 Issues Found:")?;
            for (i, issue) in issues.iter().enumerate() {
                writeln!(output, "   🚨 Issue #{}: {}", i + 1, issue.field)?;
                writeln!(output, "      Rule: {}", issue.rule)?;
                writeln!(output, "      Kind: {}", issue.kind)?;
                writeln!(output, "      Message: {}", issue.message)?;
            }
            if report.issues.len() > issues.len() {
                writeln!(
                    output,
                    "   ... and {} more issues",
                    report.issues.len() - issues.len()
                )?;
            }
        }
        Ok(())
    }

    fn write_batch(&self, output: &mut String, batch: &BatchReport) -> fmt::Result {
        let summary = &batch.summary;
        if batch.all_valid() {
            writeln!(output, "✅ {}", self.paint("Upload PASSED", "32"))?;
        } else {
            writeln!(output, "❌ {}", self.paint("Upload FAILED", "31"))?;
        }
        writeln!(output)?;
        writeln!(output, "📦 Rows: {}", summary.total_rows)?;
        writeln!(output, "   ✅ Valid: {}", self.paint(&summary.valid_rows.to_string(), "32"))?;
        writeln!(output, "   ❌ Invalid: {}", self.paint(&summary.invalid_rows.to_string(), "31"))?;
        if self.config.metrics {
            writeln!(output, "   Execution Time: {}ms", summary.execution_time_ms)?;
        }

        if !summary.errors_by_field.is_empty() {
            writeln!(output)?;
            writeln!(output, "📈 Errors by Field:")?;
            for (field, count) in &summary.errors_by_field {
                writeln!(output, "   {field}: {count}")?;
            }
        }

        if self.config.issues {
            for row in &batch.rows {
                if row.is_valid() {
                    if self.config.valid_rows {
                        writeln!(output, "   Row {}: ok", row.row)?;
                    }
                    continue;
                }
                writeln!(output)?;
                writeln!(output, "   Row {}:", row.row)?;
                if let Some(fault) = &row.report.result.fault {
                    writeln!(output, "      Engine fault: {fault}")?;
                }
                for (field, message) in &row.report.result.errors {
                    writeln!(output, "      {field}: {message}")?;
                }
            }
        }
        Ok(())
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_failed(e: fmt::Error) -> GuardError {
    GuardError::Internal(format!("Failed to format result: {e}"))
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let mut output = String::new();
        self.write_report(&mut output, report).map_err(format_failed)?;
        Ok(output)
    }

    fn format_batch(&self, batch: &BatchReport) -> Result<String> {
        let mut output = String::new();
        self.write_batch(&mut output, batch).map_err(format_failed)?;
        Ok(output)
    }
}
