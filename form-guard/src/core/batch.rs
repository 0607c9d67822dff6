//! Bulk upload validation: many rows against one template.

use super::engine::ValidationEngine;
use super::form_data::{field_value, is_empty_value, value_as_text};
use super::result::{BatchReport, BatchSummary, RowResult, ValidationIssue};
use super::rule::FieldErrorKind;
use super::template::{FieldDefinition, Template};
use super::validation_context::{Scope, ValidationContext};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;
use tracing::{info, instrument};

/// Options for [`ValidationEngine::validate_batch_with`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchOptions {
    /// Also fail unique fields whose value repeats an earlier row of the same batch
    pub detect_in_batch_duplicates: bool,
    /// Number reported for the first row; 2 matches a spreadsheet with a header row
    pub first_row_number: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            detect_in_batch_duplicates: false,
            first_row_number: 2,
        }
    }
}

impl BatchOptions {
    /// Enables duplicate detection within the batch.
    pub fn with_in_batch_duplicates(mut self, enabled: bool) -> Self {
        self.detect_in_batch_duplicates = enabled;
        self
    }

    /// Sets the number reported for the first row.
    pub fn with_first_row_number(mut self, row: usize) -> Self {
        self.first_row_number = row;
        self
    }
}

impl ValidationEngine {
    /// Validates every row of a bulk upload with default [`BatchOptions`].
    ///
    /// Rows are validated in the `upload` scope whatever the scope of
    /// `context`; results keep input order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_guard::core::{Template, ValidationContext, ValidationEngine};
    /// use serde_json::json;
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let template = Template::from_value(json!([
    ///     {"name": "employeeId", "required": true},
    ///     {"name": "bankAccount", "required": true, "applicable": "upload"}
    /// ])).unwrap();
    ///
    /// let rows = vec![
    ///     json!({"employeeId": "E1", "bankAccount": "123"}),
    ///     json!({"employeeId": "E2"}),
    /// ];
    /// let report = ValidationEngine::new()
    ///     .validate_batch(&template, &rows, &ValidationContext::form())
    ///     .await;
    ///
    /// assert_eq!(report.summary.valid_rows, 1);
    /// assert_eq!(report.rows[1].row, 3);
    /// # }
    /// ```
    pub async fn validate_batch(
        &self,
        template: &Template,
        rows: &[Value],
        context: &ValidationContext,
    ) -> BatchReport {
        self.validate_batch_with(template, rows, context, &BatchOptions::default())
            .await
    }

    /// Validates every row of a bulk upload.
    #[instrument(skip_all, fields(template = template.name().unwrap_or("<unnamed>"), rows = rows.len()))]
    pub async fn validate_batch_with(
        &self,
        template: &Template,
        rows: &[Value],
        context: &ValidationContext,
        options: &BatchOptions,
    ) -> BatchReport {
        let start = Instant::now();
        let context = context.clone().with_scope(Scope::upload());

        let reports = join_all(
            rows.iter()
                .map(|row| self.validate_detailed(template, row, &context)),
        )
        .await;

        let mut results: Vec<RowResult> = reports
            .into_iter()
            .enumerate()
            .map(|(index, report)| RowResult {
                row: options.first_row_number + index,
                report,
            })
            .collect();

        if options.detect_in_batch_duplicates {
            flag_in_batch_duplicates(template, rows, &mut results, context.scope());
        }

        let summary = summarize(&results, start);
        info!(
            rows.total = summary.total_rows,
            rows.valid = summary.valid_rows,
            rows.invalid = summary.invalid_rows,
            duration_ms = summary.execution_time_ms,
            "Batch validation completed"
        );

        BatchReport {
            rows: results,
            summary,
        }
    }
}

fn checks_uniqueness(field: &FieldDefinition) -> bool {
    field
        .rules()
        .iter()
        .any(|rule| rule.is_active() && rule.kind().is_some_and(|kind| kind.checks_uniqueness()))
}

/// Fails unique fields that repeat a value seen in an earlier row.
///
/// A field that already failed keeps its first error.
fn flag_in_batch_duplicates(
    template: &Template,
    rows: &[Value],
    results: &mut [RowResult],
    scope: &Scope,
) {
    for field in template
        .fields()
        .iter()
        .filter(|field| field.applies_to(scope) && checks_uniqueness(field))
    {
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (row, result) in rows.iter().zip(results.iter_mut()) {
            let Value::Object(form) = row else {
                continue;
            };
            let value = field_value(form, field.name());
            if is_empty_value(value) {
                continue;
            }
            let Some(key) = value_as_text(value) else {
                continue;
            };

            match first_seen.get(&key) {
                Some(&first_row) => {
                    if result.report.result.error(field.name()).is_some() {
                        continue;
                    }
                    result.report.add_issue(ValidationIssue {
                        field: field.name().to_string(),
                        rule: "duplicate-check".to_string(),
                        kind: FieldErrorKind::UniquenessViolation,
                        message: format!("{} is duplicated in row {first_row}", field.label()),
                    });
                    let metrics = &mut result.report.metrics;
                    metrics.passed_fields = metrics.passed_fields.saturating_sub(1);
                    metrics.failed_fields += 1;
                }
                None => {
                    first_seen.insert(key, result.row);
                }
            }
        }
    }
}

fn summarize(results: &[RowResult], start: Instant) -> BatchSummary {
    let mut summary = BatchSummary {
        total_rows: results.len(),
        ..BatchSummary::default()
    };
    for result in results {
        if result.is_valid() {
            summary.valid_rows += 1;
        } else {
            summary.invalid_rows += 1;
        }
        for field in result.report.result.errors.keys() {
            *summary.errors_by_field.entry(field.clone()).or_insert(0) += 1;
        }
    }
    summary.execution_time_ms = start.elapsed().as_millis() as u64;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FormData;
    use serde_json::json;

    fn template() -> Template {
        Template::from_value(json!([
            {"name": "employeeId", "label": "Employee ID", "required": true,
             "validation": {"type": "unique"}},
            {"name": "email", "label": "Email", "validation": "email"},
            {"name": "bankAccount", "label": "Bank Account", "required": true, "applicable": ["upload"]}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_rows_keep_order_and_upload_scope() {
        let rows = vec![
            json!({"employeeId": "E1", "email": "a@corp.com", "bankAccount": "1"}),
            json!({"employeeId": "E2", "email": "broken"}),
            json!({"employeeId": "E3", "email": "c@corp.com", "bankAccount": "3"}),
        ];
        let report = ValidationEngine::new()
            .validate_batch(&template(), &rows, &ValidationContext::form())
            .await;

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.rows.iter().map(|r| r.row).collect::<Vec<_>>(), vec![2, 3, 4]);
        assert!(report.rows[0].is_valid());
        let second = &report.rows[1].report.result;
        assert_eq!(second.error("bankAccount"), Some("Bank Account is required"));
        assert_eq!(second.error("email"), Some("Email must be a valid email address"));
        assert_eq!(report.summary.invalid_rows, 1);
        assert_eq!(report.summary.errors_by_field.get("email"), Some(&1));
        assert!(!report.all_valid());
    }

    #[tokio::test]
    async fn test_existing_records_checked_per_row() {
        let mut existing = FormData::new();
        existing.insert("employeeId".to_string(), json!("E1"));
        let ctx = ValidationContext::upload().with_existing_records(vec![existing]);

        let rows = vec![json!({"employeeId": "E1", "bankAccount": "1"})];
        let report = ValidationEngine::new()
            .validate_batch(&template(), &rows, &ctx)
            .await;
        assert_eq!(
            report.rows[0].report.result.error("employeeId"),
            Some("Employee ID already exists")
        );
    }

    #[tokio::test]
    async fn test_in_batch_duplicates() {
        let rows = vec![
            json!({"employeeId": "E1", "bankAccount": "1"}),
            json!({"employeeId": "E2", "bankAccount": "2"}),
            json!({"employeeId": " E1 ", "bankAccount": "3"}),
        ];
        let engine = ValidationEngine::new();
        let ctx = ValidationContext::upload();

        let plain = engine.validate_batch(&template(), &rows, &ctx).await;
        assert!(plain.all_valid());

        let options = BatchOptions::default().with_in_batch_duplicates(true);
        let report = engine
            .validate_batch_with(&template(), &rows, &ctx, &options)
            .await;
        assert_eq!(report.invalid_rows().count(), 1);
        let duplicate = &report.rows[2].report;
        assert_eq!(
            duplicate.result.error("employeeId"),
            Some("Employee ID is duplicated in row 2")
        );
        assert_eq!(duplicate.issues[0].kind, FieldErrorKind::UniquenessViolation);
        assert_eq!(duplicate.metrics.failed_fields, 1);
    }

    #[tokio::test]
    async fn test_non_object_row_fails_open() {
        let rows = vec![json!("not a row")];
        let report = ValidationEngine::new()
            .validate_batch(&template(), &rows, &ValidationContext::upload())
            .await;
        assert!(report.all_valid());
    }
}
