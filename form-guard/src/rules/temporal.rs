//! Calendar date rules: `date`, `date-before`, `date-after` and `date-range`.

use super::{skip_empty, unexpected_params, RuleParams};
use crate::core::form_data::{is_empty_value, value_as_date};
use crate::core::{FieldErrorKind, RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

fn parse_or_fail(input: &RuleInput<'_>) -> std::result::Result<NaiveDate, RuleOutcome> {
    value_as_date(input.value).ok_or_else(|| {
        input.fail_with_kind(
            FieldErrorKind::FormatMismatch,
            format!("{} must be a valid date", input.label()),
        )
    })
}

/// Fails unless the value parses as a real calendar date.
///
/// Numbers count as spreadsheet serials only from 7306 (1920-01-01) upward,
/// so a stray `7` in a date column fails.
#[derive(Debug, Clone, Default)]
pub struct DateRule;

#[async_trait]
impl RuleHandler for DateRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }
        Ok(match parse_or_fail(input) {
            Ok(_) => RuleOutcome::pass(),
            Err(failure) => failure,
        })
    }

    fn name(&self) -> &str {
        "date"
    }
}

/// Direction of a [`DateComparisonRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrdering {
    /// Value must be strictly earlier than the reference
    Before,
    /// Value must be strictly later than the reference
    After,
}

/// Orders the value against a sibling field or a literal date.
///
/// A missing or unparseable reference passes; only the value itself is
/// required to be a valid date.
#[derive(Debug, Clone)]
pub struct DateComparisonRule {
    ordering: DateOrdering,
}

impl DateComparisonRule {
    /// Creates the `date-before` rule.
    pub fn before() -> Self {
        Self {
            ordering: DateOrdering::Before,
        }
    }

    /// Creates the `date-after` rule.
    pub fn after() -> Self {
        Self {
            ordering: DateOrdering::After,
        }
    }
}

#[async_trait]
impl RuleHandler for DateComparisonRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::DateReference(reference) = input.params() else {
            return Err(unexpected_params(input));
        };
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        let date = match parse_or_fail(input) {
            Ok(date) => date,
            Err(failure) => return Ok(failure),
        };
        let Some(reference_date) = reference.resolve(input.form_data) else {
            debug!(
                field = %input.field.name(),
                reference = %reference.describe(),
                "Reference date missing; comparison not applicable"
            );
            return Ok(RuleOutcome::skipped("reference date not available"));
        };

        let (ok, word) = match self.ordering {
            DateOrdering::Before => (date < reference_date, "before"),
            DateOrdering::After => (date > reference_date, "after"),
        };
        if ok {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!(
                "{} must be {} {}",
                input.label(),
                word,
                reference.describe()
            )))
        }
    }

    fn name(&self) -> &str {
        match self.ordering {
            DateOrdering::Before => "date-before",
            DateOrdering::After => "date-after",
        }
    }
}

/// Date within an inclusive window such as `2024-01-01:2024-12-31`.
#[derive(Debug, Clone, Default)]
pub struct DateRangeRule;

#[async_trait]
impl RuleHandler for DateRangeRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::DateRange(range) = input.params() else {
            return Err(unexpected_params(input));
        };
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        let date = match parse_or_fail(input) {
            Ok(date) => date,
            Err(failure) => return Ok(failure),
        };
        if range.contains(date) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!(
                "{} must be between {} and {}",
                input.label(),
                range.start.format("%Y-%m-%d"),
                range.end.format("%Y-%m-%d")
            )))
        }
    }

    fn name(&self) -> &str {
        "date-range"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RuleSpec;
    use crate::rules::testing::evaluate;
    use serde_json::json;

    #[tokio::test]
    async fn test_date_rule() {
        let spec = || RuleSpec::new("date");
        for value in ["2023-01-15", "01/15/2023", "15/01/2023", "2023/01/15"] {
            let outcome = evaluate(&DateRule, "joiningDate", spec(), json!({"joiningDate": value})).await;
            assert!(outcome.status.is_pass(), "{value} should parse");
        }

        let outcome = evaluate(&DateRule, "joiningDate", spec(), json!({"joiningDate": "2023-02-30"})).await;
        assert_eq!(outcome.kind, Some(FieldErrorKind::FormatMismatch));
        assert_eq!(
            outcome.message.as_deref(),
            Some("joiningDate must be a valid date")
        );
    }

    #[tokio::test]
    async fn test_date_before_sibling() {
        let spec = || RuleSpec::new("date-before").with_condition("joiningDate");

        let ok = evaluate(
            &DateComparisonRule::before(),
            "birthDate",
            spec(),
            json!({"birthDate": "1990-01-01", "joiningDate": "2023-01-15"}),
        )
        .await;
        assert!(ok.status.is_pass());

        let late = evaluate(
            &DateComparisonRule::before(),
            "birthDate",
            spec(),
            json!({"birthDate": "2025-01-01", "joiningDate": "2023-01-15"}),
        )
        .await;
        assert_eq!(late.kind, Some(FieldErrorKind::CrossFieldOrderViolation));
        assert_eq!(
            late.message.as_deref(),
            Some("birthDate must be before joiningDate")
        );

        // Same day is not strictly before.
        let same = evaluate(
            &DateComparisonRule::before(),
            "birthDate",
            spec(),
            json!({"birthDate": "2023-01-15", "joiningDate": "2023-01-15"}),
        )
        .await;
        assert!(same.status.is_fail());
    }

    #[tokio::test]
    async fn test_missing_reference_passes() {
        let outcome = evaluate(
            &DateComparisonRule::after(),
            "exitDate",
            RuleSpec::new("date-after").with_condition("joiningDate"),
            json!({"exitDate": "2024-01-01"}),
        )
        .await;
        assert!(!outcome.status.is_fail());
    }

    #[tokio::test]
    async fn test_date_after_literal() {
        let spec = || RuleSpec::new("date-after").with_condition("2020-01-01");
        let ok = evaluate(&DateComparisonRule::after(), "joiningDate", spec(), json!({"joiningDate": "2020-01-02"})).await;
        assert!(ok.status.is_pass());
        let fail = evaluate(&DateComparisonRule::after(), "joiningDate", spec(), json!({"joiningDate": "2019-12-31"})).await;
        assert_eq!(
            fail.message.as_deref(),
            Some("joiningDate must be after 2020-01-01")
        );
    }

    #[tokio::test]
    async fn test_date_range_inclusive() {
        let spec = || RuleSpec::new("date-range").with_condition("2024-01-01:2024-12-31");
        for (value, passes) in [("2024-01-01", true), ("2024-12-31", true), ("2023-12-31", false), ("2025-01-01", false)] {
            let outcome = evaluate(&DateRangeRule, "payDate", spec(), json!({"payDate": value})).await;
            assert_eq!(outcome.status.is_pass(), passes, "{value}");
        }
    }
}
