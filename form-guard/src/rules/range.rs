//! Bounds rules: `range`, `salary-range` and `age`.

use super::dates::completed_years;
use super::params::format_number;
use super::{skip_empty, unexpected_params, RuleParams};
use crate::core::form_data::{is_empty_value, value_as_date, value_as_number};
use crate::core::{FieldErrorKind, RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use tracing::debug;

/// Inclusive bounds on a number, or on a date when the range names dates.
///
/// Serves both `range` and `salary-range`; the latter resolves to
/// `1000-100000` when its condition is missing.
#[derive(Debug, Clone, Default)]
pub struct RangeRule;

#[async_trait]
impl RuleHandler for RangeRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        match input.params() {
            RuleParams::NumericRange(range) => {
                let Some(number) = value_as_number(input.value) else {
                    return Ok(input.fail(format!("{} must be a number", input.label())));
                };
                if range.contains(number) {
                    Ok(RuleOutcome::pass())
                } else {
                    Ok(input.fail(format!("{} must be between {}", input.label(), range)))
                }
            }
            RuleParams::DateRange(range) => {
                let Some(date) = value_as_date(input.value) else {
                    return Ok(input.fail_with_kind(
                        FieldErrorKind::FormatMismatch,
                        format!("{} must be a valid date", input.label()),
                    ));
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
            _ => Err(unexpected_params(input)),
        }
    }

    fn name(&self) -> &str {
        "range"
    }

    fn description(&self) -> Option<&str> {
        Some("Value must fall within inclusive bounds")
    }
}

/// Age, in completed years from the value as a birth date to the
/// context's reference date, must fall within bounds (default `18-60`).
#[derive(Debug, Clone, Default)]
pub struct AgeRule;

#[async_trait]
impl RuleHandler for AgeRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::NumericRange(range) = input.params() else {
            return Err(unexpected_params(input));
        };
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        let Some(birth_date) = value_as_date(input.value) else {
            return Ok(input.fail_with_kind(
                FieldErrorKind::FormatMismatch,
                format!("{} must be a valid date", input.label()),
            ));
        };

        let today = input.context.today();
        let age = completed_years(birth_date, today);
        debug!(field = %input.field.name(), age, reference = %today, "Computed age");

        if range.contains(f64::from(age)) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!(
                "Age must be between {} and {} years",
                format_number(range.min),
                format_number(range.max)
            )))
        }
    }

    fn name(&self) -> &str {
        "age"
    }
}
