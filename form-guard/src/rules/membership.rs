//! HR list and balance rules: `department-check` and `leave-balance`.

use super::params::format_number;
use super::{skip_empty, unexpected_params, RuleParams};
use crate::core::form_data::{field_value, value_as_number, value_as_text};
use crate::core::{FieldErrorKind, RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::debug;

/// Sibling fields consulted for the leave category when the field name has none.
const LEAVE_TYPE_FIELDS: [&str; 3] = ["leaveType", "leave_type", "LeaveType"];

/// Membership in a list of departments, ignoring case and surrounding spaces.
#[derive(Debug, Clone, Default)]
pub struct DepartmentCheckRule;

#[async_trait]
impl RuleHandler for DepartmentCheckRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::List(allowed) = input.params() else {
            return Err(unexpected_params(input));
        };
        let Some(text) = value_as_text(input.value) else {
            return Ok(skip_empty());
        };

        if allowed.iter().any(|item| item.trim().eq_ignore_ascii_case(&text)) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!(
                "{} must be one of: {}",
                input.label(),
                allowed.join(", ")
            )))
        }
    }

    fn name(&self) -> &str {
        "department-check"
    }
}

/// Requested days must not exceed the balance of the field's leave category.
///
/// The category comes from the field name first (`annualLeaveDays` reads
/// as `annual`), then from a `leaveType` sibling. Requests whose category
/// cannot be determined, or has no configured balance, pass.
#[derive(Debug, Clone, Default)]
pub struct LeaveBalanceRule;

impl LeaveBalanceRule {
    fn category<'b>(
        input: &RuleInput<'_>,
        balances: &'b BTreeMap<String, f64>,
    ) -> Option<(&'b str, f64)> {
        let field_name = input.field.name().to_ascii_lowercase();
        if let Some((category, balance)) = balances
            .iter()
            .find(|(category, _)| field_name.contains(category.as_str()))
        {
            return Some((category.as_str(), *balance));
        }

        let declared = LEAVE_TYPE_FIELDS
            .iter()
            .find_map(|name| value_as_text(field_value(input.form_data, name)))?
            .to_ascii_lowercase();
        balances
            .iter()
            .find(|(category, _)| declared == **category || declared.contains(category.as_str()))
            .map(|(category, balance)| (category.as_str(), *balance))
    }
}

#[async_trait]
impl RuleHandler for LeaveBalanceRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::LeaveBalances(balances) = input.params() else {
            return Err(unexpected_params(input));
        };
        if value_as_text(input.value).is_none() {
            return Ok(skip_empty());
        }

        let Some((category, balance)) = Self::category(input, balances) else {
            debug!(field = %input.field.name(), "No leave category for field; balance not checked");
            return Ok(RuleOutcome::skipped("leave category unknown"));
        };

        let Some(requested) = value_as_number(input.value) else {
            return Ok(input.fail_with_kind(
                FieldErrorKind::FormatMismatch,
                format!("{} must be a number", input.label()),
            ));
        };

        if requested > balance {
            Ok(input.fail(format!(
                "{} exceeds available {} leave balance ({})",
                input.label(),
                category,
                format_number(balance)
            )))
        } else {
            Ok(RuleOutcome::pass())
        }
    }

    fn name(&self) -> &str {
        "leave-balance"
    }
}
