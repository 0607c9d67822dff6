//! Presence rules: `required` and `conditional-required`.

use super::{unexpected_params, RuleParams};
use crate::core::form_data::is_empty_value;
use crate::core::{RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Fails when the value is missing, null, empty or whitespace-only.
///
/// Fields marked `required` are checked by the engine before their rule
/// chain runs; this rule exists for templates that list `required` as a
/// rule instead.
#[derive(Debug, Clone, Default)]
pub struct RequiredRule;

#[async_trait]
impl RuleHandler for RequiredRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        if is_empty_value(input.value) {
            return Ok(input.fail(format!("{} is required", input.label())));
        }
        Ok(RuleOutcome::pass())
    }

    fn name(&self) -> &str {
        "required"
    }

    fn description(&self) -> Option<&str> {
        Some("Value must be provided")
    }
}

/// Requires a value only while a condition on a sibling field holds.
///
/// # Examples
///
/// A manager is only required for IT employees:
///
/// ```json
/// { "type": "conditional-required", "condition": "department=IT" }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConditionalRequiredRule;

#[async_trait]
impl RuleHandler for ConditionalRequiredRule {
    #[instrument(skip(self, input), fields(field = %input.field.name()))]
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::Conditional(condition) = input.params() else {
            return Err(unexpected_params(input));
        };

        if !condition.holds(input.form_data) {
            debug!(condition = %condition, "Condition does not hold; value is optional");
            return Ok(RuleOutcome::skipped("condition does not hold"));
        }

        if is_empty_value(input.value) {
            return Ok(input.fail(format!(
                "{} is required when {}",
                input.label(),
                condition
            )));
        }
        Ok(RuleOutcome::pass())
    }

    fn name(&self) -> &str {
        "conditional-required"
    }

    fn description(&self) -> Option<&str> {
        Some("Value must be provided when a sibling field condition holds")
    }
}
