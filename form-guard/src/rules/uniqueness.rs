//! Uniqueness against the caller's snapshot of existing records.

use super::{skip_empty, unexpected_params, RuleParams};
use crate::core::form_data::{field_value, is_empty_value, values_match};
use crate::core::{RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use tracing::debug;

/// Fails when any existing record holds the same value under the rule's key.
///
/// Serves `unique` and `duplicate-check`. The key defaults to the field's
/// own name. The snapshot is supplied by the caller through
/// [`ValidationContext::with_existing_records`](crate::core::ValidationContext::with_existing_records);
/// an empty snapshot means nothing to compare against.
#[derive(Debug, Clone, Default)]
pub struct UniqueRule;

#[async_trait]
impl RuleHandler for UniqueRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::Key(key) = input.params() else {
            return Err(unexpected_params(input));
        };
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        let records = input.context.existing_records();
        if records.is_empty() {
            return Ok(RuleOutcome::skipped("no existing records"));
        }

        let duplicate = records
            .iter()
            .position(|record| values_match(field_value(record, key), input.value));

        match duplicate {
            Some(index) => {
                debug!(field = %input.field.name(), key = %key, record = index, "Duplicate value found");
                Ok(input.fail(format!("{} already exists", input.label())))
            }
            None => Ok(RuleOutcome::pass()),
        }
    }

    fn name(&self) -> &str {
        "unique"
    }

    fn description(&self) -> Option<&str> {
        Some("Value must not appear in existing records")
    }
}
