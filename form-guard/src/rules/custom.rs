//! The `custom` rule: delegation to caller-supplied validators.

use super::{unexpected_params, RuleParams};
use crate::core::{CustomValidatorInput, RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Delegates to the validator named by the condition.
///
/// The validator sees every value, including empty ones. A name with no
/// registered validator is a no-op.
#[derive(Debug, Clone, Default)]
pub struct CustomRule;

#[async_trait]
impl RuleHandler for CustomRule {
    #[instrument(skip(self, input), fields(field = %input.field.name()))]
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::Named(name) = input.params() else {
            return Err(unexpected_params(input));
        };

        let Some(validator) = input.context.custom_validator(name) else {
            debug!(validator = %name, "No custom validator registered under this name");
            return Ok(RuleOutcome::skipped(format!("custom validator '{name}' not registered")));
        };

        let verdict = validator
            .validate(CustomValidatorInput {
                value: input.value,
                rule: input.rule.spec(),
                field_name: input.field.name(),
                form_data: input.form_data,
            })
            .await?;

        Ok(match verdict {
            Some(message) => input.fail(message),
            None => RuleOutcome::pass(),
        })
    }

    fn name(&self) -> &str {
        "custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{validator_fn, FieldErrorKind, RuleSpec, ValidationContext};
    use crate::rules::testing::evaluate_with;
    use serde_json::json;

    #[tokio::test]
    async fn test_delegates_to_named_validator() {
        let ctx = ValidationContext::form().with_custom_validator(
            "panFormat",
            validator_fn(|input| {
                let text = input.value.as_str().unwrap_or_default();
                (text.len() != 10).then(|| "PAN must be 10 characters".to_string())
            }),
        );
        let spec = || RuleSpec::new("custom").with_condition("panFormat");

        let fail = evaluate_with(&CustomRule, "pan", spec(), json!({"pan": "ABC"}), &ctx).await;
        assert_eq!(fail.kind, Some(FieldErrorKind::CustomValidatorFailure));
        assert_eq!(fail.message.as_deref(), Some("PAN must be 10 characters"));

        let pass = evaluate_with(&CustomRule, "pan", spec(), json!({"pan": "ABCDE1234F"}), &ctx).await;
        assert!(pass.status.is_pass());
    }

    #[tokio::test]
    async fn test_missing_validator_is_noop() {
        let outcome = evaluate_with(
            &CustomRule,
            "pan",
            RuleSpec::new("custom").with_condition("unknown"),
            json!({"pan": "x"}),
            &ValidationContext::form(),
        )
        .await;
        assert!(outcome.status.is_skipped());
    }

    #[tokio::test]
    async fn test_validator_sees_siblings() {
        let ctx = ValidationContext::form().with_custom_validator(
            "matchesConfirmation",
            validator_fn(|input| {
                (input.form_data.get("confirmEmail") != Some(input.value))
                    .then(|| format!("{} does not match confirmation", input.field_name))
            }),
        );

        let outcome = evaluate_with(
            &CustomRule,
            "email",
            RuleSpec::new("custom").with_condition(json!({"name": "matchesConfirmation"})),
            json!({"email": "a@b.com", "confirmEmail": "a@c.com"}),
            &ctx,
        )
        .await;
        assert_eq!(
            outcome.message.as_deref(),
            Some("email does not match confirmation")
        );
    }
}
