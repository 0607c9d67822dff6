//! Built-in validation rules.
//!
//! Each rule kind is a stateless [`RuleHandler`](crate::core::RuleHandler)
//! registered in a [`RuleRegistry`] under its canonical type name. Except for
//! `required`, `conditional-required` and `custom`, every handler treats an
//! empty value as "nothing to check" and skips itself.
//!
//! ## Available rules
//!
//! - [`RequiredRule`], [`ConditionalRequiredRule`]: presence checks
//! - [`RegexRule`], [`EmailRule`], [`PhoneFormatRule`], [`FormatCheckRule`]: value shape
//! - [`RangeRule`], [`AgeRule`]: numeric and age bounds
//! - [`DateRule`], [`DateComparisonRule`], [`DateRangeRule`]: calendar dates
//! - [`DepartmentCheckRule`], [`LeaveBalanceRule`]: HR-specific lists and balances
//! - [`UniqueRule`]: duplicates against existing records
//! - [`CustomRule`]: caller-supplied validators

mod custom;
pub mod dates;
mod format;
mod kind;
mod membership;
pub mod params;
mod presence;
mod range;
mod registry;
mod temporal;
mod uniqueness;

pub use custom::CustomRule;
pub use format::{EmailRule, FormatCheckRule, PhoneFormatRule, RegexRule};
pub use kind::{normalize_type_name, RuleKind};
pub use membership::{DepartmentCheckRule, LeaveBalanceRule};
pub use params::{
    ConditionExpr, ConditionOp, DateRange, DateReference, NumberFormat, NumericRange, ParamPair,
    RuleParams,
};
pub use presence::{ConditionalRequiredRule, RequiredRule};
pub use range::{AgeRule, RangeRule};
pub use registry::RuleRegistry;
pub use temporal::{DateComparisonRule, DateOrdering, DateRangeRule, DateRule};
pub use uniqueness::UniqueRule;

use crate::core::{RuleInput, RuleOutcome};
use crate::error::GuardError;

/// Outcome for rules that have nothing to check.
pub(crate) fn skip_empty() -> RuleOutcome {
    RuleOutcome::skipped("no value to check")
}

/// Error for a handler invoked with parameters of another rule kind.
pub(crate) fn unexpected_params(input: &RuleInput<'_>) -> GuardError {
    GuardError::invalid_rule(
        &input.rule.spec().rule_type,
        format!("handler cannot use {} parameters", input.params().shape()),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::core::form_data::field_value;
    use crate::core::{
        CompiledRule, FieldDefinition, RuleHandler, RuleInput, RuleOutcome, RuleSpec,
        ValidationContext,
    };
    use serde_json::Value;

    /// Runs one handler against `form[field]` with the given context.
    pub(crate) async fn evaluate_with(
        handler: &dyn RuleHandler,
        field: &str,
        spec: RuleSpec,
        form: Value,
        context: &ValidationContext,
    ) -> RuleOutcome {
        let definition = FieldDefinition::builder(field).build().unwrap();
        let rule = CompiledRule::compile(spec, field);
        let form_data = form.as_object().cloned().unwrap_or_default();
        let input = RuleInput {
            field: &definition,
            rule: &rule,
            value: field_value(&form_data, field),
            form_data: &form_data,
            context,
        };
        handler.evaluate(&input).await.unwrap()
    }

    /// Runs one handler in the form scope.
    pub(crate) async fn evaluate(
        handler: &dyn RuleHandler,
        field: &str,
        spec: RuleSpec,
        form: Value,
    ) -> RuleOutcome {
        evaluate_with(handler, field, spec, form, &ValidationContext::form()).await
    }
}
