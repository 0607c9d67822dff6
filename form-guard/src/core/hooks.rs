//! Extension points supplied by callers: custom validators and override resolvers.
//!
//! Both are plain trait objects carried on the
//! [`ValidationContext`](super::ValidationContext). Closures can be adapted
//! with [`validator_fn`], [`async_validator_fn`] and [`override_fn`].

use super::form_data::FormData;
use super::rule::RuleSpec;
use super::template::FieldDefinition;
use super::validation_context::ValidationContext;
use crate::prelude::*;
use crate::rules::RuleParams;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Arguments passed to a custom validator.
#[derive(Debug, Clone, Copy)]
pub struct CustomValidatorInput<'a> {
    /// The value being validated (`Null` when absent)
    pub value: &'a Value,
    /// The `custom` rule that named this validator
    pub rule: &'a RuleSpec,
    /// Name of the field being validated
    pub field_name: &'a str,
    /// All submitted values
    pub form_data: &'a FormData,
}

/// A caller-supplied validator used by the `custom` rule type.
///
/// Returns `Ok(None)` when the value is acceptable and `Ok(Some(message))`
/// when it is not. An `Err` is treated as a fault: the rule is skipped and
/// the fault is logged.
#[async_trait]
pub trait CustomValidator: Send + Sync {
    /// Validates one value.
    async fn validate(&self, input: CustomValidatorInput<'_>) -> Result<Option<String>>;
}

/// Owned copy of [`CustomValidatorInput`] handed to async closures.
#[derive(Debug, Clone)]
pub struct CustomValidatorRequest {
    /// The value being validated
    pub value: Value,
    /// The `custom` rule that named this validator
    pub rule: RuleSpec,
    /// Name of the field being validated
    pub field_name: String,
    /// All submitted values
    pub form_data: FormData,
}

impl From<CustomValidatorInput<'_>> for CustomValidatorRequest {
    fn from(input: CustomValidatorInput<'_>) -> Self {
        Self {
            value: input.value.clone(),
            rule: input.rule.clone(),
            field_name: input.field_name.to_string(),
            form_data: input.form_data.clone(),
        }
    }
}

/// Adapts a synchronous closure into a [`CustomValidator`].
pub struct FnValidator<F>(F);

#[async_trait]
impl<F> CustomValidator for FnValidator<F>
where
    F: for<'a> Fn(CustomValidatorInput<'a>) -> Option<String> + Send + Sync,
{
    async fn validate(&self, input: CustomValidatorInput<'_>) -> Result<Option<String>> {
        Ok((self.0)(input))
    }
}

/// Adapts an async closure into a [`CustomValidator`].
pub struct AsyncFnValidator<F>(F);

#[async_trait]
impl<F, Fut> CustomValidator for AsyncFnValidator<F>
where
    F: Fn(CustomValidatorRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Option<String>>> + Send,
{
    async fn validate(&self, input: CustomValidatorInput<'_>) -> Result<Option<String>> {
        (self.0)(CustomValidatorRequest::from(input)).await
    }
}

/// Wraps a synchronous closure as a shared custom validator.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::{validator_fn, ValidationContext};
///
/// let context = ValidationContext::form().with_custom_validator(
///     "evenNumber",
///     validator_fn(|input| match input.value.as_i64() {
///         Some(n) if n % 2 != 0 => Some(format!("{} must be even", input.field_name)),
///         _ => None,
///     }),
/// );
/// assert!(context.custom_validator("evenNumber").is_some());
/// ```
pub fn validator_fn<F>(f: F) -> Arc<dyn CustomValidator>
where
    F: for<'a> Fn(CustomValidatorInput<'a>) -> Option<String> + Send + Sync + 'static,
{
    Arc::new(FnValidator(f))
}

/// Wraps an async closure as a shared custom validator.
pub fn async_validator_fn<F, Fut>(f: F) -> Arc<dyn CustomValidator>
where
    F: Fn(CustomValidatorRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<String>>> + Send + 'static,
{
    Arc::new(AsyncFnValidator(f))
}

/// Arguments passed to an override resolver.
#[derive(Clone, Copy)]
pub struct OverrideInput<'a> {
    /// The value being validated (`Null` when absent)
    pub value: &'a Value,
    /// The field being validated
    pub field: &'a FieldDefinition,
    /// The rule as written in the template
    pub rule: &'a RuleSpec,
    /// The rule's resolved parameters
    pub params: &'a RuleParams,
    /// All submitted values
    pub form_data: &'a FormData,
    /// The context of the current call
    pub context: &'a ValidationContext,
}

impl fmt::Debug for OverrideInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OverrideInput")
            .field("field", &self.field.name())
            .field("rule", &self.rule.rule_type)
            .finish_non_exhaustive()
    }
}

/// Takes full control of rule evaluation when installed.
///
/// When a resolver is present it decides every rule: `Ok(None)` passes,
/// `Ok(Some(message))` fails the field and built-in handlers are not
/// consulted.
#[async_trait]
pub trait OverrideResolver: Send + Sync {
    /// Evaluates one rule.
    async fn resolve(&self, input: OverrideInput<'_>) -> Result<Option<String>>;
}

/// Adapts a synchronous closure into an [`OverrideResolver`].
pub struct FnOverride<F>(F);

#[async_trait]
impl<F> OverrideResolver for FnOverride<F>
where
    F: for<'a> Fn(OverrideInput<'a>) -> Result<Option<String>> + Send + Sync,
{
    async fn resolve(&self, input: OverrideInput<'_>) -> Result<Option<String>> {
        (self.0)(input)
    }
}

/// Wraps a synchronous closure as a shared override resolver.
pub fn override_fn<F>(f: F) -> Arc<dyn OverrideResolver>
where
    F: for<'a> Fn(OverrideInput<'a>) -> Result<Option<String>> + Send + Sync + 'static,
{
    Arc::new(FnOverride(f))
}
