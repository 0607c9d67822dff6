//! Rule definitions, rule outcomes and the handler trait.

use super::form_data::{deserialize_flag, FormData};
use super::template::FieldDefinition;
use super::validation_context::ValidationContext;
use crate::prelude::*;
use crate::rules::{normalize_type_name, params, DateReference, RuleKind, RuleParams};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// The category of a field validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldErrorKind {
    /// A required value is missing
    MissingRequiredValue,
    /// Value does not have the expected shape (regex, email, phone, date, number)
    FormatMismatch,
    /// Numeric, date, age, salary or balance bounds exceeded
    RangeViolation,
    /// Date ordering against another field or date violated
    CrossFieldOrderViolation,
    /// Value not in the allowed list
    ListMembershipViolation,
    /// Value already exists
    UniquenessViolation,
    /// Value required by a condition on another field
    ConditionalRequirementViolation,
    /// A custom validator or override rejected the value
    CustomValidatorFailure,
}

impl FieldErrorKind {
    /// Returns the name of the error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKind::MissingRequiredValue => "MissingRequiredValue",
            FieldErrorKind::FormatMismatch => "FormatMismatch",
            FieldErrorKind::RangeViolation => "RangeViolation",
            FieldErrorKind::CrossFieldOrderViolation => "CrossFieldOrderViolation",
            FieldErrorKind::ListMembershipViolation => "ListMembershipViolation",
            FieldErrorKind::UniquenessViolation => "UniquenessViolation",
            FieldErrorKind::ConditionalRequirementViolation => "ConditionalRequirementViolation",
            FieldErrorKind::CustomValidatorFailure => "CustomValidatorFailure",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The status of a rule evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleStatus {
    /// The value satisfied the rule
    Pass,
    /// The value violated the rule
    Fail,
    /// The rule had nothing to check (empty value, missing reference, unknown type)
    Skipped,
}

impl RuleStatus {
    /// Returns true if this is a Pass status.
    pub fn is_pass(&self) -> bool {
        matches!(self, RuleStatus::Pass)
    }

    /// Returns true if this is a Fail status.
    pub fn is_fail(&self) -> bool {
        matches!(self, RuleStatus::Fail)
    }

    /// Returns true if this is a Skipped status.
    pub fn is_skipped(&self) -> bool {
        matches!(self, RuleStatus::Skipped)
    }
}

/// The result of evaluating one rule against one value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// The status of the evaluation
    pub status: RuleStatus,
    /// Error category, set on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldErrorKind>,
    /// Failure message, or the reason a rule was skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleOutcome {
    /// Creates a passing outcome.
    pub fn pass() -> Self {
        Self {
            status: RuleStatus::Pass,
            kind: None,
            message: None,
        }
    }

    /// Creates a failing outcome.
    pub fn fail(kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            status: RuleStatus::Fail,
            kind: Some(kind),
            message: Some(message.into()),
        }
    }

    /// Creates a skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: RuleStatus::Skipped,
            kind: None,
            message: Some(reason.into()),
        }
    }

    /// Returns the error message if the rule failed.
    pub fn error(&self) -> Option<&str> {
        if self.status.is_fail() {
            self.message.as_deref()
        } else {
            None
        }
    }
}

fn default_active() -> bool {
    true
}

/// A rule as written in a template.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::RuleSpec;
///
/// let rule: RuleSpec = serde_json::from_str(
///     r#"{"Type": "salary-range", "Condition": "20000-90000", "IsActive": true}"#,
/// ).unwrap();
/// assert_eq!(rule.rule_type, "salary-range");
///
/// let built = RuleSpec::new("range").with_condition("1000-50000");
/// assert_eq!(built.condition, serde_json::json!("1000-50000"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule type identifier
    #[serde(
        rename = "type",
        alias = "Type",
        alias = "ruleType",
        alias = "RuleType"
    )]
    pub rule_type: String,
    /// Type-specific condition: string, object or `{ParamName, ParamValue}` pairs
    #[serde(
        default,
        alias = "Condition",
        alias = "params",
        alias = "Params",
        alias = "parameters",
        skip_serializing_if = "Value::is_null"
    )]
    pub condition: Value,
    /// Replaces the built-in failure message
    #[serde(
        default,
        alias = "Message",
        alias = "errorMessage",
        alias = "ErrorMessage",
        skip_serializing_if = "Option::is_none"
    )]
    pub message: Option<String>,
    /// Inactive rules never run
    #[serde(
        default = "default_active",
        alias = "Active",
        alias = "IsActive",
        alias = "isActive",
        deserialize_with = "deserialize_flag"
    )]
    pub active: bool,
}

impl RuleSpec {
    /// Creates an active rule with no condition.
    pub fn new(rule_type: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            condition: Value::Null,
            message: None,
            active: true,
        }
    }

    /// Sets the condition.
    pub fn with_condition(mut self, condition: impl Into<Value>) -> Self {
        self.condition = condition.into();
        self
    }

    /// Sets a custom failure message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Sets whether the rule is active.
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// A rule whose condition has been resolved into typed parameters.
///
/// Conditions are parsed once, when the template is loaded, so repeated
/// validation calls never re-parse them and every call sees the same
/// parameters.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    spec: RuleSpec,
    kind: Option<RuleKind>,
    canonical_name: String,
    params: RuleParams,
}

impl CompiledRule {
    /// Resolves a rule spec for a field.
    pub fn compile(spec: RuleSpec, field_name: &str) -> Self {
        let kind = RuleKind::from_type_name(&spec.rule_type);
        let canonical_name = match kind {
            Some(kind) => kind.name().to_string(),
            None => normalize_type_name(&spec.rule_type),
        };
        let params = params::resolve(kind, &spec.condition, field_name);

        if let RuleParams::Unresolved(reason) = &params {
            tracing::warn!(
                field.name = %field_name,
                rule.r#type = %spec.rule_type,
                reason = %reason,
                "Rule condition could not be resolved; the rule will be skipped"
            );
        }

        Self {
            spec,
            kind,
            canonical_name,
            params,
        }
    }

    /// Returns the rule as written in the template.
    pub fn spec(&self) -> &RuleSpec {
        &self.spec
    }

    /// Returns the built-in kind, if the type names one.
    pub fn kind(&self) -> Option<RuleKind> {
        self.kind
    }

    /// Returns the normalized type name used for registry lookup.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Returns the resolved parameters.
    pub fn params(&self) -> &RuleParams {
        &self.params
    }

    /// Fills in the label of a sibling date reference from `labels`.
    pub(crate) fn label_references(&mut self, labels: &HashMap<&str, &str>) {
        if let RuleParams::DateReference(DateReference::Field { name, label }) = &mut self.params {
            if let Some(found) = labels.get(name.as_str()) {
                *label = Some((*found).to_string());
            }
        }
    }

    /// Returns true if the rule should run.
    pub fn is_active(&self) -> bool {
        self.spec.active
    }

    /// Returns the error kind reported when this rule fails.
    pub fn error_kind(&self) -> FieldErrorKind {
        self.kind
            .map(|kind| kind.error_kind())
            .unwrap_or(FieldErrorKind::CustomValidatorFailure)
    }
}

/// Everything a rule handler may read while evaluating one rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    /// The field being validated
    pub field: &'a FieldDefinition,
    /// The rule being evaluated
    pub rule: &'a CompiledRule,
    /// The field's raw value (`Null` when absent)
    pub value: &'a Value,
    /// All submitted values, for cross-field rules
    pub form_data: &'a FormData,
    /// Caller-supplied context
    pub context: &'a ValidationContext,
}

impl<'a> RuleInput<'a> {
    /// Returns the field label used in messages.
    pub fn label(&self) -> &'a str {
        self.field.label()
    }

    /// Returns the resolved rule parameters.
    pub fn params(&self) -> &'a RuleParams {
        self.rule.params()
    }

    /// Builds a failure, preferring the template's message over `default_message`.
    pub fn fail(&self, default_message: impl Into<String>) -> RuleOutcome {
        self.fail_with_kind(self.rule.error_kind(), default_message)
    }

    /// Builds a failure with an explicit error kind.
    pub fn fail_with_kind(
        &self,
        kind: FieldErrorKind,
        default_message: impl Into<String>,
    ) -> RuleOutcome {
        let message = match &self.rule.spec().message {
            Some(message) if !message.trim().is_empty() => message.clone(),
            _ => default_message.into(),
        };
        RuleOutcome::fail(kind, message)
    }
}

/// A validation rule handler.
///
/// Handlers are stateless and shared across calls; everything they need
/// arrives through [`RuleInput`]. Returning `Err` marks the rule as faulty:
/// the engine logs it and skips the rule rather than failing the field.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::{RuleHandler, RuleInput, RuleOutcome};
/// use form_guard::core::form_data::value_as_text;
/// use form_guard::prelude::*;
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct UppercaseRule;
///
/// #[async_trait]
/// impl RuleHandler for UppercaseRule {
///     async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
///         match value_as_text(input.value) {
///             Some(text) if text != text.to_uppercase() => {
///                 Ok(input.fail(format!("{} must be uppercase", input.label())))
///             }
///             _ => Ok(RuleOutcome::pass()),
///         }
///     }
///
///     fn name(&self) -> &str {
///         "uppercase"
///     }
/// }
/// ```
#[async_trait]
pub trait RuleHandler: Debug + Send + Sync {
    /// Evaluates the rule.
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome>;

    /// Returns the name of the handler.
    fn name(&self) -> &str;

    /// Returns a description of what this handler validates.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A shared rule handler for use in registries.
pub type BoxedRuleHandler = Arc<dyn RuleHandler>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_spec_aliases() {
        let rule: RuleSpec = serde_json::from_value(json!({
            "RuleType": "range",
            "Params": "1-10",
            "ErrorMessage": "Pick 1 to 10",
            "IsActive": "false"
        }))
        .unwrap();

        assert_eq!(rule.rule_type, "range");
        assert_eq!(rule.condition, json!("1-10"));
        assert_eq!(rule.message.as_deref(), Some("Pick 1 to 10"));
        assert!(!rule.active);
    }

    #[test]
    fn test_rule_spec_defaults() {
        let rule: RuleSpec = serde_json::from_value(json!({"type": "email"})).unwrap();
        assert!(rule.active);
        assert!(rule.condition.is_null());
        assert!(rule.message.is_none());

        let serialized = serde_json::to_value(&rule).unwrap();
        assert_eq!(serialized, json!({"type": "email", "active": true}));
    }

    #[test]
    fn test_compiled_rule_names() {
        let known = CompiledRule::compile(RuleSpec::new("Pattern_Match").with_condition("x+"), "f");
        assert_eq!(known.kind(), Some(RuleKind::Regex));
        assert_eq!(known.canonical_name(), "regex");

        let unknown = CompiledRule::compile(RuleSpec::new("IBAN Check"), "f");
        assert_eq!(unknown.kind(), None);
        assert_eq!(unknown.canonical_name(), "iban-check");
        assert_eq!(
            unknown.error_kind(),
            FieldErrorKind::CustomValidatorFailure
        );
    }

    #[test]
    fn test_rule_outcome_builders() {
        let pass = RuleOutcome::pass();
        assert!(pass.status.is_pass());
        assert!(pass.error().is_none());

        let fail = RuleOutcome::fail(FieldErrorKind::RangeViolation, "too big");
        assert!(fail.status.is_fail());
        assert_eq!(fail.error(), Some("too big"));
        assert_eq!(fail.kind, Some(FieldErrorKind::RangeViolation));

        let skipped = RuleOutcome::skipped("empty value");
        assert!(skipped.status.is_skipped());
        assert!(skipped.error().is_none());
        assert_eq!(skipped.message.as_deref(), Some("empty value"));
    }
}
