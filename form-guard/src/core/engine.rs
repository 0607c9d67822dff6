//! The validation engine: field orchestration, rule dispatch and aggregation.

use super::config::{EngineConfig, FaultPolicy, FieldEvaluation};
use super::form_data::{field_value, is_empty_value, FormData};
use super::hooks::{OverrideInput, OverrideResolver};
use super::result::{ValidationIssue, ValidationMetrics, ValidationReport, ValidationResult};
use super::rule::{
    BoxedRuleHandler, CompiledRule, FieldErrorKind, RuleInput, RuleOutcome, RuleSpec, RuleStatus,
};
use super::template::{json_type_name, FieldDefinition, Template};
use super::validation_context::{legacy_override, ValidationContext};
use crate::prelude::*;
use crate::rules::{RuleParams, RuleRegistry};
use crate::{log_rule, perf_debug};
use futures::future::join_all;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn, Level};

/// Field name used by [`ValidationEngine::test_rule`].
const TEST_FIELD: &str = "value";

/// Validates form data against templates.
///
/// The engine holds an immutable rule registry and configuration and no
/// per-call state, so one instance can serve overlapping calls.
///
/// # Examples
///
/// ```rust
/// use form_guard::core::{Template, ValidationContext, ValidationEngine};
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let template = Template::from_value(json!({"fields": [
///     {"name": "email", "label": "Email", "required": true, "validation": "email"},
///     {"name": "salary", "label": "Salary", "validation": {"type": "range", "condition": "1000-50000"}}
/// ]})).unwrap();
///
/// let engine = ValidationEngine::new();
/// let result = engine
///     .validate(&template, &json!({"email": "", "salary": 999}), &ValidationContext::form())
///     .await;
///
/// assert!(!result.valid);
/// assert_eq!(result.error("email"), Some("Email is required"));
/// assert_eq!(result.error("salary"), Some("Salary must be between 1000 and 50000"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ValidationEngine {
    registry: Arc<RuleRegistry>,
    config: EngineConfig,
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// How one rule ended after fault isolation.
enum RuleEvaluation {
    Completed(RuleOutcome),
    Faulted,
}

/// Per-field result before aggregation.
struct FieldEvaluationResult {
    applicable: bool,
    issue: Option<ValidationIssue>,
    rules_evaluated: usize,
    rules_skipped: usize,
    rule_faults: usize,
}

impl FieldEvaluationResult {
    fn not_applicable() -> Self {
        Self {
            applicable: false,
            issue: None,
            rules_evaluated: 0,
            rules_skipped: 0,
            rule_faults: 0,
        }
    }

    fn applicable() -> Self {
        Self {
            applicable: true,
            ..Self::not_applicable()
        }
    }
}

impl ValidationEngine {
    /// Creates an engine with every built-in rule and the default configuration.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Creates an engine with every built-in rule and the given configuration.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(RuleRegistry::with_builtins()),
            config,
        }
    }

    /// Starts building an engine.
    pub fn builder() -> ValidationEngineBuilder {
        ValidationEngineBuilder::default()
    }

    /// Returns the rule registry.
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates form data and returns `{valid, errors}`.
    ///
    /// Never fails: an engine fault, such as form data that is not a JSON
    /// object, is resolved through the configured [`FaultPolicy`].
    #[instrument(skip_all, fields(template = template.name().unwrap_or("<unnamed>"), scope = %context.scope()))]
    pub async fn validate(
        &self,
        template: &Template,
        form_data: &Value,
        context: &ValidationContext,
    ) -> ValidationResult {
        match self.try_validate(template, form_data, context).await {
            Ok(report) => report.result,
            Err(error) => self.apply_fault_policy(&error),
        }
    }

    /// Validates form data and returns the result with issues and metrics.
    ///
    /// Engine faults are resolved through the configured [`FaultPolicy`].
    pub async fn validate_detailed(
        &self,
        template: &Template,
        form_data: &Value,
        context: &ValidationContext,
    ) -> ValidationReport {
        match self.try_validate(template, form_data, context).await {
            Ok(report) => report,
            Err(error) => ValidationReport {
                result: self.apply_fault_policy(&error),
                ..ValidationReport::default()
            },
        }
    }

    /// Validates form data, surfacing engine faults as [`GuardError::EngineFault`].
    pub async fn try_validate(
        &self,
        template: &Template,
        form_data: &Value,
        context: &ValidationContext,
    ) -> Result<ValidationReport> {
        let Value::Object(form) = form_data else {
            return Err(GuardError::engine_fault(format!(
                "form data must be a JSON object, found {}",
                json_type_name(form_data)
            )));
        };

        AssertUnwindSafe(self.validate_form(template, form, context))
            .catch_unwind()
            .await
            .map_err(|panic| {
                GuardError::engine_fault(format!(
                    "validation panicked: {}",
                    panic_message(panic.as_ref())
                ))
            })
    }

    /// Validates an already-decoded form.
    pub async fn validate_form(
        &self,
        template: &Template,
        form: &FormData,
        context: &ValidationContext,
    ) -> ValidationReport {
        let start = Instant::now();

        let evaluations = match self.config.field_evaluation {
            FieldEvaluation::Sequential => {
                let mut evaluations = Vec::with_capacity(template.len());
                for field in template.fields() {
                    evaluations.push(self.evaluate_field(field, form, context).await);
                }
                evaluations
            }
            FieldEvaluation::Concurrent => {
                join_all(
                    template
                        .fields()
                        .iter()
                        .map(|field| self.evaluate_field(field, form, context)),
                )
                .await
            }
        };

        let mut report = ValidationReport::new();
        let mut metrics = ValidationMetrics {
            total_fields: template.len(),
            ..ValidationMetrics::default()
        };

        for evaluation in evaluations {
            if !evaluation.applicable {
                metrics.not_applicable_fields += 1;
                continue;
            }
            metrics.evaluated_fields += 1;
            metrics.rules_evaluated += evaluation.rules_evaluated;
            metrics.rules_skipped += evaluation.rules_skipped;
            metrics.rule_faults += evaluation.rule_faults;
            match evaluation.issue {
                Some(issue) => {
                    metrics.failed_fields += 1;
                    report.add_issue(issue);
                }
                None => metrics.passed_fields += 1,
            }
        }

        metrics.execution_time_ms = start.elapsed().as_millis() as u64;
        report.metrics = metrics;

        if self.config.log.base_level >= Level::INFO {
            info!(
                valid = report.result.valid,
                errors = report.result.error_count(),
                fields.evaluated = report.metrics.evaluated_fields,
                rules.evaluated = report.metrics.rules_evaluated,
                rules.faults = report.metrics.rule_faults,
                duration_ms = report.metrics.execution_time_ms,
                "Validation completed"
            );
        }
        report
    }

    /// Evaluates a single rule against a value, for rule testing tools.
    ///
    /// The value is validated as a field named `value`; `form_data`
    /// supplies siblings for cross-field rules. Returns the error message,
    /// or `None` when the rule passes, is skipped or faults.
    pub async fn test_rule(
        &self,
        rule: &RuleSpec,
        value: &Value,
        form_data: &Value,
        context: &ValidationContext,
    ) -> Option<String> {
        let mut form = form_data.as_object().cloned().unwrap_or_default();
        form.insert(TEST_FIELD.to_string(), value.clone());

        let field = FieldDefinition::builder(TEST_FIELD)
            .label("Value")
            .build()
            .ok()?;
        let compiled = CompiledRule::compile(rule.clone(), TEST_FIELD);

        match self
            .evaluate_rule(&field, &compiled, field_value(&form, TEST_FIELD), &form, context)
            .await
        {
            RuleEvaluation::Completed(outcome) => outcome.error().map(str::to_string),
            RuleEvaluation::Faulted => None,
        }
    }

    fn apply_fault_policy(&self, error: &GuardError) -> ValidationResult {
        match self.config.fault_policy {
            FaultPolicy::FailOpen => {
                warn!(error = %error, "Engine fault; failing open");
                ValidationResult::fail_open()
            }
            FaultPolicy::FailClosed => {
                warn!(error = %error, "Engine fault; failing closed");
                ValidationResult::faulted(error.to_string())
            }
        }
    }

    async fn evaluate_field(
        &self,
        field: &FieldDefinition,
        form: &FormData,
        context: &ValidationContext,
    ) -> FieldEvaluationResult {
        if !field.applies_to(context.scope()) {
            perf_debug!(self.config.log, field = field.name(), scope = %context.scope(), "Field not applicable");
            return FieldEvaluationResult::not_applicable();
        }

        let mut result = FieldEvaluationResult::applicable();
        let value = field_value(form, field.name());

        if field.is_required() && is_empty_value(value) {
            result.issue = Some(ValidationIssue {
                field: field.name().to_string(),
                rule: "required".to_string(),
                kind: FieldErrorKind::MissingRequiredValue,
                message: format!("{} is required", field.label()),
            });
            return result;
        }

        for rule in field.rules() {
            if !rule.is_active() {
                result.rules_skipped += 1;
                continue;
            }

            let outcome = match self.evaluate_rule(field, rule, value, form, context).await {
                RuleEvaluation::Completed(outcome) => outcome,
                RuleEvaluation::Faulted => {
                    result.rule_faults += 1;
                    continue;
                }
            };

            log_rule!(
                self.config.log,
                field = field.name(),
                rule = rule.canonical_name(),
                value = %self.config.log.render_value(value),
                status = ?outcome.status,
                "Rule evaluated"
            );

            match outcome.status {
                RuleStatus::Pass => result.rules_evaluated += 1,
                RuleStatus::Skipped => result.rules_skipped += 1,
                RuleStatus::Fail => {
                    result.rules_evaluated += 1;
                    result.issue = Some(ValidationIssue {
                        field: field.name().to_string(),
                        rule: rule.spec().rule_type.clone(),
                        kind: outcome.kind.unwrap_or_else(|| rule.error_kind()),
                        message: outcome
                            .message
                            .unwrap_or_else(|| format!("{} is invalid", field.label())),
                    });
                    break;
                }
            }
        }
        result
    }

    /// Runs one rule, converting errors and panics into a skipped rule.
    async fn evaluate_rule(
        &self,
        field: &FieldDefinition,
        rule: &CompiledRule,
        value: &Value,
        form: &FormData,
        context: &ValidationContext,
    ) -> RuleEvaluation {
        let input = RuleInput {
            field,
            rule,
            value,
            form_data: form,
            context,
        };

        match AssertUnwindSafe(self.dispatch(&input)).catch_unwind().await {
            Ok(Ok(outcome)) => RuleEvaluation::Completed(outcome),
            Ok(Err(error)) => {
                warn!(
                    field = field.name(),
                    rule = %rule.spec().rule_type,
                    error = %error,
                    "Rule faulted and was skipped"
                );
                RuleEvaluation::Faulted
            }
            Err(panic) => {
                warn!(
                    field = field.name(),
                    rule = %rule.spec().rule_type,
                    panic = %panic_message(panic.as_ref()),
                    "Rule panicked and was skipped"
                );
                RuleEvaluation::Faulted
            }
        }
    }

    /// Resolves a rule: context override, then task-scoped override, then registry.
    async fn dispatch(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        if let Some(resolver) = input.context.override_resolver() {
            return run_override(resolver.as_ref(), input).await;
        }
        if let Some(resolver) = legacy_override() {
            return run_override(resolver.as_ref(), input).await;
        }

        let Some(handler) = self.registry.get(input.rule.canonical_name()) else {
            perf_debug!(
                self.config.log,
                rule = input.rule.canonical_name(),
                "No handler registered; rule ignored"
            );
            return Ok(RuleOutcome::skipped("no handler registered"));
        };

        if let RuleParams::Unresolved(reason) = input.params() {
            return Err(GuardError::invalid_rule(
                &input.rule.spec().rule_type,
                reason.as_str(),
            ));
        }

        handler.evaluate(input).await
    }
}

async fn run_override(resolver: &dyn OverrideResolver, input: &RuleInput<'_>) -> Result<RuleOutcome> {
    let verdict = resolver
        .resolve(OverrideInput {
            value: input.value,
            field: input.field,
            rule: input.rule.spec(),
            params: input.params(),
            form_data: input.form_data,
            context: input.context,
        })
        .await?;

    Ok(match verdict {
        Some(message) => RuleOutcome::fail(input.rule.error_kind(), message),
        None => RuleOutcome::pass(),
    })
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Builder for [`ValidationEngine`].
///
/// # Examples
///
/// ```rust
/// use form_guard::core::{FaultPolicy, ValidationEngine};
/// use form_guard::rules::RequiredRule;
/// use std::sync::Arc;
///
/// let engine = ValidationEngine::builder()
///     .fault_policy(FaultPolicy::FailClosed)
///     .register("mandatory", Arc::new(RequiredRule))
///     .build();
///
/// assert!(engine.registry().contains("mandatory"));
/// ```
#[derive(Debug)]
pub struct ValidationEngineBuilder {
    registry: RuleRegistry,
    config: EngineConfig,
}

impl Default for ValidationEngineBuilder {
    fn default() -> Self {
        Self {
            registry: RuleRegistry::with_builtins(),
            config: EngineConfig::default(),
        }
    }
}

impl ValidationEngineBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the fault policy.
    pub fn fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.config.fault_policy = policy;
        self
    }

    /// Sets the field evaluation mode.
    pub fn field_evaluation(mut self, mode: FieldEvaluation) -> Self {
        self.config.field_evaluation = mode;
        self
    }

    /// Replaces the registry, dropping the built-ins.
    pub fn registry(mut self, registry: RuleRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Registers a handler for a rule type.
    pub fn register(mut self, type_name: &str, handler: BoxedRuleHandler) -> Self {
        self.registry.register(type_name, handler);
        self
    }

    /// Builds the engine.
    pub fn build(self) -> ValidationEngine {
        ValidationEngine {
            registry: Arc::new(self.registry),
            config: self.config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{override_fn, validator_fn, RuleHandler};
    use async_trait::async_trait;
    use serde_json::json;

    fn template(fields: Value) -> Template {
        Template::from_value(fields).unwrap()
    }

    #[derive(Debug)]
    struct PanickingRule;

    #[async_trait]
    impl RuleHandler for PanickingRule {
        async fn evaluate(&self, _input: &RuleInput<'_>) -> Result<RuleOutcome> {
            panic!("handler bug");
        }

        fn name(&self) -> &str {
            "explode"
        }
    }

    #[tokio::test]
    async fn test_required_short_circuits_rules() {
        let template = template(json!([{
            "name": "email", "label": "Email", "required": true,
            "validation": [{"type": "email"}, {"type": "custom", "condition": "neverCalled"}]
        }]));
        let ctx = ValidationContext::form().with_custom_validator(
            "neverCalled",
            validator_fn(|_| panic!("rules must not run for an empty required field")),
        );

        let report = ValidationEngine::new()
            .validate_detailed(&template, &json!({"email": "   "}), &ctx)
            .await;
        assert_eq!(report.result.error("email"), Some("Email is required"));
        assert_eq!(report.issues[0].kind, FieldErrorKind::MissingRequiredValue);
        assert_eq!(report.metrics.rules_evaluated, 0);
        assert_eq!(report.metrics.rule_faults, 0);
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let template = template(json!([{
            "name": "code",
            "validation": [
                {"type": "regex", "condition": "^[0-9]+$", "message": "digits only"},
                {"type": "range", "condition": "1-10"}
            ]
        }]));

        let report = ValidationEngine::new()
            .validate_detailed(&template, &json!({"code": "abc"}), &ValidationContext::form())
            .await;
        assert_eq!(report.result.error("code"), Some("digits only"));
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].rule, "regex");
    }

    #[tokio::test]
    async fn test_unknown_rule_is_noop() {
        let template = template(json!([{"name": "iban", "validation": "iban-check"}]));
        let result = ValidationEngine::new()
            .validate(&template, &json!({"iban": "nonsense"}), &ValidationContext::form())
            .await;
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_applicability() {
        let template = template(json!([
            {"name": "bankAccount", "required": true, "applicable": ["upload"]},
            {"name": "email", "required": true}
        ]));
        let engine = ValidationEngine::new();

        let form = engine
            .validate_detailed(&template, &json!({}), &ValidationContext::form())
            .await;
        assert!(form.result.error("bankAccount").is_none());
        assert!(form.result.error("email").is_some());
        assert_eq!(form.metrics.not_applicable_fields, 1);

        let upload = engine
            .validate(&template, &json!({}), &ValidationContext::upload())
            .await;
        assert!(upload.error("bankAccount").is_some());
    }

    #[tokio::test]
    async fn test_faulting_rule_is_skipped() {
        let template = template(json!([{
            "name": "code",
            "validation": [{"type": "explode"}, {"type": "regex", "condition": "^A"}]
        }]));
        let engine = ValidationEngine::builder()
            .register("explode", Arc::new(PanickingRule))
            .build();

        let report = engine
            .validate_detailed(&template, &json!({"code": "B"}), &ValidationContext::form())
            .await;
        assert_eq!(report.metrics.rule_faults, 1);
        assert_eq!(report.result.error("code"), Some("code format is invalid"));
    }

    #[tokio::test]
    async fn test_unresolved_rule_never_blocks() {
        let template = template(json!([{
            "name": "code",
            "validation": {"type": "regex", "condition": "(?<=x)y"}
        }]));
        let report = ValidationEngine::new()
            .validate_detailed(&template, &json!({"code": "anything"}), &ValidationContext::form())
            .await;
        assert!(report.is_valid());
        assert_eq!(report.metrics.rule_faults, 1);
    }

    #[tokio::test]
    async fn test_fault_policies() {
        let template = template(json!([{"name": "email", "required": true}]));

        let open = ValidationEngine::new()
            .validate(&template, &json!("not an object"), &ValidationContext::form())
            .await;
        assert_eq!(open, ValidationResult::fail_open());

        let closed = ValidationEngine::builder()
            .fault_policy(FaultPolicy::FailClosed)
            .build()
            .validate(&template, &json!([1, 2]), &ValidationContext::form())
            .await;
        assert!(!closed.valid);
        assert!(closed.errors.is_empty());
        assert!(closed.fault.unwrap().contains("array"));

        let surfaced = ValidationEngine::new()
            .try_validate(&template, &Value::Null, &ValidationContext::form())
            .await;
        assert!(matches!(surfaced, Err(GuardError::EngineFault(_))));
    }

    #[tokio::test]
    async fn test_context_override_takes_control() {
        let template = template(json!([
            {"name": "email", "validation": "email"},
            {"name": "salary", "validation": {"type": "salary-range"}}
        ]));
        let ctx = ValidationContext::form().with_override(override_fn(|input| {
            Ok((input.field.name() == "salary").then(|| "server says no".to_string()))
        }));

        let result = ValidationEngine::new()
            .validate(&template, &json!({"email": "broken", "salary": 5000}), &ctx)
            .await;
        assert!(result.error("email").is_none());
        assert_eq!(result.error("salary"), Some("server says no"));
    }

    #[tokio::test]
    async fn test_concurrent_matches_sequential() {
        let template = template(json!([
            {"name": "a", "required": true},
            {"name": "b", "validation": {"type": "range", "condition": "1-5"}},
            {"name": "c", "validation": "email"},
            {"name": "d", "validation": "phone"}
        ]));
        let data = json!({"b": 9, "c": "nope", "d": "+1 415 555 2671"});
        let ctx = ValidationContext::form();

        let sequential = ValidationEngine::new().validate(&template, &data, &ctx).await;
        let concurrent = ValidationEngine::builder()
            .field_evaluation(FieldEvaluation::Concurrent)
            .build()
            .validate(&template, &data, &ctx)
            .await;

        assert_eq!(sequential, concurrent);
        assert_eq!(sequential.error_count(), 3);
    }

    #[tokio::test]
    async fn test_rule_tester() {
        let engine = ValidationEngine::new();
        let ctx = ValidationContext::form();

        let error = engine
            .test_rule(
                &RuleSpec::new("range").with_condition("1000-50000"),
                &json!(999),
                &json!({}),
                &ctx,
            )
            .await;
        assert_eq!(error.as_deref(), Some("Value must be between 1000 and 50000"));

        let pass = engine
            .test_rule(&RuleSpec::new("email"), &json!("a@b.com"), &Value::Null, &ctx)
            .await;
        assert!(pass.is_none());

        let cross = engine
            .test_rule(
                &RuleSpec::new("date-before").with_condition("joiningDate"),
                &json!("2025-01-01"),
                &json!({"joiningDate": "2023-01-15"}),
                &ctx,
            )
            .await;
        assert_eq!(cross.as_deref(), Some("Value must be before joiningDate"));

        let small_number = engine
            .test_rule(&RuleSpec::new("date"), &json!(7), &Value::Null, &ctx)
            .await;
        assert_eq!(small_number.as_deref(), Some("Value must be a valid date"));
        let serial = engine
            .test_rule(&RuleSpec::new("date"), &json!(45000), &Value::Null, &ctx)
            .await;
        assert!(serial.is_none());
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "unknown panic");
    }
}
