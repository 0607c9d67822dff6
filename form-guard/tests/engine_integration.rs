//! End-to-end tests of the validation engine against JSON templates.

use form_guard::core::{
    async_validator_fn, override_fn, FaultPolicy, FieldErrorKind, FieldEvaluation, FormData,
    RuleSpec, Template, ValidationContext, ValidationEngine, ValidationResult, LEGACY_OVERRIDE,
};
use form_guard::error::GuardError;
use form_guard::test_fixtures::{
    employee_template, fixture_context, invalid_cases, valid_employee,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn template(value: Value) -> Template {
    Template::from_value(value).unwrap()
}

async fn validate(template: &Template, data: Value) -> ValidationResult {
    ValidationEngine::new()
        .validate(template, &data, &ValidationContext::form())
        .await
}

#[tokio::test]
async fn test_required_field_reports_single_error() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let ctx = ValidationContext::form().with_custom_validator(
        "counting",
        async_validator_fn(move |_request| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Some("should not be reported".to_string()))
            }
        }),
    );
    let template = template(json!([{
        "name": "managerId", "label": "Manager", "required": true,
        "validation": [{"type": "custom", "condition": "counting"}, "email"]
    }]));

    for empty in [json!(null), json!(""), json!("  ")] {
        let result = ValidationEngine::new()
            .validate(&template, &json!({"managerId": empty}), &ctx)
            .await;
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.error("managerId"), Some("Manager is required"));
    }
    let missing = ValidationEngine::new().validate(&template, &json!({}), &ctx).await;
    assert_eq!(missing.error("managerId"), Some("Manager is required"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unknown_rule_types_are_ignored() {
    let template = template(json!([
        {"name": "iban", "validation": "iban-check"},
        {"name": "code", "validation": {"type": "Not A Real Rule", "condition": {"x": 1}}},
        {"name": "notes", "validation": "none"}
    ]));
    let result = validate(&template, json!({"iban": "??", "code": 5, "notes": "x"})).await;
    assert_eq!(result, ValidationResult::new());
}

#[tokio::test]
async fn test_idempotent_results() {
    let template = employee_template().unwrap();
    let engine = ValidationEngine::new();
    let ctx = fixture_context();
    let mut data = valid_employee();
    data["email"] = json!("broken");
    data["basicSalary"] = json!(5);

    let first = engine.validate(&template, &data, &ctx).await;
    let second = engine.validate(&template, &data, &ctx).await;
    assert_eq!(first, second);
    assert_eq!(first.error_count(), 2);
}

#[tokio::test]
async fn test_first_declared_failing_rule_wins() {
    let template = template(json!([{
        "name": "salary", "label": "Salary",
        "validation": [
            {"type": "format-check", "condition": "integer"},
            {"type": "range", "condition": "1000-50000"}
        ]
    }]));
    let result = validate(&template, json!({"salary": 12.5})).await;
    assert_eq!(result.error("salary"), Some("Salary must be a whole number"));
}

#[tokio::test]
async fn test_range_inclusivity() {
    let template = template(json!([{
        "name": "salary", "label": "Salary",
        "validation": {"type": "range", "condition": "1000-50000"}
    }]));
    for (value, valid) in [(1000, true), (999, false), (50000, true), (50001, false)] {
        let result = validate(&template, json!({"salary": value})).await;
        assert_eq!(result.valid, valid, "salary {value}");
    }
}

#[tokio::test]
async fn test_regex_full_match() {
    let template = template(json!([{
        "name": "employeeId",
        "validation": {"type": "regex", "condition": "^[a-zA-Z0-9]+$"}
    }]));
    assert!(validate(&template, json!({"employeeId": "EMP001"})).await.valid);
    assert!(!validate(&template, json!({"employeeId": "EMP@001"})).await.valid);
}

#[tokio::test]
async fn test_uniqueness_against_existing_records() {
    let template = template(json!([{"name": "email", "label": "Email", "validation": "unique"}]));
    let mut record = FormData::new();
    record.insert("email".to_string(), json!("a@b.com"));
    let ctx = ValidationContext::form().with_existing_records(vec![record]);
    let engine = ValidationEngine::new();

    let taken = engine.validate(&template, &json!({"email": "a@b.com"}), &ctx).await;
    assert_eq!(taken.error("email"), Some("Email already exists"));
    let free = engine.validate(&template, &json!({"email": "c@d.com"}), &ctx).await;
    assert!(free.valid);

    let no_records = validate(&template, json!({"email": "a@b.com"})).await;
    assert!(no_records.valid);
}

#[tokio::test]
async fn test_conditional_required() {
    let template = template(json!([{
        "name": "managerId", "label": "Manager ID",
        "validation": {"type": "conditional-required", "condition": "department=IT"}
    }]));
    let it = validate(&template, json!({"department": "IT", "managerId": ""})).await;
    assert_eq!(
        it.error("managerId"),
        Some("Manager ID is required when department is IT")
    );
    assert!(validate(&template, json!({"department": "HR", "managerId": ""})).await.valid);
    assert!(validate(&template, json!({"managerId": ""})).await.valid);
}

#[tokio::test]
async fn test_conditional_required_strict_equality() {
    let template = template(json!([{
        "name": "managerId", "label": "Manager ID",
        "validation": {"type": "conditional-required", "condition": "department === 'IT'"}
    }]));
    let it = validate(&template, json!({"department": "IT", "managerId": ""})).await;
    assert_eq!(
        it.error("managerId"),
        Some("Manager ID is required when department is IT")
    );
    assert!(validate(&template, json!({"department": "HR", "managerId": ""})).await.valid);
}

#[tokio::test]
async fn test_date_before_sibling() {
    let template = template(json!([{
        "name": "birthDate", "label": "Birth Date",
        "validation": {"type": "date-before", "condition": "joiningDate"}
    }]));
    let pass = validate(&template, json!({"birthDate": "1990-01-01", "joiningDate": "2023-01-15"})).await;
    assert!(pass.valid);
    let fail = validate(&template, json!({"birthDate": "2025-01-01", "joiningDate": "2023-01-15"})).await;
    assert_eq!(fail.error("birthDate"), Some("Birth Date must be before joiningDate"));
    let no_reference = validate(&template, json!({"birthDate": "2025-01-01"})).await;
    assert!(no_reference.valid);
}

#[tokio::test]
async fn test_date_messages_use_sibling_label() {
    let template = template(json!([
        {"name": "joiningDate", "label": "Joining Date", "validation": "date"},
        {"name": "confirmationDate", "label": "Confirmation Date",
         "validation": {"type": "date-after", "condition": "joiningDate"}}
    ]));
    let result = validate(
        &template,
        json!({"joiningDate": "2023-03-01", "confirmationDate": "2023-01-01"}),
    )
    .await;
    assert_eq!(
        result.error("confirmationDate"),
        Some("Confirmation Date must be after Joining Date")
    );
}

#[tokio::test]
async fn test_employee_template_valid_row() {
    let template = employee_template().unwrap();
    let result = ValidationEngine::new()
        .validate(&template, &valid_employee(), &fixture_context())
        .await;
    assert_eq!(result, ValidationResult::new(), "errors: {:?}", result.errors);
}

#[tokio::test]
async fn test_employee_template_single_field_mutations() {
    let template = employee_template().unwrap();
    let engine = ValidationEngine::new();
    let ctx = fixture_context();

    for case in invalid_cases() {
        let report = engine.validate_detailed(&template, &case.record(), &ctx).await;
        assert_eq!(
            report.result.errors.len(),
            1,
            "{}: {:?}",
            case.description,
            report.result.errors
        );
        assert_eq!(report.result.error(case.field), Some(case.message), "{}", case.description);
        assert_eq!(report.issues[0].kind, case.kind, "{}", case.description);
    }
}

#[tokio::test]
async fn test_upload_only_fields() {
    let template = employee_template().unwrap();
    let mut data = valid_employee();
    data.as_object_mut().unwrap().remove("bankAccount");

    let engine = ValidationEngine::new();
    let form = engine.validate(&template, &data, &fixture_context()).await;
    assert!(form.valid);

    let upload = engine
        .validate(&template, &data, &fixture_context().with_scope("upload"))
        .await;
    assert_eq!(upload.error("bankAccount"), Some("Bank Account is required"));
}

#[tokio::test]
async fn test_template_message_overrides_default() {
    let template = template(json!([{
        "name": "phone",
        "validation": {"type": "phone-format", "message": "Enter a reachable number"}
    }]));
    let result = validate(&template, json!({"phone": "12"})).await;
    assert_eq!(result.error("phone"), Some("Enter a reachable number"));
}

#[tokio::test]
async fn test_inactive_rules_are_skipped() {
    let template = template(json!([{
        "name": "email",
        "validation": [{"type": "email", "IsActive": "false"}]
    }]));
    assert!(validate(&template, json!({"email": "nope"})).await.valid);
}

#[tokio::test]
async fn test_custom_validator_errors_skip_the_rule() {
    let template = template(json!([{
        "name": "code", "label": "Code",
        "validation": [{"type": "custom", "condition": "remote"}, {"type": "regex", "condition": "^A"}]
    }]));
    let ctx = ValidationContext::form().with_custom_validator(
        "remote",
        async_validator_fn(|request| async move {
            Err(GuardError::custom_validator(
                "remote",
                format!("service unavailable for {}", request.field_name),
            ))
        }),
    );

    let report = ValidationEngine::new()
        .validate_detailed(&template, &json!({"code": "B"}), &ctx)
        .await;
    assert_eq!(report.metrics.rule_faults, 1);
    assert_eq!(report.result.error("code"), Some("Code format is invalid"));
}

#[tokio::test]
async fn test_override_resolver_bypasses_builtins() {
    let template = template(json!([
        {"name": "email", "validation": "email"},
        {"name": "department", "validation": "department-check"}
    ]));
    let ctx = ValidationContext::form().with_override(override_fn(|input| {
        Ok(match input.rule.rule_type.as_str() {
            "department-check" => Some(format!("{} is closed for hiring", input.value)),
            _ => None,
        })
    }));

    let result = ValidationEngine::new()
        .validate(&template, &json!({"email": "not-an-email", "department": "Legal"}), &ctx)
        .await;
    assert!(result.error("email").is_none());
    assert_eq!(result.error("department"), Some("\"Legal\" is closed for hiring"));
}

#[tokio::test]
async fn test_legacy_override_is_task_scoped() {
    let template = template(json!([{"name": "email", "validation": "email"}]));
    let resolver = override_fn(|_| Ok(Some("legacy says no".to_string())));
    let engine = ValidationEngine::new();
    let data = json!({"email": "a@b.com"});

    let scoped = LEGACY_OVERRIDE
        .scope(resolver, async {
            engine.validate(&template, &data, &ValidationContext::form()).await
        })
        .await;
    assert_eq!(scoped.error("email"), Some("legacy says no"));

    let outside = engine.validate(&template, &data, &ValidationContext::form()).await;
    assert!(outside.valid);

    let explicit = override_fn(|_| Ok(None));
    let context_wins = LEGACY_OVERRIDE
        .scope(override_fn(|_| Ok(Some("legacy".to_string()))), async {
            engine
                .validate(&template, &data, &ValidationContext::form().with_override(explicit))
                .await
        })
        .await;
    assert!(context_wins.valid);
}

#[tokio::test]
async fn test_fail_closed_surfaces_fault() {
    let template = template(json!([{"name": "email", "required": true}]));
    let engine = ValidationEngine::builder()
        .fault_policy(FaultPolicy::FailClosed)
        .build();

    let result = engine
        .validate(&template, &json!("nonsense"), &ValidationContext::form())
        .await;
    assert!(!result.valid);
    assert!(result.errors.is_empty());
    assert!(result.is_fault());

    let open = ValidationEngine::new()
        .validate(&template, &json!("nonsense"), &ValidationContext::form())
        .await;
    assert!(open.valid);
}

#[tokio::test]
async fn test_concurrent_evaluation_matches_sequential() {
    let template = employee_template().unwrap();
    let ctx = fixture_context();
    let concurrent = ValidationEngine::builder()
        .field_evaluation(FieldEvaluation::Concurrent)
        .build();
    let sequential = ValidationEngine::new();

    for case in invalid_cases() {
        let record = case.record();
        assert_eq!(
            concurrent.validate(&template, &record, &ctx).await,
            sequential.validate(&template, &record, &ctx).await,
            "{}",
            case.description
        );
    }
}

#[tokio::test]
async fn test_overlapping_calls_are_independent() {
    let template = Arc::new(employee_template().unwrap());
    let engine = ValidationEngine::new();
    let mut handles = Vec::new();

    for case in invalid_cases() {
        let engine = engine.clone();
        let template = Arc::clone(&template);
        handles.push(tokio::spawn(async move {
            let result = engine
                .validate(&template, &case.record(), &fixture_context())
                .await;
            (case, result)
        }));
    }

    for handle in handles {
        let (case, result) = handle.await.unwrap();
        assert_eq!(result.error(case.field), Some(case.message), "{}", case.description);
    }
}

#[tokio::test]
async fn test_rule_tester_matches_engine() {
    let engine = ValidationEngine::new();
    let ctx = ValidationContext::form();
    let rule = RuleSpec::new("department-check").with_condition("HR, IT");

    assert_eq!(
        engine.test_rule(&rule, &json!("Legal"), &json!({}), &ctx).await.as_deref(),
        Some("Value must be one of: HR, IT")
    );
    assert!(engine.test_rule(&rule, &json!("it"), &json!({}), &ctx).await.is_none());
}

#[tokio::test]
async fn test_issue_kinds() {
    let template = template(json!([
        {"name": "a", "required": true},
        {"name": "b", "validation": {"type": "date-after", "condition": "a"}},
        {"name": "c", "validation": {"type": "custom", "condition": "always"}}
    ]));
    let ctx = ValidationContext::form().with_custom_validator(
        "always",
        form_guard::core::validator_fn(|_| Some("nope".to_string())),
    );
    let report = ValidationEngine::new()
        .validate_detailed(&template, &json!({"b": "2020-01-01", "c": 1}), &ctx)
        .await;

    let kinds: Vec<FieldErrorKind> = report.issues.iter().map(|issue| issue.kind).collect();
    assert_eq!(
        kinds,
        vec![
            FieldErrorKind::MissingRequiredValue,
            FieldErrorKind::CustomValidatorFailure
        ]
    );
}
