//! Property-based tests for form-guard.
//!
//! ## Test Categories
//!
//! ### 1. Bounds
//! - Numeric ranges are inclusive at both ends for any bounds
//! - Date ordering is strict
//!
//! ### 2. Orchestration
//! - Empty required values produce exactly one error
//! - Unknown rule types never contribute errors
//! - Identical calls produce identical results
//!
//! ### 3. Shapes
//! - Phone numbers are accepted exactly when they carry 7 to 15 digits

use chrono::{Duration, NaiveDate};
use form_guard::core::{Template, ValidationContext, ValidationEngine, ValidationResult};
use form_guard::test_fixtures::{employee_template, fixture_context, valid_employee};
use proptest::prelude::*;
use serde_json::{json, Value};

fn run(template: &Template, data: &Value, context: &ValidationContext) -> ValidationResult {
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(ValidationEngine::new().validate(template, data, context))
}

fn date_from_offset(days: i64) -> String {
    let epoch = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    (epoch + Duration::days(days)).format("%Y-%m-%d").to_string()
}

proptest! {
    /// Range bounds are inclusive: `min <= v <= max` passes, anything else fails.
    #[test]
    fn test_range_inclusive_property(
        min in -10_000i64..10_000,
        span in 0i64..10_000,
        offset in -200i64..200
    ) {
        let max = min + span;
        let value = if offset < 0 { min + offset } else { max - span / 2 + offset };
        let template = Template::from_value(json!([{
            "name": "amount",
            "validation": {"type": "range", "condition": format!("{min}:{max}")}
        }])).unwrap();

        let result = run(&template, &json!({"amount": value}), &ValidationContext::form());
        prop_assert_eq!(result.valid, value >= min && value <= max, "value {} in {}..={}", value, min, max);
    }

    /// `date-before` passes only for strictly earlier dates.
    #[test]
    fn test_date_before_is_strict(value_days in 0i64..20_000, reference_days in 0i64..20_000) {
        let template = Template::from_value(json!([{
            "name": "start",
            "validation": {"type": "date-before", "condition": "end"}
        }])).unwrap();
        let data = json!({
            "start": date_from_offset(value_days),
            "end": date_from_offset(reference_days)
        });

        let result = run(&template, &data, &ValidationContext::form());
        prop_assert_eq!(result.valid, value_days < reference_days);
    }

    /// A required field holding only whitespace yields one error and nothing else runs.
    #[test]
    fn test_required_whitespace_single_error(blank in "[ \t]{0,6}") {
        let template = Template::from_value(json!([{
            "name": "email",
            "label": "Email",
            "required": true,
            "validation": ["email", {"type": "regex", "condition": "^x$"}]
        }])).unwrap();

        let result = run(&template, &json!({"email": blank}), &ValidationContext::form());
        prop_assert_eq!(result.error_count(), 1);
        prop_assert_eq!(result.error("email"), Some("Email is required"));
    }

    /// Rule types outside the registry never contribute an error.
    #[test]
    fn test_unknown_rule_types_never_fail(
        suffix in "[a-z]{3,12}",
        value in "\\PC{0,20}"
    ) {
        let template = Template::from_value(json!([{
            "name": "field",
            "validation": {"type": format!("x-{suffix}"), "condition": "anything"}
        }])).unwrap();

        let result = run(&template, &json!({"field": value}), &ValidationContext::form());
        prop_assert!(result.valid);
    }

    /// Validating the same submission twice gives the same result.
    #[test]
    fn test_validation_is_idempotent(
        field in prop::sample::select(vec![
            "employeeId", "email", "phone", "dateOfBirth", "department",
            "basicSalary", "bonusPercentage", "annualLeaveDays", "experienceYears"
        ]),
        replacement in "[A-Za-z0-9@.%-]{0,12}"
    ) {
        let template = employee_template().unwrap();
        let context = fixture_context();
        let mut data = valid_employee();
        data[field] = json!(replacement);

        let first = run(&template, &data, &context);
        let second = run(&template, &data, &context);
        prop_assert_eq!(&first, &second);
        prop_assert!(first.error_count() <= 1);
    }

    /// Phone numbers need 7 to 15 digits after separators are removed.
    #[test]
    fn test_phone_digit_count(digits in "[0-9]{1,20}", plus in any::<bool>()) {
        let template = Template::from_value(json!([{"name": "phone", "validation": "phone-format"}])).unwrap();
        let phone = if plus { format!("+{digits}") } else { digits.clone() };

        let result = run(&template, &json!({"phone": phone}), &ValidationContext::form());
        prop_assert_eq!(result.valid, (7..=15).contains(&digits.len()));
    }
}
