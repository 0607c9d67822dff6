//! Rule tester: try a rule definition against sample values.
//!
//! Mirrors the "test rule" panel of a template builder. Each rule is run
//! against a handful of values and the resulting message is printed.
//!
//! Run with:
//! ```bash
//! cargo run --example rule_tester
//! ```

use chrono::NaiveDate;
use form_guard::core::{override_fn, RuleSpec, ValidationContext, ValidationEngine};
use serde_json::{json, Value};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let engine = ValidationEngine::new();
    let context = ValidationContext::form()
        .with_reference_date(NaiveDate::from_ymd_opt(2025, 1, 1).ok_or("invalid reference date")?);

    let cases: Vec<(RuleSpec, Vec<Value>, Value)> = vec![
        (
            RuleSpec::new("regex").with_condition("/^emp\\d{3}$/i"),
            vec![json!("EMP001"), json!("EMP@001")],
            json!({}),
        ),
        (
            RuleSpec::new("salary-range"),
            vec![json!(999), json!("45,000"), json!(100_001)],
            json!({}),
        ),
        (
            RuleSpec::new("age").with_condition("21-58"),
            vec![json!("1990-06-30"), json!("06/30/2010"), json!("2023-02-30")],
            json!({}),
        ),
        (
            RuleSpec::new("date-after").with_condition("joiningDate"),
            vec![json!("2023-01-10"), json!("2023-03-01")],
            json!({"joiningDate": "2023-01-15"}),
        ),
        (
            RuleSpec::new("leave-balance").with_condition("annual:20,sick:10,casual:7"),
            vec![json!(5), json!(9)],
            json!({"leaveType": "Casual"}),
        ),
        (
            RuleSpec::new("format-check")
                .with_condition("percentage")
                .with_message("Enter a percentage"),
            vec![json!("12.5%"), json!(140)],
            json!({}),
        ),
    ];

    println!("Rule tester\n");
    for (rule, values, form_data) in &cases {
        println!("{} {}", rule.rule_type, rule.condition);
        for value in values {
            let verdict = engine.test_rule(rule, value, form_data, &context).await;
            match verdict {
                Some(message) => println!("  {value:<14} fail: {message}"),
                None => println!("  {value:<14} pass"),
            }
        }
        println!();
    }

    // A server-driven override replaces every built-in rule for the call
    let remote = context.clone().with_override(override_fn(|input| {
        Ok((input.rule.rule_type == "salary-range")
            .then(|| "Salary bands are locked for this cycle".to_string()))
    }));
    let verdict = engine
        .test_rule(&RuleSpec::new("salary-range"), &json!(5000), &json!({}), &remote)
        .await;
    println!("With override: {verdict:?}");

    Ok(())
}
