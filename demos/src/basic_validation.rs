//! Basic validation example demonstrating form-guard's core functionality.
//!
//! This example shows how to:
//! - Load a template written by a template builder
//! - Validate a form submission on every edit
//! - Plug in a custom validator and read the detailed report
//!
//! Run with:
//! ```bash
//! cargo run --example basic_validation
//! ```

use form_guard::core::{validator_fn, Template, ValidationContext, ValidationEngine};
use form_guard::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
use form_guard::logging::setup::{init_logging, LoggingConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default().with_engine_level(tracing::Level::INFO))?;

    let template = Template::from_json(
        r#"{
        "name": "new_hire",
        "fields": [
            {"name": "fullName", "label": "Full Name", "required": true},
            {"name": "workEmail", "label": "Work Email", "required": true, "validation": "email"},
            {"name": "mobile", "label": "Mobile", "validation": "phone-format"},
            {"name": "dateOfBirth", "label": "Date of Birth", "validation": {"type": "age", "condition": "18-60"}},
            {"name": "department", "label": "Department", "validation": {"type": "department-check", "condition": "Engineering, Finance, People"}},
            {"name": "employmentType", "label": "Employment Type", "required": true},
            {"name": "agencyName", "label": "Agency", "validation": {"type": "conditional-required", "condition": "employmentType=contract"}},
            {"name": "employeeCode", "label": "Employee Code", "validation": {"type": "custom", "condition": "companyCode"}}
        ]
    }"#,
    )?;

    let context = ValidationContext::form().with_custom_validator(
        "companyCode",
        validator_fn(|input| {
            let code = input.value.as_str().unwrap_or_default();
            (!code.is_empty() && !code.starts_with("ACME-"))
                .then(|| format!("{} must start with ACME-", input.field_name))
        }),
    );

    let engine = ValidationEngine::new();

    println!("Running basic validation example...\n");

    // A submission as the user types: first draft, then the corrected form
    let drafts = [
        json!({
            "fullName": "Priya Raman",
            "workEmail": "priya@",
            "mobile": "555",
            "dateOfBirth": "2011-04-02",
            "department": "Legal",
            "employmentType": "contract",
            "employeeCode": "X-1"
        }),
        json!({
            "fullName": "Priya Raman",
            "workEmail": "priya.raman@acme.io",
            "mobile": "+44 20 7946 0958",
            "dateOfBirth": "1991-04-02",
            "department": "finance",
            "employmentType": "contract",
            "agencyName": "Northwind Staffing",
            "employeeCode": "ACME-0042"
        }),
    ];

    let formatter = HumanFormatter::with_config(FormatterConfig::default().with_metrics(false));
    for (i, draft) in drafts.iter().enumerate() {
        println!("--- Draft {} ---", i + 1);
        let report = engine.validate_detailed(&template, draft, &context).await;
        println!("{}", formatter.format(&report)?);

        // The plain result is what a form renders next to each input
        println!("{}\n", serde_json::to_string_pretty(&report.result)?);
    }

    Ok(())
}
