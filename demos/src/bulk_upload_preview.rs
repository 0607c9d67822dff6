//! Bulk upload preview: validate spreadsheet rows before import.
//!
//! This example shows how to:
//! - Load a template from a file
//! - Validate many rows in the `upload` scope, including upload-only fields
//! - Check uniqueness against stored records and within the upload itself
//! - Render a per-row preview and a JSON summary
//!
//! Run with:
//! ```bash
//! cargo run --example bulk_upload_preview
//! ```

use form_guard::core::{BatchOptions, EngineConfig, Template, ValidationEngine};
use form_guard::formatters::{FormatterConfig, HumanFormatter, JsonFormatter, ResultFormatter};
use form_guard::test_fixtures::{fixture_context, valid_employee, EMPLOYEE_TEMPLATE_JSON};
use serde_json::{json, Value};
use std::io::Write;

fn row(overrides: Value) -> Value {
    let mut row = valid_employee();
    if let (Some(target), Some(patch)) = (row.as_object_mut(), overrides.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
    row
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(EMPLOYEE_TEMPLATE_JSON.as_bytes())?;
    let template = Template::from_file(file.path())?;

    // Spreadsheet rows as decoded by the upload screen; dates may arrive as serial numbers
    let rows = vec![
        row(json!({"employeeId": "EMP2001", "email": "a.khan@corp.com", "joiningDate": 45000, "confirmationDate": 45200})),
        row(json!({"employeeId": "EMP2002", "email": "b.osei@corp.com", "bankAccount": ""})),
        row(json!({"employeeId": "EMP0001", "email": "c.li@corp.com"})),
        row(json!({"employeeId": "EMP2004", "email": "d.silva@corp.com", "basicSalary": "250,000"})),
        row(json!({"employeeId": "EMP2001", "email": "e.novak@corp.com"})),
        row(json!({"employeeId": "EMP2006", "email": "f.park@corp.com", "annualLeaveDays": 30, "department": "Legal"})),
    ];

    let engine = ValidationEngine::with_config(EngineConfig::high_throughput());
    let options = BatchOptions::default().with_in_batch_duplicates(true);
    let report = engine
        .validate_batch_with(&template, &rows, &fixture_context(), &options)
        .await;

    println!("Bulk upload preview\n");
    let human = HumanFormatter::with_config(FormatterConfig::default().with_valid_rows(true));
    println!("{}", human.format_batch(&report)?);

    println!("JSON summary for the import screen:");
    let json = JsonFormatter::with_config(FormatterConfig::plain().with_metrics(false));
    println!("{}", json.format_batch(&report)?);

    if report.all_valid() {
        println!("\nAll rows can be imported.");
    } else {
        println!(
            "\n{} of {} rows need fixing before import.",
            report.summary.invalid_rows, report.summary.total_rows
        );
    }
    Ok(())
}
