//! Common test fixtures for employee form validation scenarios.
//!
//! The employee template declares 19 fields covering every built-in rule
//! kind. [`valid_employee`] passes it under [`fixture_context`], and each
//! [`InvalidCase`] patches that record to break exactly one field.

use crate::core::{
    validator_fn, CustomValidator, FieldErrorKind, FormData, Template, ValidationContext,
};
use crate::error::Result;
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::sync::Arc;

/// The employee onboarding template used across tests, demos and benches.
pub const EMPLOYEE_TEMPLATE_JSON: &str = r#"{
    "name": "employee_onboarding",
    "fields": [
        {"name": "employeeId", "label": "Employee ID", "required": true, "validation": [
            {"type": "regex", "condition": "^EMP\\d{4}$", "message": "Employee ID must look like EMP0000"},
            {"type": "unique"}
        ]},
        {"name": "firstName", "label": "First Name", "required": true,
         "validation": {"type": "regex", "condition": "^[A-Za-z][A-Za-z '\\-]*$"}},
        {"name": "lastName", "label": "Last Name", "required": true},
        {"name": "email", "label": "Email", "type": "email", "required": true,
         "validation": ["email", {"type": "duplicate-check"}]},
        {"name": "phone", "label": "Phone", "validation": "phone"},
        {"name": "dateOfBirth", "label": "Date of Birth", "type": "date", "required": true,
         "validation": ["date", {"type": "age", "condition": "18-60"}]},
        {"name": "joiningDate", "label": "Joining Date", "type": "date", "required": true,
         "validation": [{"type": "date-range", "condition": "2000-01-01:2030-12-31"}]},
        {"name": "confirmationDate", "label": "Confirmation Date", "type": "date",
         "validation": {"type": "date-after", "condition": "joiningDate"}},
        {"name": "probationEndDate", "label": "Probation End Date", "type": "date",
         "validation": {"type": "date-before", "condition": "2031-01-01"}},
        {"name": "department", "label": "Department", "required": true, "validation": "department-check"},
        {"name": "designation", "label": "Designation", "required": true},
        {"name": "basicSalary", "label": "Basic Salary", "type": "number", "required": true,
         "validation": {"type": "salary-range"}},
        {"name": "bonusPercentage", "label": "Bonus Percentage",
         "validation": {"type": "format-check", "condition": "percentage"}},
        {"name": "annualLeaveDays", "label": "Annual Leave Days", "validation": "leave-balance"},
        {"name": "employmentType", "label": "Employment Type", "required": true,
         "validation": {"type": "regex", "condition": "/^(permanent|contract)$/i",
                        "message": "Employment Type must be permanent or contract"}},
        {"name": "contractEndDate", "label": "Contract End Date", "type": "date",
         "validation": {"type": "conditional-required", "condition": "employmentType=contract"}},
        {"name": "bankAccount", "label": "Bank Account", "required": true, "applicable": ["upload"],
         "validation": {"type": "regex", "condition": "^\\d{9,18}$"}},
        {"name": "panNumber", "label": "PAN Number",
         "validation": {"type": "custom", "condition": "panFormat"}},
        {"name": "experienceYears", "label": "Experience Years", "validation": [
            {"type": "format-check", "condition": "integer"},
            {"type": "range", "condition": "0-50"}
        ]}
    ]
}"#;

/// Parses [`EMPLOYEE_TEMPLATE_JSON`].
pub fn employee_template() -> Result<Template> {
    Template::from_json(EMPLOYEE_TEMPLATE_JSON)
}

/// The date ages are computed against in fixture contexts.
pub fn reference_date() -> NaiveDate {
    #[allow(clippy::expect_used)]
    NaiveDate::from_ymd_opt(2025, 1, 1).expect("fixed calendar date should be valid")
}

/// A record that passes the employee template in both scopes.
pub fn valid_employee() -> Value {
    json!({
        "employeeId": "EMP1042",
        "firstName": "Jane",
        "lastName": "O'Neil",
        "email": "jane.oneil@corp.com",
        "phone": "+1 (415) 555-2671",
        "dateOfBirth": "1990-05-15",
        "joiningDate": "2020-03-01",
        "confirmationDate": "2020-09-01",
        "probationEndDate": "2020-08-31",
        "department": "finance",
        "designation": "Analyst",
        "basicSalary": "45,000",
        "bonusPercentage": "12.5%",
        "annualLeaveDays": 12,
        "employmentType": "Permanent",
        "contractEndDate": "",
        "bankAccount": "123456789012",
        "panNumber": "ABCDE1234F",
        "experienceYears": 6
    })
}

/// Records already stored, for uniqueness checks.
pub fn existing_employees() -> Vec<FormData> {
    [
        json!({"employeeId": "EMP0001", "email": "taken@corp.com"}),
        json!({"employeeId": "EMP0002", "email": "also.taken@corp.com"}),
    ]
    .into_iter()
    .filter_map(|record| record.as_object().cloned())
    .collect()
}

/// Accepts PAN numbers shaped `AAAAA9999A`.
pub fn pan_validator() -> Arc<dyn CustomValidator> {
    validator_fn(|input| {
        let text = input.value.as_str().map(str::trim).unwrap_or_default();
        if text.is_empty() {
            return None;
        }
        let chars: Vec<char> = text.chars().collect();
        let valid = chars.len() == 10
            && chars[..5].iter().all(char::is_ascii_uppercase)
            && chars[5..9].iter().all(char::is_ascii_digit)
            && chars[9].is_ascii_uppercase();
        (!valid).then(|| "PAN Number must be in the format AAAAA9999A".to_string())
    })
}

/// A form-scope context with existing records, the PAN validator and a fixed date.
pub fn fixture_context() -> ValidationContext {
    ValidationContext::form()
        .with_existing_records(existing_employees())
        .with_custom_validator("panFormat", pan_validator())
        .with_reference_date(reference_date())
}

/// A patch to [`valid_employee`] that breaks one field.
#[derive(Debug, Clone)]
pub struct InvalidCase {
    /// What the patch breaks
    pub description: &'static str,
    /// Values merged over the valid record
    pub patch: Value,
    /// The single field expected to fail
    pub field: &'static str,
    /// Expected error kind
    pub kind: FieldErrorKind,
    /// Expected message
    pub message: &'static str,
}

impl InvalidCase {
    /// Returns the valid record with the patch applied.
    pub fn record(&self) -> Value {
        let mut record = valid_employee();
        if let (Some(target), Some(patch)) = (record.as_object_mut(), self.patch.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
        }
        record
    }
}

/// One invalid variant per rule kind in the employee template.
pub fn invalid_cases() -> Vec<InvalidCase> {
    use FieldErrorKind::*;

    vec![
        InvalidCase {
            description: "employee id pattern",
            patch: json!({"employeeId": "E12"}),
            field: "employeeId",
            kind: FormatMismatch,
            message: "Employee ID must look like EMP0000",
        },
        InvalidCase {
            description: "employee id already stored",
            patch: json!({"employeeId": "EMP0001"}),
            field: "employeeId",
            kind: UniquenessViolation,
            message: "Employee ID already exists",
        },
        InvalidCase {
            description: "missing first name",
            patch: json!({"firstName": ""}),
            field: "firstName",
            kind: MissingRequiredValue,
            message: "First Name is required",
        },
        InvalidCase {
            description: "whitespace last name",
            patch: json!({"lastName": "   "}),
            field: "lastName",
            kind: MissingRequiredValue,
            message: "Last Name is required",
        },
        InvalidCase {
            description: "malformed email",
            patch: json!({"email": "jane.oneil@"}),
            field: "email",
            kind: FormatMismatch,
            message: "Email must be a valid email address",
        },
        InvalidCase {
            description: "email already stored",
            patch: json!({"email": "taken@corp.com"}),
            field: "email",
            kind: UniquenessViolation,
            message: "Email already exists",
        },
        InvalidCase {
            description: "short phone",
            patch: json!({"phone": "12345"}),
            field: "phone",
            kind: FormatMismatch,
            message: "Phone must be a valid phone number",
        },
        InvalidCase {
            description: "unparseable birth date",
            patch: json!({"dateOfBirth": "not-a-date"}),
            field: "dateOfBirth",
            kind: FormatMismatch,
            message: "Date of Birth must be a valid date",
        },
        InvalidCase {
            description: "under age",
            patch: json!({"dateOfBirth": "2010-01-01"}),
            field: "dateOfBirth",
            kind: RangeViolation,
            message: "Age must be between 18 and 60 years",
        },
        InvalidCase {
            description: "joining date out of range",
            patch: json!({"joiningDate": "1999-12-31"}),
            field: "joiningDate",
            kind: RangeViolation,
            message: "Joining Date must be between 2000-01-01 and 2030-12-31",
        },
        InvalidCase {
            description: "confirmation before joining",
            patch: json!({"confirmationDate": "2020-01-01"}),
            field: "confirmationDate",
            kind: CrossFieldOrderViolation,
            message: "Confirmation Date must be after Joining Date",
        },
        InvalidCase {
            description: "probation end after cutoff",
            patch: json!({"probationEndDate": "2031-06-01"}),
            field: "probationEndDate",
            kind: CrossFieldOrderViolation,
            message: "Probation End Date must be before 2031-01-01",
        },
        InvalidCase {
            description: "unknown department",
            patch: json!({"department": "Legal"}),
            field: "department",
            kind: ListMembershipViolation,
            message: "Department must be one of: HR, IT, Finance, Operations, Sales, Marketing",
        },
        InvalidCase {
            description: "salary above default range",
            patch: json!({"basicSalary": 150000}),
            field: "basicSalary",
            kind: RangeViolation,
            message: "Basic Salary must be between 1000 and 100000",
        },
        InvalidCase {
            description: "bonus over 100 percent",
            patch: json!({"bonusPercentage": 120}),
            field: "bonusPercentage",
            kind: FormatMismatch,
            message: "Bonus Percentage must be a percentage between 0 and 100",
        },
        InvalidCase {
            description: "leave above balance",
            patch: json!({"annualLeaveDays": 25}),
            field: "annualLeaveDays",
            kind: RangeViolation,
            message: "Annual Leave Days exceeds available annual leave balance (20)",
        },
        InvalidCase {
            description: "unknown employment type",
            patch: json!({"employmentType": "intern"}),
            field: "employmentType",
            kind: FormatMismatch,
            message: "Employment Type must be permanent or contract",
        },
        InvalidCase {
            description: "contract without end date",
            patch: json!({"employmentType": "contract", "contractEndDate": ""}),
            field: "contractEndDate",
            kind: ConditionalRequirementViolation,
            message: "Contract End Date is required when employmentType is contract",
        },
        InvalidCase {
            description: "malformed PAN",
            patch: json!({"panNumber": "ABC"}),
            field: "panNumber",
            kind: CustomValidatorFailure,
            message: "PAN Number must be in the format AAAAA9999A",
        },
        InvalidCase {
            description: "fractional experience",
            patch: json!({"experienceYears": 2.5}),
            field: "experienceYears",
            kind: FormatMismatch,
            message: "Experience Years must be a whole number",
        },
        InvalidCase {
            description: "experience out of range",
            patch: json!({"experienceYears": 60}),
            field: "experienceYears",
            kind: RangeViolation,
            message: "Experience Years must be between 0 and 50",
        },
    ]
}
