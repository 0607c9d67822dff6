//! # form-guard - Template-Driven Form Validation for Rust
//!
//! form-guard validates HR and payroll form submissions against templates
//! loaded at runtime. A template lists the fields of a form; each field
//! carries a label, a required flag, the scopes it applies to and an ordered
//! list of rules. The engine returns `{valid, errors}` with at most one
//! message per field, ready to show next to the input.
//!
//! ## Quick Start
//!
//! ```rust
//! use form_guard::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> form_guard::error::Result<()> {
//! let template = Template::from_json(r#"{
//!     "name": "employee_onboarding",
//!     "fields": [
//!         {"name": "email", "label": "Email", "required": true, "validation": "email"},
//!         {"name": "salary", "label": "Salary", "validation": {"type": "salary-range"}},
//!         {"name": "department", "label": "Department", "validation": "department-check"}
//!     ]
//! }"#)?;
//!
//! let engine = ValidationEngine::new();
//! let result = engine
//!     .validate(
//!         &template,
//!         &json!({"email": "jane@corp.com", "salary": 250000, "department": "Finance"}),
//!         &ValidationContext::form(),
//!     )
//!     .await;
//!
//! assert!(!result.valid);
//! assert_eq!(result.error("salary"), Some("Salary must be between 1000 and 100000"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Key Features
//!
//! ### Built-in Rule Types
//!
//! - **Presence**: `required`, `conditional-required`
//! - **Format**: `regex`, `email`, `phone-format`, `format-check`
//! - **Ranges**: `range`, `salary-range`, `age`
//! - **Dates**: `date`, `date-before`, `date-after`, `date-range`
//! - **Lists and balances**: `department-check`, `leave-balance`
//! - **Uniqueness**: `unique`, `duplicate-check`
//! - **Extension**: `custom`, delegating to validators named in the context
//!
//! Rule type names are matched loosely: `Email_Format`, `emailformat` and
//! `email-format` all select the email rule. Unknown types are ignored.
//!
//! ### Never Blocking on Broken Rules
//!
//! A rule whose parameters cannot be read, or whose handler errors or
//! panics, is logged and skipped. An engine fault resolves through the
//! configured [`core::FaultPolicy`]: fail open by default, or fail closed
//! with a fault message.
//!
//! ### Bulk Uploads
//!
//! [`core::ValidationEngine::validate_batch`] validates spreadsheet rows in
//! the `upload` scope and summarizes failures per field.
//!
//! ### Observability
//!
//! Structured logging through the `tracing` crate. See [`logging::setup`]
//! for subscriber configuration and [`logging::LogConfig`] for per-rule detail.
//!
//! ## Architecture
//!
//! - **`core`**: templates, context, engine, results and batch validation
//! - **`rules`**: rule kinds, parameter resolution, handlers and the registry
//! - **`security`**: safe regex compilation and identifier checks
//! - **`formatters`**: JSON and human-readable report output
//! - **`logging`**: logging configuration and subscriber setup
//! - **`error`**: the crate error type

pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod rules;
pub mod security;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
