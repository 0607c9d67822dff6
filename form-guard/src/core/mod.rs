//! Core validation types for form-guard.
//!
//! ## Overview
//!
//! - **[`Template`]**: the fields of a form and the rules attached to each
//! - **[`ValidationEngine`]**: evaluates form data against a template
//! - **[`ValidationContext`]**: scope, existing records, custom validators and overrides for one call
//! - **[`ValidationResult`]**: `{valid, errors}` with at most one message per field
//! - **[`RuleHandler`]**: the trait behind every rule type
//!
//! ## Flow
//!
//! ```text
//! Template
//!     └── FieldDefinition (applicable scopes, required)
//!         ├── CompiledRule 1 ──► RuleRegistry ──► RuleHandler
//!         └── CompiledRule 2 ──► RuleRegistry ──► RuleHandler
//! ```
//!
//! For every field that applies to the context scope the engine checks
//! `required` first, then the active rules in order. The first failing rule
//! produces the field's message and later rules are not run.
//!
//! ## Example
//!
//! ```rust
//! use form_guard::core::{Template, ValidationContext, ValidationEngine};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> form_guard::error::Result<()> {
//! let template = Template::from_json(r#"[
//!     {"name": "joiningDate", "label": "Joining Date", "validation": "date"},
//!     {"name": "confirmationDate", "label": "Confirmation Date",
//!      "validation": {"type": "date-after", "condition": "joiningDate"}}
//! ]"#)?;
//!
//! let result = ValidationEngine::new()
//!     .validate(
//!         &template,
//!         &json!({"joiningDate": "2024-03-01", "confirmationDate": "2024-01-01"}),
//!         &ValidationContext::form(),
//!     )
//!     .await;
//!
//! assert_eq!(
//!     result.error("confirmationDate"),
//!     Some("Confirmation Date must be after Joining Date")
//! );
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod engine;
pub mod form_data;
pub mod hooks;
pub mod result;
pub mod rule;
pub mod template;
pub mod validation_context;

pub use batch::BatchOptions;
pub use config::{EngineConfig, FaultPolicy, FieldEvaluation};
pub use engine::{ValidationEngine, ValidationEngineBuilder};
pub use form_data::FormData;
pub use hooks::{
    async_validator_fn, override_fn, validator_fn, CustomValidator, CustomValidatorInput,
    CustomValidatorRequest, OverrideInput, OverrideResolver,
};
pub use result::{
    BatchReport, BatchSummary, RowResult, ValidationIssue, ValidationMetrics, ValidationReport,
    ValidationResult,
};
pub use rule::{
    BoxedRuleHandler, CompiledRule, FieldErrorKind, RuleHandler, RuleInput, RuleOutcome, RuleSpec,
    RuleStatus,
};
pub use template::{FieldDefinition, FieldDefinitionBuilder, Template, TemplateBuilder};
pub use validation_context::{legacy_override, Scope, ValidationContext, LEGACY_OVERRIDE};
