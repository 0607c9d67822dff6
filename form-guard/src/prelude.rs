//! Prelude for commonly used types and traits in form-guard.

pub use crate::core::{
    RuleSpec, Template, ValidationContext, ValidationEngine, ValidationReport, ValidationResult,
};
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;
