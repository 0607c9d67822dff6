//! Error types for the form-guard validation engine.
//!
//! Field-level validation failures are *not* errors: they are plain messages
//! collected in a [`ValidationResult`](crate::core::ValidationResult). The
//! `GuardError` enum covers everything else, from malformed templates to
//! faults raised by custom validators.

use thiserror::Error;

/// The main error type for the form-guard library.
#[derive(Error, Debug)]
pub enum GuardError {
    /// A template document could not be parsed or is structurally invalid.
    #[error("Template parse error: {0}")]
    TemplateParse(String),

    /// A rule definition could not be turned into usable parameters.
    #[error("Invalid rule '{rule}': {message}")]
    InvalidRule {
        /// The rule type as written in the template
        rule: String,
        /// Detailed error message
        message: String,
    },

    /// A regex condition was rejected before compilation.
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A custom validator or override resolver reported a fault.
    #[error("Custom validator '{name}' failed: {message}")]
    CustomValidator {
        /// Name the validator was registered under
        name: String,
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The engine itself failed to produce a result.
    #[error("Engine fault: {0}")]
    EngineFault(String),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, GuardError>`.
///
/// # Examples
///
/// ```rust
/// use form_guard::error::Result;
///
/// fn load_rules() -> Result<()> {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, GuardError>;

impl GuardError {
    /// Creates a new invalid rule error.
    pub fn invalid_rule(rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRule {
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// Creates a new custom validator error.
    pub fn custom_validator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CustomValidator {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new custom validator error with a source error.
    pub fn custom_validator_with_source(
        name: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::CustomValidator {
            name: name.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates a new engine fault.
    pub fn engine_fault(message: impl Into<String>) -> Self {
        Self::EngineFault(message.into())
    }
}

/// Extension trait for adding context to errors.
pub trait ErrorContext<T> {
    /// Adds context to an error.
    fn context(self, msg: &str) -> Result<T>;

    /// Adds context with a lazy message.
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<GuardError>,
{
    fn context(self, msg: &str) -> Result<T> {
        self.map_err(|e| wrap(msg, e.into()))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| wrap(&f(), e.into()))
    }
}

fn wrap(msg: &str, error: GuardError) -> GuardError {
    match error {
        GuardError::TemplateParse(inner) => GuardError::TemplateParse(format!("{msg}: {inner}")),
        GuardError::Internal(inner) => GuardError::Internal(format!("{msg}: {inner}")),
        other => GuardError::Internal(format!("{msg}: {other}")),
    }
}
