//! Safety checks for template-supplied input.
//!
//! Templates arrive from an admin-editable backend, so regex conditions and
//! identifiers are treated as untrusted before they are compiled or used as
//! lookup keys.

use crate::error::{GuardError, Result};
use regex::{Regex, RegexBuilder};

/// Maximum accepted length of a regex condition.
pub const MAX_PATTERN_LENGTH: usize = 1000;

/// Maximum compiled size of a regex program, in bytes.
const MAX_COMPILED_PATTERN_SIZE: usize = 1 << 20;

/// Maximum accepted length of a field name or record key.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Regex validation and compilation utilities.
pub struct PatternSecurity;

impl PatternSecurity {
    /// Validates a regex pattern without compiling it.
    ///
    /// # Examples
    /// ```rust
    /// use form_guard::security::PatternSecurity;
    ///
    /// assert!(PatternSecurity::validate_pattern(r"^[A-Z]{3}\d{3}$").is_ok());
    /// assert!(PatternSecurity::validate_pattern(&"a".repeat(2000)).is_err());
    /// ```
    pub fn validate_pattern(pattern: &str) -> Result<()> {
        if pattern.trim().is_empty() {
            return Err(GuardError::InvalidPattern(
                "regex pattern cannot be empty".to_string(),
            ));
        }

        if pattern.len() > MAX_PATTERN_LENGTH {
            return Err(GuardError::InvalidPattern(format!(
                "regex pattern too long (max {MAX_PATTERN_LENGTH} characters)"
            )));
        }

        if pattern.contains('\0') {
            return Err(GuardError::InvalidPattern(
                "regex pattern cannot contain null bytes".to_string(),
            ));
        }

        Self::check_nested_quantifiers(pattern)
    }

    /// Validates and compiles a pattern anchored to match the whole value.
    ///
    /// Template authors write patterns with or without `^`/`$`; wrapping keeps
    /// both forms meaning "the entire value matches".
    pub fn compile_full_match(pattern: &str, case_insensitive: bool) -> Result<Regex> {
        Self::validate_pattern(pattern)?;

        RegexBuilder::new(&format!("^(?:{pattern})$"))
            .case_insensitive(case_insensitive)
            .size_limit(MAX_COMPILED_PATTERN_SIZE)
            .build()
            .map_err(|e| GuardError::InvalidPattern(format!("invalid regex pattern: {e}")))
    }

    /// Rejects the classic catastrophic-backtracking shapes.
    ///
    /// The `regex` crate matches in linear time, but these shapes almost always
    /// mean a pattern written for a backtracking engine that will be re-used on
    /// the client side.
    fn check_nested_quantifiers(pattern: &str) -> Result<()> {
        let dangerous_patterns = &["(.*)*", "(.*)+", "(.+)+", "(.+)*", "(a+)+", "(a*)*"];

        for dangerous in dangerous_patterns {
            if pattern.contains(dangerous) {
                return Err(GuardError::InvalidPattern(
                    "regex pattern contains nested quantifiers".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Input validation utilities for identifiers read from templates.
pub struct InputValidator;

impl InputValidator {
    /// Validates a field name or record key.
    ///
    /// Identifiers start with an ASCII letter or `_` and continue with ASCII
    /// letters, digits, `_`, `-` or `.`.
    ///
    /// # Examples
    /// ```rust
    /// use form_guard::security::InputValidator;
    ///
    /// assert!(InputValidator::validate_identifier("basicSalary", "field name").is_ok());
    /// assert!(InputValidator::validate_identifier("first name", "field name").is_err());
    /// ```
    pub fn validate_identifier(value: &str, name: &str) -> Result<()> {
        if value.trim().is_empty() {
            return Err(GuardError::TemplateParse(format!(
                "{name} cannot be empty or whitespace-only"
            )));
        }
        if value.len() > MAX_IDENTIFIER_LENGTH {
            return Err(GuardError::TemplateParse(format!(
                "{name} too long: {} characters (max {MAX_IDENTIFIER_LENGTH})",
                value.len()
            )));
        }
        if value.contains('\0') {
            return Err(GuardError::TemplateParse(format!(
                "{name} cannot contain null bytes"
            )));
        }

        let mut chars = value.chars();
        let starts_well = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !starts_well || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
            return Err(GuardError::TemplateParse(format!(
                "{name} '{value}' is not a plain identifier"
            )));
        }
        Ok(())
    }

    /// Validates a numeric bound read from a rule condition.
    pub fn validate_bound(value: f64, name: &str) -> Result<()> {
        if !value.is_finite() {
            return Err(GuardError::Configuration(format!(
                "invalid {name} value: must be finite (not NaN or infinite)"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_validation() {
        assert!(PatternSecurity::validate_pattern(r"^[a-zA-Z0-9]+$").is_ok());
        assert!(PatternSecurity::validate_pattern(r"EMP\d{3}").is_ok());

        assert!(PatternSecurity::validate_pattern("").is_err());
        assert!(PatternSecurity::validate_pattern(&"a".repeat(2000)).is_err());
        assert!(PatternSecurity::validate_pattern("abc\0").is_err());
        assert!(PatternSecurity::validate_pattern("(.*)*x").is_err());
    }

    #[test]
    fn test_compile_full_match() {
        let regex = PatternSecurity::compile_full_match("[A-Z]+", false).unwrap();
        assert!(regex.is_match("EMP"));
        assert!(!regex.is_match("EMP001"));

        let anchored = PatternSecurity::compile_full_match("^[a-zA-Z0-9]+$", false).unwrap();
        assert!(anchored.is_match("EMP001"));
        assert!(!anchored.is_match("EMP@001"));

        let insensitive = PatternSecurity::compile_full_match("emp\\d+", true).unwrap();
        assert!(insensitive.is_match("EMP42"));
    }

    #[test]
    fn test_compile_rejects_invalid_regex() {
        assert!(PatternSecurity::compile_full_match("[unclosed", false).is_err());
        // Look-around is not supported by the regex engine.
        assert!(PatternSecurity::compile_full_match("(?=.*\\d).{8,}", false).is_err());
    }

    #[test]
    fn test_identifier_validation() {
        assert!(InputValidator::validate_identifier("employeeId", "field name").is_ok());
        assert!(InputValidator::validate_identifier("  ", "field name").is_err());
        assert!(InputValidator::validate_identifier(&"x".repeat(200), "field name").is_err());
        assert!(InputValidator::validate_identifier("_legacy.code-2", "field name").is_ok());
        for bad in ["first name", "salary;drop", "2ndManager", " employeeId", "emp/id"] {
            assert!(
                InputValidator::validate_identifier(bad, "field name").is_err(),
                "{bad} should be rejected"
            );
        }
        assert!(InputValidator::validate_bound(f64::NAN, "min").is_err());
        assert!(InputValidator::validate_bound(10.0, "min").is_ok());
    }
}
