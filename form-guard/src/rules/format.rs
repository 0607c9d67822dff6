//! Value shape rules: regex patterns, email, phone numbers and number formats.

use super::{skip_empty, unexpected_params, NumberFormat, RuleParams};
use crate::core::form_data::is_empty_value;
use crate::core::{RuleHandler, RuleInput, RuleOutcome};
use crate::prelude::*;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    // Hard-coded pattern, known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("Hard-coded regex pattern should be valid")
});

/// Text a shape rule matches against, untrimmed. `None` for blank values and containers.
fn shape_text(value: &Value) -> Option<String> {
    if is_empty_value(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\+?\d{7,15}$").expect("Hard-coded regex pattern should be valid")
});

/// Fails when the value does not fully match the rule's pattern.
///
/// Patterns are anchored at compile time, so `EMP\d{3}` and `^EMP\d{3}$`
/// behave the same. The value is matched as submitted; surrounding
/// whitespace is part of it. A `/pattern/i` literal matches case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct RegexRule;

#[async_trait]
impl RuleHandler for RegexRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::Pattern(pattern) = input.params() else {
            return Err(unexpected_params(input));
        };
        let Some(text) = shape_text(input.value) else {
            return Ok(skip_empty());
        };

        if pattern.is_match(&text) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!("{} format is invalid", input.label())))
        }
    }

    fn name(&self) -> &str {
        "regex"
    }
}

/// Fails when the value is not a plausible email address.
///
/// Accepts a local part, a single `@` and a dotted domain ending in a TLD of
/// at least two letters. Consecutive dots are rejected.
#[derive(Debug, Clone, Default)]
pub struct EmailRule;

impl EmailRule {
    /// Returns true if `text` has an acceptable email shape.
    pub fn is_valid(text: &str) -> bool {
        EMAIL_REGEX.is_match(text) && !text.contains("..")
    }
}

#[async_trait]
impl RuleHandler for EmailRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let Some(text) = shape_text(input.value) else {
            return Ok(skip_empty());
        };

        if Self::is_valid(&text) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!("{} must be a valid email address", input.label())))
        }
    }

    fn name(&self) -> &str {
        "email"
    }
}

/// Fails unless the value holds 7 to 15 digits with an optional leading `+`.
///
/// Spaces, dashes, dots and parentheses are formatting and are ignored.
#[derive(Debug, Clone, Default)]
pub struct PhoneFormatRule;

impl PhoneFormatRule {
    /// Returns true if `text` is an acceptable phone number.
    pub fn is_valid(text: &str) -> bool {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | '(' | ')'))
            .collect();
        PHONE_REGEX.is_match(&compact)
    }
}

#[async_trait]
impl RuleHandler for PhoneFormatRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let Some(text) = shape_text(input.value) else {
            return Ok(skip_empty());
        };

        if Self::is_valid(&text) {
            Ok(RuleOutcome::pass())
        } else {
            Ok(input.fail(format!("{} must be a valid phone number", input.label())))
        }
    }

    fn name(&self) -> &str {
        "phone-format"
    }
}

/// Checks a numeric, integer or percentage shape.
///
/// Without a condition any number passes, with or without a `%` suffix.
#[derive(Debug, Clone, Default)]
pub struct FormatCheckRule;

#[async_trait]
impl RuleHandler for FormatCheckRule {
    async fn evaluate(&self, input: &RuleInput<'_>) -> Result<RuleOutcome> {
        let RuleParams::Format(format) = input.params() else {
            return Err(unexpected_params(input));
        };
        if is_empty_value(input.value) {
            return Ok(skip_empty());
        }

        if format.accepts(input.value) {
            return Ok(RuleOutcome::pass());
        }
        let message = match format {
            NumberFormat::Any | NumberFormat::Numeric => {
                format!("{} must be a number", input.label())
            }
            NumberFormat::Integer => format!("{} must be a whole number", input.label()),
            NumberFormat::Percentage => {
                format!("{} must be a percentage between 0 and 100", input.label())
            }
        };
        Ok(input.fail(message))
    }

    fn name(&self) -> &str {
        "format-check"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FieldErrorKind, RuleSpec};
    use crate::rules::testing::evaluate;
    use serde_json::json;

    #[tokio::test]
    async fn test_regex_full_match() {
        let spec = || RuleSpec::new("regex").with_condition("^[a-zA-Z0-9]+$");

        let pass = evaluate(&RegexRule, "employeeId", spec(), json!({"employeeId": "EMP001"})).await;
        assert!(pass.status.is_pass());

        let fail = evaluate(&RegexRule, "employeeId", spec(), json!({"employeeId": "EMP@001"})).await;
        assert_eq!(fail.kind, Some(FieldErrorKind::FormatMismatch));
        assert_eq!(fail.message.as_deref(), Some("employeeId format is invalid"));

        // An unanchored pattern still has to cover the whole value.
        let partial = evaluate(
            &RegexRule,
            "employeeId",
            RuleSpec::new("pattern-match").with_condition("EMP"),
            json!({"employeeId": "EMP001"}),
        )
        .await;
        assert!(partial.status.is_fail());

        let empty = evaluate(&RegexRule, "employeeId", spec(), json!({"employeeId": ""})).await;
        assert!(empty.status.is_skipped());
    }

    #[tokio::test]
    async fn test_shape_rules_see_surrounding_whitespace() {
        let padded = evaluate(
            &RegexRule,
            "employeeId",
            RuleSpec::new("regex").with_condition("^[a-zA-Z0-9]+$"),
            json!({"employeeId": " EMP001 "}),
        )
        .await;
        assert!(padded.status.is_fail());
        assert_eq!(padded.message.as_deref(), Some("employeeId format is invalid"));

        let email = evaluate(&EmailRule, "email", RuleSpec::new("email"), json!({"email": " a@b.com"})).await;
        assert!(email.status.is_fail());

        let blank = evaluate(&EmailRule, "email", RuleSpec::new("email"), json!({"email": "   "})).await;
        assert!(blank.status.is_skipped());
    }

    #[test]
    fn test_email_shapes() {
        for valid in ["a@b.com", "first.last+tag@corp.example.co", "x_y@mail-host.io"] {
            assert!(EmailRule::is_valid(valid), "{valid} should be accepted");
        }
        for invalid in ["plain", "a@b", "a@@b.com", "a@b.c", "a..b@c.com", "a b@c.com", "@b.com"] {
            assert!(!EmailRule::is_valid(invalid), "{invalid} should be rejected");
        }
    }

    #[test]
    fn test_phone_shapes() {
        for valid in ["+14155552671", "(415) 555-2671", "020 7946 0958", "98765.43210"] {
            assert!(PhoneFormatRule::is_valid(valid), "{valid} should be accepted");
        }
        for invalid in ["12345", "+1234567890123456", "555-CALL-NOW", "++1234567"] {
            assert!(!PhoneFormatRule::is_valid(invalid), "{invalid} should be rejected");
        }
    }

    #[tokio::test]
    async fn test_phone_accepts_numeric_values() {
        let outcome = evaluate(
            &PhoneFormatRule,
            "mobile",
            RuleSpec::new("phone"),
            json!({"mobile": 9876543210_i64}),
        )
        .await;
        assert!(outcome.status.is_pass());
    }

    #[tokio::test]
    async fn test_format_check() {
        let percentage = || RuleSpec::new("format-check").with_condition("percentage");

        let ok = evaluate(&FormatCheckRule, "taxRate", percentage(), json!({"taxRate": "12.5%"})).await;
        assert!(ok.status.is_pass());

        let too_high = evaluate(&FormatCheckRule, "taxRate", percentage(), json!({"taxRate": 140})).await;
        assert_eq!(
            too_high.message.as_deref(),
            Some("taxRate must be a percentage between 0 and 100")
        );

        let not_numeric = evaluate(
            &FormatCheckRule,
            "bonus",
            RuleSpec::new("format-check"),
            json!({"bonus": "a lot"}),
        )
        .await;
        assert_eq!(not_numeric.message.as_deref(), Some("bonus must be a number"));

        let unqualified_percent = evaluate(
            &FormatCheckRule,
            "bonus",
            RuleSpec::new("format-check"),
            json!({"bonus": "12.5%"}),
        )
        .await;
        assert!(unqualified_percent.status.is_pass());

        let strict_numeric = evaluate(
            &FormatCheckRule,
            "bonus",
            RuleSpec::new("format-check").with_condition("numeric"),
            json!({"bonus": "12.5%"}),
        )
        .await;
        assert!(strict_numeric.status.is_fail());
    }
}
