//! The closed set of built-in rule kinds.

use crate::core::FieldErrorKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A built-in rule kind.
///
/// Template rule types are matched case-insensitively, with `_` and spaces
/// treated as `-`, so `Date_Before`, `date before` and `date-before` all name
/// [`RuleKind::DateBefore`]. Types outside this set are still dispatched by
/// name through the [`RuleRegistry`](super::RuleRegistry) and are no-ops when
/// nothing is registered for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Value must be present
    Required,
    /// Value must fully match a regex (`regex`, `pattern-match`, `pattern`)
    Regex,
    /// Numeric (or ISO date) bounds, inclusive
    Range,
    /// Conservative email shape (`email`, `email-format`)
    Email,
    /// 7 to 15 digits with an optional leading `+` (`phone-format`, `phone`)
    PhoneFormat,
    /// Value must be a calendar date
    Date,
    /// Date strictly earlier than a sibling field or literal date
    DateBefore,
    /// Date strictly later than a sibling field or literal date
    DateAfter,
    /// Date within an inclusive window
    DateRange,
    /// Age computed from a birth date within bounds
    Age,
    /// Value not present in the existing record snapshot
    Unique,
    /// `unique` keyed by the field's own name
    DuplicateCheck,
    /// Numeric bounds with a payroll default
    SalaryRange,
    /// Membership in a delimited list of departments
    DepartmentCheck,
    /// Requested days within the leave balance of a category
    LeaveBalance,
    /// Value required only when a sibling condition holds
    ConditionalRequired,
    /// Numeric or percentage shape
    FormatCheck,
    /// Delegates to a caller-supplied validator
    Custom,
}

impl RuleKind {
    /// Every built-in kind, in registration order.
    pub const ALL: [RuleKind; 18] = [
        RuleKind::Required,
        RuleKind::Regex,
        RuleKind::Range,
        RuleKind::Email,
        RuleKind::PhoneFormat,
        RuleKind::Date,
        RuleKind::DateBefore,
        RuleKind::DateAfter,
        RuleKind::DateRange,
        RuleKind::Age,
        RuleKind::Unique,
        RuleKind::DuplicateCheck,
        RuleKind::SalaryRange,
        RuleKind::DepartmentCheck,
        RuleKind::LeaveBalance,
        RuleKind::ConditionalRequired,
        RuleKind::FormatCheck,
        RuleKind::Custom,
    ];

    /// Resolves a template rule type, including aliases.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use form_guard::rules::RuleKind;
    ///
    /// assert_eq!(RuleKind::from_type_name("pattern-match"), Some(RuleKind::Regex));
    /// assert_eq!(RuleKind::from_type_name("Email_Format"), Some(RuleKind::Email));
    /// assert_eq!(RuleKind::from_type_name("iban"), None);
    /// ```
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let kind = match normalize_type_name(type_name).as_str() {
            "required" => RuleKind::Required,
            "regex" | "pattern-match" | "pattern" => RuleKind::Regex,
            "range" => RuleKind::Range,
            "email" | "email-format" => RuleKind::Email,
            "phone-format" | "phone" => RuleKind::PhoneFormat,
            "date" => RuleKind::Date,
            "date-before" => RuleKind::DateBefore,
            "date-after" => RuleKind::DateAfter,
            "date-range" => RuleKind::DateRange,
            "age" => RuleKind::Age,
            "unique" => RuleKind::Unique,
            "duplicate-check" => RuleKind::DuplicateCheck,
            "salary-range" => RuleKind::SalaryRange,
            "department-check" => RuleKind::DepartmentCheck,
            "leave-balance" => RuleKind::LeaveBalance,
            "conditional-required" => RuleKind::ConditionalRequired,
            "format-check" => RuleKind::FormatCheck,
            "custom" => RuleKind::Custom,
            _ => return None,
        };
        Some(kind)
    }

    /// Returns the canonical rule type name.
    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Regex => "regex",
            RuleKind::Range => "range",
            RuleKind::Email => "email",
            RuleKind::PhoneFormat => "phone-format",
            RuleKind::Date => "date",
            RuleKind::DateBefore => "date-before",
            RuleKind::DateAfter => "date-after",
            RuleKind::DateRange => "date-range",
            RuleKind::Age => "age",
            RuleKind::Unique => "unique",
            RuleKind::DuplicateCheck => "duplicate-check",
            RuleKind::SalaryRange => "salary-range",
            RuleKind::DepartmentCheck => "department-check",
            RuleKind::LeaveBalance => "leave-balance",
            RuleKind::ConditionalRequired => "conditional-required",
            RuleKind::FormatCheck => "format-check",
            RuleKind::Custom => "custom",
        }
    }

    /// The error kind reported when a rule of this kind fails.
    pub fn error_kind(&self) -> FieldErrorKind {
        match self {
            RuleKind::Required => FieldErrorKind::MissingRequiredValue,
            RuleKind::Regex
            | RuleKind::Email
            | RuleKind::PhoneFormat
            | RuleKind::Date
            | RuleKind::FormatCheck => FieldErrorKind::FormatMismatch,
            RuleKind::Range
            | RuleKind::DateRange
            | RuleKind::Age
            | RuleKind::SalaryRange
            | RuleKind::LeaveBalance => FieldErrorKind::RangeViolation,
            RuleKind::DateBefore | RuleKind::DateAfter => FieldErrorKind::CrossFieldOrderViolation,
            RuleKind::DepartmentCheck => FieldErrorKind::ListMembershipViolation,
            RuleKind::Unique | RuleKind::DuplicateCheck => FieldErrorKind::UniquenessViolation,
            RuleKind::ConditionalRequired => FieldErrorKind::ConditionalRequirementViolation,
            RuleKind::Custom => FieldErrorKind::CustomValidatorFailure,
        }
    }

    /// Returns true for kinds that look up existing records.
    pub fn checks_uniqueness(&self) -> bool {
        matches!(self, RuleKind::Unique | RuleKind::DuplicateCheck)
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Normalizes a rule type name for lookup: trimmed, lowercase, `-` separated.
pub fn normalize_type_name(type_name: &str) -> String {
    type_name
        .trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
