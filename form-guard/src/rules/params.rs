//! Resolution of rule conditions into typed parameters.
//!
//! Conditions come from an admin-edited backend and take many shapes: a
//! `"min-max"` string, a `"a:b"` pair, a comma list, a JSON object, a JSON
//! array of `{ParamName, ParamValue}` pairs, or any of those serialized into
//! a string. [`resolve`] reads them once when a template is compiled. Absent
//! or malformed conditions fall back to the rule's default; conditions with
//! no sensible default become [`RuleParams::Unresolved`].

use super::dates::parse_date;
use super::RuleKind;
use crate::core::form_data::{
    field_value, is_empty_value, value_as_date, value_as_number, value_as_text, FormData,
};
use crate::security::{InputValidator, PatternSecurity};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Default bounds of `salary-range`.
pub const DEFAULT_SALARY_RANGE: NumericRange = NumericRange {
    min: 1000.0,
    max: 100_000.0,
};

/// Default bounds of `age`.
pub const DEFAULT_AGE_RANGE: NumericRange = NumericRange {
    min: 18.0,
    max: 60.0,
};

/// Default allowed list of `department-check`.
pub const DEFAULT_DEPARTMENTS: [&str; 6] = ["HR", "IT", "Finance", "Operations", "Sales", "Marketing"];

/// Default balances of `leave-balance`.
pub const DEFAULT_LEAVE_BALANCES: [(&str, f64); 3] = [("annual", 20.0), ("sick", 10.0), ("casual", 7.0)];

static NUMERIC_RANGE: Lazy<Regex> = Lazy::new(|| {
    // Hard-coded pattern, known to be valid
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*(-?[\d,]*\.?\d+)\s*(?:-|:|\bto\b)\s*(-?[\d,]*\.?\d+)\s*$")
        .expect("Hard-coded regex pattern should be valid")
});

static ISO_DATE_RANGE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2})\s*(?:-|:|,|\bto\b)\s*(\d{4}-\d{2}-\d{2})\s*$")
        .expect("Hard-coded regex pattern should be valid")
});

/// An inclusive numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound, inclusive
    pub min: f64,
    /// Upper bound, inclusive
    pub max: f64,
}

impl NumericRange {
    /// Creates a range, swapping the bounds if they are reversed.
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// Returns true if `value` lies within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} and {}", format_number(self.min), format_number(self.max))
    }
}

/// An inclusive date interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First allowed date
    pub start: NaiveDate,
    /// Last allowed date
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range, swapping the bounds if they are reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// Returns true if `date` lies within the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// What a `date-before` or `date-after` rule compares against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateReference {
    /// A sibling field holding a date
    Field {
        /// Sibling field name
        name: String,
        /// Sibling label, filled in when the template declares the field
        label: Option<String>,
    },
    /// A fixed date written in the condition
    Literal(NaiveDate),
}

impl DateReference {
    /// Resolves the reference date, or `None` when the sibling is empty or unparseable.
    pub fn resolve(&self, form_data: &FormData) -> Option<NaiveDate> {
        match self {
            DateReference::Literal(date) => Some(*date),
            DateReference::Field { name, .. } => value_as_date(field_value(form_data, name)),
        }
    }

    /// Describes the reference for messages: the sibling's label when known.
    pub fn describe(&self) -> String {
        match self {
            DateReference::Field { name, label } => label.clone().unwrap_or_else(|| name.clone()),
            DateReference::Literal(date) => date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Comparison used by `conditional-required`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConditionOp {
    /// Sibling equals the value
    Equals,
    /// Sibling is present and differs from the value
    NotEquals,
    /// Sibling is non-empty
    Present,
}

/// The controlling condition of a `conditional-required` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionExpr {
    /// Name of the controlling sibling field
    pub field: String,
    /// Comparison to apply
    pub op: ConditionOp,
    /// Value compared against, unused for [`ConditionOp::Present`]
    pub value: Option<String>,
}

impl ConditionExpr {
    /// Returns true when the condition holds for the submitted values.
    ///
    /// An absent controlling field never satisfies the condition.
    pub fn holds(&self, form_data: &FormData) -> bool {
        let sibling = field_value(form_data, &self.field);
        if is_empty_value(sibling) {
            return false;
        }
        match self.op {
            ConditionOp::Present => true,
            ConditionOp::Equals => self.matches(sibling),
            ConditionOp::NotEquals => !self.matches(sibling),
        }
    }

    fn matches(&self, sibling: &Value) -> bool {
        let Some(expected) = self.value.as_deref() else {
            return false;
        };
        let Some(actual) = value_as_text(sibling) else {
            return false;
        };
        if actual.eq_ignore_ascii_case(expected.trim()) {
            return true;
        }
        match (value_as_number(sibling), expected.trim().parse::<f64>()) {
            (Some(a), Ok(b)) => (a - b).abs() < f64::EPSILON,
            _ => false,
        }
    }
}

impl fmt::Display for ConditionExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.op, &self.value) {
            (ConditionOp::Present, _) | (_, None) => write!(f, "{} is provided", self.field),
            (ConditionOp::Equals, Some(value)) => write!(f, "{} is {}", self.field, value),
            (ConditionOp::NotEquals, Some(value)) => write!(f, "{} is not {}", self.field, value),
        }
    }
}

/// Shape checked by `format-check`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    /// A number, optionally suffixed with `%`
    Any,
    /// Any finite number, thousands separators allowed
    Numeric,
    /// A whole number
    Integer,
    /// A number between 0 and 100, optionally suffixed with `%`
    Percentage,
}

impl NumberFormat {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "any" | "number-or-percentage" => Some(NumberFormat::Any),
            "numeric" | "number" | "decimal" => Some(NumberFormat::Numeric),
            "integer" | "int" | "whole" => Some(NumberFormat::Integer),
            "percentage" | "percent" | "%" => Some(NumberFormat::Percentage),
            _ => None,
        }
    }

    /// Returns true if the value has this shape.
    pub fn accepts(&self, value: &Value) -> bool {
        let has_percent_sign = matches!(value, Value::String(s) if s.trim().ends_with('%'));
        let Some(number) = value_as_number(value) else {
            return false;
        };
        match self {
            NumberFormat::Any => true,
            NumberFormat::Numeric => !has_percent_sign,
            NumberFormat::Integer => !has_percent_sign && number.fract() == 0.0,
            NumberFormat::Percentage => (0.0..=100.0).contains(&number),
        }
    }

    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            NumberFormat::Any => "any",
            NumberFormat::Numeric => "numeric",
            NumberFormat::Integer => "integer",
            NumberFormat::Percentage => "percentage",
        }
    }
}

/// One `{ParamName, ParamValue}` entry of a structured condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamPair {
    /// Parameter name
    #[serde(alias = "ParamName", alias = "paramName", alias = "param_name")]
    pub name: String,
    /// Parameter value
    #[serde(default, alias = "ParamValue", alias = "paramValue", alias = "param_value")]
    pub value: Value,
}

/// Typed parameters of a compiled rule.
#[derive(Debug, Clone)]
pub enum RuleParams {
    /// The rule takes no parameters
    None,
    /// Inclusive numeric bounds
    NumericRange(NumericRange),
    /// Inclusive date bounds
    DateRange(DateRange),
    /// Compiled full-match pattern
    Pattern(Regex),
    /// Allowed values
    List(Vec<String>),
    /// Comparison target of `date-before`/`date-after`
    DateReference(DateReference),
    /// Controlling condition of `conditional-required`
    Conditional(ConditionExpr),
    /// Leave balances keyed by lowercase category
    LeaveBalances(BTreeMap<String, f64>),
    /// Record key for uniqueness checks
    Key(String),
    /// Name of a custom validator
    Named(String),
    /// Number shape for `format-check`
    Format(NumberFormat),
    /// Raw named parameters, kept for rule types without a built-in handler
    Structured(Vec<ParamPair>),
    /// The condition could not be resolved; the rule is skipped
    Unresolved(String),
}

impl RuleParams {
    /// Returns true if the condition could not be resolved.
    pub fn is_unresolved(&self) -> bool {
        matches!(self, RuleParams::Unresolved(_))
    }

    /// Returns a short name of the parameter shape, for logs and errors.
    pub fn shape(&self) -> &'static str {
        match self {
            RuleParams::None => "none",
            RuleParams::NumericRange(_) => "numeric-range",
            RuleParams::DateRange(_) => "date-range",
            RuleParams::Pattern(_) => "pattern",
            RuleParams::List(_) => "list",
            RuleParams::DateReference(_) => "date-reference",
            RuleParams::Conditional(_) => "conditional",
            RuleParams::LeaveBalances(_) => "leave-balances",
            RuleParams::Key(_) => "key",
            RuleParams::Named(_) => "named",
            RuleParams::Format(_) => "format",
            RuleParams::Structured(_) => "structured",
            RuleParams::Unresolved(_) => "unresolved",
        }
    }

    /// Looks up a structured parameter by name, case-insensitively.
    pub fn structured(&self, name: &str) -> Option<&Value> {
        match self {
            RuleParams::Structured(pairs) => pairs
                .iter()
                .find(|pair| pair.name.eq_ignore_ascii_case(name))
                .map(|pair| &pair.value),
            _ => None,
        }
    }
}

/// Normalized view over the many condition encodings.
#[derive(Debug, Default)]
struct Condition {
    text: Option<String>,
    entries: Vec<(String, Value)>,
    items: Vec<String>,
}

impl Condition {
    fn read(raw: &Value) -> Self {
        match raw {
            Value::Null => Self::default(),
            Value::String(s) => Self::read_text(s),
            Value::Number(_) | Value::Bool(_) => Self {
                text: value_as_text(raw),
                ..Self::default()
            },
            Value::Object(map) => Self {
                entries: object_entries(map),
                ..Self::default()
            },
            Value::Array(values) => Self::read_array(values),
        }
    }

    fn read_text(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(decoded) = serde_json::from_str::<Value>(trimmed) {
                let structured = match &decoded {
                    Value::Object(_) => true,
                    Value::Array(values) => {
                        !values.is_empty() && values.iter().all(Value::is_object)
                    }
                    _ => false,
                };
                if structured {
                    return Self::read(&decoded);
                }
            }
        }
        Self {
            text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..Self::default()
        }
    }

    fn read_array(values: &[Value]) -> Self {
        let mut condition = Self::default();
        for value in values {
            match value {
                Value::Object(map) => condition.entries.extend(object_entries(map)),
                other => condition.items.extend(value_as_text(other)),
            }
        }
        condition
    }

    fn lookup(&self, names: &[&str]) -> Option<&Value> {
        names.iter().find_map(|name| {
            self.entries
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    fn lookup_text(&self, names: &[&str]) -> Option<String> {
        self.lookup(names).and_then(value_as_text)
    }

    /// The condition as a single string: the raw text, or a named entry.
    fn primary_text(&self, names: &[&str]) -> Option<String> {
        self.text.clone().or_else(|| self.lookup_text(names))
    }
}

/// Flattens an object, expanding a single `{ParamName, ParamValue}` pair.
fn object_entries(map: &serde_json::Map<String, Value>) -> Vec<(String, Value)> {
    let is_pair = map
        .keys()
        .any(|k| k.eq_ignore_ascii_case("paramname") || k.eq_ignore_ascii_case("param_name"));
    if is_pair {
        if let Ok(pair) = serde_json::from_value::<ParamPair>(Value::Object(map.clone())) {
            return vec![(pair.name, pair.value)];
        }
    }
    map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
}

/// Resolves a rule condition for the given kind.
///
/// `field_name` supplies defaults that depend on the field, such as the
/// uniqueness key.
///
/// # Examples
///
/// ```rust
/// use form_guard::rules::{params, RuleKind, RuleParams};
/// use serde_json::json;
///
/// let resolved = params::resolve(Some(RuleKind::SalaryRange), &json!(null), "salary");
/// match resolved {
///     RuleParams::NumericRange(range) => assert_eq!((range.min, range.max), (1000.0, 100000.0)),
///     other => panic!("unexpected params: {other:?}"),
/// }
/// ```
pub fn resolve(kind: Option<RuleKind>, raw: &Value, field_name: &str) -> RuleParams {
    let condition = Condition::read(raw);

    let Some(kind) = kind else {
        return resolve_unknown(&condition);
    };

    match kind {
        RuleKind::Required | RuleKind::Email | RuleKind::PhoneFormat | RuleKind::Date => {
            RuleParams::None
        }
        RuleKind::Regex => resolve_pattern(&condition),
        RuleKind::Range => resolve_range(&condition),
        RuleKind::SalaryRange => resolve_numeric_range(&condition)
            .map(RuleParams::NumericRange)
            .unwrap_or(RuleParams::NumericRange(DEFAULT_SALARY_RANGE)),
        RuleKind::Age => resolve_numeric_range(&condition)
            .map(RuleParams::NumericRange)
            .unwrap_or(RuleParams::NumericRange(DEFAULT_AGE_RANGE)),
        RuleKind::DateBefore | RuleKind::DateAfter => resolve_date_reference(&condition),
        RuleKind::DateRange => resolve_date_range(&condition)
            .map(RuleParams::DateRange)
            .unwrap_or_else(|| {
                RuleParams::Unresolved("date range requires two dates such as 2023-01-01:2023-12-31".to_string())
            }),
        RuleKind::Unique | RuleKind::DuplicateCheck => resolve_key(&condition, field_name),
        RuleKind::DepartmentCheck => resolve_list(&condition),
        RuleKind::LeaveBalance => RuleParams::LeaveBalances(resolve_leave_balances(&condition)),
        RuleKind::ConditionalRequired => resolve_conditional(&condition),
        RuleKind::FormatCheck => RuleParams::Format(
            condition
                .primary_text(&["format", "type", "value"])
                .and_then(|name| NumberFormat::from_name(&name))
                .unwrap_or(NumberFormat::Any),
        ),
        RuleKind::Custom => match condition.primary_text(&["name", "validator", "function", "value"]) {
            Some(name) => RuleParams::Named(name),
            None => RuleParams::Unresolved("custom rule does not name a validator".to_string()),
        },
    }
}

fn resolve_unknown(condition: &Condition) -> RuleParams {
    if !condition.entries.is_empty() {
        let pairs = condition
            .entries
            .iter()
            .map(|(name, value)| ParamPair {
                name: name.clone(),
                value: value.clone(),
            })
            .collect();
        return RuleParams::Structured(pairs);
    }
    match &condition.text {
        Some(text) => RuleParams::Named(text.clone()),
        None if !condition.items.is_empty() => RuleParams::List(condition.items.clone()),
        None => RuleParams::None,
    }
}

fn resolve_pattern(condition: &Condition) -> RuleParams {
    let Some(source) = condition.primary_text(&["pattern", "regex", "value"]) else {
        return RuleParams::Unresolved("regex rule has no pattern".to_string());
    };

    let (pattern, case_insensitive) = split_regex_literal(&source);
    match PatternSecurity::compile_full_match(pattern, case_insensitive) {
        Ok(regex) => RuleParams::Pattern(regex),
        Err(e) => RuleParams::Unresolved(e.to_string()),
    }
}

/// Splits a `/pattern/flags` literal. Plain patterns are returned unchanged.
fn split_regex_literal(source: &str) -> (&str, bool) {
    if let Some(rest) = source.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let flags = &rest[end + 1..];
            if flags.chars().all(|c| "gimsuy".contains(c)) {
                return (&rest[..end], flags.contains('i'));
            }
        }
    }
    (source, false)
}

fn resolve_range(condition: &Condition) -> RuleParams {
    if let Some(range) = resolve_numeric_range(condition) {
        return RuleParams::NumericRange(range);
    }
    if let Some(text) = &condition.text {
        if let Some(captures) = ISO_DATE_RANGE.captures(text) {
            if let (Some(start), Some(end)) = (parse_date(&captures[1]), parse_date(&captures[2])) {
                return RuleParams::DateRange(DateRange::new(start, end));
            }
        }
    }
    RuleParams::Unresolved("range requires a min-max condition".to_string())
}

fn resolve_numeric_range(condition: &Condition) -> Option<NumericRange> {
    let min = condition.lookup(&["min", "minimum", "from"]).and_then(value_as_number);
    let max = condition.lookup(&["max", "maximum", "to"]).and_then(value_as_number);
    if let (Some(min), Some(max)) = (min, max) {
        return checked_range(min, max);
    }

    let text = condition.primary_text(&["range", "value"])?;
    let captures = NUMERIC_RANGE.captures(&text)?;
    let min = parse_bound(&captures[1])?;
    let max = parse_bound(&captures[2])?;
    checked_range(min, max)
}

fn parse_bound(text: &str) -> Option<f64> {
    text.replace(',', "").parse::<f64>().ok()
}

fn checked_range(min: f64, max: f64) -> Option<NumericRange> {
    InputValidator::validate_bound(min, "min").ok()?;
    InputValidator::validate_bound(max, "max").ok()?;
    Some(NumericRange::new(min, max))
}

fn resolve_date_range(condition: &Condition) -> Option<DateRange> {
    let start = condition.lookup_text(&["start", "from", "min", "startDate"]);
    let end = condition.lookup_text(&["end", "to", "max", "endDate"]);
    if let (Some(start), Some(end)) = (start, end) {
        return Some(DateRange::new(parse_date(&start)?, parse_date(&end)?));
    }

    let text = condition.primary_text(&["range", "value"])?;
    if let Some(captures) = ISO_DATE_RANGE.captures(&text) {
        return Some(DateRange::new(
            parse_date(&captures[1])?,
            parse_date(&captures[2])?,
        ));
    }
    let (start, end) = text.split_once(':').or_else(|| text.split_once(','))?;
    Some(DateRange::new(parse_date(start)?, parse_date(end)?))
}

fn resolve_date_reference(condition: &Condition) -> RuleParams {
    let Some(reference) = condition.primary_text(&["field", "reference", "date", "value"]) else {
        return RuleParams::Unresolved("date comparison needs a field name or a date".to_string());
    };
    match parse_date(&reference) {
        Some(date) => RuleParams::DateReference(DateReference::Literal(date)),
        None => RuleParams::DateReference(DateReference::Field {
            name: reference,
            label: None,
        }),
    }
}

fn resolve_key(condition: &Condition, field_name: &str) -> RuleParams {
    let key = condition
        .primary_text(&["key", "field", "value"])
        .unwrap_or_else(|| field_name.to_string());
    match InputValidator::validate_identifier(&key, "uniqueness key") {
        Ok(()) => RuleParams::Key(key),
        Err(e) => RuleParams::Unresolved(e.to_string()),
    }
}

fn resolve_list(condition: &Condition) -> RuleParams {
    let mut values: Vec<String> = if !condition.items.is_empty() {
        condition.items.clone()
    } else if let Some(Value::Array(items)) = condition.lookup(&["departments", "values", "allowed"]) {
        items.iter().filter_map(value_as_text).collect()
    } else {
        condition
            .primary_text(&["departments", "values", "allowed", "value"])
            .map(|text| split_list(&text))
            .unwrap_or_default()
    };
    values.retain(|v| !v.is_empty());

    if values.is_empty() {
        values = DEFAULT_DEPARTMENTS.iter().map(|d| d.to_string()).collect();
    }
    RuleParams::List(values)
}

fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '|'])
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn resolve_leave_balances(condition: &Condition) -> BTreeMap<String, f64> {
    let mut balances = BTreeMap::new();

    if let Some(text) = &condition.text {
        for entry in split_list(text) {
            if let Some((category, amount)) = entry.split_once(':').or_else(|| entry.split_once('=')) {
                if let Ok(amount) = amount.trim().parse::<f64>() {
                    balances.insert(category.trim().to_ascii_lowercase(), amount);
                }
            }
        }
    }
    for (category, amount) in &condition.entries {
        if let Some(amount) = value_as_number(amount) {
            balances.insert(category.trim().to_ascii_lowercase(), amount);
        }
    }

    if balances.is_empty() {
        balances = DEFAULT_LEAVE_BALANCES
            .iter()
            .map(|(category, amount)| (category.to_string(), *amount))
            .collect();
    }
    balances
}

fn resolve_conditional(condition: &Condition) -> RuleParams {
    if let Some(field) = condition.lookup_text(&["field", "dependsOn", "when"]) {
        let value = condition.lookup_text(&["value", "equals", "is"]);
        let negated = condition
            .lookup_text(&["operator", "op"])
            .map(|op| matches!(op.trim(), "!=" | "!==" | "<>" | "not-equals" | "notEquals"))
            .unwrap_or(false);
        let op = match (&value, negated) {
            (None, _) => ConditionOp::Present,
            (Some(_), true) => ConditionOp::NotEquals,
            (Some(_), false) => ConditionOp::Equals,
        };
        return RuleParams::Conditional(ConditionExpr { field, op, value });
    }

    let Some(text) = condition.text.as_deref() else {
        return RuleParams::Unresolved("conditional rule does not name a controlling field".to_string());
    };
    match parse_condition_expr(text) {
        Some(expr) => RuleParams::Conditional(expr),
        None => RuleParams::Unresolved(format!("cannot read condition '{text}'")),
    }
}

/// Parses `field!=value`, `field==value`, `field=value`, `field:value` or a bare `field`.
///
/// `===` and `!==` read as `==` and `!=`. Returns `None` when the field part
/// is not a plain name, which is how unknown operators surface.
fn parse_condition_expr(text: &str) -> Option<ConditionExpr> {
    let (field, op, value) = if let Some((field, value)) = text.split_once("!=") {
        (field, ConditionOp::NotEquals, Some(value))
    } else if let Some((field, value)) = text.split_once("==") {
        (field, ConditionOp::Equals, Some(value))
    } else if let Some((field, value)) = text.split_once(['=', ':']) {
        (field, ConditionOp::Equals, Some(value))
    } else {
        (text, ConditionOp::Present, None)
    };

    let field = field.trim().trim_matches(['"', '\'']);
    if field.is_empty()
        || !field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return None;
    }
    let value = value.map(|v| {
        let v = v.strip_prefix('=').unwrap_or(v);
        v.trim().trim_matches(['"', '\'']).to_string()
    });
    Some(ConditionExpr {
        field: field.to_string(),
        op,
        value,
    })
}

/// Formats a bound without a trailing `.0` for whole numbers.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

impl Condition {
    #[cfg(test)]
    fn from_text(text: &str) -> Self {
        Self::read(&Value::String(text.to_string()))
    }
}
