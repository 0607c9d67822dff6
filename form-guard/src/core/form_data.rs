//! Helpers for reading untyped form values.
//!
//! Form data arrives as a JSON object whose values are strings, numbers,
//! booleans or null. Spreadsheet uploads mix representations freely (a salary
//! may be `50000`, `"50000"` or `"50,000"`), so rules read values through
//! these helpers instead of matching on [`Value`] directly.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::rules::dates;

/// Form data: a mapping of field name to raw value.
pub type FormData = serde_json::Map<String, Value>;

/// Placeholder returned for fields missing from the form data.
static MISSING: Value = Value::Null;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const SPREADSHEET_EPOCH_OFFSET: i64 = 25_569;

/// Smallest number read as a spreadsheet serial (1920-01-01).
///
/// Smaller numbers are counts or bare years typed into a date column.
const MIN_SPREADSHEET_SERIAL: i64 = 7_306;

/// Largest spreadsheet serial that maps to a real date (9999-12-31).
const MAX_SPREADSHEET_SERIAL: i64 = 2_958_465;

/// Returns the value of `name`, or `Null` when the field is absent.
pub fn field_value<'a>(form_data: &'a FormData, name: &str) -> &'a Value {
    form_data.get(name).unwrap_or(&MISSING)
}

/// Returns true for missing, null, empty and whitespace-only values.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Renders a scalar as trimmed text. Returns `None` for empty values and containers.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a numeric value, accepting thousands separators and a trailing `%`.
pub fn value_as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .trim()
                .trim_end_matches('%')
                .chars()
                .filter(|c| *c != ',' && *c != '_')
                .collect();
            cleaned
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
        }
        _ => None,
    }
}

/// Reads a calendar date from text or a spreadsheet serial number.
///
/// Whole numbers from 7306 (1920-01-01) to 2958465 (9999-12-31) are
/// spreadsheet serials; any other number is not a date.
pub fn value_as_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => dates::parse_date(s),
        Value::Number(n) => n.as_i64().and_then(spreadsheet_serial_to_date),
        _ => None,
    }
}

fn spreadsheet_serial_to_date(serial: i64) -> Option<NaiveDate> {
    if !(MIN_SPREADSHEET_SERIAL..=MAX_SPREADSHEET_SERIAL).contains(&serial) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    epoch.checked_add_signed(Duration::days(serial - SPREADSHEET_EPOCH_OFFSET))
}

/// Compares two values the way a person reading the form would.
///
/// `"100"` equals `100`, surrounding whitespace is ignored and empty values
/// never match anything.
pub fn values_match(left: &Value, right: &Value) -> bool {
    match (value_as_text(left), value_as_text(right)) {
        (Some(l), Some(r)) => {
            if l == r {
                return true;
            }
            match (value_as_number(left), value_as_number(right)) {
                (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
                _ => false,
            }
        }
        _ => false,
    }
}

/// Deserializes a flag written as a boolean, number or string.
pub(crate) fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(flag_from_value(&value))
}

pub(crate) fn flag_from_value(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "y"
        ),
        _ => false,
    }
}
