// 🧹 Field Coercion Utilities
//
// v1 documents were written by several client versions, so the same field
// can arrive as a number, a numeric string, or garbage. These helpers turn
// raw JSON values into the v2 field types.

use crate::entities::TimeUnit;
use crate::error::MigrationError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// NUMBERS
// ============================================================================

/// What to do when a numeric field cannot be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberPolicy {
    /// Unparseable values become 0
    #[default]
    Lenient,
    /// Unparseable values abort the run
    Strict,
}

impl NumberPolicy {
    pub fn int(&self, field: &str, value: &Value) -> Result<i64, MigrationError> {
        match (try_int(value), self) {
            (Some(n), _) => Ok(n),
            (None, NumberPolicy::Lenient) => Ok(0),
            (None, NumberPolicy::Strict) => Err(strict_error(field, value)),
        }
    }

    pub fn float(&self, field: &str, value: &Value) -> Result<f64, MigrationError> {
        match (try_float(value), self) {
            (Some(n), _) => Ok(n),
            (None, NumberPolicy::Lenient) => Ok(0.0),
            (None, NumberPolicy::Strict) => Err(strict_error(field, value)),
        }
    }
}

fn strict_error(field: &str, value: &Value) -> MigrationError {
    MigrationError::StrictNumber {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Best-effort integer parse; 0 when the value is not a number
pub fn parse_int(value: &Value) -> i64 {
    try_int(value).unwrap_or(0)
}

/// Best-effort float parse; 0.0 when the value is not a number
pub fn parse_float(value: &Value) -> f64 {
    try_float(value).unwrap_or(0.0)
}

/// Integer conversion. Fractional numbers truncate toward zero; numeric
/// strings must hold an integer literal ("12.5" is rejected).
pub fn try_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite())
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Float conversion. Non-finite results count as failures since JSON
/// cannot carry them.
pub fn try_float(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|f| f.is_finite())
}

// ============================================================================
// STRINGS
// ============================================================================

/// Render any JSON value as a plain string, the way the v1 scripts printed
/// values: strings pass through unquoted, null is `None`, booleans are
/// `True`/`False`, everything else uses its JSON text.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        other => other.to_string(),
    }
}

/// Characters removed from notes, in removal order
const STRIPPED_NOTE_CHARS: [char; 5] = ['\n', '<', '>', '/', '\\'];

/// Turn free-form v1 notes into the single-paragraph markup v2 expects.
///
/// This only strips markup-significant characters; it does NOT escape `&`
/// or quotes.
pub fn sanitize_notes(value: &Value) -> String {
    let mut plain = stringify(value);
    for c in STRIPPED_NOTE_CHARS {
        plain = plain.replace(c, "");
    }
    format!("<p>{}</p>", plain)
}

// ============================================================================
// TIME UNITS
// ============================================================================

/// Map a v1 time unit ("day", "week", ...) to the v2 enum. Total: anything
/// unrecognized, including a missing value, is DAY.
pub fn normalize_time_unit(value: Option<&Value>) -> TimeUnit {
    match value.and_then(Value::as_str) {
        Some("day") => TimeUnit::Day,
        Some("week") => TimeUnit::Week,
        Some("month") => TimeUnit::Month,
        Some("year") => TimeUnit::Year,
        _ => TimeUnit::Day,
    }
}
