//! Value coercion into the declared field kind.
//!
//! Coercion is a pure function of the raw value and the declared kind. In
//! strict mode every mismatch is an error; with conversion errors ignored the
//! coercer substitutes a best-effort value instead:
//!
//! | kind    | substitute on failure                       |
//! |---------|---------------------------------------------|
//! | number  | the raw value, unchanged                    |
//! | boolean | the JSON truthiness of the raw value        |
//! | array   | the raw value, unchanged                    |
//! | object  | none, the failure always propagates         |
//!
//! A malformed object literal has no meaningful substitute, so it fails even
//! when conversion errors are ignored.

use serde_json::{Number, Value};

use crate::engine::field::FieldKind;
use crate::errors::CoercionError;

/// Largest integer an `f64` holds exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Coerces `raw` into `kind`, downgrading failures when `ignore_errors` is set.
pub fn coerce(raw: &Value, kind: FieldKind, ignore_errors: bool) -> Result<Value, CoercionError> {
    match coerce_strict(raw, kind) {
        Ok(value) => Ok(value),
        Err(error) if ignore_errors => match best_effort(raw, kind) {
            Some(substitute) => {
                tracing::warn!(
                    kind = %kind,
                    error = %error,
                    substitute = %substitute,
                    "Ignoring type conversion error"
                );
                Ok(substitute)
            }
            None => Err(error),
        },
        Err(error) => Err(error),
    }
}

/// Coerces `raw` into `kind` without any fallback.
pub fn coerce_strict(raw: &Value, kind: FieldKind) -> Result<Value, CoercionError> {
    match kind {
        FieldKind::String => Ok(Value::String(to_text(raw))),
        FieldKind::Number => to_number(raw),
        FieldKind::Boolean => to_boolean(raw),
        FieldKind::Array => to_array(raw),
        FieldKind::Object => to_object(raw),
    }
}

fn best_effort(raw: &Value, kind: FieldKind) -> Option<Value> {
    match kind {
        FieldKind::String | FieldKind::Number | FieldKind::Array => Some(raw.clone()),
        FieldKind::Boolean => Some(Value::Bool(is_truthy(raw))),
        FieldKind::Object => None,
    }
}

/// Canonical text form of a value.
///
/// Strings are returned as-is, numbers without a trailing `.0` when whole,
/// and structured values as compact JSON.
pub fn to_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Number(n) => number_text(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => raw.to_string(),
    }
}

fn number_text(n: &Number) -> String {
    if n.is_f64() {
        if let Some(f) = n.as_f64() {
            if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
                return (f as i64).to_string();
            }
        }
    }
    n.to_string()
}

fn mismatch(raw: &Value, expected: FieldKind) -> CoercionError {
    CoercionError::TypeMismatch {
        expected,
        value: to_text(raw),
    }
}

fn to_number(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Null => Ok(Value::Null),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => float_value(f).ok_or_else(|| mismatch(raw, FieldKind::Number)),
            _ => Ok(raw.clone()),
        },
        Value::Bool(b) => Ok(Value::from(u8::from(*b))),
        Value::String(s) => parse_number(s).ok_or_else(|| mismatch(raw, FieldKind::Number)),
        Value::Array(_) | Value::Object(_) => Err(mismatch(raw, FieldKind::Number)),
    }
}

/// Parses numeric text the way loosely-typed sources write numbers.
///
/// Blank text is zero; `0x`, `0o` and `0b` prefixes select a radix.
pub fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Some(Value::from(0));
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return i64::from_str_radix(digits, radix).ok().map(Value::from);
        }
    }

    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::from(int));
    }
    if let Ok(int) = trimmed.parse::<u64>() {
        return Some(Value::from(int));
    }

    // Rust accepts "inf" and "NaN" spellings; JSON cannot carry them.
    trimmed.parse::<f64>().ok().and_then(float_value)
}

fn float_value(f: f64) -> Option<Value> {
    if !f.is_finite() {
        return None;
    }
    if f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER {
        return Some(Value::from(f as i64));
    }
    Number::from_f64(f).map(Value::Number)
}

fn to_boolean(raw: &Value) -> Result<Value, CoercionError> {
    match raw {
        Value::Null => Ok(Value::Null),
        Value::Bool(_) => Ok(raw.clone()),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f == 1.0 => Ok(Value::Bool(true)),
            Some(f) if f == 0.0 => Ok(Value::Bool(false)),
            _ => Err(mismatch(raw, FieldKind::Boolean)),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                return Ok(Value::Bool(true));
            }
            if trimmed.eq_ignore_ascii_case("false") {
                return Ok(Value::Bool(false));
            }
            if trimmed.is_empty() {
                return Err(mismatch(raw, FieldKind::Boolean));
            }
            match parse_number(trimmed).and_then(|n| n.as_f64()) {
                Some(f) if f == 1.0 => Ok(Value::Bool(true)),
                Some(f) if f == 0.0 => Ok(Value::Bool(false)),
                _ => Err(mismatch(raw, FieldKind::Boolean)),
            }
        }
        Value::Array(_) | Value::Object(_) => Err(mismatch(raw, FieldKind::Boolean)),
    }
}

/// JSON truthiness: `null`, `false`, `0` and `""` are false, everything else true.
pub fn is_truthy(raw: &Value) -> bool {
    match raw {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn to_array(raw: &Value) -> Result<Value, CoercionError> {
    let parse_error = || CoercionError::ArrayParse {
        value: to_text(raw),
    };

    match raw {
        Value::Null | Value::Array(_) => Ok(raw.clone()),
        Value::String(s) => {
            if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(s) {
                return Ok(parsed);
            }
            // Hand-written literals often use single quotes.
            match serde_json::from_str::<Value>(&s.replace('\'', "\"")) {
                Ok(parsed @ Value::Array(_)) => Ok(parsed),
                _ => Err(parse_error()),
            }
        }
        _ => Err(parse_error()),
    }
}

fn to_object(raw: &Value) -> Result<Value, CoercionError> {
    let parse_error = || CoercionError::ObjectParse {
        value: to_text(raw),
    };

    match raw {
        Value::Null | Value::Object(_) | Value::Array(_) => Ok(raw.clone()),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ (Value::Object(_) | Value::Array(_))) => Ok(parsed),
            _ => Err(parse_error()),
        },
        _ => Err(parse_error()),
    }
}
