//! Parsing of structured field values supplied as text.
//!
//! Object and array fields whose raw value arrives as (resolved) text are
//! parsed here before coercion. Hand-written JSON is often slightly off, so a
//! failed strict parse is retried once after a recovery pass that:
//!
//! - turns single quotes into double quotes,
//! - quotes bare object keys,
//! - drops trailing commas before `]` and `}`.
//!
//! Failures here are never downgraded by `ignoreConversionErrors`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::engine::field::FieldKind;
use crate::errors::FieldError;

static BARE_KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([{,]\s*)([\w$]+)\s*:").unwrap());

static TRAILING_COMMA_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*([\]}])").unwrap());

/// Best-effort repair of almost-JSON text.
pub fn recover_json(text: &str) -> String {
    let quoted = text.replace('\'', "\"");
    let keyed = BARE_KEY_PATTERN.replace_all(&quoted, "$1\"$2\":");
    TRAILING_COMMA_PATTERN.replace_all(&keyed, "$1").into_owned()
}

/// Parses the text of a structured field for the item at `item_index`.
///
/// The parsed value must be an object or array for [`FieldKind::Object`] and
/// an array for [`FieldKind::Array`].
pub fn parse_json_parameter(
    json_data: &str,
    kind: FieldKind,
    field_name: &str,
    item_index: usize,
) -> Result<Value, FieldError> {
    let location = format!("entry with name '{}'", field_name);

    let parsed = match serde_json::from_str::<Value>(json_data) {
        Ok(value) => value,
        Err(strict_error) => {
            let recovered = recover_json(json_data);
            match serde_json::from_str::<Value>(&recovered) {
                Ok(value) => {
                    tracing::debug!(
                        field_name,
                        item_index,
                        error = %strict_error,
                        "Recovered malformed JSON for field"
                    );
                    value
                }
                Err(_) => {
                    let description = if recovered == json_data {
                        json_data.to_string()
                    } else {
                        format!("{};\n Original input: {}", recovered, json_data)
                    };
                    return Err(FieldError::ObjectParse {
                        field_name: field_name.to_string(),
                        item_index,
                        message: format!("The {} in item {} contains invalid JSON", location, item_index),
                        description: Some(description),
                    });
                }
            }
        }
    };

    let shape_ok = match kind {
        FieldKind::Array => parsed.is_array(),
        _ => parsed.is_object() || parsed.is_array(),
    };
    if !shape_ok {
        let expected = if kind == FieldKind::Array { "array" } else { "object" };
        return Err(FieldError::ObjectParse {
            field_name: field_name.to_string(),
            item_index,
            message: format!(
                "The {} in item {} does not contain a valid JSON {}",
                location, item_index, expected
            ),
            description: None,
        });
    }

    Ok(parsed)
}
