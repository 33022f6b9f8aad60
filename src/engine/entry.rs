//! Validation of a single field entry.
//!
//! An entry is validated in three steps: its name is resolved into a path,
//! its raw value is selected (or, for structured kinds supplied as raw text,
//! resolved and parsed), and the value is coerced into the declared kind.
//! Every failure is attributed to the field name and item index here.

use serde_json::Value;
use std::collections::HashMap;

use crate::engine::coercion::coerce;
use crate::engine::expression::{ExpressionResolver, resolve_raw_data};
use crate::engine::field::{FieldSpecification, SetNodeOptions};
use crate::engine::json_parameter::parse_json_parameter;
use crate::engine::path::{PathSegment, resolve};
use crate::errors::FieldError;

/// A field entry that passed validation, ready to be written into an item.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEntry {
    pub name: String,
    pub path: Vec<PathSegment>,
    pub value: Value,
}

/// Validates `field` using the raw value of its own kind.
pub fn validate_entry(
    field: &FieldSpecification,
    item_index: usize,
    options: &SetNodeOptions,
) -> Result<ValidatedEntry, FieldError> {
    validate_entry_value(field, field.value.raw(), item_index, options)
}

/// Validates `field` using `raw` in place of the value it declares.
pub fn validate_entry_value(
    field: &FieldSpecification,
    raw: &Value,
    item_index: usize,
    options: &SetNodeOptions,
) -> Result<ValidatedEntry, FieldError> {
    let path = resolve(&field.name, options.dot_notation).map_err(|source| FieldError::InvalidPath {
        field_name: field.name.clone(),
        item_index,
        source,
    })?;

    let value = coerce(raw, field.kind(), options.ignore_conversion_errors)
        .map_err(|error| FieldError::from_coercion(&field.name, item_index, error))?;

    tracing::debug!(
        field_name = %field.name,
        kind = %field.kind(),
        item_index,
        "Validated field entry"
    );

    Ok(ValidatedEntry {
        name: field.name.clone(),
        path,
        value,
    })
}

/// Validates `field` for the item at `item_index`, resolving raw text first when present.
///
/// Object and array fields that have an entry in `raw_fields` take their value
/// from that text: expression segments are resolved through `resolver`, then
/// the result is parsed as JSON. All other fields use their declared value.
pub async fn resolve_entry(
    field: &FieldSpecification,
    raw_fields: &HashMap<String, String>,
    resolver: &dyn ExpressionResolver,
    item_index: usize,
    options: &SetNodeOptions,
) -> Result<ValidatedEntry, FieldError> {
    let kind = field.kind();
    let raw_text = raw_fields.get(&field.name).filter(|_| kind.is_structured());

    let Some(raw_text) = raw_text else {
        return validate_entry(field, item_index, options);
    };

    let resolved = resolve_raw_data(resolver, raw_text, item_index)
        .await
        .map_err(|e| FieldError::ExpressionFailed {
            field_name: field.name.clone(),
            item_index,
            details: e.to_string(),
        })?;
    let parsed = parse_json_parameter(&resolved, kind, &field.name, item_index)?;

    validate_entry_value(field, &parsed, item_index, options)
}
