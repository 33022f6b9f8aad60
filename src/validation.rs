//! Configuration-time validation of set node parameters.
//!
//! Node parameters arrive as loosely shaped JSON. Everything that can be
//! checked without an item (field kinds, field names, option types, raw text
//! entries) is checked here, so a bad configuration is rejected before any
//! item is processed.

use crate::errors::ValidationError;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::{
    constants::{
        ENTRY_NAME, ENTRY_TYPE, ENTRY_VALUE, PARAM_FIELDS, PARAM_FIELDS_VALUES, PARAM_OPTIONS,
        PARAM_RAW_FIELDS,
    },
    engine::field::{FieldKind, FieldSpecification, FieldValue, SetNodeOptions, SetNodeParameters},
};

/// Turns raw node parameters into validated [`SetNodeParameters`].
pub struct Validator;

impl Validator {
    /// Validate node parameters using the built-in option defaults.
    pub fn validate_parameters(parameters: &Value) -> Result<SetNodeParameters, ValidationError> {
        Self::validate_parameters_with_defaults(parameters, SetNodeOptions::default())
    }

    /// Validate node parameters, filling options the parameters omit from `defaults`.
    ///
    /// Rules:
    /// 1. Parameters MUST be an object
    /// 2. `fields` MUST be an array, or an object holding the array under `values`
    /// 3. Every field MUST have a non-empty name and a known kind
    /// 4. `options` MUST be an object of boolean flags
    /// 5. `rawFields` MUST map field names to strings
    pub fn validate_parameters_with_defaults(
        parameters: &Value,
        defaults: SetNodeOptions,
    ) -> Result<SetNodeParameters, ValidationError> {
        let parameters = parameters
            .as_object()
            .ok_or_else(|| ValidationError::InvalidParameters {
                details: "Node parameters must be an object".to_string(),
            })?;

        let fields = match parameters.get(PARAM_FIELDS) {
            Some(fields) => Self::validate_fields(fields)?,
            None => Vec::new(),
        };

        let options = Self::validate_options(parameters.get(PARAM_OPTIONS), defaults)?;

        let raw_fields = match parameters.get(PARAM_RAW_FIELDS) {
            Some(raw_fields) => Self::validate_raw_fields(raw_fields)?,
            None => HashMap::new(),
        };

        Ok(SetNodeParameters {
            fields,
            options,
            raw_fields,
        })
    }

    /// Validate the declared field list.
    pub fn validate_fields(fields: &Value) -> Result<Vec<FieldSpecification>, ValidationError> {
        let entries = match fields {
            Value::Array(entries) => entries,
            Value::Object(collection) => match collection.get(PARAM_FIELDS_VALUES) {
                Some(Value::Array(entries)) => entries,
                None => return Ok(Vec::new()),
                Some(_) => {
                    return Err(ValidationError::InvalidFieldType {
                        field_name: PARAM_FIELDS_VALUES.to_string(),
                        context: PARAM_FIELDS.to_string(),
                        expected_type: "array".to_string(),
                    });
                }
            },
            Value::Null => return Ok(Vec::new()),
            _ => {
                return Err(ValidationError::InvalidFieldType {
                    field_name: PARAM_FIELDS.to_string(),
                    context: "parameters".to_string(),
                    expected_type: "array".to_string(),
                });
            }
        };

        entries
            .iter()
            .enumerate()
            .map(|(position, entry)| Self::validate_field(entry, position))
            .collect()
    }

    /// Validate a single field entry at `position` in the field list.
    pub fn validate_field(entry: &Value, position: usize) -> Result<FieldSpecification, ValidationError> {
        let context = format!("field {}", position);
        let entry = entry
            .as_object()
            .ok_or_else(|| ValidationError::InvalidFieldType {
                field_name: PARAM_FIELDS.to_string(),
                context: context.clone(),
                expected_type: "object".to_string(),
            })?;

        let name = match entry.get(ENTRY_NAME) {
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(ValidationError::InvalidFieldType {
                    field_name: ENTRY_NAME.to_string(),
                    context,
                    expected_type: "string".to_string(),
                });
            }
            None => {
                return Err(ValidationError::MissingRequiredField {
                    field_name: ENTRY_NAME.to_string(),
                    context,
                });
            }
        };
        if name.is_empty() {
            return Err(ValidationError::EmptyFieldName { position });
        }

        let kind = match entry.get(ENTRY_TYPE) {
            Some(Value::String(type_name)) => FieldKind::from_type_name(type_name).ok_or_else(|| {
                ValidationError::UnknownFieldKind {
                    kind: type_name.clone(),
                    position,
                }
            })?,
            Some(other) => {
                return Err(ValidationError::UnknownFieldKind {
                    kind: other.to_string(),
                    position,
                });
            }
            None => {
                return Err(ValidationError::MissingRequiredField {
                    field_name: ENTRY_TYPE.to_string(),
                    context,
                });
            }
        };

        let raw = entry
            .get(kind.type_name())
            .or_else(|| entry.get(ENTRY_VALUE))
            .cloned()
            .unwrap_or_else(|| kind.default_raw());

        Ok(FieldSpecification::new(name, FieldValue::new(kind, raw)))
    }

    /// Validate node options, overlaying them on `defaults`.
    pub fn validate_options(
        options: Option<&Value>,
        defaults: SetNodeOptions,
    ) -> Result<SetNodeOptions, ValidationError> {
        let overrides = match options {
            None | Some(Value::Null) => return Ok(defaults),
            Some(Value::Object(overrides)) => overrides,
            Some(_) => {
                return Err(ValidationError::InvalidFieldType {
                    field_name: PARAM_OPTIONS.to_string(),
                    context: "parameters".to_string(),
                    expected_type: "object".to_string(),
                });
            }
        };

        let mut merged = match serde_json::to_value(defaults) {
            Ok(Value::Object(merged)) => merged,
            _ => Map::new(),
        };
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(merged)).map_err(|e| ValidationError::InvalidFieldType {
            field_name: PARAM_OPTIONS.to_string(),
            context: e.to_string(),
            expected_type: "boolean flags".to_string(),
        })
    }

    /// Validate the raw text map of structured fields.
    pub fn validate_raw_fields(raw_fields: &Value) -> Result<HashMap<String, String>, ValidationError> {
        let raw_fields = match raw_fields {
            Value::Null => return Ok(HashMap::new()),
            Value::Object(raw_fields) => raw_fields,
            _ => {
                return Err(ValidationError::InvalidFieldType {
                    field_name: PARAM_RAW_FIELDS.to_string(),
                    context: "parameters".to_string(),
                    expected_type: "object".to_string(),
                });
            }
        };

        raw_fields
            .iter()
            .map(|(name, text)| match text {
                Value::String(text) => Ok((name.clone(), text.clone())),
                _ => Err(ValidationError::InvalidFieldType {
                    field_name: name.clone(),
                    context: PARAM_RAW_FIELDS.to_string(),
                    expected_type: "string".to_string(),
                }),
            })
            .collect()
    }
}

impl TryFrom<&Value> for SetNodeParameters {
    type Error = ValidationError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Validator::validate_parameters(value)
    }
}
