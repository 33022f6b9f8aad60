//! Field specifications and node options.
//!
//! A field specification declares one output field: where to write it (its
//! name, possibly a dot-path) and which kind of value to write. The raw value
//! travels inside the kind's variant, so a specification can never hold a
//! payload for a kind other than its own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

use crate::constants::{
    FIELD_TYPE_ARRAY, FIELD_TYPE_BOOLEAN, FIELD_TYPE_NUMBER, FIELD_TYPE_OBJECT, FIELD_TYPE_STRING,
};

/// The five value kinds a field can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::String,
        FieldKind::Number,
        FieldKind::Boolean,
        FieldKind::Array,
        FieldKind::Object,
    ];

    /// The `type` identifier used by node parameters, e.g. `numberValue`.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => FIELD_TYPE_STRING,
            FieldKind::Number => FIELD_TYPE_NUMBER,
            FieldKind::Boolean => FIELD_TYPE_BOOLEAN,
            FieldKind::Array => FIELD_TYPE_ARRAY,
            FieldKind::Object => FIELD_TYPE_OBJECT,
        }
    }

    /// Parses either the parameter identifier (`numberValue`) or the short name (`number`).
    pub fn from_type_name(name: &str) -> Option<Self> {
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == name || kind.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Array => "array",
            FieldKind::Object => "object",
        }
    }

    /// Value used when a field entry omits its raw slot.
    pub fn default_raw(&self) -> Value {
        match self {
            FieldKind::String => Value::String(String::new()),
            FieldKind::Number => Value::from(0),
            FieldKind::Boolean => Value::String("true".to_string()),
            FieldKind::Array => Value::String(String::new()),
            FieldKind::Object => Value::Object(Map::new()),
        }
    }

    /// Whether raw text for this kind may be routed through the JSON sub-parser.
    pub fn is_structured(&self) -> bool {
        matches!(self, FieldKind::Array | FieldKind::Object)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw value of a field, tagged with its declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(Value),
    Number(Value),
    Boolean(Value),
    Array(Value),
    Object(Value),
}

impl FieldValue {
    pub fn new(kind: FieldKind, raw: Value) -> Self {
        match kind {
            FieldKind::String => FieldValue::String(raw),
            FieldKind::Number => FieldValue::Number(raw),
            FieldKind::Boolean => FieldValue::Boolean(raw),
            FieldKind::Array => FieldValue::Array(raw),
            FieldKind::Object => FieldValue::Object(raw),
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Array(_) => FieldKind::Array,
            FieldValue::Object(_) => FieldKind::Object,
        }
    }

    pub fn raw(&self) -> &Value {
        match self {
            FieldValue::String(raw)
            | FieldValue::Number(raw)
            | FieldValue::Boolean(raw)
            | FieldValue::Array(raw)
            | FieldValue::Object(raw) => raw,
        }
    }
}

/// One declared output field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpecification {
    pub name: String,
    pub value: FieldValue,
}

impl FieldSpecification {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn string(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(name, FieldValue::String(raw.into()))
    }

    pub fn number(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(name, FieldValue::Number(raw.into()))
    }

    pub fn boolean(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(name, FieldValue::Boolean(raw.into()))
    }

    pub fn array(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(name, FieldValue::Array(raw.into()))
    }

    pub fn object(name: impl Into<String>, raw: impl Into<Value>) -> Self {
        Self::new(name, FieldValue::Object(raw.into()))
    }

    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }
}

fn default_true() -> bool {
    true
}

/// Options of the set node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetNodeOptions {
    /// Split field names on `.` and brackets into nested paths.
    #[serde(default = "default_true")]
    pub dot_notation: bool,

    /// Replace conversion failures with a best-effort value instead of failing.
    #[serde(default)]
    pub ignore_conversion_errors: bool,

    /// Start from an empty payload instead of a copy of the input item.
    #[serde(default)]
    pub keep_only_set: bool,

    /// Carry the input item's binary payload onto the output item.
    #[serde(default = "default_true")]
    pub include_binary: bool,
}

impl Default for SetNodeOptions {
    fn default() -> Self {
        Self {
            dot_notation: true,
            ignore_conversion_errors: false,
            keep_only_set: false,
            include_binary: true,
        }
    }
}

/// Everything the node needs per invocation, read-only while items are processed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetNodeParameters {
    pub fields: Vec<FieldSpecification>,
    pub options: SetNodeOptions,
    /// Unresolved raw text of object and array fields, keyed by field name.
    pub raw_fields: HashMap<String, String>,
}

impl SetNodeParameters {
    pub fn new(fields: Vec<FieldSpecification>, options: SetNodeOptions) -> Self {
        Self {
            fields,
            options,
            raw_fields: HashMap::new(),
        }
    }

    pub fn with_raw_field(mut self, name: impl Into<String>, raw: impl Into<String>) -> Self {
        self.raw_fields.insert(name.into(), raw.into());
        self
    }
}
