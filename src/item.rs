//! Data items flowing through a workflow.
//!
//! An item is the unit the set node works on: a structured `json` payload,
//! an optional opaque `binary` payload, and a back-reference to the input item
//! it was derived from.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::ERROR_FIELD;
use crate::errors::ValidationError;

/// Reference from an output item to the input item it was produced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedItem {
    pub item: usize,
}

/// A workflow data item.
///
/// The `json` payload is always an object; scalars are never valid at the top
/// level of an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    #[serde(default)]
    pub json: Map<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binary: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<PairedItem>,
}

impl Item {
    pub fn new(json: Map<String, Value>) -> Self {
        Self {
            json,
            binary: None,
            paired_item: None,
        }
    }

    /// Builds the substitute item returned when an item fails under continue-on-fail.
    pub fn error(message: impl Into<String>, item_index: usize) -> Self {
        let mut json = Map::new();
        json.insert(ERROR_FIELD.to_string(), Value::String(message.into()));
        Self {
            json,
            binary: None,
            paired_item: Some(PairedItem { item: item_index }),
        }
    }

    pub fn with_binary(mut self, binary: Map<String, Value>) -> Self {
        self.binary = Some(binary);
        self
    }

    pub fn with_paired_item(mut self, item_index: usize) -> Self {
        self.paired_item = Some(PairedItem { item: item_index });
        self
    }

    /// Returns the `json` payload as a `Value`.
    pub fn json_value(&self) -> Value {
        Value::Object(self.json.clone())
    }
}

impl From<Map<String, Value>> for Item {
    fn from(json: Map<String, Value>) -> Self {
        Self::new(json)
    }
}

impl TryFrom<Value> for Item {
    type Error = ValidationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(json) => Ok(Self::new(json)),
            other => Err(ValidationError::InvalidFieldType {
                field_name: "json".to_string(),
                context: format!("item payload {}", other),
                expected_type: "object".to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_item_from_object_value() {
        let item = Item::try_from(json!({"x": 1})).unwrap();
        assert_eq!(item.json_value(), json!({"x": 1}));
        assert!(item.binary.is_none());
        assert!(item.paired_item.is_none());
    }

    #[test]
    fn test_item_rejects_scalar_payload() {
        let result = Item::try_from(json!(42));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("expected object"));
    }

    #[test]
    fn test_error_item_shape() {
        let item = Item::error("boom", 3);
        let serialized = serde_json::to_value(&item).unwrap();
        assert_eq!(
            serialized,
            json!({"json": {"error": "boom"}, "pairedItem": {"item": 3}})
        );
    }

    #[test]
    fn test_item_deserializes_wire_names() {
        let item: Item = serde_json::from_value(json!({
            "json": {"a": true},
            "binary": {"data": {"mimeType": "text/plain"}},
            "pairedItem": {"item": 0}
        }))
        .unwrap();
        assert_eq!(item.json["a"], json!(true));
        assert!(item.binary.is_some());
        assert_eq!(item.paired_item, Some(PairedItem { item: 0 }));
    }
}
