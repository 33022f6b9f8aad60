use thiserror::Error;

use crate::engine::field::FieldKind;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("error-setnode-config-1 Version not available")]
    VersionNotAvailable,

    #[error("error-setnode-config-2 Invalid boolean flag for {var_name}: {value}")]
    InvalidBooleanFlag { var_name: String, value: String },
}

/// Configuration-time problems with the node parameters.
///
/// These are raised before any item is processed and never carry an item index.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("error-setnode-validation-1 Invalid node parameters: {details}")]
    InvalidParameters { details: String },

    #[error("error-setnode-validation-2 Missing required field: {field_name} in {context}")]
    MissingRequiredField { field_name: String, context: String },

    #[error(
        "error-setnode-validation-3 Invalid field type: {field_name} in {context}, expected {expected_type}"
    )]
    InvalidFieldType {
        field_name: String,
        context: String,
        expected_type: String,
    },

    #[error("error-setnode-validation-4 Unknown field kind '{kind}' for field at position {position}")]
    UnknownFieldKind { kind: String, position: usize },

    #[error("error-setnode-validation-5 Field at position {position} has an empty name")]
    EmptyFieldName { position: usize },
}

/// Failures of the value coercer, before they are attributed to a field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoercionError {
    #[error("error-setnode-coercion-1 '{value}' does not match kind {expected}")]
    TypeMismatch { expected: FieldKind, value: String },

    #[error("error-setnode-coercion-2 '{value}' could not be parsed as an array")]
    ArrayParse { value: String },

    #[error("error-setnode-coercion-3 '{value}' could not be parsed as an object")]
    ObjectParse { value: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PathError {
    #[error("error-setnode-path-1 Field name is empty")]
    EmptyPath,

    #[error("error-setnode-path-2 Empty segment at offset {offset} in '{path}'")]
    EmptySegment { path: String, offset: usize },

    #[error("error-setnode-path-3 Unclosed bracket in '{path}'")]
    UnclosedBracket { path: String },

    #[error("error-setnode-path-4 Invalid bracket segment '[{content}]' in '{path}'")]
    InvalidBracket { path: String, content: String },

    #[error("error-setnode-path-5 Expected '.' or '[' after ']' at offset {offset} in '{path}'")]
    MissingSeparator { path: String, offset: usize },

    #[error("error-setnode-path-6 Index {index} exceeds the maximum of {max} in '{path}'")]
    IndexTooLarge {
        path: String,
        index: String,
        max: usize,
    },
}

/// A field entry that failed validation for a specific item.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldError {
    #[error(
        "error-setnode-field-1 '{field_name}' expects a {expected} but we got '{value}' [item {item_index}]"
    )]
    TypeMismatch {
        field_name: String,
        item_index: usize,
        expected: FieldKind,
        value: String,
    },

    #[error(
        "error-setnode-field-2 '{field_name}' expects an array but we got '{value}' [item {item_index}]"
    )]
    ArrayParse {
        field_name: String,
        item_index: usize,
        value: String,
    },

    #[error("error-setnode-field-3 {message} [item {item_index}]")]
    ObjectParse {
        field_name: String,
        item_index: usize,
        message: String,
        description: Option<String>,
    },

    #[error("error-setnode-field-4 Invalid field name '{field_name}': {source} [item {item_index}]")]
    InvalidPath {
        field_name: String,
        item_index: usize,
        #[source]
        source: PathError,
    },

    #[error(
        "error-setnode-field-5 Expression for '{field_name}' could not be resolved: {details} [item {item_index}]"
    )]
    ExpressionFailed {
        field_name: String,
        item_index: usize,
        details: String,
    },
}

impl FieldError {
    /// Attributes a coercer failure to a field and item.
    pub fn from_coercion(field_name: &str, item_index: usize, error: CoercionError) -> Self {
        let field_name = field_name.to_string();
        match error {
            CoercionError::TypeMismatch { expected, value } => FieldError::TypeMismatch {
                field_name,
                item_index,
                expected,
                value,
            },
            CoercionError::ArrayParse { value } => FieldError::ArrayParse {
                field_name,
                item_index,
                value,
            },
            CoercionError::ObjectParse { value } => FieldError::ObjectParse {
                message: format!("'{}' expects an object but we got '{}'", field_name, value),
                field_name,
                item_index,
                description: None,
            },
        }
    }

    pub fn field_name(&self) -> &str {
        match self {
            FieldError::TypeMismatch { field_name, .. }
            | FieldError::ArrayParse { field_name, .. }
            | FieldError::ObjectParse { field_name, .. }
            | FieldError::InvalidPath { field_name, .. }
            | FieldError::ExpressionFailed { field_name, .. } => field_name,
        }
    }

    pub fn item_index(&self) -> usize {
        match self {
            FieldError::TypeMismatch { item_index, .. }
            | FieldError::ArrayParse { item_index, .. }
            | FieldError::ObjectParse { item_index, .. }
            | FieldError::InvalidPath { item_index, .. }
            | FieldError::ExpressionFailed { item_index, .. } => *item_index,
        }
    }

    /// Human-readable hint on how to fix the failure, if one applies.
    pub fn description(&self) -> Option<String> {
        match self {
            FieldError::TypeMismatch { field_name, .. } | FieldError::ArrayParse { field_name, .. } => {
                Some(format!(
                    "To fix the error try to change the type for the field \"{}\" or activate the option “Ignore Type Conversion Errors” to apply a less strict type validation",
                    field_name
                ))
            }
            FieldError::ObjectParse { description, .. } => description.clone(),
            FieldError::InvalidPath { .. } => Some(
                "Disable the option “Support Dot Notation” to use the field name literally".to_string(),
            ),
            FieldError::ExpressionFailed { .. } => None,
        }
    }
}

/// Error surfaced to the caller when an item fails and the failure policy aborts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ItemError {
    #[error("error-setnode-item-1 Item {item_index} could not be processed: {source}")]
    FieldFailed {
        item_index: usize,
        description: Option<String>,
        #[source]
        source: FieldError,
    },
}

impl ItemError {
    pub fn item_index(&self) -> usize {
        match self {
            ItemError::FieldFailed { item_index, .. } => *item_index,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            ItemError::FieldFailed { description, .. } => description.as_deref(),
        }
    }

    pub fn field_error(&self) -> &FieldError {
        match self {
            ItemError::FieldFailed { source, .. } => source,
        }
    }
}

impl From<FieldError> for ItemError {
    fn from(source: FieldError) -> Self {
        ItemError::FieldFailed {
            item_index: source.item_index(),
            description: source.description(),
            source,
        }
    }
}
