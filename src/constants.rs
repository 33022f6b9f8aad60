//! Application-wide constants

/// Field kind identifiers as they appear in the `type` parameter of a field entry
pub(crate) const FIELD_TYPE_STRING: &str = "stringValue";
pub(crate) const FIELD_TYPE_NUMBER: &str = "numberValue";
pub(crate) const FIELD_TYPE_BOOLEAN: &str = "booleanValue";
pub(crate) const FIELD_TYPE_ARRAY: &str = "arrayValue";
pub(crate) const FIELD_TYPE_OBJECT: &str = "objectValue";

/// Parameter keys of the node
pub(crate) const PARAM_FIELDS: &str = "fields";
pub(crate) const PARAM_FIELDS_VALUES: &str = "values";
pub(crate) const PARAM_OPTIONS: &str = "options";
pub(crate) const PARAM_RAW_FIELDS: &str = "rawFields";

/// Keys of a single field entry
pub(crate) const ENTRY_NAME: &str = "name";
pub(crate) const ENTRY_TYPE: &str = "type";
pub(crate) const ENTRY_VALUE: &str = "value";

/// Key of the soft-fail payload in an output item
pub(crate) const ERROR_FIELD: &str = "error";

/// Prefix marking a raw value as an expression
pub(crate) const EXPRESSION_PREFIX: char = '=';

/// Largest array position a field name may address
pub(crate) const MAX_ARRAY_INDEX: usize = 100_000;
