/// Field kinds, declared field specifications and node options.
pub mod field;

/// Coercion of raw field values into their declared kind.
pub mod coercion;

/// Resolution of field names into nested write paths.
pub mod path;

/// Expression resolution for raw field text, backed by DataLogic.
pub mod expression;

/// Parsing of structured field values supplied as text.
pub mod json_parameter;

/// Per-field validation producing a path and a coerced value.
pub mod entry;

/// Assembly of output items from validated entries.
pub mod assembler;

/// Caller-supplied continue-on-fail policy.
pub mod failure_policy;

/// Per-item execution and the sequential batch helper.
pub mod executor;

pub use executor::SetNodeExecutor;
pub use failure_policy::{ContinueOnFail, FailureAction, ItemFailurePolicy, StopOnFail};
pub use field::{FieldKind, FieldSpecification, FieldValue, SetNodeOptions, SetNodeParameters};
