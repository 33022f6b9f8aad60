//! # setnode
//!
//! setnode is the field-setting engine of a workflow "Set" node. For every input
//! item it writes a declared list of fields, each with a name (optionally a
//! dot-notation path) and a declared value kind, and produces one output item.
//!
//! ## Architecture Overview
//!
//! ### Field Specifications
//! - **Kinds**: `string`, `number`, `boolean`, `array`, `object`
//! - Each field carries its raw value inside the variant of its kind
//! - Node parameters are validated into [`engine::field::SetNodeParameters`] before any item runs
//!
//! ### Evaluation Engine
//! - **Name resolution** turns `a.b[0]` into a write path, or keeps the name literal
//! - **Raw text resolution** evaluates `{{ ... }}` segments through an injected resolver,
//!   with a `datalogic-rs` backed implementation
//! - **JSON sub-parsing** parses object and array text, with a recovery pass for hand-written JSON
//! - **Coercion** converts raw values to the declared kind, optionally best-effort
//! - **Assembly** writes validated entries into a copy of the item, or into an empty item
//!
//! ### Failure Handling
//! - The first failing field of an item ends that item
//! - A caller-supplied policy decides between a soft-fail `{ "error": ... }` item and aborting
//!
//! ## Configuration
//!
//! The `setnode` binary is configured via environment variables:
//! - `SETNODE_DOT_NOTATION`, `SETNODE_IGNORE_CONVERSION_ERRORS`, `SETNODE_KEEP_ONLY_SET`,
//!   `SETNODE_INCLUDE_BINARY`: default node options
//! - `SETNODE_CONTINUE_ON_FAIL`: soft-fail failed items instead of aborting
//! - `RUST_LOG`, `JSON_LOGS`: logging
//!
//! ## Error Handling
//!
//! All error strings use the format: `error-setnode-<domain>-<number> <message>: <details>`
//!
//! ## Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use setnode::engine::{SetNodeExecutor, StopOnFail};
//! use setnode::engine::expression::DataLogicExpressionResolver;
//! use setnode::validation::Validator;
//!
//! let parameters = Validator::validate_parameters(&node_parameters)?;
//! let executor = SetNodeExecutor::new(
//!     parameters,
//!     Arc::new(DataLogicExpressionResolver::from_items(&items)),
//!     Arc::new(StopOnFail),
//! );
//!
//! let output = executor.execute_items(&items).await?;
//! ```

/// Configuration management for the setnode binary.
///
/// Default node options and the continue-on-fail switch are loaded from
/// environment variables.
pub mod config;

pub(crate) mod constants;

/// Set node evaluation engine.
///
/// Contains field specifications, value coercion, name resolution, raw text
/// resolution, item assembly and the item-level executor.
pub mod engine;

pub mod errors;

/// Workflow data items.
pub mod item;

/// Configuration-time validation of node parameters.
pub mod validation;

#[cfg(test)]
pub mod test_helpers;
