//! Item-level execution of the set node.
//!
//! For each item the executor validates every declared field in declaration
//! order. The first failing field ends the item: the injected failure policy
//! either supplies a substitute item or the failure is returned to the caller
//! as an [`ItemError`]. When every field validates, the entries are assembled
//! into the output item.
//!
//! Parameters, resolver and policy are shared read-only by all items, so a
//! single executor can be used for items processed concurrently.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use serde_json::json;
//! use setnode::engine::executor::SetNodeExecutor;
//! use setnode::engine::expression::NoopExpressionResolver;
//! use setnode::engine::failure_policy::StopOnFail;
//! use setnode::engine::field::{FieldSpecification, SetNodeOptions, SetNodeParameters};
//! use setnode::item::Item;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let parameters = SetNodeParameters::new(
//!     vec![FieldSpecification::number("total", "42")],
//!     SetNodeOptions::default(),
//! );
//! let executor = SetNodeExecutor::new(
//!     parameters,
//!     Arc::new(NoopExpressionResolver),
//!     Arc::new(StopOnFail),
//! );
//!
//! let item = Item::try_from(json!({"id": 1})).unwrap();
//! let output = executor.execute_item(&item, 0).await.unwrap();
//! assert_eq!(output.json_value(), json!({"id": 1, "total": 42}));
//! # });
//! ```

use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

use crate::engine::assembler::prepare_item;
use crate::engine::entry::{ValidatedEntry, resolve_entry};
use crate::engine::expression::ExpressionResolver;
use crate::engine::failure_policy::{FailureAction, ItemFailurePolicy};
use crate::engine::field::SetNodeParameters;
use crate::errors::{FieldError, ItemError};
use crate::item::Item;

/// Applies a set node's field specifications to items.
#[derive(Clone)]
pub struct SetNodeExecutor {
    parameters: Arc<SetNodeParameters>,
    resolver: Arc<dyn ExpressionResolver>,
    policy: Arc<dyn ItemFailurePolicy>,
}

impl SetNodeExecutor {
    pub fn new(
        parameters: SetNodeParameters,
        resolver: Arc<dyn ExpressionResolver>,
        policy: Arc<dyn ItemFailurePolicy>,
    ) -> Self {
        Self {
            parameters: Arc::new(parameters),
            resolver,
            policy,
        }
    }

    pub fn parameters(&self) -> &SetNodeParameters {
        &self.parameters
    }

    /// Produces the output item for `item`, the input item at `item_index`.
    ///
    /// # Returns
    ///
    /// * `Ok(item)` - the assembled item, or the policy's substitute for a failed item
    /// * `Err(error)` - a field failed and the policy aborted
    #[instrument(level = "debug", skip(self, item), fields(fields = self.parameters.fields.len()))]
    pub async fn execute_item(&self, item: &Item, item_index: usize) -> Result<Item, ItemError> {
        match self.validate_fields(item_index).await {
            Ok(entries) => {
                debug!(entries = entries.len(), "Assembling output item");
                Ok(prepare_item(item, item_index, entries, &self.parameters.options))
            }
            Err(failure) => self.handle_failure(failure),
        }
    }

    /// Runs every item in index order, stopping at the first aborted item.
    pub async fn execute_items(&self, items: &[Item]) -> Result<Vec<Item>, ItemError> {
        let mut output = Vec::with_capacity(items.len());
        for (item_index, item) in items.iter().enumerate() {
            output.push(self.execute_item(item, item_index).await?);
        }
        Ok(output)
    }

    async fn validate_fields(&self, item_index: usize) -> Result<Vec<ValidatedEntry>, FieldError> {
        let parameters = self.parameters.as_ref();
        let mut entries = Vec::with_capacity(parameters.fields.len());

        for field in &parameters.fields {
            let entry = resolve_entry(
                field,
                &parameters.raw_fields,
                self.resolver.as_ref(),
                item_index,
                &parameters.options,
            )
            .await?;
            entries.push(entry);
        }

        Ok(entries)
    }

    fn handle_failure(&self, failure: FieldError) -> Result<Item, ItemError> {
        match self.policy.on_item_failure(&failure) {
            FailureAction::ContinueWith(substitute) => {
                warn!(
                    field_name = %failure.field_name(),
                    item_index = failure.item_index(),
                    error = %failure,
                    "Field validation failed, continuing with substitute item"
                );
                Ok(substitute)
            }
            FailureAction::Abort => {
                error!(
                    field_name = %failure.field_name(),
                    item_index = failure.item_index(),
                    error = %failure,
                    "Field validation failed"
                );
                Err(ItemError::from(failure))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::failure_policy::{ContinueOnFail, StopOnFail};
    use crate::engine::field::{FieldSpecification, SetNodeOptions};
    use crate::item::PairedItem;
    use crate::test_helpers::StaticExpressionResolver;
    use serde_json::{Value, json};

    fn executor(
        fields: Vec<FieldSpecification>,
        options: SetNodeOptions,
        policy: Arc<dyn ItemFailurePolicy>,
    ) -> SetNodeExecutor {
        SetNodeExecutor::new(
            SetNodeParameters::new(fields, options),
            Arc::new(StaticExpressionResolver::default()),
            policy,
        )
    }

    fn item(value: Value) -> Item {
        Item::try_from(value).unwrap()
    }

    #[tokio::test]
    async fn test_execute_item_merges_fields() {
        let executor = executor(
            vec![
                FieldSpecification::string("name", "Ada"),
                FieldSpecification::number("age", "36"),
                FieldSpecification::boolean("active", "true"),
                FieldSpecification::array("tags", "[\"a\"]"),
                FieldSpecification::object("meta", "{\"k\": 1}"),
            ],
            SetNodeOptions::default(),
            Arc::new(StopOnFail),
        );

        let output = executor.execute_item(&item(json!({"id": 9})), 0).await.unwrap();
        assert_eq!(
            output.json_value(),
            json!({
                "id": 9,
                "name": "Ada",
                "age": 36,
                "active": true,
                "tags": ["a"],
                "meta": {"k": 1}
            })
        );
        assert_eq!(output.paired_item, Some(PairedItem { item: 0 }));
    }

    #[tokio::test]
    async fn test_execute_item_aborts_with_item_index() {
        let executor = executor(
            vec![
                FieldSpecification::string("ok", "fine"),
                FieldSpecification::number("bad", "abc"),
            ],
            SetNodeOptions::default(),
            Arc::new(StopOnFail),
        );

        let err = executor.execute_item(&item(json!({})), 7).await.unwrap_err();
        assert_eq!(err.item_index(), 7);
        assert_eq!(err.field_error().field_name(), "bad");
        assert!(err.description().unwrap().contains("\"bad\""));
        assert!(err.to_string().contains("error-setnode-item-1"));
    }

    #[tokio::test]
    async fn test_execute_item_continue_on_fail() {
        let executor = executor(
            vec![FieldSpecification::boolean("flag", "maybe")],
            SetNodeOptions::default(),
            Arc::new(ContinueOnFail),
        );

        let output = executor
            .execute_item(&item(json!({"keep": "me"})), 1)
            .await
            .unwrap();
        assert_eq!(output.json.len(), 1);
        let message = output.json["error"].as_str().unwrap();
        assert!(message.contains("'flag' expects a boolean but we got 'maybe' [item 1]"));
    }

    #[tokio::test]
    async fn test_first_failing_field_stops_validation() {
        let executor = executor(
            vec![
                FieldSpecification::number("first", "x"),
                FieldSpecification::object("second", "{bad"),
            ],
            SetNodeOptions::default(),
            Arc::new(StopOnFail),
        );

        let err = executor.execute_item(&item(json!({})), 0).await.unwrap_err();
        assert_eq!(err.field_error().field_name(), "first");
    }

    #[tokio::test]
    async fn test_execute_items_stops_at_abort() {
        let executor = executor(
            vec![FieldSpecification::number("n", "not a number")],
            SetNodeOptions::default(),
            Arc::new(StopOnFail),
        );
        let err = executor
            .execute_items(&[item(json!({})), item(json!({}))])
            .await
            .unwrap_err();
        assert_eq!(err.item_index(), 0);
    }

    #[tokio::test]
    async fn test_execute_items_with_continue() {
        let executor = executor(
            vec![FieldSpecification::number("n", "not a number")],
            SetNodeOptions::default(),
            Arc::new(ContinueOnFail),
        );
        let output = executor
            .execute_items(&[item(json!({})), item(json!({}))])
            .await
            .unwrap();
        assert_eq!(output.len(), 2);
        assert_eq!(output[1].paired_item, Some(PairedItem { item: 1 }));
        assert!(output[1].json.contains_key("error"));
    }

    #[tokio::test]
    async fn test_execute_item_is_idempotent() {
        let executor = executor(
            vec![
                FieldSpecification::number("a.b", "1"),
                FieldSpecification::string("a.c", 2),
            ],
            SetNodeOptions::default(),
            Arc::new(StopOnFail),
        );
        let input = item(json!({"x": {"y": [1, 2]}}));

        let first = executor.execute_item(&input, 0).await.unwrap();
        let second = executor.execute_item(&input, 0).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(input.json_value(), json!({"x": {"y": [1, 2]}}));
    }

    #[tokio::test]
    async fn test_executor_shared_across_tasks() {
        let executor = Arc::new(executor(
            vec![FieldSpecification::number("n", "5")],
            SetNodeOptions {
                keep_only_set: true,
                ..SetNodeOptions::default()
            },
            Arc::new(StopOnFail),
        ));

        let handles: Vec<_> = (0..4)
            .map(|index| {
                let executor = Arc::clone(&executor);
                tokio::spawn(async move {
                    let input = Item::try_from(json!({"index": index})).unwrap();
                    executor.execute_item(&input, index).await
                })
            })
            .collect();

        for handle in handles {
            let output = handle.await.unwrap().unwrap();
            assert_eq!(output.json_value(), json!({"n": 5}));
        }
    }
}
