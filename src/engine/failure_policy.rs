//! Caller-supplied policy for items that fail validation.
//!
//! The executor never decides on its own whether a failed item aborts the
//! batch. It asks the injected [`ItemFailurePolicy`], which either supplies a
//! substitute item to continue with or asks to abort.

use std::sync::Arc;

use crate::errors::FieldError;
use crate::item::Item;

/// What to do with an item whose processing failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureAction {
    /// Emit this item in place of the failed one and keep going.
    ContinueWith(Item),
    /// Surface the failure to the caller.
    Abort,
}

pub trait ItemFailurePolicy: Send + Sync {
    fn on_item_failure(&self, failure: &FieldError) -> FailureAction;
}

impl<F> ItemFailurePolicy for F
where
    F: Fn(&FieldError) -> FailureAction + Send + Sync,
{
    fn on_item_failure(&self, failure: &FieldError) -> FailureAction {
        self(failure)
    }
}

/// Continue-on-fail: the failed item is replaced by `{ "error": <message> }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContinueOnFail;

impl ItemFailurePolicy for ContinueOnFail {
    fn on_item_failure(&self, failure: &FieldError) -> FailureAction {
        FailureAction::ContinueWith(Item::error(failure.to_string(), failure.item_index()))
    }
}

/// Every failure aborts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StopOnFail;

impl ItemFailurePolicy for StopOnFail {
    fn on_item_failure(&self, _failure: &FieldError) -> FailureAction {
        FailureAction::Abort
    }
}

/// Selects the policy matching a continue-on-fail flag.
pub fn failure_policy(continue_on_fail: bool) -> Arc<dyn ItemFailurePolicy> {
    if continue_on_fail {
        Arc::new(ContinueOnFail)
    } else {
        Arc::new(StopOnFail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::field::FieldKind;
    use serde_json::json;

    fn failure() -> FieldError {
        FieldError::TypeMismatch {
            field_name: "n".to_string(),
            item_index: 2,
            expected: FieldKind::Number,
            value: "x".to_string(),
        }
    }

    #[test]
    fn test_continue_on_fail_builds_error_item() {
        let FailureAction::ContinueWith(item) = ContinueOnFail.on_item_failure(&failure()) else {
            panic!("expected a substitute item");
        };
        assert_eq!(item.json.len(), 1);
        assert_eq!(item.json["error"], json!(failure().to_string()));
        assert_eq!(item.paired_item.map(|p| p.item), Some(2));
    }

    #[test]
    fn test_stop_on_fail_aborts() {
        assert_eq!(StopOnFail.on_item_failure(&failure()), FailureAction::Abort);
    }

    #[test]
    fn test_closure_policy() {
        let policy = |failure: &FieldError| {
            if failure.item_index() % 2 == 0 {
                FailureAction::Abort
            } else {
                FailureAction::ContinueWith(Item::default())
            }
        };
        assert_eq!(policy.on_item_failure(&failure()), FailureAction::Abort);
    }

    #[test]
    fn test_policy_from_flag() {
        assert!(matches!(
            failure_policy(true).on_item_failure(&failure()),
            FailureAction::ContinueWith(_)
        ));
        assert_eq!(failure_policy(false).on_item_failure(&failure()), FailureAction::Abort);
    }
}
