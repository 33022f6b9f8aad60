//! Test helper utilities for setnode tests
//!
//! This module provides a canned expression resolver and shared guards for
//! tests that touch process-wide state.

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;

use crate::engine::expression::ExpressionResolver;

// Test environment mutex to prevent concurrent environment variable modification
pub static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Resolver answering from a fixed table of expressions.
///
/// The same answer is returned for every item. Unknown expressions fail.
#[derive(Debug, Clone, Default)]
pub struct StaticExpressionResolver {
    answers: HashMap<String, Value>,
}

impl StaticExpressionResolver {
    pub fn with(mut self, expression: &str, value: Value) -> Self {
        self.answers.insert(expression.to_string(), value);
        self
    }
}

#[async_trait]
impl ExpressionResolver for StaticExpressionResolver {
    async fn evaluate(&self, expression: &str, item_index: usize) -> Result<Value> {
        self.answers
            .get(expression)
            .cloned()
            .ok_or_else(|| anyhow!("Unknown expression '{}' for item {}", expression, item_index))
    }
}
