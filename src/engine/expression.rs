//! Expression resolution for raw field values.
//!
//! Raw text that starts with `=` is an expression template: every `{{ ... }}`
//! segment in it is evaluated for the current item and spliced back into the
//! text. Evaluation itself is delegated to an [`ExpressionResolver`], so the
//! engine works with any expression language, or with none at all.
//!
//! [`DataLogicExpressionResolver`] evaluates segments written as JSON logic
//! against the item's `json` payload:
//!
//! ```text
//! ={"user": {{ {"var": "name"} }}, "tags": {{ {"var": "tags"} }}}
//! ```

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use datalogic_rs::DataLogic;
use serde_json::Value;
use std::cell::RefCell;
use std::sync::Arc;

use crate::constants::EXPRESSION_PREFIX;
use crate::engine::coercion::to_text;
use crate::item::Item;

/// Evaluates one expression for one item.
///
/// Implementors must be `Send + Sync`: parameters and resolvers are shared by
/// every item of a batch, and callers may process items concurrently.
#[async_trait]
pub trait ExpressionResolver: Send + Sync {
    /// Evaluates `expression` (the text between `{{` and `}}`, trimmed) for the
    /// item at `item_index`.
    async fn evaluate(&self, expression: &str, item_index: usize) -> Result<Value>;
}

#[async_trait]
impl<T: ExpressionResolver + ?Sized> ExpressionResolver for Arc<T> {
    async fn evaluate(&self, expression: &str, item_index: usize) -> Result<Value> {
        self.as_ref().evaluate(expression, item_index).await
    }
}

/// Resolver for callers without an expression language; every expression fails.
#[derive(Debug, Clone, Default)]
pub struct NoopExpressionResolver;

#[async_trait]
impl ExpressionResolver for NoopExpressionResolver {
    async fn evaluate(&self, expression: &str, _item_index: usize) -> Result<Value> {
        Err(anyhow!(
            "Expressions are not supported by this resolver: {{{{ {} }}}}",
            expression
        ))
    }
}

/// Resolves the expression segments of `raw` for the item at `item_index`.
///
/// Text that does not start with `=` is returned unchanged. Otherwise the
/// leading `=` characters are dropped and each `{{ ... }}` segment is replaced,
/// in order, by the text form of its result: structured results as JSON,
/// strings verbatim, other scalars in their canonical text form.
pub async fn resolve_raw_data(
    resolver: &dyn ExpressionResolver,
    raw: &str,
    item_index: usize,
) -> Result<String> {
    let Some(template) = raw.strip_prefix(EXPRESSION_PREFIX) else {
        return Ok(raw.to_string());
    };
    let template = template.trim_start_matches(EXPRESSION_PREFIX);

    let resolvables = find_resolvables(template);

    let mut resolved = String::with_capacity(template.len());
    let mut cursor = 0;
    for (start, end, expression) in resolvables {
        resolved.push_str(&template[cursor..start]);
        let value = resolver.evaluate(&expression, item_index).await?;
        tracing::trace!(expression = %expression, item_index, "Resolved expression segment");
        resolved.push_str(&to_text(&value));
        cursor = end;
    }
    resolved.push_str(&template[cursor..]);

    Ok(resolved)
}

/// Locates the `{{ ... }}` segments of `template`.
///
/// Returns the byte range of each segment together with its trimmed inner
/// expression. Braces and quoted strings inside a segment are balanced, so a
/// segment closes on the first `}}` found at nesting depth zero and JSON-logic
/// objects such as `{"!": {"var": "flag"}}` stay whole. An unterminated
/// segment and everything after it is left as literal text.
fn find_resolvables(template: &str) -> Vec<(usize, usize, String)> {
    let bytes = template.as_bytes();
    let mut resolvables = Vec::new();
    let mut cursor = 0;

    while let Some(found) = template[cursor..].find("{{") {
        let start = cursor + found;
        let inner_start = start + 2;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut close = None;

        let mut position = inner_start;
        while position < bytes.len() {
            let byte = bytes[position];
            if in_string {
                if escaped {
                    escaped = false;
                } else if byte == b'\\' {
                    escaped = true;
                } else if byte == b'"' {
                    in_string = false;
                }
            } else {
                match byte {
                    b'"' => in_string = true,
                    b'{' => depth += 1,
                    b'}' if depth == 0 && bytes.get(position + 1) == Some(&b'}') => {
                        close = Some(position);
                        break;
                    }
                    b'}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            position += 1;
        }

        let Some(close) = close else {
            break;
        };
        let expression = template[inner_start..close].trim().to_string();
        resolvables.push((start, close + 2, expression));
        cursor = close + 2;
    }

    resolvables
}

/// Maximum number of evaluations before the thread's DataLogic engine is recreated.
const DATALOGIC_ROTATION_THRESHOLD: usize = 10000;

thread_local! {
    /// Thread-local DataLogic engine and its usage counter.
    static DATALOGIC_CACHE: RefCell<Option<(DataLogic, usize)>> = const { RefCell::new(None) };
}

/// Runs `f` with this thread's cached DataLogic engine, rotating it periodically.
fn with_cached_datalogic<F, R>(f: F) -> R
where
    F: FnOnce(&DataLogic) -> R,
{
    DATALOGIC_CACHE.with(|cache| {
        let mut cache_ref = cache.borrow_mut();

        let should_rotate = cache_ref
            .as_ref()
            .map(|(_, count)| *count >= DATALOGIC_ROTATION_THRESHOLD)
            .unwrap_or(true);
        if should_rotate {
            *cache_ref = None;
        }

        let (datalogic, count) = cache_ref.get_or_insert_with(|| (DataLogic::new(), 0));
        *count += 1;

        f(datalogic)
    })
}

/// Evaluates JSON-logic expressions against the `json` payload of the batch's items.
#[derive(Debug, Clone)]
pub struct DataLogicExpressionResolver {
    items: Arc<Vec<Value>>,
}

impl DataLogicExpressionResolver {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    pub fn from_items(items: &[Item]) -> Self {
        Self::new(items.iter().map(Item::json_value).collect())
    }
}

#[async_trait]
impl ExpressionResolver for DataLogicExpressionResolver {
    async fn evaluate(&self, expression: &str, item_index: usize) -> Result<Value> {
        let data = self
            .items
            .get(item_index)
            .cloned()
            .ok_or_else(|| anyhow!("No item at index {}", item_index))?;

        let logic: Value = serde_json::from_str(expression)
            .map_err(|e| anyhow!("Expression is not valid JSON logic: {}: {}", expression, e))?;

        with_cached_datalogic(|datalogic| {
            let compiled = datalogic
                .compile(&logic)
                .map_err(|e| anyhow!("Compilation failed: {}", e))?;
            datalogic
                .evaluate_owned(&compiled, data)
                .map_err(|e| anyhow!("Evaluation failed: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::StaticExpressionResolver;
    use serde_json::json;

    #[tokio::test]
    async fn test_plain_text_is_unchanged() {
        let resolver = StaticExpressionResolver::default();
        let resolved = resolve_raw_data(&resolver, "{\"a\": {{ x }}}", 0).await.unwrap();
        assert_eq!(resolved, "{\"a\": {{ x }}}");
    }

    #[tokio::test]
    async fn test_resolvables_are_spliced_in_order() {
        let resolver = StaticExpressionResolver::default()
            .with("$json.name", json!("Ada"))
            .with("$json.tags", json!(["x", "y"]))
            .with("$json.age", json!(36));

        let resolved = resolve_raw_data(
            &resolver,
            "={\"name\": \"{{ $json.name }}\", \"tags\": {{$json.tags}}, \"age\": {{ $json.age }}}",
            0,
        )
        .await
        .unwrap();

        assert_eq!(
            resolved,
            "{\"name\": \"Ada\", \"tags\": [\"x\",\"y\"], \"age\": 36}"
        );
    }

    #[tokio::test]
    async fn test_repeated_prefix_and_null_result() {
        let resolver = StaticExpressionResolver::default().with("missing", Value::Null);
        let resolved = resolve_raw_data(&resolver, "=={\"v\": {{ missing }}}", 0)
            .await
            .unwrap();
        assert_eq!(resolved, "{\"v\": null}");
    }

    #[tokio::test]
    async fn test_resolver_failure_propagates() {
        let resolved = resolve_raw_data(&NoopExpressionResolver, "={{ anything }}", 2).await;
        assert!(resolved.is_err());
        assert!(resolved.unwrap_err().to_string().contains("anything"));
    }

    #[tokio::test]
    async fn test_expression_without_resolvables() {
        let resolved = resolve_raw_data(&NoopExpressionResolver, "={\"a\": 1}", 0)
            .await
            .unwrap();
        assert_eq!(resolved, "{\"a\": 1}");
    }

    #[tokio::test]
    async fn test_datalogic_resolver_reads_item_payload() {
        let resolver = DataLogicExpressionResolver::new(vec![
            json!({"name": "first"}),
            json!({"name": "second", "scores": [1, 2]}),
        ]);

        let value = resolver.evaluate(r#"{"var": "name"}"#, 1).await.unwrap();
        assert_eq!(value, json!("second"));

        let resolved = resolve_raw_data(
            &resolver,
            r#"={"who": "{{ {"var": "name"} }}", "scores": {{ {"var": "scores"} }}}"#,
            1,
        )
        .await
        .unwrap();
        assert_eq!(resolved, r#"{"who": "second", "scores": [1,2]}"#);
    }

    #[test]
    fn test_find_resolvables_balances_nested_objects() {
        let template = r#"{"neg": {{ {"!": {"var": "flag"}} }}, "s": {{ {"cat": ["}}", "x"]} }}}"#;
        let found: Vec<String> = find_resolvables(template)
            .into_iter()
            .map(|(_, _, expression)| expression)
            .collect();
        assert_eq!(
            found,
            vec![r#"{"!": {"var": "flag"}}"#, r#"{"cat": ["}}", "x"]}"#]
        );

        assert_eq!(
            find_resolvables("{{ a }} and {{ b }}")
                .into_iter()
                .map(|(start, end, _)| (start, end))
                .collect::<Vec<_>>(),
            vec![(0, 7), (12, 19)]
        );
        assert!(find_resolvables("{{ {\"open\": 1 }").is_empty());
    }

    #[tokio::test]
    async fn test_datalogic_nested_expression() {
        let resolver = DataLogicExpressionResolver::new(vec![json!({"flag": false, "n": 3})]);
        let resolved = resolve_raw_data(
            &resolver,
            r#"={"neg": {{ {"!": {"var": "flag"}} }}, "big": {{ {">": [{"var": "n"}, 2]} }}}"#,
            0,
        )
        .await
        .unwrap();
        assert_eq!(resolved, r#"{"neg": true, "big": true}"#);
    }

    #[tokio::test]
    async fn test_datalogic_resolver_errors() {
        let resolver = DataLogicExpressionResolver::new(vec![json!({})]);
        assert!(resolver.evaluate(r#"{"var": "a"}"#, 5).await.is_err());
        assert!(resolver.evaluate("not json", 0).await.is_err());
    }
}
