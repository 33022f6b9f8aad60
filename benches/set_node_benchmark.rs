// Benchmark for the set node executor.
// Covers plain typed fields, nested dot-notation paths, and object fields
// resolved from raw text through DataLogic expressions.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use serde_json::{Value, json};
use setnode::engine::SetNodeExecutor;
use setnode::engine::expression::DataLogicExpressionResolver;
use setnode::engine::failure_policy::failure_policy;
use setnode::item::Item;
use setnode::validation::Validator;
use std::sync::Arc;
use tokio::runtime::Runtime;

fn build_items(count: usize) -> Vec<Item> {
    (0..count)
        .map(|index| {
            Item::try_from(json!({
                "id": index,
                "user": {"name": format!("user-{}", index), "active": index % 2 == 0},
                "tags": ["a", "b", "c"]
            }))
            .unwrap()
        })
        .collect()
}

fn build_executor(parameters: Value, items: &[Item]) -> SetNodeExecutor {
    SetNodeExecutor::new(
        Validator::validate_parameters(&parameters).unwrap(),
        Arc::new(DataLogicExpressionResolver::from_items(items)),
        failure_policy(false),
    )
}

// Benchmark typed scalar fields written at the top level
fn bench_scalar_fields(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("set_node_scalar");

    let parameters = json!({"fields": [
        {"name": "label", "type": "stringValue", "stringValue": "hello"},
        {"name": "count", "type": "numberValue", "numberValue": "42"},
        {"name": "enabled", "type": "booleanValue", "booleanValue": "true"},
        {"name": "list", "type": "arrayValue", "arrayValue": "[1, 2, 3]"}
    ]});

    for count in [1usize, 100, 1000] {
        let items = build_items(count);
        let executor = build_executor(parameters.clone(), &items);

        group.bench_with_input(BenchmarkId::from_parameter(count), &items, |b, items| {
            b.to_async(&rt)
                .iter(|| async { black_box(executor.execute_items(items).await.unwrap()) });
        });
    }

    group.finish();
}

// Benchmark nested dot-notation writes with and without keepOnlySet
fn bench_nested_paths(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("set_node_nested");
    let items = build_items(100);

    for keep_only_set in [false, true] {
        let parameters = json!({
            "fields": [
                {"name": "a.b.c", "type": "numberValue", "numberValue": 1},
                {"name": "a.list[4].name", "type": "stringValue", "stringValue": "x"},
                {"name": "user.flags['beta.feature']", "type": "booleanValue", "booleanValue": "false"}
            ],
            "options": {"keepOnlySet": keep_only_set}
        });
        let executor = build_executor(parameters, &items);

        group.bench_function(
            BenchmarkId::new("keep_only_set", keep_only_set),
            |b| {
                b.to_async(&rt)
                    .iter(|| async { black_box(executor.execute_items(&items).await.unwrap()) });
            },
        );
    }

    group.finish();
}

// Benchmark object fields built from raw text with expression segments
fn bench_raw_expressions(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("set_node_raw_expressions");
    let items = build_items(100);

    let parameters = json!({
        "fields": [
            {"name": "profile", "type": "objectValue", "objectValue": {}},
            {"name": "tags", "type": "arrayValue", "arrayValue": ""}
        ],
        "rawFields": {
            "profile": "={\"name\": \"{{ {\"var\": \"user.name\"} }}\", \"active\": {{ {\"var\": \"user.active\"} }}}",
            "tags": "={{ {\"var\": \"tags\"} }}"
        }
    });
    let executor = build_executor(parameters, &items);

    group.bench_function("datalogic", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(executor.execute_items(&items).await.unwrap()) });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_scalar_fields,
    bench_nested_paths,
    bench_raw_expressions
);
criterion_main!(benches);
