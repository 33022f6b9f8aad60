//! Assembly of output items from validated entries.

use serde_json::{Map, Value};

use crate::engine::entry::ValidatedEntry;
use crate::engine::field::SetNodeOptions;
use crate::engine::path::PathSegment;
use crate::item::{Item, PairedItem};

/// Builds the output item for the input `item` at `item_index`.
///
/// The payload starts empty when `keep_only_set` is enabled and as a copy of
/// the input payload otherwise. Entries are written in order, so a later entry
/// targeting the same path replaces an earlier one. The input item is never
/// modified.
pub fn prepare_item(
    item: &Item,
    item_index: usize,
    entries: Vec<ValidatedEntry>,
    options: &SetNodeOptions,
) -> Item {
    let mut json = if options.keep_only_set {
        Map::new()
    } else {
        item.json.clone()
    };

    for entry in entries {
        set_path(&mut json, &entry.path, entry.value);
    }

    Item {
        json,
        binary: if options.include_binary {
            item.binary.clone()
        } else {
            None
        },
        paired_item: Some(PairedItem { item: item_index }),
    }
}

/// Writes `value` at `path` inside `root`, creating intermediate containers.
///
/// A missing or scalar intermediate becomes an array when the next segment
/// addresses an index and an object otherwise. Writing past the end of an
/// array pads it with `null`. Positions above the index ceiling are written
/// as object keys.
pub fn set_path(root: &mut Map<String, Value>, path: &[PathSegment], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    let mut slot = root.entry(first.as_key()).or_insert(Value::Null);
    for segment in rest {
        slot = child_slot(slot, segment);
    }
    *slot = value;
}

fn child_slot<'a>(target: &'a mut Value, segment: &PathSegment) -> &'a mut Value {
    let index = segment.as_index();
    let fits = match target {
        Value::Object(_) => true,
        Value::Array(_) => index.is_some(),
        _ => false,
    };
    if !fits {
        *target = match index {
            Some(_) => Value::Array(Vec::new()),
            None => Value::Object(Map::new()),
        };
    }

    match (target, index) {
        (Value::Array(items), Some(index)) => {
            // `as_index` caps positions at MAX_ARRAY_INDEX, so this never saturates.
            let len = index.checked_add(1).unwrap_or(usize::MAX);
            if len > items.len() {
                items.resize(len, Value::Null);
            }
            &mut items[index]
        }
        (Value::Object(map), _) => map.entry(segment.as_key()).or_insert(Value::Null),
        // Replaced with a fitting container above.
        (other, _) => other,
    }
}
