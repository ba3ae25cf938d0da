//! # Serialization Engine
//!
//! Lowers typed values back into untyped form, walking the descriptor and
//! the value together. Tagged unions are re-wrapped using the variant name
//! recorded in the instance's tag map at the value's path; the chosen
//! variant itself is serialized one segment deeper, under its name.
//!
//! Serialization is total: a record only holds values that passed
//! validation, and where a hook changed a value's shape the value is lifted
//! structurally instead.

use std::collections::BTreeMap;

use mspec_core::{Map, Value};

use crate::descriptor::{Shape, TypeDescriptor};
use crate::typed::TypedValue;
use crate::types::TagStrategy;

/// Serialize `value`, produced by `descriptor` at `path`.
pub(crate) fn field(
    descriptor: &TypeDescriptor,
    value: &TypedValue,
    tags: &BTreeMap<String, String>,
    path: &str,
) -> Value {
    match descriptor.shape() {
        Shape::Union { variants, tag } => union(variants, tag, value, tags, path),
        Shape::Sequence { element, .. } => match value {
            TypedValue::List(items) => Value::List(elements(element, items, tags, path)),
            TypedValue::Set(items) => Value::Set(elements(element, items, tags, path)),
            TypedValue::Tuple(items) => Value::Tuple(elements(element, items, tags, path)),
            other => other.to_value(),
        },
        Shape::Mapping { key, value: item } => match value {
            TypedValue::Map(entries) => Value::Map(
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, (k, v))| {
                        (
                            field(key, k, tags, &format!("{path}/{i}/key")),
                            field(item, v, tags, &format!("{path}/{i}/value")),
                        )
                    })
                    .collect::<Map>(),
            ),
            other => other.to_value(),
        },
        Shape::Scalar(_) | Shape::Record(_) => value.to_value(),
    }
}

fn elements(
    element: &TypeDescriptor,
    items: &[TypedValue],
    tags: &BTreeMap<String, String>,
    path: &str,
) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| field(element, item, tags, &format!("{path}/{i}")))
        .collect()
}

fn union(
    variants: &[TypeDescriptor],
    tag: &TagStrategy,
    value: &TypedValue,
    tags: &BTreeMap<String, String>,
    path: &str,
) -> Value {
    let by_name = |name: &str| variants.iter().find(|v| v.type_name() == Some(name));

    // Recorded choice first, then the record's own type name, then shape.
    // A recorded choice that no longer admits the value (a hook reordered or
    // replaced it) is ignored. Untagged unions record nothing at `path`.
    let recorded = match tag {
        TagStrategy::Untagged => None,
        _ => tags.get(path),
    };
    let variant = recorded
        .and_then(|name| by_name(name.as_str()))
        .filter(|v| v.admits(value))
        .or_else(|| {
            value
                .as_record()
                .and_then(|record| by_name(record.schema().type_name()))
        })
        .or_else(|| variants.iter().find(|v| v.admits(value)));

    let name = variant.and_then(TypeDescriptor::type_name);
    let inner = match (variant, name) {
        (Some(variant), Some(name)) if !tag.is_untagged() => {
            field(variant, value, tags, &format!("{path}/{name}"))
        }
        (Some(variant), _) => field(variant, value, tags, path),
        (None, _) => value.to_value(),
    };

    let Some(name) = name else {
        return inner;
    };

    match tag {
        TagStrategy::Untagged => inner,
        TagStrategy::External => {
            let mut map = Map::with_capacity(1);
            map.insert(name, inner);
            Value::Map(map)
        }
        TagStrategy::Internal { tag } => match inner {
            Value::Map(mut map) => {
                map.insert_first(tag.as_str(), name);
                Value::Map(map)
            }
            other => {
                tracing::warn!(
                    path,
                    variant = name,
                    found = other.kind_name(),
                    "internally tagged variant is not a mapping; emitted without tag"
                );
                other
            }
        },
        TagStrategy::Adjacent { tag, content } => {
            let mut map = Map::with_capacity(2);
            map.insert(tag.as_str(), name);
            map.insert(content.as_str(), inner);
            Value::Map(map)
        }
    }
}
