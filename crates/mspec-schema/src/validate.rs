//! # Validation Engine
//!
//! Walks an untyped [`Value`] against a [`TypeDescriptor`] and produces a
//! [`TypedValue`], collecting every failure instead of stopping at the
//! first one.
//!
//! ## Aggregation
//!
//! A [`Validator`] owns an error sink and the tag map of the record being
//! constructed. Each field is attempted regardless of earlier failures.
//! Nested record construction failures are flattened into the parent's
//! sink, so one construction call yields one report.
//!
//! ## Type errors
//!
//! `InvalidType` always describes the whole field: the expected type is the
//! field descriptor's pretty form and the actual type is inferred from the
//! field's raw value, even when the mismatch is a single list element.
//!
//! ## Tag paths
//!
//! Variant names chosen for tagged unions are recorded under a path: the
//! field key, then `/<index>` per sequence element and `/<index>/key` or
//! `/<index>/value` per mapping entry. Inside a tagged variant the path
//! continues with `/<VariantName>`, so `{"v": {"Outer": {"Inner": 1}}}`
//! records `v -> Outer` and `v/Outer -> Inner`. Untagged unions add no
//! segment.

use std::collections::BTreeMap;
use std::sync::Arc;

use mspec_core::{Map, SpecError, SpecErrorGroup, Value};

use crate::descriptor::{Shape, TypeDescriptor};
use crate::record::Record;
use crate::registry::{RecordSchema, TRANSPARENT_KEY};
use crate::typed::TypedValue;
use crate::types::{SequenceKind, TagStrategy};

/// Construct a record of type `schema` from untyped data.
///
/// `data` absent (or null) falls back to `fallback`; an empty mapping with a
/// non-empty fallback also uses the fallback.
///
/// # Errors
///
/// Returns every failure found in the input, in field declaration order.
pub fn validate_record(
    schema: &Arc<RecordSchema>,
    data: Option<&Value>,
    fallback: &Map,
) -> Result<Record, SpecErrorGroup> {
    let mut validator = Validator::new(schema.name());
    let values = validator.fields(schema, data, fallback);

    if let Some(group) = SpecErrorGroup::new(SpecErrorGroup::VALIDATION_FAILED, validator.errors) {
        tracing::trace!(record = schema.name(), errors = group.len(), "construction failed");
        return Err(group);
    }
    match values {
        Some(values) => Ok(Record::from_parts(Arc::clone(schema), values, validator.tags)),
        // Unreachable: a failed walk always pushes an error.
        None => Err(SpecErrorGroup::single(SpecError::MissingArgument {
            model: schema.name().to_string(),
        })),
    }
}

/// The field being validated, used for whole-field error reporting.
#[derive(Clone, Copy)]
struct Root<'a> {
    descriptor: &'a TypeDescriptor,
    value: &'a Value,
}

/// Error sink and tag map for one record construction.
pub(crate) struct Validator<'m> {
    model: &'m str,
    errors: Vec<SpecError>,
    tags: BTreeMap<String, String>,
}

impl<'m> Validator<'m> {
    pub(crate) fn new(model: &'m str) -> Self {
        Self {
            model,
            errors: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    /// Validate every field of `schema`. Returns the values in declaration
    /// order when no error was pushed.
    fn fields(
        &mut self,
        schema: &RecordSchema,
        data: Option<&Value>,
        fallback: &Map,
    ) -> Option<Vec<TypedValue>> {
        if schema.is_transparent() {
            return self.transparent(schema, data, fallback);
        }

        let input = match data {
            None | Some(Value::Null) if fallback.is_empty() => {
                self.errors.push(SpecError::MissingArgument {
                    model: self.model.to_string(),
                });
                return None;
            }
            None | Some(Value::Null) => fallback,
            Some(Value::Map(map)) if map.is_empty() && !fallback.is_empty() => fallback,
            Some(Value::Map(map)) => map,
            Some(other) => {
                self.errors.push(SpecError::InvalidType {
                    model: self.model.to_string(),
                    key: String::new(),
                    expected: "dict".to_string(),
                    found: other.type_name(),
                });
                return None;
            }
        };

        let before = self.errors.len();
        let mut values = Vec::with_capacity(schema.fields().len());
        for descriptor in schema.fields() {
            match input.get(descriptor.serialized_key()) {
                Some(raw) => {
                    if let Some(value) = self.field(descriptor, raw) {
                        values.push(value);
                    }
                }
                None => match descriptor.default_value() {
                    Some(value) => values.push(value),
                    None => self.errors.push(SpecError::MissingRequiredKey {
                        model: self.model.to_string(),
                        key: descriptor.serialized_key().to_string(),
                    }),
                },
            }
        }
        (self.errors.len() == before).then_some(values)
    }

    fn transparent(
        &mut self,
        schema: &RecordSchema,
        data: Option<&Value>,
        fallback: &Map,
    ) -> Option<Vec<TypedValue>> {
        let descriptor = schema.fields().first()?;
        let raw = match data.or_else(|| fallback.get(TRANSPARENT_KEY)) {
            Some(raw) => raw,
            None => match descriptor.default_value() {
                Some(value) => return Some(vec![value]),
                None => {
                    self.errors.push(SpecError::MissingArgument {
                        model: self.model.to_string(),
                    });
                    return None;
                }
            },
        };
        self.field(descriptor, raw).map(|value| vec![value])
    }

    /// Validate one top-level field.
    fn field(&mut self, descriptor: &TypeDescriptor, raw: &Value) -> Option<TypedValue> {
        let root = Root {
            descriptor,
            value: raw,
        };
        self.validate(root, descriptor, raw, descriptor.key())
    }

    /// Validate `raw` against `descriptor`. Returns `Some` only when no
    /// error was pushed.
    fn validate(
        &mut self,
        root: Root<'_>,
        descriptor: &TypeDescriptor,
        raw: &Value,
        path: &str,
    ) -> Option<TypedValue> {
        let before = self.errors.len();

        let converted = match descriptor.shape() {
            Shape::Scalar(kind) => {
                if kind.accepts(raw) {
                    Some(TypedValue::from(raw))
                } else {
                    self.invalid(root);
                    None
                }
            }
            Shape::Sequence { kind, element } => self.sequence(root, *kind, element, raw, path),
            Shape::Mapping { key, value } => self.mapping(root, key, value, raw, path),
            Shape::Record(schema) => self.record(root, schema, raw),
            Shape::Union { variants, tag } => self.union(root, descriptor, variants, tag, raw, path),
        };

        if self.errors.len() > before {
            return None;
        }
        let value = converted?;

        if let Some(predicate) = descriptor.validator() {
            if !predicate(&value) {
                self.errors.push(SpecError::FailedValidation {
                    model: self.model.to_string(),
                    key: descriptor.key().to_string(),
                });
                return None;
            }
        }

        Some(match descriptor.hook() {
            Some(hook) => hook(value),
            None => value,
        })
    }

    fn invalid(&mut self, root: Root<'_>) {
        tracing::trace!(model = self.model, field = root.descriptor.key(), "invalid type");
        self.errors.push(SpecError::InvalidType {
            model: self.model.to_string(),
            key: root.descriptor.key().to_string(),
            expected: root.descriptor.pretty(),
            found: root.value.type_name(),
        });
    }

    fn sequence(
        &mut self,
        root: Root<'_>,
        kind: SequenceKind,
        element: &TypeDescriptor,
        raw: &Value,
        path: &str,
    ) -> Option<TypedValue> {
        let Some(items) = raw.as_sequence() else {
            self.invalid(root);
            return None;
        };

        let mut converted = Vec::with_capacity(items.len());
        let mut failed = false;
        for (i, item) in items.iter().enumerate() {
            match self.validate(root, element, item, &format!("{path}/{i}")) {
                Some(value) => converted.push(value),
                None => failed = true,
            }
        }
        if failed {
            return None;
        }

        if kind == SequenceKind::Set {
            converted = self.dedupe(converted, path);
        }
        Some(kind.wrap(converted))
    }

    /// Drop duplicate set members, keeping the first occurrence, and move
    /// the tags of kept members to their new positions.
    fn dedupe(&mut self, items: Vec<TypedValue>, path: &str) -> Vec<TypedValue> {
        let mut kept: Vec<TypedValue> = Vec::with_capacity(items.len());
        let mut positions = Vec::with_capacity(items.len());
        for item in items {
            if kept.contains(&item) {
                positions.push(None);
            } else {
                positions.push(Some(kept.len()));
                kept.push(item);
            }
        }
        if positions.iter().enumerate().any(|(i, p)| *p != Some(i)) {
            self.rebase_tags(path, &positions);
        }
        kept
    }

    fn rebase_tags(&mut self, path: &str, positions: &[Option<usize>]) {
        let prefix = format!("{path}/");
        let affected: Vec<String> = self
            .tags
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .collect();

        let mut moved = Vec::with_capacity(affected.len());
        for key in affected {
            let Some(name) = self.tags.remove(&key) else {
                continue;
            };
            let rest = &key[prefix.len()..];
            let (index, tail) = match rest.split_once('/') {
                Some((index, tail)) => (index, Some(tail)),
                None => (rest, None),
            };
            let target = index
                .parse::<usize>()
                .ok()
                .and_then(|i| positions.get(i).copied().flatten());
            if let Some(new_index) = target {
                let new_key = match tail {
                    Some(tail) => format!("{prefix}{new_index}/{tail}"),
                    None => format!("{prefix}{new_index}"),
                };
                moved.push((new_key, name));
            }
        }
        self.tags.extend(moved);
    }

    fn mapping(
        &mut self,
        root: Root<'_>,
        key: &TypeDescriptor,
        value: &TypeDescriptor,
        raw: &Value,
        path: &str,
    ) -> Option<TypedValue> {
        let Some(map) = raw.as_map() else {
            self.invalid(root);
            return None;
        };

        let mut entries = Vec::with_capacity(map.len());
        let mut failed = false;
        for (i, (k, v)) in map.iter().enumerate() {
            let k = self.validate(root, key, k, &format!("{path}/{i}/key"));
            let v = self.validate(root, value, v, &format!("{path}/{i}/value"));
            match (k, v) {
                (Some(k), Some(v)) => entries.push((k, v)),
                _ => failed = true,
            }
        }
        (!failed).then_some(TypedValue::Map(entries))
    }

    fn record(
        &mut self,
        root: Root<'_>,
        schema: &Arc<RecordSchema>,
        raw: &Value,
    ) -> Option<TypedValue> {
        if !schema.is_transparent() && !matches!(raw, Value::Map(_) | Value::Null) {
            self.invalid(root);
            return None;
        }
        match validate_record(schema, Some(raw), &Map::new()) {
            Ok(record) => Some(TypedValue::from(record)),
            Err(group) => {
                self.errors.extend(group.into_errors());
                None
            }
        }
    }

    fn union(
        &mut self,
        root: Root<'_>,
        descriptor: &TypeDescriptor,
        variants: &[TypeDescriptor],
        tag: &TagStrategy,
        raw: &Value,
        path: &str,
    ) -> Option<TypedValue> {
        if tag.is_untagged() {
            return self.untagged(root, variants, raw, path);
        }

        let Some(map) = raw.as_map() else {
            self.invalid(root);
            return None;
        };

        let (name, inner) = match tag {
            TagStrategy::Untagged => return None,
            TagStrategy::External => {
                if map.len() > 1 {
                    self.invalid(root);
                    return None;
                }
                match map.first() {
                    Some((key, inner)) => (key.key_string(), inner),
                    None => {
                        self.unknown_variant(descriptor, String::new());
                        return None;
                    }
                }
            }
            TagStrategy::Internal { tag } => match map.get(tag) {
                Some(name) => (name.key_string(), raw),
                None => {
                    self.errors.push(SpecError::MissingRequiredKey {
                        model: self.model.to_string(),
                        key: tag.clone(),
                    });
                    return None;
                }
            },
            TagStrategy::Adjacent { tag, content } => match (map.get(tag), map.get(content)) {
                (Some(name), Some(inner)) => (name.key_string(), inner),
                _ => {
                    self.invalid(root);
                    return None;
                }
            },
        };

        let Some(variant) = variants.iter().find(|v| v.type_name() == Some(name.as_str())) else {
            self.unknown_variant(descriptor, name);
            return None;
        };

        // The variant's own tags live below the chosen name so a nested
        // tagged union cannot overwrite this entry.
        let value = self.validate(root, variant, inner, &format!("{path}/{name}"))?;
        self.tags.insert(path.to_string(), name);
        Some(value)
    }

    /// First variant that validates cleanly wins. Failed attempts run
    /// against scratch state and leave no errors or tags behind.
    fn untagged(
        &mut self,
        root: Root<'_>,
        variants: &[TypeDescriptor],
        raw: &Value,
        path: &str,
    ) -> Option<TypedValue> {
        for variant in variants {
            let mut attempt = Validator::new(self.model);
            match attempt.validate(root, variant, raw, path) {
                Some(value) if attempt.errors.is_empty() => {
                    self.tags.extend(attempt.tags);
                    return Some(value);
                }
                _ => tracing::debug!(
                    model = self.model,
                    field = root.descriptor.key(),
                    variant = %variant.pretty(),
                    discarded = attempt.errors.len(),
                    "untagged variant rejected"
                ),
            }
        }
        self.invalid(root);
        None
    }

    fn unknown_variant(&mut self, descriptor: &TypeDescriptor, key: String) {
        self.errors.push(SpecError::UnknownUnionKey {
            model: self.model.to_string(),
            field: descriptor.key().to_string(),
            key,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Field, FieldType};
    use mspec_core::ErrorKind;

    fn json(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    fn schema(name: &str, fields: Vec<Field>) -> Arc<RecordSchema> {
        fields
            .into_iter()
            .fold(RecordSchema::builder(name), |b, f| b.field(f))
            .build()
            .unwrap()
    }

    fn construct(schema: &Arc<RecordSchema>, text: &str) -> Result<Record, SpecErrorGroup> {
        validate_record(schema, Some(&json(text)), &Map::new())
    }

    #[test]
    fn test_missing_argument() {
        let s = schema("Simple", vec![Field::new("a", FieldType::int())]);
        let err = validate_record(&s, None, &Map::new()).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::MissingArgument {
                model: "Simple".into()
            }]
        );
        let err = validate_record(&s, Some(&Value::Null), &Map::new()).unwrap_err();
        assert_eq!(err.errors()[0].kind(), ErrorKind::MissingArgument);
    }

    #[test]
    fn test_fallback_fields() {
        let s = schema("Simple", vec![Field::new("a", FieldType::int())]);
        let fallback: Map = [("a", Value::Int(4))].into_iter().collect();
        let record = validate_record(&s, None, &fallback).unwrap();
        assert_eq!(record.get("a"), Some(&TypedValue::Int(4)));
        let record = validate_record(&s, Some(&json("{}")), &fallback).unwrap();
        assert_eq!(record.get("a"), Some(&TypedValue::Int(4)));
    }

    #[test]
    fn test_top_level_non_mapping() {
        let s = schema("Simple", vec![Field::new("a", FieldType::int())]);
        let err = construct(&s, "[1, 2]").unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::InvalidType {
                model: "Simple".into(),
                key: String::new(),
                expected: "dict".into(),
                found: "list[int]".into(),
            }]
        );
    }

    #[test]
    fn test_every_field_is_attempted() {
        let s = schema(
            "Many",
            vec![
                Field::new("a", FieldType::int()),
                Field::new("b", FieldType::string()),
                Field::new("c", FieldType::bool()),
                Field::new("d", FieldType::int()),
            ],
        );
        let err = construct(&s, r#"{"a": "x", "b": 1, "c": 2}"#).unwrap_err();
        let kinds: Vec<_> = err.errors().iter().map(SpecError::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ErrorKind::InvalidType,
                ErrorKind::InvalidType,
                ErrorKind::InvalidType,
                ErrorKind::MissingRequiredKey
            ]
        );
    }

    #[test]
    fn test_list_element_error_reports_whole_field() {
        let s = schema("Lists", vec![Field::new("v", FieldType::list(FieldType::int()))]);
        let err = construct(&s, r#"{"v": [1, "x", "y"]}"#).unwrap_err();
        assert_eq!(err.len(), 2);
        assert_eq!(
            err.errors()[0],
            SpecError::InvalidType {
                model: "Lists".into(),
                key: "v".into(),
                expected: "list[int]".into(),
                found: "list[int | str]".into(),
            }
        );
    }

    #[test]
    fn test_mapping_keys_and_values_both_checked() {
        let s = schema(
            "Dicts",
            vec![Field::new("v", FieldType::dict(FieldType::string(), FieldType::int()))],
        );
        let err = construct(&s, r#"{"v": {"a": "x", "b": 2, "c": "y"}}"#).unwrap_err();
        assert_eq!(err.len(), 2);
        let record = construct(&s, r#"{"v": {"a": 1}}"#).unwrap();
        assert_eq!(
            record.get("v").and_then(|v| v.get("a")),
            Some(&TypedValue::Int(1))
        );
    }

    #[test]
    fn test_set_drops_duplicates() {
        let s = schema("Sets", vec![Field::new("v", FieldType::set(FieldType::int()))]);
        let record = construct(&s, r#"{"v": [3, 1, 3, 2, 1]}"#).unwrap();
        assert_eq!(
            record.get("v"),
            Some(&TypedValue::Set(vec![
                TypedValue::Int(3),
                TypedValue::Int(1),
                TypedValue::Int(2)
            ]))
        );
    }

    #[test]
    fn test_sequence_rebuilds_declared_kind() {
        let s = schema("Tuples", vec![Field::new("v", FieldType::tuple(FieldType::int()))]);
        let record = construct(&s, r#"{"v": [1, 2]}"#).unwrap();
        assert!(matches!(record.get("v"), Some(TypedValue::Tuple(items)) if items.len() == 2));
    }

    #[test]
    fn test_validator_and_hook() {
        let s = schema(
            "Checked",
            vec![
                Field::new("positive", FieldType::int())
                    .validate(|v| v.as_int().is_some_and(|i| i > 0)),
                Field::new("doubled", FieldType::int())
                    .hook(|v| TypedValue::Int(v.as_int().unwrap_or(0) * 2)),
            ],
        );
        let err = construct(&s, r#"{"positive": -1, "doubled": 2}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::FailedValidation {
                model: "Checked".into(),
                key: "positive".into()
            }]
        );
        let record = construct(&s, r#"{"positive": 1, "doubled": 2}"#).unwrap();
        assert_eq!(record.get("doubled"), Some(&TypedValue::Int(4)));
    }

    #[test]
    fn test_defaults_are_not_validated() {
        let s = schema(
            "Defaults",
            vec![Field::new("a", FieldType::int())
                .default_value(-5)
                .validate(|v| v.as_int().is_some_and(|i| i > 0))],
        );
        let record = construct(&s, "{}").unwrap();
        assert_eq!(record.get("a"), Some(&TypedValue::Int(-5)));
    }

    #[test]
    fn test_nested_record_errors_are_flattened() {
        let inner = schema(
            "Inner",
            vec![
                Field::new("x", FieldType::int()),
                Field::new("y", FieldType::int()),
            ],
        );
        let outer = schema(
            "Outer",
            vec![
                Field::new("inner", FieldType::record(&inner)),
                Field::new("z", FieldType::int()),
            ],
        );
        let err = construct(&outer, r#"{"inner": {"x": "a"}, "z": "b"}"#).unwrap_err();
        let models: Vec<_> = err.errors().iter().map(SpecError::model).collect();
        assert_eq!(models, vec!["Inner", "Inner", "Outer"]);
    }

    #[test]
    fn test_nested_record_wrong_shape() {
        let inner = schema("Inner", vec![Field::new("x", FieldType::int())]);
        let outer = schema("Outer", vec![Field::new("inner", FieldType::record(&inner))]);
        let err = construct(&outer, r#"{"inner": 3}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::InvalidType {
                model: "Outer".into(),
                key: "inner".into(),
                expected: "Inner".into(),
                found: "int".into(),
            }]
        );
    }

    #[test]
    fn test_untagged_first_success_wins() {
        let s = schema(
            "Either",
            vec![Field::new(
                "v",
                FieldType::union([FieldType::any(), FieldType::int().hook(|_| TypedValue::Int(0))]),
            )],
        );
        let record = construct(&s, r#"{"v": 7}"#).unwrap();
        assert_eq!(record.get("v"), Some(&TypedValue::Int(7)));
    }

    #[test]
    fn test_untagged_failure_is_single_error() {
        let s = schema(
            "Either",
            vec![Field::new("v", FieldType::union([FieldType::int(), FieldType::string()]))],
        );
        let err = construct(&s, r#"{"v": [1]}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::InvalidType {
                model: "Either".into(),
                key: "v".into(),
                expected: "int | str".into(),
                found: "list[int]".into(),
            }]
        );
    }

    fn tagged(tag: TagStrategy) -> Arc<RecordSchema> {
        schema(
            "Tagged",
            vec![Field::new(
                "v",
                FieldType::union([
                    FieldType::int().type_name("Int"),
                    FieldType::string().type_name("Str"),
                ])
                .tag(tag),
            )],
        )
    }

    #[test]
    fn test_external_tag_errors() {
        let s = tagged(TagStrategy::External);
        let err = construct(&s, r#"{"v": {}}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::UnknownUnionKey {
                model: "Tagged".into(),
                field: "v".into(),
                key: String::new(),
            }]
        );
        let err = construct(&s, r#"{"v": {"Int": 1, "Str": "x"}}"#).unwrap_err();
        assert_eq!(err.errors()[0].kind(), ErrorKind::InvalidType);
        let err = construct(&s, r#"{"v": 1}"#).unwrap_err();
        assert_eq!(err.errors()[0].kind(), ErrorKind::InvalidType);
    }

    #[test]
    fn test_external_tag_records_choice() {
        let s = tagged(TagStrategy::External);
        let record = construct(&s, r#"{"v": {"Str": "x"}}"#).unwrap();
        assert_eq!(record.get("v"), Some(&TypedValue::from("x")));
        assert_eq!(record.tag_map().get("v").map(String::as_str), Some("Str"));
    }

    #[test]
    fn test_internal_tag_missing_key() {
        let s = tagged(TagStrategy::internal("type"));
        let err = construct(&s, r#"{"v": {"value": 1}}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::MissingRequiredKey {
                model: "Tagged".into(),
                key: "type".into()
            }]
        );
    }

    #[test]
    fn test_adjacent_tag_missing_content() {
        let s = tagged(TagStrategy::adjacent("t", "c"));
        let err = construct(&s, r#"{"v": {"t": "Int"}}"#).unwrap_err();
        assert_eq!(err.errors()[0].kind(), ErrorKind::InvalidType);
        let err = construct(&s, r#"{"v": {"t": "Float", "c": 1.0}}"#).unwrap_err();
        assert_eq!(err.errors()[0].kind(), ErrorKind::UnknownUnionKey);
        let record = construct(&s, r#"{"v": {"t": "Int", "c": 1}}"#).unwrap();
        assert_eq!(record.get("v"), Some(&TypedValue::Int(1)));
    }

    #[test]
    fn test_internal_and_adjacent_tags_reject_non_mapping() {
        for strategy in [TagStrategy::internal("type"), TagStrategy::adjacent("t", "c")] {
            let err = construct(&tagged(strategy), r#"{"v": 1}"#).unwrap_err();
            assert_eq!(
                err.errors(),
                &[SpecError::InvalidType {
                    model: "Tagged".into(),
                    key: "v".into(),
                    expected: "int | str".into(),
                    found: "int".into(),
                }]
            );
        }
    }

    fn nested_unions() -> Arc<RecordSchema> {
        let inner = FieldType::union([
            FieldType::int().type_name("I1"),
            FieldType::int().type_name("I2"),
        ])
        .tag(TagStrategy::External)
        .type_name("Inner");
        schema(
            "Nested",
            vec![Field::new(
                "v",
                FieldType::union([inner, FieldType::string().type_name("S")])
                    .tag(TagStrategy::External),
            )],
        )
    }

    #[test]
    fn test_nested_tagged_union_keeps_both_choices() {
        let record = construct(&nested_unions(), r#"{"v": {"Inner": {"I2": 5}}}"#).unwrap();
        assert_eq!(record.get("v"), Some(&TypedValue::Int(5)));
        let tags: Vec<_> = record
            .tag_map()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(tags, vec![("v", "Inner"), ("v/Inner", "I2")]);
    }

    #[test]
    fn test_nested_tagged_union_unknown_inner_variant() {
        let err = construct(&nested_unions(), r#"{"v": {"Inner": {"I3": 5}}}"#).unwrap_err();
        assert_eq!(
            err.errors(),
            &[SpecError::UnknownUnionKey {
                model: "Nested".into(),
                field: "v".into(),
                key: "I3".into(),
            }]
        );
    }

    #[test]
    fn test_tags_inside_containers_use_paths() {
        let member = FieldType::union([
            FieldType::int().type_name("Int"),
            FieldType::string().type_name("Str"),
        ])
        .tag(TagStrategy::External);
        let s = schema("Paths", vec![Field::new("v", FieldType::list(member))]);
        let record = construct(&s, r#"{"v": [{"Int": 1}, {"Str": "a"}]}"#).unwrap();
        let tags: Vec<_> = record
            .tag_map()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(tags, vec![("v/0", "Int"), ("v/1", "Str")]);
    }

    #[test]
    fn test_set_dedupe_rebases_tags() {
        let member = FieldType::union([
            FieldType::int().type_name("Int"),
            FieldType::string().type_name("Str"),
        ])
        .tag(TagStrategy::External);
        let s = schema("Paths", vec![Field::new("v", FieldType::set(member))]);
        let record = construct(&s, r#"{"v": [{"Int": 1}, {"Int": 1}, {"Str": "a"}]}"#).unwrap();
        let tags: Vec<_> = record
            .tag_map()
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(tags, vec![("v/0", "Int"), ("v/1", "Str")]);
    }
}
