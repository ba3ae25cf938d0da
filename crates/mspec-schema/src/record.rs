//! # Record Instances
//!
//! A [`Record`] is a validated instance of a [`RecordSchema`]: one typed
//! value per field in declaration order, plus the tag map of variant names
//! chosen while validating tagged unions. The tag map is consulted only
//! when the record is serialized back with [`Record::to_map`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use mspec_core::{Map, SpecErrorGroup, Value};

use crate::registry::RecordSchema;
use crate::serialize;
use crate::typed::TypedValue;
use crate::validate::validate_record;

/// A validated record.
#[derive(Clone)]
pub struct Record {
    schema: Arc<RecordSchema>,
    values: Vec<TypedValue>,
    tags: BTreeMap<String, String>,
}

impl Record {
    /// Validate `data` (or `fallback` when `data` is absent or empty) into
    /// a record of type `schema`.
    ///
    /// # Errors
    ///
    /// Returns one report holding every failure found in the input.
    pub fn construct(
        schema: &Arc<RecordSchema>,
        data: Option<&Value>,
        fallback: &Map,
    ) -> Result<Self, SpecErrorGroup> {
        validate_record(schema, data, fallback)
    }

    /// Shorthand for [`Record::construct`] without fallback fields.
    pub fn from_value(schema: &Arc<RecordSchema>, data: &Value) -> Result<Self, SpecErrorGroup> {
        validate_record(schema, Some(data), &Map::new())
    }

    pub(crate) fn from_parts(
        schema: Arc<RecordSchema>,
        values: Vec<TypedValue>,
        tags: BTreeMap<String, String>,
    ) -> Self {
        Self {
            schema,
            values,
            tags,
        }
    }

    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Value of the field with internal key `key`.
    pub fn get(&self, key: &str) -> Option<&TypedValue> {
        self.schema.position(key).and_then(|i| self.values.get(i))
    }

    /// Fields as `(internal key, value)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypedValue)> {
        self.schema
            .fields()
            .iter()
            .map(|d| d.key())
            .zip(self.values.iter())
    }

    /// Variant names chosen for tagged unions, keyed by path.
    pub fn tag_map(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// Serialize back into untyped form, restoring union tags. Transparent
    /// records serialize to their bare value.
    pub fn to_map(&self) -> Value {
        let fields = self.schema.fields();
        if self.schema.is_transparent() {
            return match (fields.first(), self.values.first()) {
                (Some(descriptor), Some(value)) => {
                    serialize::field(descriptor, value, &self.tags, descriptor.key())
                }
                _ => Value::Null,
            };
        }

        let map = fields
            .iter()
            .zip(self.values.iter())
            .map(|(descriptor, value)| {
                (
                    descriptor.serialized_key(),
                    serialize::field(descriptor, value, &self.tags, descriptor.key()),
                )
            })
            .collect::<Map>();
        Value::Map(map)
    }
}

/// Records are equal when they have the same type and serialize to the
/// same untyped form.
impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.to_map() == other.to_map()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name())?;
        if self.schema.is_transparent() {
            if let Some(value) = self.values.first() {
                write!(f, " {value}")?;
            }
        } else {
            for (key, value) in self.iter() {
                write!(f, " {key}={value}")?;
            }
        }
        f.write_str(">")
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
