//! # Record Registry
//!
//! A [`RecordSchema`] holds the ordered descriptors of one record type,
//! indexed by serialized key. It is built once, when the record type is
//! declared, and shared read-only through an `Arc` by every instance and
//! every validation call afterwards.
//!
//! ## Thread Safety
//!
//! `RecordSchema` is `Send + Sync`. Nothing mutates it after
//! [`RecordSchemaBuilder::build`], so concurrent validations need no
//! locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use mspec_core::{RenameRule, SpecError};

use crate::builder::build;
use crate::descriptor::TypeDescriptor;
use crate::types::{Field, FieldType};

/// Internal key of the single field of a transparent record.
pub const TRANSPARENT_KEY: &str = "value";

/// Compiled descriptors of one record type.
pub struct RecordSchema {
    name: String,
    type_name: String,
    rename_all: RenameRule,
    transparent: bool,
    fields: Vec<TypeDescriptor>,
    by_serialized_key: HashMap<String, usize>,
    by_key: HashMap<String, usize>,
}

impl RecordSchema {
    /// Start declaring a record type.
    pub fn builder(name: impl Into<String>) -> RecordSchemaBuilder {
        RecordSchemaBuilder {
            name: name.into(),
            type_name: None,
            rename_all: RenameRule::None,
            fields: Vec::new(),
        }
    }

    /// Declare a transparent record over `ty`, named after the type
    /// (`PartAOrPartB` for a union of `PartA` and `PartB`).
    pub fn transparent(ty: FieldType) -> Result<Arc<Self>, SpecError> {
        let name = ty.display_name();
        Self::transparent_named(name, ty)
    }

    /// Declare a transparent record: a single field whose value is the
    /// whole input and the whole serialized output.
    pub fn transparent_named(name: impl Into<String>, ty: FieldType) -> Result<Arc<Self>, SpecError> {
        Self::builder(name).transparent(ty)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name this record is identified by as a tagged union member.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn rename_all(&self) -> RenameRule {
        self.rename_all
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Descriptors in declaration order.
    pub fn fields(&self) -> &[TypeDescriptor] {
        &self.fields
    }

    /// Look up a descriptor by serialized key.
    pub fn field(&self, serialized_key: &str) -> Option<&TypeDescriptor> {
        self.by_serialized_key
            .get(serialized_key)
            .map(|&i| &self.fields[i])
    }

    /// Position of a field by internal key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.by_key.get(key).copied()
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("rename_all", &self.rename_all)
            .field("transparent", &self.transparent)
            .field(
                "fields",
                &self
                    .fields
                    .iter()
                    .map(|d| (d.serialized_key(), d.pretty()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Declares a [`RecordSchema`].
#[derive(Debug)]
pub struct RecordSchemaBuilder {
    name: String,
    type_name: Option<String>,
    rename_all: RenameRule,
    fields: Vec<Field>,
}

impl RecordSchemaBuilder {
    /// Name used when this record is a tagged union member. Defaults to
    /// the record name.
    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    /// Rule deriving serialized keys for fields without an explicit rename.
    pub fn rename_all(mut self, rule: RenameRule) -> Self {
        self.rename_all = rule;
        self
    }

    /// Append a field. Declaration order is kept.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Compile every field and freeze the registry.
    ///
    /// # Errors
    ///
    /// - `MissingTypeName` when a tagged union member has no type name.
    /// - `DuplicateKey` when two fields share an internal or serialized key.
    pub fn build(self) -> Result<Arc<RecordSchema>, SpecError> {
        self.finish(false)
    }

    /// Freeze as a transparent record over `ty`. Fields added with
    /// [`field`](Self::field) are discarded.
    pub fn transparent(mut self, ty: FieldType) -> Result<Arc<RecordSchema>, SpecError> {
        self.fields = vec![Field::new(TRANSPARENT_KEY, ty)];
        self.finish(true)
    }

    fn finish(self, transparent: bool) -> Result<Arc<RecordSchema>, SpecError> {
        let mut fields = Vec::with_capacity(self.fields.len());
        let mut by_serialized_key = HashMap::with_capacity(self.fields.len());
        let mut by_key = HashMap::with_capacity(self.fields.len());

        for (i, field) in self.fields.iter().enumerate() {
            let descriptor = build(&self.name, field.key(), field.ty())?.finish(self.rename_all);

            let duplicate = |key: &str, serialized: bool| SpecError::DuplicateKey {
                model: self.name.clone(),
                key: key.to_string(),
                serialized,
            };
            if by_key.insert(descriptor.key().to_string(), i).is_some() {
                return Err(duplicate(descriptor.key(), false));
            }
            if by_serialized_key
                .insert(descriptor.serialized_key().to_string(), i)
                .is_some()
            {
                return Err(duplicate(descriptor.serialized_key(), true));
            }
            fields.push(descriptor);
        }

        tracing::debug!(
            record = %self.name,
            fields = fields.len(),
            transparent,
            "record schema built"
        );

        Ok(Arc::new(RecordSchema {
            type_name: self.type_name.unwrap_or_else(|| self.name.clone()),
            name: self.name,
            rename_all: self.rename_all,
            transparent,
            fields,
            by_serialized_key,
            by_key,
        }))
    }
}
