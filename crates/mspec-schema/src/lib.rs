//! # mspec-schema: Schema Compilation, Validation & Serialization
//!
//! Turns declared record shapes into executable descriptors, validates
//! untyped nested data against them, and serializes validated records
//! back into the same untyped shape.
//!
//! ## Pipeline
//!
//! - [`types`]: the declared schema graph ([`FieldType`] plus modifiers).
//! - [`builder`] / [`descriptor`]: compile a declared field into an
//!   immutable [`TypeDescriptor`].
//! - [`registry`]: per-record [`RecordSchema`], built once and shared.
//! - [`validate`]: the validation engine behind [`Record::construct`],
//!   with four union tagging strategies and aggregated errors.
//! - `serialize`: [`Record::to_map`], restoring stripped union tags.
//! - [`declare`]: record schemas from YAML or JSON documents.
//!
//! ## Example
//!
//! ```
//! use mspec_core::Value;
//! use mspec_schema::{Field, FieldType, Record, RecordSchema};
//!
//! let simple = RecordSchema::builder("Simple")
//!     .field(Field::new("a", FieldType::int()))
//!     .field(Field::new("b", FieldType::string()))
//!     .build()
//!     .unwrap();
//!
//! let data: Value = serde_json::from_str(r#"{"a": 1, "b": "value"}"#).unwrap();
//! let record = Record::from_value(&simple, &data).unwrap();
//! assert_eq!(record.to_string(), r#"<Simple a=1 b="value">"#);
//! assert_eq!(record.to_map(), data);
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `mspec-core` internally.
//! - Schemas are immutable after `build()`; a schema defect (a tagged union
//!   member without a type name, a key collision) fails at build time, never
//!   during validation.
//! - Validation failures are reported, never panicked on: a construction
//!   call returns a typed record or one report listing every failure.

pub mod builder;
pub mod declare;
pub mod descriptor;
pub mod record;
pub mod registry;
mod serialize;
pub mod typed;
pub mod types;
pub mod validate;

pub use declare::{read_document, DeclarationError, SchemaDocument, SchemaSet, TagDecl, TypeExpr};
pub use descriptor::{DescriptorBuilder, Shape, TypeDescriptor};
pub use record::Record;
pub use registry::{RecordSchema, RecordSchemaBuilder, TRANSPARENT_KEY};
pub use typed::TypedValue;
pub use types::{Field, FieldType, Modifiers, ScalarKind, SequenceKind, TagStrategy};
pub use validate::validate_record;
