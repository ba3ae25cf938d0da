//! # mspec-core: Foundational Types for mspec
//!
//! This crate is the leaf of the mspec workspace. It defines the untyped
//! value tree that schemas validate and produce, the key rename rules
//! applied when a record schema is built, and the error family every
//! validation report is made of. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **One untyped value tree.** JSON, YAML and programmatic input all
//!    arrive as [`Value`]. Parsing text is the caller's business; the
//!    engine only ever sees already-parsed nested maps.
//!
//! 2. **Structural type names.** [`Value::type_name`] reports the shape of
//!    data (`list[int | str]`) so mismatches explain themselves.
//!
//! 3. **Errors are data.** [`SpecError`] values carry the record type name
//!    and field, serialize to structured maps, and are aggregated into a
//!    [`SpecErrorGroup`] instead of short-circuiting.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `mspec-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod rename;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use error::{ErrorKind, SpecError, SpecErrorGroup};
pub use rename::{ParseRenameRuleError, RenameRule};
pub use value::{Map, Value};
