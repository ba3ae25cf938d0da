//! # Error Types: Structured Validation Errors
//!
//! Defines the error family shared by schema construction and record
//! validation. All errors use `thiserror` for derive-based `Display` and
//! `Error` implementations and serialize to structured maps for reporting.
//!
//! ## Design
//!
//! - Every error names the record type it was raised for.
//! - Field-level failures are aggregated into a [`SpecErrorGroup`]: one
//!   report per construction attempt, listing every problem in the input.
//! - `MissingTypeName` and `DuplicateKey` describe an unbuildable schema.
//!   They are returned on their own, at schema build time, and never
//!   appear inside a validation report.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A single schema or validation error.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpecError {
    /// No input data and no fallback fields were supplied.
    #[error("no data or fallback fields passed to {model}")]
    MissingArgument {
        /// Record type name.
        model: String,
    },

    /// A required key is absent and the field has no default.
    #[error("missing required key {model}.{key}")]
    MissingRequiredKey {
        /// Record type name.
        model: String,
        /// The serialized key that was expected.
        key: String,
    },

    /// The structural shape of a value does not match its descriptor.
    #[error("{model}.{key} expected type {expected} but found {found}")]
    InvalidType {
        /// Record type name.
        model: String,
        /// Internal field key (empty when the whole input is rejected).
        key: String,
        /// Pretty-printed expected type.
        expected: String,
        /// Type inferred from the data.
        found: String,
    },

    /// A field's validator predicate rejected the converted value.
    #[error("{model}.{key} failed validation")]
    FailedValidation {
        /// Record type name.
        model: String,
        /// Internal field key.
        key: String,
    },

    /// A union tag does not name any declared variant.
    #[error("unknown key found `{key}` for {model}.{field}")]
    UnknownUnionKey {
        /// Record type name.
        model: String,
        /// Internal field key of the union.
        field: String,
        /// The tag that was found (empty when no tag was present at all).
        key: String,
    },

    /// A tagged union member has no resolvable type name.
    #[error("{model}.{key} union type is missing a type name for {ty}")]
    MissingTypeName {
        /// Record type name.
        model: String,
        /// Internal field key of the union.
        key: String,
        /// Pretty-printed type of the offending member.
        ty: String,
    },

    /// Two fields share an internal key or resolve to the same serialized
    /// key.
    #[error("{model} declares {} key `{key}` more than once", key_role(.serialized))]
    DuplicateKey {
        /// Record type name.
        model: String,
        /// The colliding key.
        key: String,
        /// Whether `key` is a serialized key rather than an internal one.
        serialized: bool,
    },
}

fn key_role(serialized: &bool) -> &'static str {
    if *serialized {
        "serialized"
    } else {
        "internal"
    }
}

/// The kind of a [`SpecError`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingArgument,
    MissingRequiredKey,
    InvalidType,
    FailedValidation,
    UnknownUnionKey,
    MissingTypeName,
    DuplicateKey,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MissingArgument => "MISSING_ARGUMENT",
            Self::MissingRequiredKey => "MISSING_REQUIRED_KEY",
            Self::InvalidType => "INVALID_TYPE",
            Self::FailedValidation => "FAILED_VALIDATION",
            Self::UnknownUnionKey => "UNKNOWN_UNION_KEY",
            Self::MissingTypeName => "MISSING_TYPE_NAME",
            Self::DuplicateKey => "DUPLICATE_KEY",
        };
        f.write_str(s)
    }
}

impl SpecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument { .. } => ErrorKind::MissingArgument,
            Self::MissingRequiredKey { .. } => ErrorKind::MissingRequiredKey,
            Self::InvalidType { .. } => ErrorKind::InvalidType,
            Self::FailedValidation { .. } => ErrorKind::FailedValidation,
            Self::UnknownUnionKey { .. } => ErrorKind::UnknownUnionKey,
            Self::MissingTypeName { .. } => ErrorKind::MissingTypeName,
            Self::DuplicateKey { .. } => ErrorKind::DuplicateKey,
        }
    }

    /// The record type name the error was raised for.
    pub fn model(&self) -> &str {
        match self {
            Self::MissingArgument { model }
            | Self::MissingRequiredKey { model, .. }
            | Self::InvalidType { model, .. }
            | Self::FailedValidation { model, .. }
            | Self::UnknownUnionKey { model, .. }
            | Self::MissingTypeName { model, .. }
            | Self::DuplicateKey { model, .. } => model,
        }
    }

    /// The field the error concerns, when there is one.
    ///
    /// For `MissingRequiredKey` this is the serialized key and for
    /// `DuplicateKey` whichever key collided; for `UnknownUnionKey` it is the
    /// union's field, not the tag.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::MissingArgument { .. } => None,
            Self::MissingRequiredKey { key, .. }
            | Self::InvalidType { key, .. }
            | Self::FailedValidation { key, .. }
            | Self::MissingTypeName { key, .. }
            | Self::DuplicateKey { key, .. } => Some(key),
            Self::UnknownUnionKey { field, .. } => Some(field),
        }
    }
}

/// The aggregated result of one failed construction attempt.
///
/// # Invariants
///
/// - Never empty: a report exists only because something failed.
/// - Errors are kept in the order they were found.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{message}:\n{}", DisplayErrors(.errors))]
pub struct SpecErrorGroup {
    message: String,
    errors: Vec<SpecError>,
}

struct DisplayErrors<'a>(&'a [SpecError]);

impl fmt::Display for DisplayErrors<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  [{}] {e}", e.kind())?;
        }
        Ok(())
    }
}

impl SpecErrorGroup {
    /// Message used for every validation report.
    pub const VALIDATION_FAILED: &'static str = "validation failed";

    /// Build a report. Returns `None` when there is nothing to report.
    pub fn new(message: impl Into<String>, errors: Vec<SpecError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self {
                message: message.into(),
                errors,
            })
        }
    }

    /// A report holding exactly one error.
    pub fn single(error: SpecError) -> Self {
        Self {
            message: Self::VALIDATION_FAILED.to_string(),
            errors: vec![error],
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the number of errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Always false; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns a slice of all errors.
    pub fn errors(&self) -> &[SpecError] {
        &self.errors
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_errors(self) -> Vec<SpecError> {
        self.errors
    }

    /// Structured form: `{"message": ..., "errors": [...]}`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| {
            serde_json::json!({ "message": self.message, "errors": [] })
        })
    }
}
