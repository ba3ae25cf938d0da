//! # mspec-cli: Record Schema Command-Line Interface
//!
//! Drives the schema engine from the shell: declare record schemas in a
//! YAML or JSON document, then check data documents against them.
//!
//! ## Subcommands
//!
//! - `validate`: construct a record from a data document and report every
//!   failure at once
//! - `roundtrip`: construct, then serialize back with union tags restored
//! - `inspect`: list declared records with their serialized keys and types
//!
//! ## Usage
//!
//! ```bash
//! mspec validate --schema schemas.yaml --record Holder data.json
//! mspec roundtrip --schema schemas.yaml --record Holder data.json --yaml
//! mspec -vv inspect --schema schemas.yaml
//! ```
//!
//! ## Exit Codes
//!
//! - `0`: success
//! - `1`: the document failed validation
//! - `2`: operational error (unreadable schema or document, unknown record)
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here return exit codes.
//! - Rendering is split from I/O so each subcommand's output is testable
//!   without touching the filesystem.

pub mod inspect;
pub mod roundtrip;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use mspec_schema::{RecordSchema, SchemaSet};

/// A subcommand's exit code and the text it prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub code: u8,
    pub output: String,
}

/// Load a schema document and pick one declared record by name.
pub fn load_record(schema: &Path, name: &str) -> Result<Arc<RecordSchema>> {
    let set = load_schemas(schema)?;
    set.get(name).cloned().with_context(|| {
        format!(
            "record {name:?} is not declared in {} (declared: {})",
            schema.display(),
            set.names().join(", ")
        )
    })
}

/// Load every record declared in a schema document.
pub fn load_schemas(schema: &Path) -> Result<SchemaSet> {
    let set = SchemaSet::from_path(schema)
        .with_context(|| format!("failed to load schemas from {}", schema.display()))?;
    tracing::debug!(path = %schema.display(), records = set.len(), "loaded schema document");
    Ok(set)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;

    pub const SCHEMAS: &str = r#"
records:
  - name: PartA
    fields:
      a: int
  - name: PartB
    fields:
      b: str
  - name: Holder
    rename_all: camelCase
    fields:
      first_part:
        type: PartA | PartB
        tag: { strategy: internal, tag: kind }
      count:
        type: int
        default: 0
"#;

    /// Write `content` to a temp file with the given extension.
    pub fn file(content: &str, extension: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(&format!(".{extension}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_record_by_name() {
        let schemas = fixtures::file(fixtures::SCHEMAS, "yaml");
        let holder = load_record(schemas.path(), "Holder").unwrap();
        assert_eq!(holder.name(), "Holder");
    }

    #[test]
    fn test_load_record_unknown_name_lists_declared() {
        let schemas = fixtures::file(fixtures::SCHEMAS, "yaml");
        let err = load_record(schemas.path(), "Missing").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("\"Missing\""), "{message}");
        assert!(message.contains("PartA, PartB, Holder"), "{message}");
    }

    #[test]
    fn test_load_schemas_missing_file_has_context() {
        let err = load_schemas(Path::new("/nonexistent/schemas.yaml")).unwrap_err();
        assert!(format!("{err:#}").starts_with("failed to load schemas from"));
    }
}
