//! # Roundtrip Subcommand
//!
//! Constructs a record from a data document, then serializes it back with
//! defaults filled in and union tags restored. Useful for normalizing
//! documents and for checking that a schema's tagging matches the data.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use mspec_core::Value;
use mspec_schema::{read_document, Record, RecordSchema};

use crate::Outcome;

/// Arguments for the roundtrip subcommand.
#[derive(Args, Debug)]
pub struct RoundtripArgs {
    /// Schema document declaring the records (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Name of the declared record to construct.
    #[arg(long)]
    pub record: String,

    /// Data document to normalize.
    pub document: PathBuf,

    /// Emit YAML instead of pretty JSON.
    #[arg(long)]
    pub yaml: bool,
}

/// Output format for serialized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
}

/// Construct then serialize. On a validation failure the output is the
/// rendered report.
pub fn normalize(schema: &Arc<RecordSchema>, data: &Value, format: Format) -> Result<Outcome> {
    let record = match Record::from_value(schema, data) {
        Ok(record) => record,
        Err(group) => {
            return Ok(Outcome {
                code: 1,
                output: group.to_string(),
            })
        }
    };
    let value = record.to_map();
    let text = match format {
        Format::Json => {
            serde_json::to_string_pretty(&value).context("failed to render JSON output")?
        }
        Format::Yaml => serde_yaml::to_string(&value).context("failed to render YAML output")?,
    };
    if &value != data {
        tracing::debug!(record = schema.name(), "serialized form differs from input");
    }
    Ok(Outcome {
        code: 0,
        output: text.trim_end().to_string(),
    })
}

/// Execute the roundtrip subcommand.
pub fn run_roundtrip(args: &RoundtripArgs) -> Result<u8> {
    let schema = crate::load_record(&args.schema, &args.record)?;
    let data = read_document(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let format = if args.yaml { Format::Yaml } else { Format::Json };
    let outcome = normalize(&schema, &data, format)?;
    if outcome.code == 0 {
        println!("{}", outcome.output);
    } else {
        eprintln!("{}", outcome.output);
    }
    Ok(outcome.code)
}
