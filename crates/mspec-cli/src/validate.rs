//! # Validate Subcommand
//!
//! Constructs one declared record from a data document and reports the
//! outcome. Every failure in the document is listed, not just the first.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use mspec_core::Value;
use mspec_schema::{read_document, Record, RecordSchema};

use crate::Outcome;

/// Arguments for the validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Schema document declaring the records (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Name of the declared record to construct.
    #[arg(long)]
    pub record: String,

    /// Data document to validate (YAML or JSON by extension).
    pub document: PathBuf,

    /// Print the failure report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Validate `data` against `schema` and render the result.
pub fn check(schema: &Arc<RecordSchema>, data: &Value, json: bool) -> Result<Outcome> {
    match Record::from_value(schema, data) {
        Ok(record) => Ok(Outcome {
            code: 0,
            output: format!("OK {record}"),
        }),
        Err(group) => {
            tracing::info!(record = schema.name(), errors = group.len(), "validation failed");
            let output = if json {
                serde_json::to_string_pretty(&group.to_json())
                    .context("failed to render validation report")?
            } else {
                format!("FAIL {}", group)
            };
            Ok(Outcome { code: 1, output })
        }
    }
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs) -> Result<u8> {
    let schema = crate::load_record(&args.schema, &args.record)?;
    let data = read_document(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let outcome = check(&schema, &data, args.json)?;
    println!("{}", outcome.output);
    Ok(outcome.code)
}
