//! # Inspect Subcommand
//!
//! Prints the compiled view of a schema document: each record with its
//! fields, the key each field is read from, its expected type and any
//! union tagging.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use mspec_core::RenameRule;
use mspec_schema::{RecordSchema, SchemaSet, Shape, TagStrategy, TypeDescriptor};

/// Arguments for the inspect subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Schema document declaring the records (YAML or JSON).
    #[arg(long)]
    pub schema: PathBuf,

    /// Only show this record.
    #[arg(long)]
    pub record: Option<String>,
}

/// Describe every record in the set, in declaration order.
pub fn describe(set: &SchemaSet) -> String {
    set.iter().map(|schema| describe_record(schema)).collect()
}

/// Describe one record.
pub fn describe_record(schema: &RecordSchema) -> String {
    let mut out = String::new();
    let _ = write!(out, "{}", schema.name());
    if schema.type_name() != schema.name() {
        let _ = write!(out, " as {}", schema.type_name());
    }
    if schema.is_transparent() {
        out.push_str(" (transparent)");
    }
    if schema.rename_all() != RenameRule::None {
        let _ = write!(out, " (rename_all: {})", schema.rename_all());
    }
    out.push('\n');
    for field in schema.fields() {
        let _ = writeln!(out, "  {}", describe_field(field));
    }
    out
}

fn describe_field(field: &TypeDescriptor) -> String {
    let mut line = if field.key() == field.serialized_key() {
        format!("{}: {}", field.key(), field.pretty())
    } else {
        format!("{} <- {:?}: {}", field.key(), field.serialized_key(), field.pretty())
    };
    if let Shape::Union { variants, tag } = field.shape() {
        if let Some(tagging) = describe_tag(tag) {
            let names: Vec<_> = variants
                .iter()
                .map(|v| v.type_name().unwrap_or("?"))
                .collect();
            let _ = write!(line, " [{tagging}; {}]", names.join(", "));
        }
    }
    if field.has_default() {
        line.push_str(" (default)");
    }
    line
}

fn describe_tag(tag: &TagStrategy) -> Option<String> {
    match tag {
        TagStrategy::Untagged => None,
        TagStrategy::External => Some("external".to_string()),
        TagStrategy::Internal { tag } => Some(format!("internal tag={tag:?}")),
        TagStrategy::Adjacent { tag, content } => {
            Some(format!("adjacent tag={tag:?} content={content:?}"))
        }
    }
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    match &args.record {
        Some(name) => {
            let schema = crate::load_record(&args.schema, name)?;
            print!("{}", describe_record(&schema));
        }
        None => {
            let set = crate::load_schemas(&args.schema)?;
            print!("{}", describe(&set));
        }
    }
    Ok(0)
}
