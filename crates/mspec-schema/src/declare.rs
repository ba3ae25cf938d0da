//! # Schema Documents
//!
//! Declares record types from YAML or JSON documents instead of Rust code:
//!
//! ```yaml
//! records:
//!   - name: PartA
//!     fields:
//!       a: int
//!   - name: PartB
//!     fields:
//!       b: str
//!   - name: Holder
//!     rename_all: camelCase
//!     fields:
//!       first_part:
//!         type: PartA | PartB
//!         tag: { strategy: external }
//!       count:
//!         type: int
//!         default: 0
//! ```
//!
//! Records are built in document order, so a field may only name records
//! declared above it. Field order inside a record is preserved.
//!
//! ## Type expressions
//!
//! `any`, `null`, `bool`, `int`, `float`, `str`, `list[T]`, `set[T]`,
//! `tuple[T]`, `dict[K, V]`, `optional[T]`, unions with `|`, and names of
//! previously declared records.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use mspec_core::{RenameRule, SpecError, Value};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

use crate::registry::{RecordSchema, TRANSPARENT_KEY};
use crate::typed::TypedValue;
use crate::types::{Field, FieldType, TagStrategy};

/// Error while loading or building a schema document.
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// A document file could not be read or parsed.
    #[error("document load error for '{path}': {reason}")]
    DocumentLoad { path: String, reason: String },

    /// The schema document does not have the expected structure.
    #[error("invalid schema document: {0}")]
    Parse(String),

    /// A type expression names neither a builtin nor a declared record.
    #[error("{record}.{field}: unknown type `{name}`")]
    UnknownType {
        record: String,
        field: String,
        name: String,
    },

    /// A type expression is malformed.
    #[error("{record}.{field}: invalid type expression `{expr}`: {reason}")]
    TypeExpression {
        record: String,
        field: String,
        expr: String,
        reason: String,
    },

    #[error("record `{0}` is declared more than once")]
    DuplicateRecord(String),

    /// `type_names` does not name every union member.
    #[error("{record}.{field}: {found} type names given for {expected} union members")]
    TypeNameCount {
        record: String,
        field: String,
        expected: usize,
        found: usize,
    },

    #[error("{0}: a transparent record cannot declare fields")]
    TransparentWithFields(String),

    #[error(transparent)]
    Schema(#[from] SpecError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Document model ──────────────────────────────────────────────────

/// Top level of a schema document.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaDocument {
    pub records: Vec<RecordDecl>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDecl {
    pub name: String,
    #[serde(default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub rename_all: RenameRule,
    /// Type expression of a transparent record.
    #[serde(default)]
    pub transparent: Option<String>,
    #[serde(default)]
    pub fields: OrderedFields,
}

/// Field declarations in document order.
#[derive(Debug, Default)]
pub struct OrderedFields(pub Vec<(String, FieldDecl)>);

impl<'de> Deserialize<'de> for OrderedFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = OrderedFields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of field names to declarations")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, decl)) = access.next_entry::<String, FieldDecl>()? {
                    fields.push((key, decl));
                }
                Ok(OrderedFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// A field is either a bare type expression or a full specification.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FieldDecl {
    Short(String),
    Full(FieldSpec),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub rename: Option<String>,
    /// Literal default. An explicit `null` is a null default, not absence.
    #[serde(default, deserialize_with = "present")]
    pub default: Option<Value>,
    #[serde(default)]
    pub tag: Option<TagDecl>,
    /// Names of the union members, positionally.
    #[serde(default)]
    pub type_names: Vec<String>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Declared union tag strategy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TagDecl {
    Untagged,
    External,
    Internal { tag: String },
    Adjacent { tag: String, content: String },
}

impl From<TagDecl> for TagStrategy {
    fn from(decl: TagDecl) -> Self {
        match decl {
            TagDecl::Untagged => TagStrategy::Untagged,
            TagDecl::External => TagStrategy::External,
            TagDecl::Internal { tag } => TagStrategy::Internal { tag },
            TagDecl::Adjacent { tag, content } => TagStrategy::Adjacent { tag, content },
        }
    }
}

// ─── Type expressions ────────────────────────────────────────────────

/// Parsed, unresolved type expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Name(String),
    Generic(String, Vec<TypeExpr>),
    Union(Vec<TypeExpr>),
}

/// Malformed type expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TypeExprError(String);

impl FromStr for TypeExpr {
    type Err = TypeExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = ExprParser {
            input: s,
            pos: 0,
        };
        let expr = parser.union()?;
        parser.skip_ws();
        if parser.pos < s.len() {
            return Err(parser.unexpected());
        }
        Ok(expr)
    }
}

struct ExprParser<'a> {
    input: &'a str,
    pos: usize,
}

impl ExprParser<'_> {
    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.input[self.pos..].chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn unexpected(&mut self) -> TypeExprError {
        match self.peek() {
            Some(c) => TypeExprError(format!("unexpected `{c}` at offset {}", self.pos)),
            None => TypeExprError("unexpected end of expression".to_string()),
        }
    }

    fn union(&mut self) -> Result<TypeExpr, TypeExprError> {
        let mut members = vec![self.term()?];
        while self.eat('|') {
            members.push(self.term()?);
        }
        Ok(if members.len() == 1 {
            members.remove(0)
        } else {
            TypeExpr::Union(members)
        })
    }

    fn term(&mut self) -> Result<TypeExpr, TypeExprError> {
        let name = self.ident()?;
        if !self.eat('[') {
            return Ok(TypeExpr::Name(name));
        }
        let mut args = vec![self.union()?];
        while self.eat(',') {
            args.push(self.union()?);
        }
        if !self.eat(']') {
            return Err(self.unexpected());
        }
        Ok(TypeExpr::Generic(name, args))
    }

    fn ident(&mut self) -> Result<String, TypeExprError> {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let len = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_'))
            .unwrap_or(rest.len());
        if len == 0 {
            return Err(self.unexpected());
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }
}

enum ResolveError {
    Unknown(String),
    Arity(String),
}

impl TypeExpr {
    fn resolve(&self, records: &HashMap<String, Arc<RecordSchema>>) -> Result<FieldType, ResolveError> {
        match self {
            Self::Name(name) => match name.as_str() {
                "any" => Ok(FieldType::any()),
                "null" | "None" => Ok(FieldType::null()),
                "bool" => Ok(FieldType::bool()),
                "int" => Ok(FieldType::int()),
                "float" => Ok(FieldType::float()),
                "str" => Ok(FieldType::string()),
                other => records
                    .get(other)
                    .map(FieldType::record)
                    .ok_or_else(|| ResolveError::Unknown(other.to_string())),
            },
            Self::Generic(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| arg.resolve(records))
                    .collect::<Result<Vec<_>, _>>()?;
                let arity = |expected: usize| {
                    ResolveError::Arity(format!(
                        "`{name}` takes {expected} argument(s), found {}",
                        args.len()
                    ))
                };
                match (name.as_str(), <[FieldType; 1]>::try_from(args.clone())) {
                    ("list", Ok([t])) => Ok(FieldType::list(t)),
                    ("set", Ok([t])) => Ok(FieldType::set(t)),
                    ("tuple", Ok([t])) => Ok(FieldType::tuple(t)),
                    ("optional", Ok([t])) => Ok(FieldType::optional(t)),
                    ("list" | "set" | "tuple" | "optional", Err(_)) => Err(arity(1)),
                    ("dict", _) => match <[FieldType; 2]>::try_from(args.clone()) {
                        Ok([k, v]) => Ok(FieldType::dict(k, v)),
                        Err(_) => Err(arity(2)),
                    },
                    (other, _) => Err(ResolveError::Unknown(other.to_string())),
                }
            }
            Self::Union(members) => Ok(FieldType::union(
                members
                    .iter()
                    .map(|m| m.resolve(records))
                    .collect::<Result<Vec<_>, _>>()?,
            )),
        }
    }
}

// ─── Schema sets ─────────────────────────────────────────────────────

/// Record schemas built from one document, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    records: Vec<Arc<RecordSchema>>,
    by_name: HashMap<String, Arc<RecordSchema>>,
}

impl SchemaSet {
    /// Build every record of `document`.
    ///
    /// # Errors
    ///
    /// Fails on the first record that cannot be built.
    pub fn from_document(document: &SchemaDocument) -> Result<Self, DeclarationError> {
        let mut set = Self::default();
        for decl in &document.records {
            if set.by_name.contains_key(&decl.name) {
                return Err(DeclarationError::DuplicateRecord(decl.name.clone()));
            }
            let schema = set.build_record(decl)?;
            set.by_name.insert(decl.name.clone(), Arc::clone(&schema));
            set.records.push(schema);
        }
        tracing::debug!(records = set.records.len(), "schema document built");
        Ok(set)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, DeclarationError> {
        let document: SchemaDocument =
            serde_yaml::from_str(text).map_err(|e| DeclarationError::Parse(e.to_string()))?;
        Self::from_document(&document)
    }

    pub fn from_json_str(text: &str) -> Result<Self, DeclarationError> {
        let document: SchemaDocument =
            serde_json::from_str(text).map_err(|e| DeclarationError::Parse(e.to_string()))?;
        Self::from_document(&document)
    }

    /// Load a schema document, YAML or JSON by file extension.
    pub fn from_path(path: &Path) -> Result<Self, DeclarationError> {
        let content = std::fs::read_to_string(path).map_err(|e| DeclarationError::DocumentLoad {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let result = if is_yaml(path) {
            Self::from_yaml_str(&content)
        } else {
            Self::from_json_str(&content)
        };
        result.map_err(|e| match e {
            DeclarationError::Parse(reason) => DeclarationError::DocumentLoad {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Arc<RecordSchema>> {
        self.by_name.get(name)
    }

    /// Schemas in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordSchema>> {
        self.records.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn build_record(&self, decl: &RecordDecl) -> Result<Arc<RecordSchema>, DeclarationError> {
        let mut builder = RecordSchema::builder(&decl.name).rename_all(decl.rename_all);
        if let Some(type_name) = &decl.type_name {
            builder = builder.type_name(type_name);
        }

        if let Some(expr) = &decl.transparent {
            if !decl.fields.0.is_empty() {
                return Err(DeclarationError::TransparentWithFields(decl.name.clone()));
            }
            let ty = self.field_type(&decl.name, TRANSPARENT_KEY, expr)?;
            return Ok(builder.transparent(ty)?);
        }

        for (key, field) in &decl.fields.0 {
            builder = builder.field(self.field(&decl.name, key, field)?);
        }
        Ok(builder.build()?)
    }

    fn field(&self, record: &str, key: &str, decl: &FieldDecl) -> Result<Field, DeclarationError> {
        let spec = match decl {
            FieldDecl::Short(expr) => return Ok(Field::new(key, self.field_type(record, key, expr)?)),
            FieldDecl::Full(spec) => spec,
        };

        let mut ty = self.field_type(record, key, &spec.ty)?;
        if !spec.type_names.is_empty() {
            ty = name_members(record, key, ty, &spec.type_names)?;
        }

        let mut field = Field::new(key, ty);
        if let Some(rename) = &spec.rename {
            field = field.rename(rename);
        }
        if let Some(default) = &spec.default {
            field = field.default_value(TypedValue::from(default));
        }
        if let Some(tag) = &spec.tag {
            field = field.tag(tag.clone().into());
        }
        Ok(field)
    }

    fn field_type(&self, record: &str, field: &str, expr: &str) -> Result<FieldType, DeclarationError> {
        let parsed: TypeExpr = expr.parse().map_err(|e: TypeExprError| DeclarationError::TypeExpression {
            record: record.to_string(),
            field: field.to_string(),
            expr: expr.to_string(),
            reason: e.0,
        })?;
        parsed.resolve(&self.by_name).map_err(|e| match e {
            ResolveError::Unknown(name) => DeclarationError::UnknownType {
                record: record.to_string(),
                field: field.to_string(),
                name,
            },
            ResolveError::Arity(reason) => DeclarationError::TypeExpression {
                record: record.to_string(),
                field: field.to_string(),
                expr: expr.to_string(),
                reason,
            },
        })
    }
}

fn name_members(
    record: &str,
    field: &str,
    ty: FieldType,
    names: &[String],
) -> Result<FieldType, DeclarationError> {
    let members = match ty {
        FieldType::Union(members) if members.len() == names.len() => members,
        FieldType::Union(members) => {
            return Err(DeclarationError::TypeNameCount {
                record: record.to_string(),
                field: field.to_string(),
                expected: members.len(),
                found: names.len(),
            })
        }
        _ => {
            return Err(DeclarationError::TypeNameCount {
                record: record.to_string(),
                field: field.to_string(),
                expected: 0,
                found: names.len(),
            })
        }
    };
    Ok(FieldType::union(
        members
            .into_iter()
            .zip(names)
            .map(|(member, name)| member.type_name(name)),
    ))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

/// Read a data document, YAML or JSON by file extension.
pub fn read_document(path: &Path) -> Result<Value, DeclarationError> {
    let load_error = |reason: String| DeclarationError::DocumentLoad {
        path: path.display().to_string(),
        reason,
    };
    let content =
        std::fs::read_to_string(path).map_err(|e| load_error(format!("cannot read file: {e}")))?;
    if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| load_error(format!("invalid YAML: {e}")))
    } else {
        serde_json::from_str(&content).map_err(|e| load_error(format!("invalid JSON: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Shape;
    use crate::record::Record;

    const DOC: &str = r#"
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
        tag: { strategy: external }
      count:
        type: int
        default: 0
      label:
        type: int | str
        tag: { strategy: adjacent, tag: t, content: c }
        type_names: [Int, Str]
      note:
        type: optional[str]
        default: null
"#;

    #[test]
    fn test_parse_type_expressions() {
        let e: TypeExpr = "dict[str, list[int | null]]".parse().unwrap();
        assert_eq!(
            e,
            TypeExpr::Generic(
                "dict".into(),
                vec![
                    TypeExpr::Name("str".into()),
                    TypeExpr::Generic(
                        "list".into(),
                        vec![TypeExpr::Union(vec![
                            TypeExpr::Name("int".into()),
                            TypeExpr::Name("null".into())
                        ])]
                    )
                ]
            )
        );
        assert!("list[int".parse::<TypeExpr>().is_err());
        assert!("int |".parse::<TypeExpr>().is_err());
        assert!("int str".parse::<TypeExpr>().is_err());
    }

    #[test]
    fn test_build_document_keeps_order() {
        let set = SchemaSet::from_yaml_str(DOC).unwrap();
        assert_eq!(set.names(), vec!["PartA", "PartB", "Holder"]);
        let holder = set.get("Holder").unwrap();
        let keys: Vec<_> = holder.fields().iter().map(|d| d.serialized_key()).collect();
        assert_eq!(keys, vec!["firstPart", "count", "label", "note"]);
        assert!(matches!(
            holder.fields()[0].tag_strategy(),
            Some(TagStrategy::External)
        ));
        match holder.fields()[2].shape() {
            Shape::Union { variants, .. } => {
                let names: Vec<_> = variants.iter().map(|v| v.type_name()).collect();
                assert_eq!(names, vec![Some("Int"), Some("Str")]);
            }
            other => panic!("expected union, got {other:?}"),
        }
    }

    #[test]
    fn test_declared_schema_validates() {
        let set = SchemaSet::from_yaml_str(DOC).unwrap();
        let data: Value =
            serde_json::from_str(r#"{"firstPart": {"PartB": {"b": "x"}}, "label": {"t": "Str", "c": "s"}}"#)
                .unwrap();
        let record = Record::from_value(set.get("Holder").unwrap(), &data).unwrap();
        assert_eq!(record.get("count"), Some(&TypedValue::Int(0)));
        assert_eq!(record.get("note"), Some(&TypedValue::Null));
        let out = record.to_map();
        let out = out.as_map().unwrap();
        assert_eq!(out.get("firstPart"), data.as_map().unwrap().get("firstPart"));
        assert_eq!(out.get("count"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_unknown_type() {
        let err = SchemaSet::from_yaml_str(
            "records:\n  - name: A\n    fields:\n      x: Missing\n",
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownType { ref name, .. } if name == "Missing"));
    }

    #[test]
    fn test_forward_reference_is_unknown() {
        let err = SchemaSet::from_yaml_str(
            "records:\n  - name: A\n    fields:\n      b: B\n  - name: B\n    fields:\n      x: int\n",
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownType { .. }));
    }

    #[test]
    fn test_bad_arity() {
        let err = SchemaSet::from_yaml_str(
            "records:\n  - name: A\n    fields:\n      x: dict[str]\n",
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::TypeExpression { .. }));
    }

    #[test]
    fn test_missing_type_name_surfaces_spec_error() {
        let err = SchemaSet::from_yaml_str(
            "records:\n  - name: A\n    fields:\n      x:\n        type: int | str\n        tag: { strategy: external }\n",
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::Schema(SpecError::MissingTypeName { .. })));
    }

    #[test]
    fn test_type_name_count() {
        let err = SchemaSet::from_yaml_str(
            "records:\n  - name: A\n    fields:\n      x:\n        type: int | str\n        type_names: [Int]\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::TypeNameCount {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_duplicate_record() {
        let err = SchemaSet::from_json_str(
            r#"{"records": [{"name": "A", "fields": {}}, {"name": "A", "fields": {}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DeclarationError::DuplicateRecord(ref n) if n == "A"));
    }

    #[test]
    fn test_transparent_record() {
        let set = SchemaSet::from_yaml_str(
            "records:\n  - name: Ids\n    transparent: list[int]\n",
        )
        .unwrap();
        let ids = set.get("Ids").unwrap();
        assert!(ids.is_transparent());
        let data: Value = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(Record::from_value(ids, &data).unwrap().to_map(), data);
    }
}
