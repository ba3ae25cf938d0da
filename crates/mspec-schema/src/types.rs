//! # Semantic Field Types and Modifiers
//!
//! The explicit schema graph a record is declared with. A [`FieldType`] is
//! a scalar kind, a container of other field types, a nested record, a
//! union, or any of those wrapped in [`Modifiers`].
//!
//! Modifiers can be attached at any depth, so a list element or a union
//! member carries its own validator, hook or type name:
//!
//! ```
//! use mspec_schema::{FieldType, TagStrategy};
//!
//! let ty = FieldType::union([
//!     FieldType::int().type_name("Int"),
//!     FieldType::string().type_name("Str"),
//! ])
//! .tag(TagStrategy::External);
//! # let _ = ty;
//! ```
//!
//! When annotations nest, the outer one wins field by field.

use std::fmt;
use std::sync::Arc;

use mspec_core::Value;

use crate::registry::RecordSchema;
use crate::typed::TypedValue;

/// Produces a field's value when its key is absent from the input.
pub type DefaultFn = Arc<dyn Fn() -> TypedValue + Send + Sync>;

/// Accepts or rejects a fully converted value.
pub type Predicate = Arc<dyn Fn(&TypedValue) -> bool + Send + Sync>;

/// Transforms a value after it passed validation.
pub type Hook = Arc<dyn Fn(TypedValue) -> TypedValue + Send + Sync>;

/// Primitive value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// Any value at all, kept as-is.
    Any,
    Null,
    Bool,
    Int,
    Float,
    Str,
}

impl ScalarKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Str => "str",
        }
    }

    /// Whether an untyped value is a native instance of this kind.
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::Any, _)
                | (Self::Null, Value::Null)
                | (Self::Bool, Value::Bool(_))
                | (Self::Int, Value::Int(_))
                | (Self::Float, Value::Float(_))
                | (Self::Str, Value::Str(_))
        )
    }
}

/// The container a sequence rebuilds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SequenceKind {
    List,
    /// Duplicates are dropped, first occurrence kept.
    Set,
    /// Homogeneous tuple.
    Tuple,
}

impl SequenceKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Set => "set",
            Self::Tuple => "tuple",
        }
    }

    pub(crate) fn wrap(self, items: Vec<TypedValue>) -> TypedValue {
        match self {
            Self::List => TypedValue::List(items),
            Self::Set => TypedValue::Set(items),
            Self::Tuple => TypedValue::Tuple(items),
        }
    }
}

/// How a union variant's identity is encoded in serialized data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TagStrategy {
    /// No tag; the first variant that validates wins.
    #[default]
    Untagged,
    /// `{"TypeName": value}`
    External,
    /// `{"<tag>": "TypeName", ...value}`
    Internal { tag: String },
    /// `{"<tag>": "TypeName", "<content>": value}`
    Adjacent { tag: String, content: String },
}

impl TagStrategy {
    pub fn internal(tag: impl Into<String>) -> Self {
        Self::Internal { tag: tag.into() }
    }

    pub fn adjacent(tag: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Adjacent {
            tag: tag.into(),
            content: content.into(),
        }
    }

    pub fn is_untagged(&self) -> bool {
        matches!(self, Self::Untagged)
    }
}

// ─── Modifiers ───────────────────────────────────────────────────────

/// Field-level modifiers. Every slot is optional; a slot that is set
/// always beats a value inferred from the type's structure.
#[derive(Clone, Default)]
pub struct Modifiers {
    pub(crate) rename: Option<String>,
    pub(crate) default: Option<DefaultFn>,
    pub(crate) literal: Option<TypedValue>,
    pub(crate) validator: Option<Predicate>,
    pub(crate) hook: Option<Hook>,
    pub(crate) tag: Option<TagStrategy>,
    pub(crate) type_name: Option<String>,
}

impl Modifiers {
    /// Layer `self` over `inner`: slots set here win.
    fn over(self, inner: Modifiers) -> Modifiers {
        Modifiers {
            rename: self.rename.or(inner.rename),
            default: self.default.or(inner.default),
            literal: self.literal.or(inner.literal),
            validator: self.validator.or(inner.validator),
            hook: self.hook.or(inner.hook),
            tag: self.tag.or(inner.tag),
            type_name: self.type_name.or(inner.type_name),
        }
    }
}

impl fmt::Debug for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modifiers")
            .field("rename", &self.rename)
            .field("default", &self.default.is_some())
            .field("literal", &self.literal)
            .field("validator", &self.validator.is_some())
            .field("hook", &self.hook.is_some())
            .field("tag", &self.tag)
            .field("type_name", &self.type_name)
            .finish()
    }
}

// ─── Field types ─────────────────────────────────────────────────────

/// A declared semantic type.
#[derive(Debug, Clone)]
pub enum FieldType {
    Scalar(ScalarKind),
    Sequence(SequenceKind, Box<FieldType>),
    Mapping(Box<FieldType>, Box<FieldType>),
    Record(Arc<RecordSchema>),
    Union(Vec<FieldType>),
    Annotated(Box<FieldType>, Modifiers),
}

impl FieldType {
    pub fn any() -> Self {
        Self::Scalar(ScalarKind::Any)
    }

    pub fn null() -> Self {
        Self::Scalar(ScalarKind::Null)
    }

    pub fn bool() -> Self {
        Self::Scalar(ScalarKind::Bool)
    }

    pub fn int() -> Self {
        Self::Scalar(ScalarKind::Int)
    }

    pub fn float() -> Self {
        Self::Scalar(ScalarKind::Float)
    }

    pub fn string() -> Self {
        Self::Scalar(ScalarKind::Str)
    }

    pub fn list(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::List, Box::new(element))
    }

    pub fn set(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::Set, Box::new(element))
    }

    pub fn tuple(element: FieldType) -> Self {
        Self::Sequence(SequenceKind::Tuple, Box::new(element))
    }

    pub fn dict(key: FieldType, value: FieldType) -> Self {
        Self::Mapping(Box::new(key), Box::new(value))
    }

    pub fn record(schema: &Arc<RecordSchema>) -> Self {
        Self::Record(Arc::clone(schema))
    }

    pub fn union(members: impl IntoIterator<Item = FieldType>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    /// `T | null`.
    pub fn optional(inner: FieldType) -> Self {
        Self::Union(vec![inner, Self::null()])
    }

    /// Serialize under `key` instead of the derived key.
    pub fn rename(self, key: impl Into<String>) -> Self {
        self.annotate(|m| m.rename = Some(key.into()))
    }

    /// Produce the value with `producer` when the key is absent.
    pub fn default<F>(self, producer: F) -> Self
    where
        F: Fn() -> TypedValue + Send + Sync + 'static,
    {
        self.annotate(|m| m.default = Some(Arc::new(producer)))
    }

    /// Use `literal` when the key is absent. Beats `default` and the
    /// implicit null default of optional types.
    pub fn default_value(self, literal: impl Into<TypedValue>) -> Self {
        let literal = literal.into();
        self.annotate(|m| m.literal = Some(literal))
    }

    /// Reject converted values for which `predicate` returns false.
    pub fn validate<F>(self, predicate: F) -> Self
    where
        F: Fn(&TypedValue) -> bool + Send + Sync + 'static,
    {
        self.annotate(|m| m.validator = Some(Arc::new(predicate)))
    }

    /// Replace validated values with `hook(value)`.
    pub fn hook<F>(self, hook: F) -> Self
    where
        F: Fn(TypedValue) -> TypedValue + Send + Sync + 'static,
    {
        self.annotate(|m| m.hook = Some(Arc::new(hook)))
    }

    /// Tagging strategy of a union.
    pub fn tag(self, strategy: TagStrategy) -> Self {
        self.annotate(|m| m.tag = Some(strategy))
    }

    /// Name identifying this type as a tagged union member.
    pub fn type_name(self, name: impl Into<String>) -> Self {
        self.annotate(|m| m.type_name = Some(name.into()))
    }

    fn annotate(self, apply: impl FnOnce(&mut Modifiers)) -> Self {
        match self {
            Self::Annotated(inner, mut modifiers) => {
                apply(&mut modifiers);
                Self::Annotated(inner, modifiers)
            }
            other => {
                let mut modifiers = Modifiers::default();
                apply(&mut modifiers);
                Self::Annotated(Box::new(other), modifiers)
            }
        }
    }

    /// Strip annotations, merging them outermost-first.
    pub(crate) fn peel(&self) -> (&FieldType, Modifiers) {
        match self {
            Self::Annotated(inner, outer) => {
                let (base, inner_mods) = inner.peel();
                (base, outer.clone().over(inner_mods))
            }
            other => (other, Modifiers::default()),
        }
    }

    /// Whether this type is the null scalar.
    pub fn is_null(&self) -> bool {
        matches!(self.peel().0, Self::Scalar(ScalarKind::Null))
    }

    /// Short name used when deriving transparent record names.
    pub fn display_name(&self) -> String {
        match self.peel().0 {
            Self::Scalar(kind) => kind.name().to_string(),
            Self::Sequence(kind, _) => kind.name().to_string(),
            Self::Mapping(..) => "dict".to_string(),
            Self::Record(schema) => schema.name().to_string(),
            Self::Union(members) => members
                .iter()
                .map(FieldType::display_name)
                .collect::<Vec<_>>()
                .join("Or"),
            Self::Annotated(inner, _) => inner.display_name(),
        }
    }
}

// ─── Fields ──────────────────────────────────────────────────────────

/// One declared field: an internal key and its type.
#[derive(Debug, Clone)]
pub struct Field {
    key: String,
    ty: FieldType,
}

impl Field {
    pub fn new(key: impl Into<String>, ty: FieldType) -> Self {
        Self {
            key: key.into(),
            ty,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn rename(self, key: impl Into<String>) -> Self {
        self.map_ty(|ty| ty.rename(key))
    }

    pub fn default<F>(self, producer: F) -> Self
    where
        F: Fn() -> TypedValue + Send + Sync + 'static,
    {
        self.map_ty(|ty| ty.default(producer))
    }

    pub fn default_value(self, literal: impl Into<TypedValue>) -> Self {
        self.map_ty(|ty| ty.default_value(literal))
    }

    pub fn validate<F>(self, predicate: F) -> Self
    where
        F: Fn(&TypedValue) -> bool + Send + Sync + 'static,
    {
        self.map_ty(|ty| ty.validate(predicate))
    }

    pub fn hook<F>(self, hook: F) -> Self
    where
        F: Fn(TypedValue) -> TypedValue + Send + Sync + 'static,
    {
        self.map_ty(|ty| ty.hook(hook))
    }

    pub fn tag(self, strategy: TagStrategy) -> Self {
        self.map_ty(|ty| ty.tag(strategy))
    }

    pub fn type_name(self, name: impl Into<String>) -> Self {
        self.map_ty(|ty| ty.type_name(name))
    }

    fn map_ty(self, f: impl FnOnce(FieldType) -> FieldType) -> Self {
        Self {
            key: self.key,
            ty: f(self.ty),
        }
    }
}
