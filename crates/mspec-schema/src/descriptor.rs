//! # Type Descriptors
//!
//! A [`TypeDescriptor`] is the compiled, immutable form of one field: its
//! shape, default producer, validator, hook, union tagging and serialized
//! key. Descriptors are assembled on a mutable [`DescriptorBuilder`] and
//! frozen with [`DescriptorBuilder::finish`]; nothing mutates them after.
//!
//! ## Shapes
//!
//! [`Shape`] is a closed sum: every engine pass matches it exhaustively,
//! so adding a shape forces every pass to handle it.

use std::fmt;
use std::sync::Arc;

use mspec_core::RenameRule;

use crate::registry::RecordSchema;
use crate::typed::TypedValue;
use crate::types::{DefaultFn, Hook, Modifiers, Predicate, ScalarKind, SequenceKind, TagStrategy};

/// The structural shape of a descriptor.
#[derive(Debug, Clone)]
pub enum Shape {
    Scalar(ScalarKind),
    Sequence {
        kind: SequenceKind,
        element: Box<TypeDescriptor>,
    },
    Mapping {
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>,
    },
    Record(Arc<RecordSchema>),
    Union {
        variants: Vec<TypeDescriptor>,
        tag: TagStrategy,
    },
}

/// Immutable validation and serialization rules for one field.
#[derive(Clone)]
pub struct TypeDescriptor {
    key: String,
    serialized_key: String,
    shape: Shape,
    default: Option<DefaultFn>,
    validator: Option<Predicate>,
    hook: Option<Hook>,
    type_name: Option<String>,
}

impl TypeDescriptor {
    /// The record's internal field key. Never renamed.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The key used in untyped data.
    pub fn serialized_key(&self) -> &str {
        &self.serialized_key
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Name identifying this descriptor as a tagged union member.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Tag strategy, for union shapes.
    pub fn tag_strategy(&self) -> Option<&TagStrategy> {
        match &self.shape {
            Shape::Union { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Invoke the default producer, if any.
    pub fn default_value(&self) -> Option<TypedValue> {
        self.default.as_ref().map(|produce| produce())
    }

    pub(crate) fn validator(&self) -> Option<&Predicate> {
        self.validator.as_ref()
    }

    pub(crate) fn hook(&self) -> Option<&Hook> {
        self.hook.as_ref()
    }

    /// Render the expected type: `int`, `list[int]`, `dict[str, int]`,
    /// `int | null`, or a record name.
    pub fn pretty(&self) -> String {
        match &self.shape {
            Shape::Scalar(kind) => kind.name().to_string(),
            Shape::Sequence { kind, element } => format!("{}[{}]", kind.name(), element.pretty()),
            Shape::Mapping { key, value } => format!("dict[{}, {}]", key.pretty(), value.pretty()),
            Shape::Record(schema) => schema.name().to_string(),
            Shape::Union { variants, .. } => variants
                .iter()
                .map(TypeDescriptor::pretty)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Whether a typed value has a shape this descriptor could have
    /// produced. Shallow: container elements are not inspected.
    pub fn admits(&self, value: &TypedValue) -> bool {
        match (&self.shape, value) {
            (Shape::Scalar(ScalarKind::Any), _) => true,
            (Shape::Scalar(kind), v) => v.scalar_kind() == Some(*kind),
            (Shape::Sequence { kind, .. }, v) => v.sequence_kind() == Some(*kind),
            (Shape::Mapping { .. }, TypedValue::Map(_)) => true,
            (Shape::Record(schema), TypedValue::Record(r)) => r.schema().name() == schema.name(),
            (Shape::Union { variants, .. }, v) => variants.iter().any(|d| d.admits(v)),
            _ => false,
        }
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("key", &self.key)
            .field("serialized_key", &self.serialized_key)
            .field("shape", &self.pretty())
            .field("default", &self.default.is_some())
            .field("validator", &self.validator.is_some())
            .field("hook", &self.hook.is_some())
            .field("type_name", &self.type_name)
            .finish()
    }
}

// ─── Builder ─────────────────────────────────────────────────────────

/// Mutable, transient form of a [`TypeDescriptor`].
///
/// Values inferred from structure (a record's type name, the null default
/// of an optional) go into `inferred_*` slots; modifiers set explicitly
/// override them when the descriptor is finished.
pub struct DescriptorBuilder {
    key: String,
    shape: Shape,
    rename: Option<String>,
    default: Option<DefaultFn>,
    literal: Option<TypedValue>,
    inferred_default: Option<DefaultFn>,
    validator: Option<Predicate>,
    hook: Option<Hook>,
    type_name: Option<String>,
    inferred_type_name: Option<String>,
}

impl DescriptorBuilder {
    pub fn new(key: impl Into<String>, shape: Shape) -> Self {
        Self {
            key: key.into(),
            shape,
            rename: None,
            default: None,
            literal: None,
            inferred_default: None,
            validator: None,
            hook: None,
            type_name: None,
            inferred_type_name: None,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub(crate) fn infer_default(&mut self, producer: DefaultFn) {
        self.inferred_default = Some(producer);
    }

    pub(crate) fn infer_type_name(&mut self, name: impl Into<String>) {
        self.inferred_type_name = Some(name.into());
    }

    /// Apply explicitly declared modifiers. The tag slot is consumed by
    /// the union builder and ignored here.
    pub(crate) fn apply(&mut self, modifiers: Modifiers) {
        let Modifiers {
            rename,
            default,
            literal,
            validator,
            hook,
            tag: _,
            type_name,
        } = modifiers;
        self.rename = rename.or(self.rename.take());
        self.default = default.or(self.default.take());
        self.literal = literal.or(self.literal.take());
        self.validator = validator.or(self.validator.take());
        self.hook = hook.or(self.hook.take());
        self.type_name = type_name.or(self.type_name.take());
    }

    /// Freeze into an immutable descriptor.
    ///
    /// The serialized key is the explicit rename if one was declared, and
    /// `rule` applied to the internal key otherwise. Defaults resolve as
    /// literal, then explicit producer, then inferred producer.
    pub fn finish(self, rule: RenameRule) -> TypeDescriptor {
        let serialized_key = self.rename.unwrap_or_else(|| rule.apply(&self.key));
        let literal_default = self.literal.map(|literal| {
            let produce: DefaultFn = Arc::new(move || literal.clone());
            produce
        });
        TypeDescriptor {
            key: self.key,
            serialized_key,
            shape: self.shape,
            default: literal_default.or(self.default).or(self.inferred_default),
            validator: self.validator,
            hook: self.hook,
            type_name: self.type_name.or(self.inferred_type_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(kind: ScalarKind) -> TypeDescriptor {
        DescriptorBuilder::new("v", Shape::Scalar(kind)).finish(RenameRule::None)
    }

    #[test]
    fn test_pretty_scalar_and_list() {
        assert_eq!(scalar(ScalarKind::Int).pretty(), "int");
        let list = DescriptorBuilder::new(
            "v",
            Shape::Sequence {
                kind: SequenceKind::List,
                element: Box::new(scalar(ScalarKind::Int)),
            },
        )
        .finish(RenameRule::None);
        assert_eq!(list.pretty(), "list[int]");
    }

    #[test]
    fn test_pretty_dict_and_union() {
        let dict = DescriptorBuilder::new(
            "v",
            Shape::Mapping {
                key: Box::new(scalar(ScalarKind::Str)),
                value: Box::new(scalar(ScalarKind::Int)),
            },
        )
        .finish(RenameRule::None);
        assert_eq!(dict.pretty(), "dict[str, int]");

        let union = DescriptorBuilder::new(
            "v",
            Shape::Union {
                variants: vec![scalar(ScalarKind::Int), scalar(ScalarKind::Null)],
                tag: TagStrategy::Untagged,
            },
        )
        .finish(RenameRule::None);
        assert_eq!(union.pretty(), "int | null");
        assert_eq!(union.tag_strategy(), Some(&TagStrategy::Untagged));
    }

    #[test]
    fn test_serialized_key_precedence() {
        let mut explicit = DescriptorBuilder::new("first_name", Shape::Scalar(ScalarKind::Str));
        explicit.apply(Modifiers {
            rename: Some("given".into()),
            ..Modifiers::default()
        });
        assert_eq!(explicit.finish(RenameRule::CamelCase).serialized_key(), "given");

        let derived = DescriptorBuilder::new("first_name", Shape::Scalar(ScalarKind::Str));
        assert_eq!(derived.finish(RenameRule::CamelCase).serialized_key(), "firstName");
    }

    #[test]
    fn test_default_precedence() {
        let mut b = DescriptorBuilder::new("v", Shape::Scalar(ScalarKind::Int));
        b.infer_default(Arc::new(|| TypedValue::Null));
        let d = DescriptorBuilder::new("v", Shape::Scalar(ScalarKind::Int)).finish(RenameRule::None);
        assert!(!d.has_default());

        b.apply(Modifiers {
            default: Some(Arc::new(|| TypedValue::Int(0))),
            ..Modifiers::default()
        });
        let mut with_literal = DescriptorBuilder::new("v", Shape::Scalar(ScalarKind::Int));
        with_literal.infer_default(Arc::new(|| TypedValue::Null));
        with_literal.apply(Modifiers {
            default: Some(Arc::new(|| TypedValue::Int(0))),
            literal: Some(TypedValue::Int(7)),
            ..Modifiers::default()
        });

        assert_eq!(b.finish(RenameRule::None).default_value(), Some(TypedValue::Int(0)));
        assert_eq!(
            with_literal.finish(RenameRule::None).default_value(),
            Some(TypedValue::Int(7))
        );
    }

    #[test]
    fn test_explicit_type_name_beats_inferred() {
        let mut b = DescriptorBuilder::new("v", Shape::Scalar(ScalarKind::Int));
        b.infer_type_name("Inferred");
        b.apply(Modifiers {
            type_name: Some("Explicit".into()),
            ..Modifiers::default()
        });
        assert_eq!(b.finish(RenameRule::None).type_name(), Some("Explicit"));
    }

    #[test]
    fn test_admits() {
        let int = scalar(ScalarKind::Int);
        assert!(int.admits(&TypedValue::Int(3)));
        assert!(!int.admits(&TypedValue::from("x")));
        assert!(scalar(ScalarKind::Any).admits(&TypedValue::from("x")));
    }
}
