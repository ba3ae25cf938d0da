//! # Descriptor Builder
//!
//! Compiles a declared [`FieldType`] into a [`DescriptorBuilder`],
//! recursing into container elements and union members.
//!
//! Building is pure and deterministic. It fails only when a tagged union
//! has a member with no resolvable type name: a record member inherits its
//! record's type name, anything else must carry an explicit `type_name`.

use std::sync::Arc;

use mspec_core::{RenameRule, SpecError};

use crate::descriptor::{DescriptorBuilder, Shape, TypeDescriptor};
use crate::typed::TypedValue;
use crate::types::{FieldType, TagStrategy};

/// Build the descriptor of field `key` of record `model`.
pub fn build(model: &str, key: &str, ty: &FieldType) -> Result<DescriptorBuilder, SpecError> {
    let (base, modifiers) = ty.peel();

    let mut builder = match base {
        FieldType::Scalar(kind) => DescriptorBuilder::new(key, Shape::Scalar(*kind)),
        FieldType::Sequence(kind, element) => {
            let element = build_nested(model, key, element)?;
            DescriptorBuilder::new(
                key,
                Shape::Sequence {
                    kind: *kind,
                    element: Box::new(element),
                },
            )
        }
        FieldType::Mapping(k, v) => {
            let k = build_nested(model, key, k)?;
            let v = build_nested(model, key, v)?;
            DescriptorBuilder::new(
                key,
                Shape::Mapping {
                    key: Box::new(k),
                    value: Box::new(v),
                },
            )
        }
        FieldType::Record(schema) => {
            let mut builder = DescriptorBuilder::new(key, Shape::Record(Arc::clone(schema)));
            builder.infer_type_name(schema.type_name());
            builder
        }
        FieldType::Union(members) => {
            let tag = modifiers.tag.clone().unwrap_or_default();
            build_union(model, key, members, tag)?
        }
        // `peel` never returns an annotation; recurse for completeness.
        FieldType::Annotated(inner, _) => build(model, key, inner)?,
    };

    if modifiers.tag.is_some() && !matches!(builder.shape(), Shape::Union { .. }) {
        tracing::warn!(
            model,
            field = key,
            "tag strategy declared on a non-union type is ignored"
        );
    }

    builder.apply(modifiers);
    Ok(builder)
}

fn build_nested(model: &str, key: &str, ty: &FieldType) -> Result<TypeDescriptor, SpecError> {
    Ok(build(model, key, ty)?.finish(RenameRule::None))
}

fn build_union(
    model: &str,
    key: &str,
    members: &[FieldType],
    tag: TagStrategy,
) -> Result<DescriptorBuilder, SpecError> {
    let mut variants = Vec::with_capacity(members.len());
    let mut nullable = false;

    for member in members {
        nullable |= member.is_null();
        let variant = build_nested(model, key, member)?;
        if !tag.is_untagged() && variant.type_name().is_none() {
            return Err(SpecError::MissingTypeName {
                model: model.to_string(),
                key: key.to_string(),
                ty: variant.pretty(),
            });
        }
        variants.push(variant);
    }

    let mut builder = DescriptorBuilder::new(key, Shape::Union { variants, tag });
    if nullable {
        builder.infer_default(Arc::new(|| TypedValue::Null));
    }
    Ok(builder)
}
