// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type, entity-set and context resolution shared by the JSON and XML
//! serializers.

use crate::config::EDM_NAMESPACE;
use crate::data::{ContextUrl, Entity};
use crate::edm::{
    EdmPrimitiveKind, EdmProvider, EdmTypeRef, FullQualifiedName, StructuralProperty,
    StructuredType, TypeFacets,
};
use crate::error::{SerResult, SerializerError};
use crate::query::{ExpandOption, SelectOption};
use crate::ser::projection::context_select_list;
use crate::ser::uri::resolve_entity_id;

/// Runtime type of a value statically typed as `base`.
///
/// `type_name` is the name carried by the value (`ns.T` or `#ns.T`). It
/// must resolve, be of the same kind and chain to `base` through its base
/// types.
pub(crate) fn resolve_derived<'a>(
    edm: &'a dyn EdmProvider,
    base: &'a StructuredType,
    type_name: Option<&str>,
) -> SerResult<&'a StructuredType> {
    let Some(name) = type_name else {
        return Ok(base);
    };
    let fqn = FullQualifiedName::parse(name.trim_start_matches('#'));
    if edm.same_name(&fqn, &base.name) {
        return Ok(base);
    }
    let derived = edm
        .resolve_type(&fqn)
        .and_then(EdmTypeRef::structured)
        .ok_or_else(|| SerializerError::UnknownType(name.to_string()))?;
    if derived.kind != base.kind || !edm.is_derived_from(derived, &base.name) {
        return Err(SerializerError::WrongBaseType {
            derived: derived.name.to_string(),
            base: base.name.to_string(),
        });
    }
    Ok(derived)
}

/// Declared type of a structural property.
pub(crate) fn property_type<'a>(
    edm: &'a dyn EdmProvider,
    property: &StructuralProperty,
) -> SerResult<EdmTypeRef<'a>> {
    edm.resolve_type(&property.type_name)
        .ok_or_else(|| SerializerError::UnknownType(property.type_name.to_string()))
}

/// Fully qualified name a resolved type is annotated with.
pub(crate) fn resolved_name(resolved: EdmTypeRef<'_>) -> FullQualifiedName {
    match resolved {
        EdmTypeRef::Primitive(kind) => kind.into(),
        EdmTypeRef::Entity(t) | EdmTypeRef::Complex(t) => t.name.clone(),
        EdmTypeRef::Enum(e) => e.name.clone(),
        EdmTypeRef::Definition(d) => d.name.clone(),
    }
}

/// Primitive kind and effective facets of a primitive or type-definition
/// type. A definition's own facets apply when the usage declares none.
pub(crate) fn primitive_facets<'f>(
    resolved: EdmTypeRef<'f>,
    facets: &'f TypeFacets,
) -> Option<(EdmPrimitiveKind, &'f TypeFacets)> {
    match resolved {
        EdmTypeRef::Primitive(kind) => Some((kind, facets)),
        EdmTypeRef::Definition(def) => {
            let facets = if facets.is_empty() { &def.facets } else { facets };
            Some((def.underlying, facets))
        }
        _ => None,
    }
}

/// Id if explicit or computable; `None` without an entity set.
pub(crate) fn known_entity_id<'e>(
    edm: &dyn EdmProvider,
    set: Option<&str>,
    ty: &StructuredType,
    entity: &'e Entity,
) -> SerResult<Option<&'e str>> {
    if entity.id().is_none() && set.is_none() {
        return Ok(None);
    }
    resolve_entity_id(edm, set, ty, entity).map(Some)
}

/// Value of `@odata.type` / `m:type`: `#Int16`, `#ns.ET`, `#Collection(ns.CT)`.
/// Primitive types drop the `Edm` namespace.
pub(crate) fn type_annotation(name: &FullQualifiedName, collection: bool) -> String {
    let bare = if name.namespace == EDM_NAMESPACE {
        name.name.clone()
    } else {
        name.to_string()
    };
    if collection {
        format!("#Collection({})", bare)
    } else {
        format!("#{}", bare)
    }
}

/// Render the context URL, filling in the select list from the projection
/// when the descriptor has none.
///
/// `Err(NoContextUrl)` when the context is required but absent.
pub(crate) fn context_string(
    context: Option<&ContextUrl>,
    select: Option<&SelectOption>,
    expand: Option<&ExpandOption>,
    required: bool,
) -> SerResult<Option<String>> {
    let Some(context) = context else {
        return if required {
            Err(SerializerError::NoContextUrl)
        } else {
            Ok(None)
        };
    };
    if context.select_list.is_some() || context.entity_set_or_singleton_or_type.is_none() {
        return context.encode().map(Some);
    }
    match context_select_list(select, expand) {
        Some(list) => context.clone().select_list(list).encode().map(Some),
        None => context.encode().map(Some),
    }
}

/// Strip a `Container/` prefix from a binding target.
fn target_name(target: &str) -> &str {
    target.rsplit('/').next().unwrap_or(target)
}

fn binding_target<'a>(edm: &'a dyn EdmProvider, source: &str, path: &str) -> Option<&'a str> {
    edm.entity_set(source)
        .and_then(|s| s.binding_target(path))
        .or_else(|| edm.singleton(source).and_then(|s| s.binding_target(path)))
        .map(target_name)
}

/// Entity set (or singleton) the payload of `context` belongs to, used to
/// compute canonical ids. Follows navigation bindings for
/// `Set(key)/Nav` contexts.
pub(crate) fn entity_set_scope(edm: &dyn EdmProvider, context: Option<&ContextUrl>) -> Option<String> {
    let context = context?;
    let name = context.entity_set_or_singleton_or_type.as_deref()?;
    match &context.nav_or_property_path {
        None => (edm.entity_set(name).is_some() || edm.singleton(name).is_some())
            .then(|| name.to_string()),
        Some(path) => binding_target(edm, name, path).map(str::to_string),
    }
}

/// Entity set of entities reached through navigation property `navigation`
/// from an entity of `parent`: the bound target, else the parent set.
pub(crate) fn nested_set(
    edm: &dyn EdmProvider,
    parent: Option<&str>,
    navigation: &str,
) -> Option<String> {
    let parent = parent?;
    Some(binding_target(edm, parent, navigation).unwrap_or(parent).to_string())
}
