// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! URI literals, key predicates and canonical entity ids.

use crate::data::{ComplexValue, Entity, EnumValue, PrimitiveValue, Property, Value};
use crate::edm::{EdmPrimitiveKind, EdmProvider, EdmTypeRef, StructuredType, TypeFacets};
use crate::error::{SerResult, SerializerError};
use crate::ser::primitive::{canonical, encode_enum};
use std::fmt::Write as _;

/// Characters kept verbatim besides the RFC 3986 unreserved set.
const KEEP: &[u8] = b"'():,=@!$*;+";

fn percent_encode(input: &str, keep_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input.as_bytes() {
        let verbatim = b.is_ascii_alphanumeric()
            || matches!(b, b'-' | b'.' | b'_' | b'~')
            || KEEP.contains(&b)
            || (keep_slash && b == b'/');
        if verbatim {
            out.push(char::from(b));
        } else {
            let _ = write!(out, "%{:02X}", b);
        }
    }
    out
}

/// Encode a resource path; `/` separators are kept.
pub fn encode_path(path: &str) -> String {
    percent_encode(path, true)
}

/// Encode one path segment or key literal.
pub fn encode_segment(segment: &str) -> String {
    percent_encode(segment, false)
}

/// URI literal of a primitive value (`'text'`, `42`, `binary'...'`, ...).
pub fn primitive_literal(
    kind: EdmPrimitiveKind,
    value: &PrimitiveValue,
    facets: &TypeFacets,
    property: &str,
) -> SerResult<String> {
    let text = canonical(kind, value, facets, property)?;
    let literal = match kind {
        EdmPrimitiveKind::String => format!("'{}'", text.replace('\'', "''")),
        EdmPrimitiveKind::Binary => format!("binary'{}'", text),
        EdmPrimitiveKind::Duration => format!("duration'{}'", text),
        _ => text,
    };
    Ok(literal)
}

/// Literal of one key property value, resolved against its declared type.
fn key_literal(
    edm: &dyn EdmProvider,
    owner: &StructuredType,
    path: &str,
    properties: &[Property],
) -> SerResult<String> {
    let mut owner = owner;
    let mut properties = properties;
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        let declared = edm
            .structural_property(owner, segment)
            .ok_or(SerializerError::MissingId)?;
        let property = properties
            .iter()
            .find(|p| p.name == segment)
            .ok_or(SerializerError::MissingId)?;
        let resolved = edm
            .resolve_type(&declared.type_name)
            .ok_or_else(|| SerializerError::UnknownType(declared.type_name.to_string()))?;
        if segments.peek().is_some() {
            let (EdmTypeRef::Complex(complex), Value::Complex(ComplexValue { properties: inner, .. })) =
                (resolved, &property.value)
            else {
                return Err(SerializerError::MissingId);
            };
            owner = complex;
            properties = inner.as_slice();
            continue;
        }
        return match (resolved, &property.value) {
            (EdmTypeRef::Primitive(kind), Value::Primitive(v)) => {
                primitive_literal(kind, v, &declared.facets, &property.name)
            }
            (EdmTypeRef::Definition(def), Value::Primitive(v)) => {
                primitive_literal(def.underlying, v, &def.facets, &property.name)
            }
            (EdmTypeRef::Enum(e), Value::Enum(v)) => {
                let names = encode_enum(e, v, &property.name)?;
                Ok(format!("{}'{}'", e.name, names))
            }
            (EdmTypeRef::Enum(e), Value::Primitive(v)) => {
                let n = v.as_i64().ok_or_else(|| {
                    SerializerError::wrong_value(&property.name, v.raw_string())
                })?;
                let names = encode_enum(e, &EnumValue::Number(n), &property.name)?;
                Ok(format!("{}'{}'", e.name, names))
            }
            (_, Value::Null) => Err(SerializerError::MissingId),
            _ => Err(SerializerError::InconsistentPropertyType(property.name.clone())),
        };
    }
    Err(SerializerError::MissingId)
}

/// Key predicate of `entity`: the bare literal for a single key,
/// `k1=v1,k2=v2` in declaration order for composite keys.
pub fn key_predicate(
    edm: &dyn EdmProvider,
    entity_type: &StructuredType,
    entity: &Entity,
) -> SerResult<String> {
    let refs = edm.key_refs(entity_type);
    if refs.is_empty() {
        return Err(SerializerError::MissingId);
    }
    if let [single] = refs {
        let literal = key_literal(edm, entity_type, &single.name, &entity.properties)?;
        return Ok(encode_segment(&literal));
    }
    let mut parts = Vec::with_capacity(refs.len());
    for key in refs {
        let literal = key_literal(edm, entity_type, &key.name, &entity.properties)?;
        parts.push(format!("{}={}", encode_segment(key.key_name()), encode_segment(&literal)));
    }
    Ok(parts.join(","))
}

/// Canonical id `<set>(<key predicate>)`.
pub fn canonical_id(
    edm: &dyn EdmProvider,
    entity_set: &str,
    entity_type: &StructuredType,
    entity: &Entity,
) -> SerResult<String> {
    Ok(format!(
        "{}({})",
        encode_segment(entity_set),
        key_predicate(edm, entity_type, entity)?
    ))
}

/// Id of `entity`, computed from the key when not set and cached on the
/// entity. A singleton's id is its name. Fails with `MissingId` when no
/// set name is known.
pub fn resolve_entity_id<'e>(
    edm: &dyn EdmProvider,
    entity_set: Option<&str>,
    entity_type: &StructuredType,
    entity: &'e Entity,
) -> SerResult<&'e str> {
    entity.resolve_id(|e| {
        let set = entity_set.ok_or(SerializerError::MissingId)?;
        if edm.singleton(set).is_some() {
            return Ok(encode_segment(set));
        }
        canonical_id(edm, set, entity_type, e)
    })
}
