// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity Data Model catalog
//!
//! Read-only description of a service's data shape, consumed by every
//! serializer.
//!
//! # Features
//!
//! - **Type model**: entity/complex types with single inheritance, enums,
//!   type definitions, operations, terms, containers
//! - **EdmProvider**: lookup seam; plug in any catalog
//! - **Edm**: in-memory, index-backed provider
//! - **Builder API**: fluent construction of schemas and types
//!
//! Structured types keep a `base_type` *name*, never a pointer; the chain is
//! resolved through the provider on demand.
//!
//! # Example
//!
//! ```rust
//! use odata_wire::edm::{Edm, EdmPrimitiveKind, EdmProvider, SchemaBuilder, StructuredTypeBuilder};
//!
//! let edm = Edm::new(vec![SchemaBuilder::new("ns")
//!     .structured_type(
//!         StructuredTypeBuilder::entity("ns.ETBase")
//!             .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
//!             .build(),
//!     )
//!     .structured_type(
//!         StructuredTypeBuilder::entity("ns.ETDerived")
//!             .base("ns.ETBase")
//!             .primitive("PropertyString", EdmPrimitiveKind::String)
//!             .build(),
//!     )
//!     .build()]);
//!
//! let derived = edm.entity_type(&"ns.ETDerived".into()).unwrap();
//! assert_eq!(edm.structural_properties(derived).len(), 2);
//! assert_eq!(edm.key_refs(derived)[0].name, "PropertyInt16");
//! ```

mod builder;
mod expression;
mod primitive;
mod schema;
mod types;

pub use builder::{SchemaBuilder, StructuredTypeBuilder};
pub use expression::{
    ComparisonOp, ConstantExpression, DynamicExpression, DynamicKind, Expression, PropertyValue,
    TypeReference,
};
pub use primitive::EdmPrimitiveKind;
pub use schema::{
    ActionImport, Annotation, AnnotationGroup, EdmOperation, EdmxInclude, EdmxIncludeAnnotations,
    EdmxReference, EntityContainer, EntitySet, FunctionImport, NavigationPropertyBinding,
    OperationKind, Parameter, ReturnType, Schema, Singleton, Term,
};
pub use types::{
    EnumMember, EnumType, FullQualifiedName, MaxLength, NavigationProperty, OnDeleteAction,
    PropertyRef, ReferentialConstraint, Scale, StructuralProperty, StructuredKind, StructuredType,
    TypeDefinition, TypeFacets,
};

use crate::config::EDM_NAMESPACE;
use std::collections::HashMap;

/// Resolved type: the closed set of kinds a type name can denote.
#[derive(Debug, Clone, Copy)]
pub enum EdmTypeRef<'a> {
    Primitive(EdmPrimitiveKind),
    Entity(&'a StructuredType),
    Complex(&'a StructuredType),
    Enum(&'a EnumType),
    Definition(&'a TypeDefinition),
}

impl<'a> EdmTypeRef<'a> {
    pub fn structured(self) -> Option<&'a StructuredType> {
        match self {
            Self::Entity(t) | Self::Complex(t) => Some(t),
            _ => None,
        }
    }

    /// Primitive kind this type is represented by on the wire, if any.
    pub fn primitive_kind(self) -> Option<EdmPrimitiveKind> {
        match self {
            Self::Primitive(k) => Some(k),
            Self::Definition(d) => Some(d.underlying),
            Self::Enum(e) => Some(e.underlying),
            Self::Entity(_) | Self::Complex(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// EdmProvider trait
// ---------------------------------------------------------------------------

/// Read-only, queryable type catalog.
///
/// Only [`schemas`](Self::schemas) is required; the lookups have scanning
/// default implementations that indexed catalogs override. Names may use a
/// schema alias in place of the namespace everywhere.
pub trait EdmProvider: Send + Sync {
    /// All schemas, in declaration order.
    fn schemas(&self) -> &[Schema];

    /// Namespace designated by `prefix` (a namespace or a schema alias).
    fn resolve_namespace<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.schemas()
            .iter()
            .find(|s| s.alias.as_deref() == Some(prefix))
            .map_or(prefix, |s| s.namespace.as_str())
    }

    /// Look up any named type.
    fn resolve_type(&self, name: &FullQualifiedName) -> Option<EdmTypeRef<'_>> {
        let namespace = self.resolve_namespace(&name.namespace);
        if namespace == EDM_NAMESPACE {
            return EdmPrimitiveKind::from_name(&name.name).map(EdmTypeRef::Primitive);
        }
        let schema = self.schemas().iter().find(|s| s.namespace == namespace)?;
        let local = name.name.as_str();
        if let Some(t) = schema.entity_types.iter().find(|t| t.name.name == local) {
            return Some(EdmTypeRef::Entity(t));
        }
        if let Some(t) = schema.complex_types.iter().find(|t| t.name.name == local) {
            return Some(EdmTypeRef::Complex(t));
        }
        if let Some(t) = schema.enum_types.iter().find(|t| t.name.name == local) {
            return Some(EdmTypeRef::Enum(t));
        }
        schema
            .type_definitions
            .iter()
            .find(|t| t.name.name == local)
            .map(EdmTypeRef::Definition)
    }

    /// The (single) entity container of the service.
    fn entity_container(&self) -> Option<&EntityContainer> {
        self.schemas()
            .iter()
            .find_map(|s| s.entity_container.as_ref())
    }

    fn entity_type(&self, name: &FullQualifiedName) -> Option<&StructuredType> {
        match self.resolve_type(name)? {
            EdmTypeRef::Entity(t) => Some(t),
            _ => None,
        }
    }

    fn complex_type(&self, name: &FullQualifiedName) -> Option<&StructuredType> {
        match self.resolve_type(name)? {
            EdmTypeRef::Complex(t) => Some(t),
            _ => None,
        }
    }

    fn enum_type(&self, name: &FullQualifiedName) -> Option<&EnumType> {
        match self.resolve_type(name)? {
            EdmTypeRef::Enum(t) => Some(t),
            _ => None,
        }
    }

    fn entity_set(&self, name: &str) -> Option<&EntitySet> {
        self.entity_container()?.find_entity_set(name)
    }

    fn singleton(&self, name: &str) -> Option<&Singleton> {
        self.entity_container()?.find_singleton(name)
    }

    /// Whether two names denote the same element once aliases are resolved.
    fn same_name(&self, a: &FullQualifiedName, b: &FullQualifiedName) -> bool {
        a.name == b.name
            && self.resolve_namespace(&a.namespace) == self.resolve_namespace(&b.namespace)
    }

    /// Direct base type of `ty`, if declared and resolvable.
    fn base_type(&self, ty: &StructuredType) -> Option<&StructuredType> {
        let base = ty.base_type.as_ref()?;
        self.resolve_type(base)?.structured()
    }

    /// Inheritance chain from the root type down to `ty` itself.
    fn type_chain<'a>(&'a self, ty: &'a StructuredType) -> Vec<&'a StructuredType> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(base) = self.base_type(current) {
            // a malformed catalog could loop; stop at the first repeat
            if chain.iter().any(|t| t.name == base.name) {
                break;
            }
            chain.push(base);
            current = base;
        }
        chain.reverse();
        chain
    }

    /// Declared plus inherited structural properties, base type first.
    fn structural_properties<'a>(&'a self, ty: &'a StructuredType) -> Vec<&'a StructuralProperty> {
        self.type_chain(ty)
            .into_iter()
            .flat_map(|t| t.properties.iter())
            .collect()
    }

    fn structural_property<'a>(
        &'a self,
        ty: &'a StructuredType,
        name: &str,
    ) -> Option<&'a StructuralProperty> {
        self.type_chain(ty)
            .into_iter()
            .rev()
            .find_map(|t| t.declared_property(name))
    }

    /// Declared plus inherited navigation properties, base type first.
    fn navigation_properties<'a>(&'a self, ty: &'a StructuredType) -> Vec<&'a NavigationProperty> {
        self.type_chain(ty)
            .into_iter()
            .flat_map(|t| t.navigation_properties.iter())
            .collect()
    }

    fn navigation_property<'a>(
        &'a self,
        ty: &'a StructuredType,
        name: &str,
    ) -> Option<&'a NavigationProperty> {
        self.type_chain(ty)
            .into_iter()
            .rev()
            .find_map(|t| t.declared_navigation(name))
    }

    /// Key of `ty`: the key of the nearest type in its chain that declares one.
    fn key_refs<'a>(&'a self, ty: &'a StructuredType) -> &'a [PropertyRef] {
        self.type_chain(ty)
            .into_iter()
            .rev()
            .find(|t| !t.key.is_empty())
            .map(|t| t.key.as_slice())
            .unwrap_or(&[])
    }

    /// `true` when `derived` is `base` or has it somewhere in its chain.
    fn is_derived_from(&self, derived: &StructuredType, base: &FullQualifiedName) -> bool {
        self.type_chain(derived)
            .iter()
            .any(|t| self.same_name(&t.name, base))
    }

    /// All overloads of an action or function.
    fn operations(&self, name: &FullQualifiedName) -> Vec<&EdmOperation> {
        let namespace = self.resolve_namespace(&name.namespace);
        self.schemas()
            .iter()
            .filter(|s| s.namespace == namespace)
            .flat_map(|s| s.actions.iter().chain(s.functions.iter()))
            .filter(|op| op.name.name == name.name)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum TypeSlot {
    Entity(usize, usize),
    Complex(usize, usize),
    Enum(usize, usize),
    Definition(usize, usize),
}

/// [`HashMap`]-indexed [`EdmProvider`] over owned schemas.
#[derive(Debug, Default)]
pub struct Edm {
    schemas: Vec<Schema>,
    aliases: HashMap<String, String>,
    types: HashMap<FullQualifiedName, TypeSlot>,
}

impl Edm {
    /// Build the catalog and its lookup indexes.
    pub fn new(schemas: Vec<Schema>) -> Self {
        let mut aliases = HashMap::new();
        let mut types = HashMap::new();
        for (si, schema) in schemas.iter().enumerate() {
            if let Some(alias) = &schema.alias {
                aliases.insert(alias.clone(), schema.namespace.clone());
            }
            let key = |name: &FullQualifiedName| {
                FullQualifiedName::new(schema.namespace.clone(), name.name.clone())
            };
            for (i, t) in schema.entity_types.iter().enumerate() {
                types.insert(key(&t.name), TypeSlot::Entity(si, i));
            }
            for (i, t) in schema.complex_types.iter().enumerate() {
                types.insert(key(&t.name), TypeSlot::Complex(si, i));
            }
            for (i, t) in schema.enum_types.iter().enumerate() {
                types.insert(key(&t.name), TypeSlot::Enum(si, i));
            }
            for (i, t) in schema.type_definitions.iter().enumerate() {
                types.insert(key(&t.name), TypeSlot::Definition(si, i));
            }
        }
        log::debug!(
            "[edm] catalog built: {} schema(s), {} type(s)",
            schemas.len(),
            types.len()
        );
        Self {
            schemas,
            aliases,
            types,
        }
    }

    /// Number of indexed (non-primitive) types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl EdmProvider for Edm {
    fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    fn resolve_namespace<'a>(&'a self, prefix: &'a str) -> &'a str {
        self.aliases.get(prefix).map_or(prefix, String::as_str)
    }

    fn resolve_type(&self, name: &FullQualifiedName) -> Option<EdmTypeRef<'_>> {
        let namespace = self.resolve_namespace(&name.namespace);
        if namespace == EDM_NAMESPACE {
            return EdmPrimitiveKind::from_name(&name.name).map(EdmTypeRef::Primitive);
        }
        let key = FullQualifiedName::new(namespace, name.name.clone());
        let slot = *self.types.get(&key)?;
        let resolved = match slot {
            TypeSlot::Entity(s, i) => EdmTypeRef::Entity(&self.schemas[s].entity_types[i]),
            TypeSlot::Complex(s, i) => EdmTypeRef::Complex(&self.schemas[s].complex_types[i]),
            TypeSlot::Enum(s, i) => EdmTypeRef::Enum(&self.schemas[s].enum_types[i]),
            TypeSlot::Definition(s, i) => {
                EdmTypeRef::Definition(&self.schemas[s].type_definitions[i])
            }
        };
        Some(resolved)
    }
}
