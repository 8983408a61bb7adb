// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builder API for schemas and structured types.

use crate::edm::primitive::EdmPrimitiveKind;
use crate::edm::schema::{
    Annotation, AnnotationGroup, EdmOperation, EntityContainer, OperationKind, Schema, Term,
};
use crate::edm::types::{
    EnumType, FullQualifiedName, NavigationProperty, PropertyRef, StructuralProperty,
    StructuredType, TypeDefinition,
};

/// Builder for entity and complex types.
#[derive(Debug)]
pub struct StructuredTypeBuilder {
    ty: StructuredType,
}

impl StructuredTypeBuilder {
    pub fn entity(name: impl Into<FullQualifiedName>) -> Self {
        Self {
            ty: StructuredType::entity(name),
        }
    }

    pub fn complex(name: impl Into<FullQualifiedName>) -> Self {
        Self {
            ty: StructuredType::complex(name),
        }
    }

    pub fn base(mut self, base: impl Into<FullQualifiedName>) -> Self {
        self.ty.base_type = Some(base.into());
        self
    }

    pub fn abstract_type(mut self) -> Self {
        self.ty.is_abstract = true;
        self
    }

    pub fn open_type(mut self) -> Self {
        self.ty.is_open = true;
        self
    }

    /// Mark as a media entity type.
    pub fn has_stream(mut self) -> Self {
        self.ty.has_stream = true;
        self
    }

    /// Add a non-nullable primitive property and reference it from the key.
    pub fn key_property(mut self, name: impl Into<String>, kind: EdmPrimitiveKind) -> Self {
        let name = name.into();
        self.ty.key.push(PropertyRef {
            name: name.clone(),
            alias: None,
        });
        self.ty
            .properties
            .push(StructuralProperty::new(name, kind).not_null());
        self
    }

    /// Reference an already declared (or inherited) property from the key.
    pub fn key(mut self, name: impl Into<String>, alias: Option<&str>) -> Self {
        self.ty.key.push(PropertyRef {
            name: name.into(),
            alias: alias.map(str::to_string),
        });
        self
    }

    /// Add a nullable primitive property.
    pub fn primitive(mut self, name: impl Into<String>, kind: EdmPrimitiveKind) -> Self {
        self.ty.properties.push(StructuralProperty::new(name, kind));
        self
    }

    pub fn property(mut self, property: StructuralProperty) -> Self {
        self.ty.properties.push(property);
        self
    }

    pub fn navigation(mut self, navigation: NavigationProperty) -> Self {
        self.ty.navigation_properties.push(navigation);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.ty.annotations.push(annotation);
        self
    }

    pub fn build(self) -> StructuredType {
        self.ty
    }
}

/// Builder for one schema; types are sorted into their CSDL buckets.
#[derive(Debug)]
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            schema: Schema {
                namespace: namespace.into(),
                ..Schema::default()
            },
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.schema.alias = Some(alias.into());
        self
    }

    /// Add an entity or complex type, depending on its kind.
    pub fn structured_type(mut self, ty: StructuredType) -> Self {
        if ty.is_entity() {
            self.schema.entity_types.push(ty);
        } else {
            self.schema.complex_types.push(ty);
        }
        self
    }

    pub fn enum_type(mut self, ty: EnumType) -> Self {
        self.schema.enum_types.push(ty);
        self
    }

    pub fn type_definition(mut self, ty: TypeDefinition) -> Self {
        self.schema.type_definitions.push(ty);
        self
    }

    /// Add an action or function overload, depending on its kind.
    pub fn operation(mut self, operation: EdmOperation) -> Self {
        match operation.kind {
            OperationKind::Action => self.schema.actions.push(operation),
            OperationKind::Function => self.schema.functions.push(operation),
        }
        self
    }

    pub fn term(mut self, term: Term) -> Self {
        self.schema.terms.push(term);
        self
    }

    pub fn container(mut self, container: EntityContainer) -> Self {
        self.schema.entity_container = Some(container);
        self
    }

    pub fn annotation_group(mut self, group: AnnotationGroup) -> Self {
        self.schema.annotation_groups.push(group);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.schema.annotations.push(annotation);
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}
