// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type declarations: structured (entity/complex) types, enums, type definitions.

use crate::edm::primitive::EdmPrimitiveKind;
use crate::edm::schema::Annotation;
use std::fmt;

/// Namespace-qualified name of a schema element (`ns.Name`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullQualifiedName {
    pub namespace: String,
    pub name: String,
}

impl FullQualifiedName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Split `ns.sub.Name` at the last dot. A name without a dot gets an
    /// empty namespace.
    pub fn parse(qualified: &str) -> Self {
        match qualified.rsplit_once('.') {
            Some((ns, name)) => Self::new(ns, name),
            None => Self::new("", qualified),
        }
    }

    /// Render with `namespace` replaced by `prefix` (an alias).
    pub fn with_prefix(&self, prefix: &str) -> String {
        format!("{}.{}", prefix, self.name)
    }
}

impl fmt::Display for FullQualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

impl From<&str> for FullQualifiedName {
    fn from(qualified: &str) -> Self {
        Self::parse(qualified)
    }
}

impl From<EdmPrimitiveKind> for FullQualifiedName {
    fn from(kind: EdmPrimitiveKind) -> Self {
        Self::new(crate::config::EDM_NAMESPACE, kind.name())
    }
}

// ---------------------------------------------------------------------------
// Facets
// ---------------------------------------------------------------------------

/// `MaxLength` facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxLength {
    Max,
    Value(u32),
}

/// `Scale` facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Value(u32),
    Variable,
    Floating,
}

/// Value-constraining facets shared by properties, parameters, return
/// types, terms and type definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeFacets {
    pub max_length: Option<MaxLength>,
    pub precision: Option<u32>,
    pub scale: Option<Scale>,
    pub srid: Option<String>,
    /// `None` means the CSDL default (`true`).
    pub unicode: Option<bool>,
}

impl TypeFacets {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

/// Declared structural property of an entity or complex type.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralProperty {
    pub name: String,
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    pub facets: TypeFacets,
    pub default_value: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl StructuralProperty {
    /// Nullable, single-valued property of the given type.
    pub fn new(name: impl Into<String>, type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            collection: false,
            nullable: true,
            facets: TypeFacets::default(),
            default_value: None,
            annotations: Vec::new(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn max_length(mut self, max: u32) -> Self {
        self.facets.max_length = Some(MaxLength::Value(max));
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.facets.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.facets.scale = Some(scale);
        self
    }

    pub fn unicode(mut self, unicode: bool) -> Self {
        self.facets.unicode = Some(unicode);
        self
    }

    pub fn srid(mut self, srid: impl Into<String>) -> Self {
        self.facets.srid = Some(srid.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Primitive kind when the declared type is an `Edm.*` type.
    pub fn primitive_kind(&self) -> Option<EdmPrimitiveKind> {
        if self.type_name.namespace == crate::config::EDM_NAMESPACE {
            EdmPrimitiveKind::from_name(&self.type_name.name)
        } else {
            None
        }
    }
}

/// `OnDelete` action of a navigation property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDeleteAction {
    Cascade,
    None,
    SetNull,
    SetDefault,
}

impl OnDeleteAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cascade => "Cascade",
            Self::None => "None",
            Self::SetNull => "SetNull",
            Self::SetDefault => "SetDefault",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferentialConstraint {
    pub property: String,
    pub referenced_property: String,
    pub annotations: Vec<Annotation>,
}

/// Declared navigation property.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationProperty {
    pub name: String,
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub nullable: bool,
    pub partner: Option<String>,
    pub contains_target: bool,
    pub referential_constraints: Vec<ReferentialConstraint>,
    pub on_delete: Option<OnDeleteAction>,
    pub annotations: Vec<Annotation>,
}

impl NavigationProperty {
    pub fn new(name: impl Into<String>, type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            collection: false,
            nullable: true,
            partner: None,
            contains_target: false,
            referential_constraints: Vec::new(),
            on_delete: None,
            annotations: Vec::new(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn partner(mut self, partner: impl Into<String>) -> Self {
        self.partner = Some(partner.into());
        self
    }

    pub fn contains_target(mut self) -> Self {
        self.contains_target = true;
        self
    }

    pub fn constraint(
        mut self,
        property: impl Into<String>,
        referenced_property: impl Into<String>,
    ) -> Self {
        self.referential_constraints.push(ReferentialConstraint {
            property: property.into(),
            referenced_property: referenced_property.into(),
            annotations: Vec::new(),
        });
        self
    }

    pub fn on_delete(mut self, action: OnDeleteAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

// ---------------------------------------------------------------------------
// Structured types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuredKind {
    Entity,
    Complex,
}

/// Key property reference; `name` may be a `/`-separated path into a
/// complex property, in which case an alias is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyRef {
    pub name: String,
    pub alias: Option<String>,
}

impl PropertyRef {
    /// Name under which the key value appears in key predicates.
    pub fn key_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Entity or complex type. Only the properties declared on this type are
/// stored; inherited ones are reached through [`base_type`](Self::base_type)
/// via the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredType {
    pub kind: StructuredKind,
    pub name: FullQualifiedName,
    pub base_type: Option<FullQualifiedName>,
    pub is_abstract: bool,
    pub is_open: bool,
    pub has_stream: bool,
    pub key: Vec<PropertyRef>,
    pub properties: Vec<StructuralProperty>,
    pub navigation_properties: Vec<NavigationProperty>,
    pub annotations: Vec<Annotation>,
}

impl StructuredType {
    fn new(kind: StructuredKind, name: FullQualifiedName) -> Self {
        Self {
            kind,
            name,
            base_type: None,
            is_abstract: false,
            is_open: false,
            has_stream: false,
            key: Vec::new(),
            properties: Vec::new(),
            navigation_properties: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn entity(name: impl Into<FullQualifiedName>) -> Self {
        Self::new(StructuredKind::Entity, name.into())
    }

    pub fn complex(name: impl Into<FullQualifiedName>) -> Self {
        Self::new(StructuredKind::Complex, name.into())
    }

    pub fn is_entity(&self) -> bool {
        self.kind == StructuredKind::Entity
    }

    pub fn declared_property(&self, name: &str) -> Option<&StructuralProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn declared_navigation(&self, name: &str) -> Option<&NavigationProperty> {
        self.navigation_properties.iter().find(|p| p.name == name)
    }
}

// ---------------------------------------------------------------------------
// Enums and type definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumType {
    pub name: FullQualifiedName,
    pub underlying: EdmPrimitiveKind,
    pub is_flags: bool,
    pub members: Vec<EnumMember>,
    pub annotations: Vec<Annotation>,
}

impl EnumType {
    pub fn new(name: impl Into<FullQualifiedName>) -> Self {
        Self {
            name: name.into(),
            underlying: EdmPrimitiveKind::Int32,
            is_flags: false,
            members: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn underlying(mut self, kind: EdmPrimitiveKind) -> Self {
        self.underlying = kind;
        self
    }

    pub fn flags(mut self) -> Self {
        self.is_flags = true;
        self
    }

    pub fn member(mut self, name: impl Into<String>, value: i64) -> Self {
        self.members.push(EnumMember {
            name: name.into(),
            value,
            annotations: Vec::new(),
        });
        self
    }

    pub fn member_by_name(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_by_value(&self, value: i64) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.value == value)
    }

    /// Canonical member-name form of a numeric value. Flags enums combine
    /// matching members with `,`; `None` when the value cannot be expressed.
    pub fn value_to_names(&self, value: i64) -> Option<String> {
        if let Some(member) = self.member_by_value(value) {
            return Some(member.name.clone());
        }
        if !self.is_flags {
            return None;
        }
        let mut remaining = value;
        let mut names = Vec::new();
        for member in &self.members {
            if member.value != 0 && value & member.value == member.value {
                names.push(member.name.as_str());
                remaining &= !member.value;
            }
        }
        if remaining != 0 || names.is_empty() {
            return None;
        }
        Some(names.join(","))
    }
}

/// Named alias of a primitive type with fixed facets.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: FullQualifiedName,
    pub underlying: EdmPrimitiveKind,
    pub facets: TypeFacets,
    pub annotations: Vec<Annotation>,
}

impl TypeDefinition {
    pub fn new(name: impl Into<FullQualifiedName>, underlying: EdmPrimitiveKind) -> Self {
        Self {
            name: name.into(),
            underlying,
            facets: TypeFacets::default(),
            annotations: Vec::new(),
        }
    }

    pub fn max_length(mut self, max: u32) -> Self {
        self.facets.max_length = Some(MaxLength::Value(max));
        self
    }

    pub fn precision(mut self, precision: u32) -> Self {
        self.facets.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: Scale) -> Self {
        self.facets.scale = Some(scale);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fqn_parse() {
        let fqn = FullQualifiedName::parse("odata.test1.ETAllPrim");
        assert_eq!(fqn.namespace, "odata.test1");
        assert_eq!(fqn.name, "ETAllPrim");
        assert_eq!(fqn.to_string(), "odata.test1.ETAllPrim");
        assert_eq!(fqn.with_prefix("a"), "a.ETAllPrim");
        assert_eq!(FullQualifiedName::from(EdmPrimitiveKind::Int16).to_string(), "Edm.Int16");
    }

    #[test]
    fn test_flags_names() {
        let e = EnumType::new("ns.ENString")
            .flags()
            .member("String1", 1)
            .member("String2", 2)
            .member("String3", 4);
        assert_eq!(e.value_to_names(2).as_deref(), Some("String2"));
        assert_eq!(e.value_to_names(5).as_deref(), Some("String1,String3"));
        assert_eq!(e.value_to_names(8), None);
    }

    #[test]
    fn test_property_builder() {
        let p = StructuralProperty::new("PropertyString", EdmPrimitiveKind::String)
            .not_null()
            .max_length(10);
        assert!(!p.nullable);
        assert_eq!(p.facets.max_length, Some(MaxLength::Value(10)));
        assert_eq!(p.primitive_kind(), Some(EdmPrimitiveKind::String));
    }
}
