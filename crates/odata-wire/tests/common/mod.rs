// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared fixture: a small service with two entity sets bound to each
//! other, a self-referencing navigation, base and derived types, one
//! operation of each kind and their imports.

#![allow(dead_code)]

use odata_wire::data::{ComplexValue, ContextSuffix, ContextUrl, Entity, Inline, Link, Property, ServiceMetadata};
use odata_wire::edm::{
    ActionImport, Annotation, ComparisonOp, Edm, EdmOperation, EdmPrimitiveKind, EdmProvider,
    EdmxReference, EntityContainer, EntitySet, EnumType, Expression, FullQualifiedName,
    FunctionImport, NavigationProperty, Parameter, ReturnType, Scale, SchemaBuilder, Singleton,
    StructuralProperty, StructuredType, StructuredTypeBuilder, Term, TypeDefinition,
};
use std::sync::Arc;

pub const NS: &str = "odata.test1";

pub fn metadata() -> ServiceMetadata {
    let schema = SchemaBuilder::new(NS)
        .alias("namespace")
        .enum_type(
            EnumType::new("odata.test1.ENString")
                .flags()
                .member("String1", 1)
                .member("String2", 2)
                .member("String3", 4),
        )
        .type_definition(TypeDefinition::new("odata.test1.TDString", EdmPrimitiveKind::String).max_length(15))
        .structured_type(
            StructuredTypeBuilder::complex("odata.test1.CTTwoPrim")
                .property(StructuralProperty::new("PropertyInt16", EdmPrimitiveKind::Int16).not_null())
                .primitive("PropertyString", EdmPrimitiveKind::String)
                .build(),
        )
        .structured_type(
            StructuredTypeBuilder::complex("odata.test1.CTTwoPrimDerived")
                .base("odata.test1.CTTwoPrim")
                .primitive("PropertyDate", EdmPrimitiveKind::Date)
                .build(),
        )
        .structured_type(
            StructuredTypeBuilder::entity("odata.test1.ETAllPrim")
                .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
                .primitive("PropertyString", EdmPrimitiveKind::String)
                .primitive("PropertyInt64", EdmPrimitiveKind::Int64)
                .property(
                    StructuralProperty::new("PropertyDecimal", EdmPrimitiveKind::Decimal)
                        .precision(11)
                        .scale(Scale::Value(5)),
                )
                .primitive("PropertyDate", EdmPrimitiveKind::Date)
                .property(StructuralProperty::new("PropertyEnum", "odata.test1.ENString"))
                .property(StructuralProperty::new("PropertyComp", "odata.test1.CTTwoPrim"))
                .navigation(NavigationProperty::new("NavPropertyETTwoPrimOne", "odata.test1.ETTwoPrim"))
                .navigation(
                    NavigationProperty::new("NavPropertyETTwoPrimMany", "odata.test1.ETTwoPrim")
                        .collection(),
                )
                .build(),
        )
        .structured_type(
            StructuredTypeBuilder::entity("odata.test1.ETTwoPrim")
                .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
                .primitive("PropertyString", EdmPrimitiveKind::String)
                .navigation(NavigationProperty::new("NavPropertyETTwoPrimOne", "odata.test1.ETTwoPrim"))
                .navigation(NavigationProperty::new("NavPropertyETAllPrimOne", "odata.test1.ETAllPrim"))
                .build(),
        )
        .structured_type(
            StructuredTypeBuilder::entity("odata.test1.ETTwoPrimDerived")
                .base("odata.test1.ETTwoPrim")
                .primitive("PropertyDate", EdmPrimitiveKind::Date)
                .build(),
        )
        .operation(
            EdmOperation::action("odata.test1.UARTString")
                .parameter(Parameter::new("ParameterInt16", EdmPrimitiveKind::Int16).not_null())
                .returns(ReturnType::new(EdmPrimitiveKind::String)),
        )
        .operation(
            EdmOperation::function("odata.test1.UFCRTString")
                .composable()
                .returns(ReturnType::new("odata.test1.TDString")),
        )
        .term(Term::new("odata.test1.Check", "Edm.Boolean"))
        .container(
            EntityContainer::new("odata.test1.Container")
                .entity_set(
                    EntitySet::new("ESAllPrim", "odata.test1.ETAllPrim")
                        .bind("NavPropertyETTwoPrimOne", "ESTwoPrim")
                        .bind("NavPropertyETTwoPrimMany", "ESTwoPrim"),
                )
                .entity_set(
                    EntitySet::new("ESTwoPrim", "odata.test1.ETTwoPrim")
                        .bind("NavPropertyETTwoPrimOne", "ESTwoPrim")
                        .bind("NavPropertyETAllPrimOne", "ESAllPrim"),
                )
                .singleton(Singleton::new("SINav", "odata.test1.ETTwoPrim"))
                .action_import(ActionImport::new("AIRTString", "odata.test1.UARTString"))
                .function_import(
                    FunctionImport::new("FICRTString", "odata.test1.UFCRTString").in_service_document(),
                ),
        )
        .annotate(Annotation::new("odata.test1.Check").value(Expression::compare(
            ComparisonOp::Gt,
            Expression::path("PropertyInt16"),
            Expression::int(0),
        )))
        .build();

    ServiceMetadata::new(Arc::new(Edm::new(vec![schema])))
        .etag("W/\"metadata-1\"")
        .reference(
            EdmxReference::new("http://docs.oasis-open.org/odata/odata/v4.0/os/vocabularies/Org.OData.Core.V1.xml")
                .include("Org.OData.Core.V1", Some("Core")),
        )
}

pub fn entity_type<'a>(metadata: &'a ServiceMetadata, name: &str) -> &'a StructuredType {
    metadata
        .edm
        .entity_type(&FullQualifiedName::new(NS, name))
        .unwrap_or_else(|| panic!("fixture type {name} missing"))
}

pub fn complex_type<'a>(metadata: &'a ServiceMetadata, name: &str) -> &'a StructuredType {
    metadata
        .edm
        .complex_type(&FullQualifiedName::new(NS, name))
        .unwrap_or_else(|| panic!("fixture type {name} missing"))
}

pub fn all_prim(key: i16) -> Entity {
    Entity::new()
        .property(Property::primitive("PropertyInt16", key))
        .property(Property::primitive("PropertyString", "First Resource - positive values"))
        .property(Property::primitive("PropertyInt64", 9_223_372_036_854_775_807i64))
        .property(Property::primitive("PropertyDate", chrono::NaiveDate::from_ymd_opt(2012, 12, 3).unwrap_or_default()))
        .property(Property::complex(
            "PropertyComp",
            ComplexValue::new()
                .property(Property::primitive("PropertyInt16", 111i16))
                .property(Property::primitive("PropertyString", "comp")),
        ))
}

pub fn two_prim(key: i16, text: &str) -> Entity {
    Entity::new()
        .property(Property::primitive("PropertyInt16", key))
        .property(Property::primitive("PropertyString", text))
}

/// Two `ETTwoPrim` entities pointing at each other through
/// `NavPropertyETTwoPrimOne`.
pub fn cyclic_pair() -> Arc<Entity> {
    let first = Arc::new(two_prim(1, "first").navigation(Link::new("NavPropertyETTwoPrimOne")));
    let second = Arc::new(
        two_prim(2, "second")
            .navigation(Link::new("NavPropertyETTwoPrimOne").inline_entity(Arc::clone(&first))),
    );
    if let Some(link) = first.navigation_link("NavPropertyETTwoPrimOne") {
        link.set_inline(Inline::Entity(second));
    }
    first
}

pub fn entity_context(set: &str) -> ContextUrl {
    ContextUrl::entity_set(set).suffix(ContextSuffix::Entity)
}

pub fn json(bytes: &[u8]) -> serde_json::Value {
    serde_json::from_slice(bytes).unwrap_or_else(|e| panic!("invalid JSON ({e}): {}", String::from_utf8_lossy(bytes)))
}
