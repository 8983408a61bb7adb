// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Naming and literal rules shared by the CSDL JSON and XML writers.

use crate::config::EDM_NAMESPACE;
use crate::data::{PrimitiveValue, ServiceMetadata};
use crate::edm::{
    ConstantExpression, EdmPrimitiveKind, EdmProvider, FullQualifiedName,
    StructuredType, TypeFacets,
};
use crate::error::SerResult;
use crate::ser::primitive::canonical;
use std::collections::HashMap;

/// Namespace to alias mapping of one metadata document.
///
/// Built per call from the document's references and schemas; every type
/// reference written afterwards prefers the alias.
#[derive(Debug, Default)]
pub(crate) struct CsdlNames {
    aliases: HashMap<String, String>,
}

impl CsdlNames {
    pub(crate) fn new(metadata: &ServiceMetadata) -> Self {
        let mut names = Self::default();
        for reference in &metadata.references {
            for include in &reference.includes {
                if let Some(alias) = &include.alias {
                    names.register(&include.namespace, alias);
                }
            }
        }
        for schema in metadata.edm.schemas() {
            if let Some(alias) = &schema.alias {
                names.register(&schema.namespace, alias);
            }
        }
        names
    }

    fn register(&mut self, namespace: &str, alias: &str) {
        self.aliases.insert(namespace.to_string(), alias.to_string());
    }

    /// Alias-qualified name if the namespace has an alias.
    pub(crate) fn name(&self, fqn: &FullQualifiedName) -> String {
        if fqn.namespace.is_empty() || fqn.namespace == EDM_NAMESPACE {
            return fqn.to_string();
        }
        match self.aliases.get(&fqn.namespace) {
            Some(alias) => fqn.with_prefix(alias),
            None => fqn.to_string(),
        }
    }

    /// XML type reference: `Collection(...)` wrapped when `collection`.
    pub(crate) fn type_ref(&self, fqn: &FullQualifiedName, collection: bool) -> String {
        let name = self.name(fqn);
        if collection {
            format!("Collection({})", name)
        } else {
            name
        }
    }

    /// `alias.Term` or `alias.Term#Qualifier`.
    pub(crate) fn term(&self, term: &FullQualifiedName, qualifier: Option<&str>) -> String {
        let term = self.name(term);
        match qualifier {
            Some(q) => format!("{}#{}", term, q),
            None => term,
        }
    }
}

fn constant_primitive(constant: &ConstantExpression) -> Option<(EdmPrimitiveKind, PrimitiveValue)> {
    let pair = match constant {
        ConstantExpression::Binary(v) => (EdmPrimitiveKind::Binary, PrimitiveValue::Binary(v.clone())),
        ConstantExpression::Bool(v) => (EdmPrimitiveKind::Boolean, PrimitiveValue::Boolean(*v)),
        ConstantExpression::Date(v) => (EdmPrimitiveKind::Date, PrimitiveValue::Date(*v)),
        ConstantExpression::DateTimeOffset(v) => {
            (EdmPrimitiveKind::DateTimeOffset, PrimitiveValue::DateTimeOffset(*v))
        }
        ConstantExpression::Decimal(v) => (EdmPrimitiveKind::Decimal, PrimitiveValue::Decimal(*v)),
        ConstantExpression::Duration(v) => (EdmPrimitiveKind::Duration, PrimitiveValue::Duration(*v)),
        ConstantExpression::Float(v) => (EdmPrimitiveKind::Double, PrimitiveValue::Double(*v)),
        ConstantExpression::Guid(v) => (EdmPrimitiveKind::Guid, PrimitiveValue::Guid(*v)),
        ConstantExpression::Int(v) => (EdmPrimitiveKind::Int64, PrimitiveValue::Int64(*v)),
        ConstantExpression::String(v) => (EdmPrimitiveKind::String, PrimitiveValue::String(v.clone())),
        ConstantExpression::TimeOfDay(v) => (EdmPrimitiveKind::TimeOfDay, PrimitiveValue::TimeOfDay(*v)),
        ConstantExpression::EnumMember { .. } => return None,
    };
    Some(pair)
}

/// Canonical text of a constant expression.
///
/// Enum members render as `Red,Green` in JSON and as space separated
/// `alias.Enum/Red alias.Enum/Green` paths in XML.
pub(crate) fn constant_text(
    constant: &ConstantExpression,
    names: &CsdlNames,
    xml: bool,
) -> SerResult<String> {
    if let ConstantExpression::EnumMember { enum_type, members } = constant {
        if !xml {
            return Ok(members.join(","));
        }
        let qualified = names.name(enum_type);
        let paths: Vec<String> = members.iter().map(|m| format!("{}/{}", qualified, m)).collect();
        return Ok(paths.join(" "));
    }
    match constant_primitive(constant) {
        Some((kind, value)) => canonical(kind, &value, &TypeFacets::default(), constant.name()),
        None => Ok(String::new()),
    }
}

/// `true` when `ty` declares a key and no type above it in the chain does.
pub(crate) fn writes_key(edm: &dyn EdmProvider, ty: &StructuredType) -> bool {
    if ty.key.is_empty() {
        return false;
    }
    let chain = edm.type_chain(ty);
    !chain
        .iter()
        .take(chain.len().saturating_sub(1))
        .any(|t| !t.key.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{Edm, EdmxReference, SchemaBuilder, StructuredTypeBuilder};
    use std::sync::Arc;

    fn metadata() -> ServiceMetadata {
        let edm = Edm::new(vec![SchemaBuilder::new("odata.test1")
            .alias("namespace")
            .structured_type(
                StructuredTypeBuilder::entity("odata.test1.ETBase")
                    .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
                    .build(),
            )
            .structured_type(
                StructuredTypeBuilder::entity("odata.test1.ETDerived")
                    .base("namespace.ETBase")
                    .key_property("PropertyString", EdmPrimitiveKind::String)
                    .build(),
            )
            .build()]);
        ServiceMetadata::new(Arc::new(edm)).reference(
            EdmxReference::new("http://ref/$metadata").include("Org.OData.Core.V1", Some("Core")),
        )
    }

    #[test]
    fn test_alias_preferred() {
        let md = metadata();
        let names = CsdlNames::new(&md);
        assert_eq!(names.name(&"odata.test1.ETBase".into()), "namespace.ETBase");
        assert_eq!(names.name(&"Org.OData.Core.V1.Description".into()), "Core.Description");
        assert_eq!(names.name(&"Edm.String".into()), "Edm.String");
        assert_eq!(names.name(&"other.T".into()), "other.T");
        assert_eq!(names.type_ref(&"Edm.Int16".into(), true), "Collection(Edm.Int16)");
        let description = "Org.OData.Core.V1.Description".into();
        assert_eq!(names.term(&description, Some("Q")), "Core.Description#Q");
        assert_eq!(names.term(&description, None), "Core.Description");
    }

    #[test]
    fn test_key_written_once_in_chain() {
        let md = metadata();
        let base = md.edm.entity_type(&"namespace.ETBase".into()).unwrap();
        let derived = md.edm.entity_type(&"namespace.ETDerived".into()).unwrap();
        assert!(writes_key(md.edm.as_ref(), base));
        assert!(!writes_key(md.edm.as_ref(), derived));
    }

    #[test]
    fn test_constant_texts() {
        let names = CsdlNames::new(&metadata());
        let members = ConstantExpression::EnumMember {
            enum_type: "odata.test1.ENString".into(),
            members: vec!["String1".into(), "String3".into()],
        };
        assert_eq!(constant_text(&members, &names, false).unwrap(), "String1,String3");
        assert_eq!(
            constant_text(&members, &names, true).unwrap(),
            "namespace.ENString/String1 namespace.ENString/String3"
        );
        assert_eq!(
            constant_text(&ConstantExpression::Float(f64::INFINITY), &names, true).unwrap(),
            "INF"
        );
        assert_eq!(
            constant_text(&ConstantExpression::Binary(vec![0xfb, 0xff]), &names, false).unwrap(),
            "-_8="
        );
    }
}
