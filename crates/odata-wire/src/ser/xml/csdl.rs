// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CSDL XML (`edmx:Edmx`) metadata document.
//!
//! Same member order as the JSON form. Constant expressions are written
//! in element form (`<String>x</String>`), never as attributes, and
//! annotation groups keep their own `<Annotations>` element each.

use super::writer::XmlWriter;
use crate::config::{CSDL_VERSION, NS_EDM, NS_EDMX};
use crate::data::ServiceMetadata;
use crate::edm::{
    Annotation, AnnotationGroup, DynamicExpression, DynamicKind, EdmOperation, EdmPrimitiveKind,
    EdmProvider, EntityContainer, EnumType, Expression, MaxLength, NavigationProperty,
    NavigationPropertyBinding, Scale, Schema, StructuralProperty, StructuredKind, StructuredType,
    Term, TypeDefinition, TypeFacets,
};
use crate::error::SerResult;
use crate::ser::csdl::{constant_text, writes_key, CsdlNames};
use std::io::Write;

const EDMX: &str = "edmx:Edmx";
const EDMX_REFERENCE: &str = "edmx:Reference";
const EDMX_INCLUDE: &str = "edmx:Include";
const EDMX_INCLUDE_ANNOTATIONS: &str = "edmx:IncludeAnnotations";
const EDMX_DATA_SERVICES: &str = "edmx:DataServices";
const ANNOTATION: &str = "Annotation";

/// Owned attribute list; facet and flag values are formatted on the fly.
#[derive(Default)]
struct Attributes(Vec<(&'static str, String)>);

impl Attributes {
    fn with(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.0.push((name, value.into()));
        self
    }

    fn opt(self, name: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    /// `name="true"` when set; CSDL XML defaults these flags to false.
    fn flag(self, name: &'static str, value: bool) -> Self {
        if value {
            self.with(name, "true")
        } else {
            self
        }
    }

    fn nullable(self, nullable: bool) -> Self {
        if nullable {
            self
        } else {
            self.with("Nullable", "false")
        }
    }

    fn facets(mut self, facets: &TypeFacets) -> Self {
        match facets.max_length {
            Some(MaxLength::Max) => self = self.with("MaxLength", "max"),
            Some(MaxLength::Value(n)) => self = self.with("MaxLength", n.to_string()),
            None => {}
        }
        if let Some(precision) = facets.precision {
            self = self.with("Precision", precision.to_string());
        }
        match facets.scale {
            Some(Scale::Value(n)) => self = self.with("Scale", n.to_string()),
            Some(Scale::Variable) => self = self.with("Scale", "variable"),
            Some(Scale::Floating) => self = self.with("Scale", "floating"),
            None => {}
        }
        self = self.opt("SRID", facets.srid.as_deref());
        if facets.unicode == Some(false) {
            self = self.with("Unicode", "false");
        }
        self
    }

    fn as_attrs(&self) -> Vec<(&str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

/// Writes one CSDL XML document; holds the per-call alias map.
pub(crate) struct CsdlXmlWriter<'a> {
    metadata: &'a ServiceMetadata,
    names: CsdlNames,
}

impl<'a> CsdlXmlWriter<'a> {
    pub(crate) fn new(metadata: &'a ServiceMetadata) -> Self {
        Self {
            metadata,
            names: CsdlNames::new(metadata),
        }
    }

    fn edm(&self) -> &'a dyn EdmProvider {
        self.metadata.edm.as_ref()
    }

    /// `<name attrs>` followed by `body` and `</name>`, or `<name attrs/>`
    /// when `has_body` is false.
    fn element<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        name: &str,
        attrs: &Attributes,
        has_body: bool,
        body: impl FnOnce(&mut XmlWriter<W>) -> SerResult<()>,
    ) -> SerResult<()> {
        if !has_body {
            return xml.empty(name, &attrs.as_attrs());
        }
        xml.start(name, &attrs.as_attrs())?;
        body(xml)?;
        xml.end(name)
    }

    pub(crate) fn write<W: Write>(&self, xml: &mut XmlWriter<W>) -> SerResult<()> {
        xml.declaration()?;
        xml.start(EDMX, &[("xmlns:edmx", NS_EDMX), ("Version", CSDL_VERSION)])?;
        for reference in &self.metadata.references {
            let attrs = Attributes::default().with("Uri", reference.uri.as_str());
            let has_body = !reference.includes.is_empty()
                || !reference.include_annotations.is_empty()
                || !reference.annotations.is_empty();
            self.element(xml, EDMX_REFERENCE, &attrs, has_body, |xml| {
                for include in &reference.includes {
                    let attrs = Attributes::default()
                        .with("Namespace", include.namespace.as_str())
                        .opt("Alias", include.alias.as_deref());
                    xml.empty(EDMX_INCLUDE, &attrs.as_attrs())?;
                }
                for include in &reference.include_annotations {
                    let attrs = Attributes::default()
                        .with("TermNamespace", include.term_namespace.as_str())
                        .opt("Qualifier", include.qualifier.as_deref())
                        .opt("TargetNamespace", include.target_namespace.as_deref());
                    xml.empty(EDMX_INCLUDE_ANNOTATIONS, &attrs.as_attrs())?;
                }
                self.write_annotations(xml, &reference.annotations)
            })?;
        }
        xml.start(EDMX_DATA_SERVICES, &[])?;
        for schema in self.edm().schemas() {
            self.write_schema(xml, schema)?;
        }
        xml.end(EDMX_DATA_SERVICES)?;
        xml.end(EDMX)
    }

    // ===== Schema =====

    fn write_schema<W: Write>(&self, xml: &mut XmlWriter<W>, schema: &Schema) -> SerResult<()> {
        log::debug!("[csdl] writing schema {} as XML", schema.namespace);
        let attrs = Attributes::default()
            .with("xmlns", NS_EDM)
            .with("Namespace", schema.namespace.as_str())
            .opt("Alias", schema.alias.as_deref());
        xml.start("Schema", &attrs.as_attrs())?;
        for enum_type in &schema.enum_types {
            self.write_enum_type(xml, enum_type)?;
        }
        for definition in &schema.type_definitions {
            self.write_type_definition(xml, definition)?;
        }
        for ty in &schema.entity_types {
            self.write_structured_type(xml, ty)?;
        }
        for ty in &schema.complex_types {
            self.write_structured_type(xml, ty)?;
        }
        for operation in schema.actions.iter().chain(&schema.functions) {
            self.write_operation(xml, operation)?;
        }
        for term in &schema.terms {
            self.write_term(xml, term)?;
        }
        if let Some(container) = &schema.entity_container {
            self.write_container(xml, container)?;
        }
        for group in &schema.annotation_groups {
            self.write_annotation_group(xml, group)?;
        }
        self.write_annotations(xml, &schema.annotations)?;
        xml.end("Schema")
    }

    fn write_enum_type<W: Write>(&self, xml: &mut XmlWriter<W>, enum_type: &EnumType) -> SerResult<()> {
        let mut attrs = Attributes::default().with("Name", enum_type.name.name.as_str());
        if enum_type.underlying != EdmPrimitiveKind::Int32 {
            attrs = attrs.with("UnderlyingType", enum_type.underlying.qualified_name());
        }
        let attrs = attrs.flag("IsFlags", enum_type.is_flags);
        xml.start("EnumType", &attrs.as_attrs())?;
        for member in &enum_type.members {
            let attrs = Attributes::default()
                .with("Name", member.name.as_str())
                .with("Value", member.value.to_string());
            self.element(xml, "Member", &attrs, !member.annotations.is_empty(), |xml| {
                self.write_annotations(xml, &member.annotations)
            })?;
        }
        self.write_annotations(xml, &enum_type.annotations)?;
        xml.end("EnumType")
    }

    fn write_type_definition<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        definition: &TypeDefinition,
    ) -> SerResult<()> {
        let attrs = Attributes::default()
            .with("Name", definition.name.name.as_str())
            .with("UnderlyingType", definition.underlying.qualified_name())
            .facets(&definition.facets);
        self.element(xml, "TypeDefinition", &attrs, !definition.annotations.is_empty(), |xml| {
            self.write_annotations(xml, &definition.annotations)
        })
    }

    fn write_structured_type<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        ty: &StructuredType,
    ) -> SerResult<()> {
        let tag = match ty.kind {
            StructuredKind::Entity => "EntityType",
            StructuredKind::Complex => "ComplexType",
        };
        let base = ty.base_type.as_ref().map(|b| self.names.name(b));
        let attrs = Attributes::default()
            .with("Name", ty.name.name.as_str())
            .opt("BaseType", base.as_deref())
            .flag("Abstract", ty.is_abstract)
            .flag("OpenType", ty.is_open)
            .flag("HasStream", ty.has_stream);
        xml.start(tag, &attrs.as_attrs())?;
        if writes_key(self.edm(), ty) {
            xml.start("Key", &[])?;
            for key in &ty.key {
                let attrs = Attributes::default()
                    .with("Name", key.name.as_str())
                    .opt("Alias", key.alias.as_deref());
                xml.empty("PropertyRef", &attrs.as_attrs())?;
            }
            xml.end("Key")?;
        }
        for property in &ty.properties {
            self.write_property(xml, property)?;
        }
        for navigation in &ty.navigation_properties {
            self.write_navigation_property(xml, navigation)?;
        }
        self.write_annotations(xml, &ty.annotations)?;
        xml.end(tag)
    }

    fn write_property<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        property: &StructuralProperty,
    ) -> SerResult<()> {
        let attrs = Attributes::default()
            .with("Name", property.name.as_str())
            .with("Type", self.names.type_ref(&property.type_name, property.collection))
            .nullable(property.nullable)
            .facets(&property.facets)
            .opt("DefaultValue", property.default_value.as_deref());
        self.element(xml, "Property", &attrs, !property.annotations.is_empty(), |xml| {
            self.write_annotations(xml, &property.annotations)
        })
    }

    fn write_navigation_property<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        navigation: &NavigationProperty,
    ) -> SerResult<()> {
        let mut attrs = Attributes::default()
            .with("Name", navigation.name.as_str())
            .with("Type", self.names.type_ref(&navigation.type_name, navigation.collection));
        if !navigation.collection {
            attrs = attrs.nullable(navigation.nullable);
        }
        let attrs = attrs
            .opt("Partner", navigation.partner.as_deref())
            .flag("ContainsTarget", navigation.contains_target);
        let has_body = !navigation.referential_constraints.is_empty()
            || navigation.on_delete.is_some()
            || !navigation.annotations.is_empty();
        self.element(xml, "NavigationProperty", &attrs, has_body, |xml| {
            for constraint in &navigation.referential_constraints {
                let attrs = Attributes::default()
                    .with("Property", constraint.property.as_str())
                    .with("ReferencedProperty", constraint.referenced_property.as_str());
                self.element(
                    xml,
                    "ReferentialConstraint",
                    &attrs,
                    !constraint.annotations.is_empty(),
                    |xml| self.write_annotations(xml, &constraint.annotations),
                )?;
            }
            if let Some(action) = navigation.on_delete {
                xml.empty("OnDelete", &[("Action", action.as_str())])?;
            }
            self.write_annotations(xml, &navigation.annotations)
        })
    }

    // ===== Operations and terms =====

    fn write_operation<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        operation: &EdmOperation,
    ) -> SerResult<()> {
        let attrs = Attributes::default()
            .with("Name", operation.name.name.as_str())
            .flag("IsBound", operation.is_bound)
            .flag("IsComposable", operation.is_composable)
            .opt("EntitySetPath", operation.entity_set_path.as_deref());
        let has_body = !operation.parameters.is_empty()
            || operation.return_type.is_some()
            || !operation.annotations.is_empty();
        self.element(xml, operation.kind.as_str(), &attrs, has_body, |xml| {
            for parameter in &operation.parameters {
                let attrs = Attributes::default()
                    .with("Name", parameter.name.as_str())
                    .with("Type", self.names.type_ref(&parameter.type_name, parameter.collection))
                    .nullable(parameter.nullable)
                    .facets(&parameter.facets);
                self.element(xml, "Parameter", &attrs, !parameter.annotations.is_empty(), |xml| {
                    self.write_annotations(xml, &parameter.annotations)
                })?;
            }
            if let Some(returns) = &operation.return_type {
                let attrs = Attributes::default()
                    .with("Type", self.names.type_ref(&returns.type_name, returns.collection))
                    .nullable(returns.nullable)
                    .facets(&returns.facets);
                xml.empty("ReturnType", &attrs.as_attrs())?;
            }
            self.write_annotations(xml, &operation.annotations)
        })
    }

    fn write_term<W: Write>(&self, xml: &mut XmlWriter<W>, term: &Term) -> SerResult<()> {
        let base = term.base_term.as_ref().map(|b| self.names.name(b));
        let applies_to = (!term.applies_to.is_empty()).then(|| term.applies_to.join(" "));
        let attrs = Attributes::default()
            .with("Name", term.name.name.as_str())
            .with("Type", self.names.type_ref(&term.type_name, term.collection))
            .opt("BaseTerm", base.as_deref())
            .opt("AppliesTo", applies_to.as_deref())
            .opt("DefaultValue", term.default_value.as_deref())
            .nullable(term.nullable)
            .facets(&term.facets);
        self.element(xml, "Term", &attrs, !term.annotations.is_empty(), |xml| {
            self.write_annotations(xml, &term.annotations)
        })
    }

    // ===== Entity container =====

    fn write_container<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        container: &EntityContainer,
    ) -> SerResult<()> {
        let extends = container.extends.as_ref().map(|e| self.names.name(e));
        let attrs = Attributes::default()
            .with("Name", container.name.name.as_str())
            .opt("Extends", extends.as_deref());
        xml.start("EntityContainer", &attrs.as_attrs())?;
        for set in &container.entity_sets {
            let mut attrs = Attributes::default()
                .with("Name", set.name.as_str())
                .with("EntityType", self.names.name(&set.entity_type));
            if !set.include_in_service_document {
                attrs = attrs.with("IncludeInServiceDocument", "false");
            }
            let has_body = !set.bindings.is_empty() || !set.annotations.is_empty();
            self.element(xml, "EntitySet", &attrs, has_body, |xml| {
                write_bindings(xml, &set.bindings)?;
                self.write_annotations(xml, &set.annotations)
            })?;
        }
        for singleton in &container.singletons {
            let attrs = Attributes::default()
                .with("Name", singleton.name.as_str())
                .with("Type", self.names.name(&singleton.entity_type));
            let has_body = !singleton.bindings.is_empty() || !singleton.annotations.is_empty();
            self.element(xml, "Singleton", &attrs, has_body, |xml| {
                write_bindings(xml, &singleton.bindings)?;
                self.write_annotations(xml, &singleton.annotations)
            })?;
        }
        for import in &container.action_imports {
            let attrs = Attributes::default()
                .with("Name", import.name.as_str())
                .with("Action", self.names.name(&import.action))
                .opt("EntitySet", import.entity_set.as_deref());
            self.element(xml, "ActionImport", &attrs, !import.annotations.is_empty(), |xml| {
                self.write_annotations(xml, &import.annotations)
            })?;
        }
        for import in &container.function_imports {
            let attrs = Attributes::default()
                .with("Name", import.name.as_str())
                .with("Function", self.names.name(&import.function))
                .opt("EntitySet", import.entity_set.as_deref())
                .flag("IncludeInServiceDocument", import.include_in_service_document);
            self.element(xml, "FunctionImport", &attrs, !import.annotations.is_empty(), |xml| {
                self.write_annotations(xml, &import.annotations)
            })?;
        }
        self.write_annotations(xml, &container.annotations)?;
        xml.end("EntityContainer")
    }

    // ===== Annotations =====

    fn write_annotation_group<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        group: &AnnotationGroup,
    ) -> SerResult<()> {
        let attrs = Attributes::default()
            .with("Target", group.target.as_str())
            .opt("Qualifier", group.qualifier.as_deref());
        xml.start("Annotations", &attrs.as_attrs())?;
        self.write_annotations(xml, &group.annotations)?;
        xml.end("Annotations")
    }

    fn write_annotations<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        annotations: &[Annotation],
    ) -> SerResult<()> {
        for annotation in annotations {
            self.write_annotation(xml, annotation)?;
        }
        Ok(())
    }

    fn write_annotation<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        annotation: &Annotation,
    ) -> SerResult<()> {
        let attrs = Attributes::default()
            .with("Term", self.names.name(&annotation.term))
            .opt("Qualifier", annotation.qualifier.as_deref());
        let has_body = annotation.expression.is_some() || !annotation.annotations.is_empty();
        self.element(xml, ANNOTATION, &attrs, has_body, |xml| {
            self.write_annotations(xml, &annotation.annotations)?;
            match &annotation.expression {
                Some(expression) => self.write_expression(xml, expression),
                None => Ok(()),
            }
        })
    }

    fn write_expression<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        expression: &Expression,
    ) -> SerResult<()> {
        match expression {
            Expression::Constant(constant) => {
                let text = constant_text(constant, &self.names, true)?;
                xml.text_element(constant.name(), &[], &text)
            }
            Expression::Dynamic(dynamic) => self.write_dynamic(xml, dynamic),
        }
    }

    fn write_dynamic<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        dynamic: &DynamicExpression,
    ) -> SerResult<()> {
        let tag = dynamic.kind.name();
        let mut attrs = Attributes::default();
        match &dynamic.kind {
            DynamicKind::Apply { function, .. } => {
                attrs = attrs.with("Function", self.names.name(function));
            }
            DynamicKind::Cast { type_ref, .. } | DynamicKind::IsOf { type_ref, .. } => {
                attrs = attrs
                    .with("Type", self.names.type_ref(&type_ref.type_name, type_ref.collection))
                    .facets(&type_ref.facets);
            }
            DynamicKind::LabeledElement { name, .. } => attrs = attrs.with("Name", name.as_str()),
            DynamicKind::Record {
                type_name: Some(type_name),
                ..
            } => attrs = attrs.with("Type", self.names.name(type_name)),
            _ => {}
        }

        let text = match &dynamic.kind {
            DynamicKind::LabeledElementReference(name) => Some(self.names.name(name)),
            DynamicKind::AnnotationPath(path)
            | DynamicKind::NavigationPropertyPath(path)
            | DynamicKind::Path(path)
            | DynamicKind::PropertyPath(path) => Some(path.clone()),
            _ => None,
        };
        if let Some(text) = text {
            if dynamic.annotations.is_empty() {
                return xml.text_element(tag, &attrs.as_attrs(), &text);
            }
        }

        let has_body = !dynamic.annotations.is_empty()
            || !matches!(dynamic.kind, DynamicKind::Null | DynamicKind::Record { .. })
            || matches!(&dynamic.kind, DynamicKind::Record { properties, .. } if !properties.is_empty());
        self.element(xml, tag, &attrs, has_body, |xml| {
            self.write_annotations(xml, &dynamic.annotations)?;
            self.write_operands(xml, &dynamic.kind)
        })
    }

    fn write_operands<W: Write>(&self, xml: &mut XmlWriter<W>, kind: &DynamicKind) -> SerResult<()> {
        match kind {
            DynamicKind::And(l, r) | DynamicKind::Or(l, r) | DynamicKind::Comparison(_, l, r) => {
                self.write_expression(xml, l)?;
                self.write_expression(xml, r)
            }
            DynamicKind::Not(operand) | DynamicKind::UrlRef(operand) => {
                self.write_expression(xml, operand)
            }
            DynamicKind::Apply { parameters, .. } | DynamicKind::Collection(parameters) => {
                for parameter in parameters {
                    self.write_expression(xml, parameter)?;
                }
                Ok(())
            }
            DynamicKind::Cast { value, .. }
            | DynamicKind::IsOf { value, .. }
            | DynamicKind::LabeledElement { value, .. } => self.write_expression(xml, value),
            DynamicKind::If {
                guard,
                then,
                otherwise,
            } => {
                self.write_expression(xml, guard)?;
                self.write_expression(xml, then)?;
                match otherwise {
                    Some(otherwise) => self.write_expression(xml, otherwise),
                    None => Ok(()),
                }
            }
            DynamicKind::Record { properties, .. } => {
                for member in properties {
                    xml.start("PropertyValue", &[("Property", member.property.as_str())])?;
                    self.write_annotations(xml, &member.annotations)?;
                    self.write_expression(xml, &member.value)?;
                    xml.end("PropertyValue")?;
                }
                Ok(())
            }
            // text content, written by the caller
            DynamicKind::LabeledElementReference(name) => xml.text(&self.names.name(name)),
            DynamicKind::AnnotationPath(path)
            | DynamicKind::NavigationPropertyPath(path)
            | DynamicKind::Path(path)
            | DynamicKind::PropertyPath(path) => xml.text(path),
            DynamicKind::Null => Ok(()),
        }
    }
}

fn write_bindings<W: Write>(
    xml: &mut XmlWriter<W>,
    bindings: &[NavigationPropertyBinding],
) -> SerResult<()> {
    for binding in bindings {
        xml.empty(
            "NavigationPropertyBinding",
            &[("Path", binding.path.as_str()), ("Target", binding.target.as_str())],
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{
        ComparisonOp, Edm, EntitySet, SchemaBuilder, StructuredTypeBuilder,
    };
    use std::sync::Arc;

    fn render(schema: Schema) -> String {
        let md = ServiceMetadata::new(Arc::new(Edm::new(vec![schema])));
        let mut xml = XmlWriter::new(Vec::new());
        CsdlXmlWriter::new(&md).write(&mut xml).unwrap();
        String::from_utf8(xml.into_inner()).unwrap()
    }

    #[test]
    fn test_schema_elements() {
        let out = render(
            SchemaBuilder::new("ns")
                .alias("n")
                .structured_type(
                    StructuredTypeBuilder::entity("ns.ETTwoPrim")
                        .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
                        .primitive("PropertyString", EdmPrimitiveKind::String)
                        .build(),
                )
                .container(
                    EntityContainer::new("ns.Container")
                        .entity_set(EntitySet::new("ESTwoPrim", "ns.ETTwoPrim")),
                )
                .build(),
        );
        let doc = roxmltree::Document::parse(&out).unwrap();
        let root = doc.root_element();
        assert_eq!(root.tag_name().namespace(), Some(NS_EDMX));
        assert_eq!(root.attribute("Version"), Some("4.0"));
        let schema = root.descendants().find(|n| n.has_tag_name((NS_EDM, "Schema"))).unwrap();
        assert_eq!(schema.attribute("Alias"), Some("n"));
        let key = schema
            .descendants()
            .find(|n| n.has_tag_name((NS_EDM, "PropertyRef")))
            .unwrap();
        assert_eq!(key.attribute("Name"), Some("PropertyInt16"));
        let key_prop = schema
            .descendants()
            .find(|n| n.has_tag_name((NS_EDM, "Property")) && n.attribute("Name") == Some("PropertyInt16"))
            .unwrap();
        assert_eq!(key_prop.attribute("Nullable"), Some("false"));
        let set = schema
            .descendants()
            .find(|n| n.has_tag_name((NS_EDM, "EntitySet")))
            .unwrap();
        assert_eq!(set.attribute("EntityType"), Some("n.ETTwoPrim"));
    }

    #[test]
    fn test_expression_elements() {
        let annotation = Annotation::new("ns.Check").value(Expression::compare(
            ComparisonOp::Gt,
            Expression::path("PropertyInt16"),
            Expression::int(5),
        ));
        let out = render(SchemaBuilder::new("ns").annotate(annotation).build());
        assert!(
            out.contains(r#"<Annotation Term="ns.Check"><Gt><Path>PropertyInt16</Path><Int>5</Int></Gt></Annotation>"#),
            "{}",
            out
        );
    }
}
