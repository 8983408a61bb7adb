// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CSDL JSON metadata document.
//!
//! Members of each schema are written in a fixed order: enum types, type
//! definitions, entity types, complex types, actions, functions, terms, the
//! entity container, `$Annotations` groups, then the schema's own
//! annotations. Overloaded actions and functions share one member holding
//! an array of overloads.

use super::writer::JsonWriter;
use crate::config::CSDL_VERSION;
use crate::data::ServiceMetadata;
use crate::edm::{
    Annotation, AnnotationGroup, ConstantExpression, DynamicExpression, DynamicKind,
    EdmOperation, EdmPrimitiveKind, EdmProvider, EntityContainer, EnumType, Expression,
    FullQualifiedName, MaxLength, NavigationProperty, NavigationPropertyBinding, Scale, Schema,
    StructuralProperty, StructuredKind, StructuredType, Term, TypeDefinition, TypeFacets,
    TypeReference,
};
use crate::error::SerResult;
use crate::ser::csdl::{constant_text, writes_key, CsdlNames};
use std::io::Write;

const KIND: &str = "$Kind";
const TYPE: &str = "$Type";
const COLLECTION: &str = "$Collection";
const NULLABLE: &str = "$Nullable";

/// Writes one CSDL JSON document; holds the per-call alias map.
pub(crate) struct CsdlJsonWriter<'a> {
    metadata: &'a ServiceMetadata,
    names: CsdlNames,
}

impl<'a> CsdlJsonWriter<'a> {
    pub(crate) fn new(metadata: &'a ServiceMetadata) -> Self {
        Self {
            metadata,
            names: CsdlNames::new(metadata),
        }
    }

    fn edm(&self) -> &'a dyn EdmProvider {
        self.metadata.edm.as_ref()
    }

    pub(crate) fn write<W: Write>(&self, json: &mut JsonWriter<W>) -> SerResult<()> {
        json.begin_object()?;
        json.string_field("$Version", CSDL_VERSION)?;
        if let Some(container) = self.edm().entity_container() {
            json.string_field("$EntityContainer", &container.name.to_string())?;
        }
        self.write_references(json)?;
        for schema in self.edm().schemas() {
            self.write_schema(json, schema)?;
        }
        json.end_object()?;
        Ok(())
    }

    // ===== References =====

    fn write_references<W: Write>(&self, json: &mut JsonWriter<W>) -> SerResult<()> {
        if self.metadata.references.is_empty() {
            return Ok(());
        }
        json.name("$Reference")?;
        json.begin_object()?;
        for reference in &self.metadata.references {
            json.name(&reference.uri)?;
            json.begin_object()?;
            if !reference.includes.is_empty() {
                json.name("$Include")?;
                json.begin_array()?;
                for include in &reference.includes {
                    json.begin_object()?;
                    json.string_field("$Namespace", &include.namespace)?;
                    json.opt_string_field("$Alias", include.alias.as_deref())?;
                    json.end_object()?;
                }
                json.end_array()?;
            }
            if !reference.include_annotations.is_empty() {
                json.name("$IncludeAnnotations")?;
                json.begin_array()?;
                for include in &reference.include_annotations {
                    json.begin_object()?;
                    json.string_field("$TermNamespace", &include.term_namespace)?;
                    json.opt_string_field("$Qualifier", include.qualifier.as_deref())?;
                    json.opt_string_field("$TargetNamespace", include.target_namespace.as_deref())?;
                    json.end_object()?;
                }
                json.end_array()?;
            }
            self.write_annotations(json, "", &reference.annotations)?;
            json.end_object()?;
        }
        json.end_object()?;
        Ok(())
    }

    // ===== Schema =====

    fn write_schema<W: Write>(&self, json: &mut JsonWriter<W>, schema: &Schema) -> SerResult<()> {
        log::debug!("[csdl] writing schema {}", schema.namespace);
        json.name(&schema.namespace)?;
        json.begin_object()?;
        json.opt_string_field("$Alias", schema.alias.as_deref())?;
        for enum_type in &schema.enum_types {
            self.write_enum_type(json, enum_type)?;
        }
        for definition in &schema.type_definitions {
            self.write_type_definition(json, definition)?;
        }
        for ty in &schema.entity_types {
            self.write_structured_type(json, ty)?;
        }
        for ty in &schema.complex_types {
            self.write_structured_type(json, ty)?;
        }
        self.write_operations(json, &schema.actions)?;
        self.write_operations(json, &schema.functions)?;
        for term in &schema.terms {
            self.write_term(json, term)?;
        }
        if let Some(container) = &schema.entity_container {
            self.write_container(json, container)?;
        }
        self.write_annotation_groups(json, &schema.annotation_groups)?;
        self.write_annotations(json, "", &schema.annotations)?;
        json.end_object()?;
        Ok(())
    }

    fn write_enum_type<W: Write>(&self, json: &mut JsonWriter<W>, enum_type: &EnumType) -> SerResult<()> {
        json.name(&enum_type.name.name)?;
        json.begin_object()?;
        json.string_field(KIND, "EnumType")?;
        if enum_type.underlying != EdmPrimitiveKind::Int32 {
            json.string_field("$UnderlyingType", &enum_type.underlying.qualified_name())?;
        }
        if enum_type.is_flags {
            json.name("$IsFlags")?;
            json.bool(true)?;
        }
        for member in &enum_type.members {
            json.name(&member.name)?;
            json.number(&member.value.to_string())?;
            self.write_annotations(json, &member.name, &member.annotations)?;
        }
        self.write_annotations(json, "", &enum_type.annotations)?;
        json.end_object()?;
        Ok(())
    }

    fn write_type_definition<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        definition: &TypeDefinition,
    ) -> SerResult<()> {
        json.name(&definition.name.name)?;
        json.begin_object()?;
        json.string_field(KIND, "TypeDefinition")?;
        json.string_field("$UnderlyingType", &definition.underlying.qualified_name())?;
        write_facets(json, &definition.facets)?;
        self.write_annotations(json, "", &definition.annotations)?;
        json.end_object()?;
        Ok(())
    }

    /// Only members declared on `ty` itself; inherited ones stay with the base.
    fn write_structured_type<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        ty: &StructuredType,
    ) -> SerResult<()> {
        json.name(&ty.name.name)?;
        json.begin_object()?;
        let kind = match ty.kind {
            StructuredKind::Entity => "EntityType",
            StructuredKind::Complex => "ComplexType",
        };
        json.string_field(KIND, kind)?;
        if let Some(base) = &ty.base_type {
            json.string_field("$BaseType", &self.names.name(base))?;
        }
        write_flag(json, "$Abstract", ty.is_abstract)?;
        write_flag(json, "$OpenType", ty.is_open)?;
        write_flag(json, "$HasStream", ty.has_stream)?;
        if writes_key(self.edm(), ty) {
            json.name("$Key")?;
            json.begin_array()?;
            for key in &ty.key {
                match &key.alias {
                    Some(alias) => {
                        json.begin_object()?;
                        json.string_field(alias, &key.name)?;
                        json.end_object()?;
                    }
                    None => json.string(&key.name)?,
                }
            }
            json.end_array()?;
        }
        for property in &ty.properties {
            self.write_property(json, property)?;
        }
        for navigation in &ty.navigation_properties {
            self.write_navigation_property(json, navigation)?;
        }
        self.write_annotations(json, "", &ty.annotations)?;
        json.end_object()?;
        Ok(())
    }

    fn write_type<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        type_name: &FullQualifiedName,
        collection: bool,
    ) -> SerResult<()> {
        json.string_field(TYPE, &self.names.name(type_name))?;
        write_flag(json, COLLECTION, collection)?;
        Ok(())
    }

    fn write_property<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        property: &StructuralProperty,
    ) -> SerResult<()> {
        json.name(&property.name)?;
        json.begin_object()?;
        self.write_type(json, &property.type_name, property.collection)?;
        write_flag(json, NULLABLE, property.nullable)?;
        write_facets(json, &property.facets)?;
        json.opt_string_field("$DefaultValue", property.default_value.as_deref())?;
        self.write_annotations(json, "", &property.annotations)?;
        json.end_object()?;
        Ok(())
    }

    fn write_navigation_property<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        navigation: &NavigationProperty,
    ) -> SerResult<()> {
        json.name(&navigation.name)?;
        json.begin_object()?;
        json.string_field(KIND, "NavigationProperty")?;
        self.write_type(json, &navigation.type_name, navigation.collection)?;
        if !navigation.collection {
            write_flag(json, NULLABLE, navigation.nullable)?;
        }
        json.opt_string_field("$Partner", navigation.partner.as_deref())?;
        write_flag(json, "$ContainsTarget", navigation.contains_target)?;
        if !navigation.referential_constraints.is_empty() {
            json.name("$ReferentialConstraint")?;
            json.begin_object()?;
            for constraint in &navigation.referential_constraints {
                json.string_field(&constraint.property, &constraint.referenced_property)?;
                self.write_annotations(json, &constraint.property, &constraint.annotations)?;
            }
            json.end_object()?;
        }
        if let Some(action) = navigation.on_delete {
            json.name("$OnDelete")?;
            json.string(action.as_str())?;
        }
        self.write_annotations(json, "", &navigation.annotations)?;
        json.end_object()?;
        Ok(())
    }

    // ===== Operations and terms =====

    /// One member per operation name, each an array of overloads.
    fn write_operations<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        operations: &[EdmOperation],
    ) -> SerResult<()> {
        let mut groups: Vec<(&str, Vec<&EdmOperation>)> = Vec::new();
        for operation in operations {
            match groups.iter_mut().find(|(name, _)| *name == operation.name.name) {
                Some((_, overloads)) => overloads.push(operation),
                None => groups.push((operation.name.name.as_str(), vec![operation])),
            }
        }
        for (name, overloads) in groups {
            json.name(name)?;
            json.begin_array()?;
            for operation in overloads {
                self.write_operation(json, operation)?;
            }
            json.end_array()?;
        }
        Ok(())
    }

    fn write_operation<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        operation: &EdmOperation,
    ) -> SerResult<()> {
        json.begin_object()?;
        json.string_field(KIND, operation.kind.as_str())?;
        write_flag(json, "$IsBound", operation.is_bound)?;
        write_flag(json, "$IsComposable", operation.is_composable)?;
        json.opt_string_field("$EntitySetPath", operation.entity_set_path.as_deref())?;
        if !operation.parameters.is_empty() {
            json.name("$Parameter")?;
            json.begin_array()?;
            for parameter in &operation.parameters {
                json.begin_object()?;
                json.string_field("$Name", &parameter.name)?;
                self.write_type(json, &parameter.type_name, parameter.collection)?;
                write_flag(json, NULLABLE, parameter.nullable)?;
                write_facets(json, &parameter.facets)?;
                self.write_annotations(json, "", &parameter.annotations)?;
                json.end_object()?;
            }
            json.end_array()?;
        }
        if let Some(returns) = &operation.return_type {
            json.name("$ReturnType")?;
            json.begin_object()?;
            self.write_type(json, &returns.type_name, returns.collection)?;
            write_flag(json, NULLABLE, returns.nullable)?;
            write_facets(json, &returns.facets)?;
            json.end_object()?;
        }
        self.write_annotations(json, "", &operation.annotations)?;
        json.end_object()?;
        Ok(())
    }

    fn write_term<W: Write>(&self, json: &mut JsonWriter<W>, term: &Term) -> SerResult<()> {
        json.name(&term.name.name)?;
        json.begin_object()?;
        json.string_field(KIND, "Term")?;
        self.write_type(json, &term.type_name, term.collection)?;
        write_flag(json, NULLABLE, term.nullable)?;
        write_facets(json, &term.facets)?;
        if let Some(base) = &term.base_term {
            json.string_field("$BaseTerm", &self.names.name(base))?;
        }
        if !term.applies_to.is_empty() {
            json.name("$AppliesTo")?;
            json.begin_array()?;
            for target in &term.applies_to {
                json.string(target)?;
            }
            json.end_array()?;
        }
        json.opt_string_field("$DefaultValue", term.default_value.as_deref())?;
        self.write_annotations(json, "", &term.annotations)?;
        json.end_object()?;
        Ok(())
    }

    // ===== Entity container =====

    fn write_container<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        container: &EntityContainer,
    ) -> SerResult<()> {
        json.name(&container.name.name)?;
        json.begin_object()?;
        json.string_field(KIND, "EntityContainer")?;
        if let Some(extends) = &container.extends {
            json.string_field("$Extends", &self.names.name(extends))?;
        }
        for set in &container.entity_sets {
            json.name(&set.name)?;
            json.begin_object()?;
            json.name(COLLECTION)?;
            json.bool(true)?;
            json.string_field(TYPE, &self.names.name(&set.entity_type))?;
            if !set.include_in_service_document {
                json.name("$IncludeInServiceDocument")?;
                json.bool(false)?;
            }
            write_bindings(json, &set.bindings)?;
            self.write_annotations(json, "", &set.annotations)?;
            json.end_object()?;
        }
        for singleton in &container.singletons {
            json.name(&singleton.name)?;
            json.begin_object()?;
            json.string_field(TYPE, &self.names.name(&singleton.entity_type))?;
            write_bindings(json, &singleton.bindings)?;
            self.write_annotations(json, "", &singleton.annotations)?;
            json.end_object()?;
        }
        for import in &container.action_imports {
            json.name(&import.name)?;
            json.begin_object()?;
            json.string_field("$Action", &self.names.name(&import.action))?;
            json.opt_string_field("$EntitySet", import.entity_set.as_deref())?;
            self.write_annotations(json, "", &import.annotations)?;
            json.end_object()?;
        }
        for import in &container.function_imports {
            json.name(&import.name)?;
            json.begin_object()?;
            json.string_field("$Function", &self.names.name(&import.function))?;
            json.opt_string_field("$EntitySet", import.entity_set.as_deref())?;
            write_flag(json, "$IncludeInServiceDocument", import.include_in_service_document)?;
            self.write_annotations(json, "", &import.annotations)?;
            json.end_object()?;
        }
        self.write_annotations(json, "", &container.annotations)?;
        json.end_object()?;
        Ok(())
    }

    // ===== Annotations =====

    /// `$Annotations`, merging groups that share a target. A group's
    /// qualifier applies to members without their own.
    fn write_annotation_groups<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        groups: &[AnnotationGroup],
    ) -> SerResult<()> {
        if groups.is_empty() {
            return Ok(());
        }
        let mut targets: Vec<(&str, Vec<(Option<&str>, &Annotation)>)> = Vec::new();
        for group in groups {
            let members = group
                .annotations
                .iter()
                .map(|a| (a.qualifier.as_deref().or(group.qualifier.as_deref()), a));
            match targets.iter_mut().find(|(t, _)| *t == group.target) {
                Some((_, existing)) => existing.extend(members),
                None => targets.push((group.target.as_str(), members.collect())),
            }
        }
        json.name("$Annotations")?;
        json.begin_object()?;
        for (target, annotations) in targets {
            json.name(target)?;
            json.begin_object()?;
            for (qualifier, annotation) in annotations {
                self.write_annotation(json, "", qualifier, annotation)?;
            }
            json.end_object()?;
        }
        json.end_object()?;
        Ok(())
    }

    /// `<prefix>@term[#qualifier]` members.
    fn write_annotations<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        prefix: &str,
        annotations: &[Annotation],
    ) -> SerResult<()> {
        for annotation in annotations {
            self.write_annotation(json, prefix, annotation.qualifier.as_deref(), annotation)?;
        }
        Ok(())
    }

    fn write_annotation<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        prefix: &str,
        qualifier: Option<&str>,
        annotation: &Annotation,
    ) -> SerResult<()> {
        let key = format!("{}@{}", prefix, self.names.term(&annotation.term, qualifier));
        json.name(&key)?;
        match &annotation.expression {
            Some(expression) => self.write_expression(json, expression)?,
            // a bare annotation applies the term's default
            None => json.bool(true)?,
        }
        self.write_annotations(json, &key, &annotation.annotations)
    }

    fn write_expression<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        expression: &Expression,
    ) -> SerResult<()> {
        match expression {
            Expression::Constant(constant) => self.write_constant(json, constant),
            Expression::Dynamic(dynamic) => self.write_dynamic(json, dynamic),
        }
    }

    fn write_constant<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        constant: &ConstantExpression,
    ) -> SerResult<()> {
        let text = constant_text(constant, &self.names, false)?;
        match constant {
            ConstantExpression::Bool(v) => json.bool(*v)?,
            ConstantExpression::Int(_) | ConstantExpression::Decimal(_) => json.number(&text)?,
            ConstantExpression::Float(v) if v.is_finite() => json.number(&text)?,
            ConstantExpression::Float(_) | ConstantExpression::String(_) => json.string(&text)?,
            ConstantExpression::Binary(_)
            | ConstantExpression::Date(_)
            | ConstantExpression::DateTimeOffset(_)
            | ConstantExpression::Duration(_)
            | ConstantExpression::EnumMember { .. }
            | ConstantExpression::Guid(_)
            | ConstantExpression::TimeOfDay(_) => {
                json.begin_object()?;
                json.string_field(&format!("${}", constant.name()), &text)?;
                json.end_object()?;
            }
        }
        Ok(())
    }

    fn write_operands<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        name: &str,
        operands: &[&Expression],
    ) -> SerResult<()> {
        json.name(name)?;
        json.begin_array()?;
        for operand in operands {
            self.write_expression(json, operand)?;
        }
        json.end_array()?;
        Ok(())
    }

    fn write_type_reference<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        type_ref: &TypeReference,
    ) -> SerResult<()> {
        self.write_type(json, &type_ref.type_name, type_ref.collection)?;
        write_facets(json, &type_ref.facets)
    }

    fn write_dynamic<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        dynamic: &DynamicExpression,
    ) -> SerResult<()> {
        let tag = format!("${}", dynamic.kind.name());
        match &dynamic.kind {
            DynamicKind::Collection(items) => {
                json.begin_array()?;
                for item in items {
                    self.write_expression(json, item)?;
                }
                json.end_array()?;
                if !dynamic.annotations.is_empty() {
                    log::debug!("[csdl] annotations on a collection expression are not representable in JSON");
                }
                return Ok(());
            }
            DynamicKind::Null if dynamic.annotations.is_empty() => {
                json.null()?;
                return Ok(());
            }
            _ => {}
        }
        json.begin_object()?;
        match &dynamic.kind {
            DynamicKind::And(l, r) | DynamicKind::Or(l, r) | DynamicKind::Comparison(_, l, r) => {
                self.write_operands(json, &tag, &[l.as_ref(), r.as_ref()])?;
            }
            DynamicKind::Not(operand) | DynamicKind::UrlRef(operand) => {
                json.name(&tag)?;
                self.write_expression(json, operand)?;
            }
            DynamicKind::Apply {
                function,
                parameters,
            } => {
                let operands: Vec<&Expression> = parameters.iter().collect();
                self.write_operands(json, &tag, &operands)?;
                json.string_field("$Function", &self.names.name(function))?;
            }
            DynamicKind::Cast { type_ref, value } | DynamicKind::IsOf { type_ref, value } => {
                json.name(&tag)?;
                self.write_expression(json, value)?;
                self.write_type_reference(json, type_ref)?;
            }
            DynamicKind::If {
                guard,
                then,
                otherwise,
            } => {
                let mut operands: Vec<&Expression> = vec![guard.as_ref(), then.as_ref()];
                if let Some(otherwise) = otherwise {
                    operands.push(otherwise.as_ref());
                }
                self.write_operands(json, &tag, &operands)?;
            }
            DynamicKind::LabeledElement { name, value } => {
                json.name(&tag)?;
                self.write_expression(json, value)?;
                json.string_field("$Name", name)?;
            }
            DynamicKind::LabeledElementReference(name) => {
                json.string_field(&tag, &self.names.name(name))?;
            }
            DynamicKind::Null => {
                json.name(&tag)?;
                json.null()?;
            }
            DynamicKind::AnnotationPath(path)
            | DynamicKind::NavigationPropertyPath(path)
            | DynamicKind::Path(path)
            | DynamicKind::PropertyPath(path) => {
                json.string_field(&tag, path)?;
            }
            DynamicKind::Record {
                type_name,
                properties,
            } => {
                if let Some(type_name) = type_name {
                    json.string_field(TYPE, &self.names.name(type_name))?;
                }
                for member in properties {
                    json.name(&member.property)?;
                    self.write_expression(json, &member.value)?;
                    self.write_annotations(json, &member.property, &member.annotations)?;
                }
            }
            DynamicKind::Collection(_) => {}
        }
        self.write_annotations(json, "", &dynamic.annotations)?;
        json.end_object()?;
        Ok(())
    }
}

/// `name: true` when `value`; CSDL JSON defaults every flag to false.
fn write_flag<W: Write>(json: &mut JsonWriter<W>, name: &str, value: bool) -> SerResult<()> {
    if value {
        json.name(name)?;
        json.bool(true)?;
    }
    Ok(())
}

fn write_facets<W: Write>(json: &mut JsonWriter<W>, facets: &TypeFacets) -> SerResult<()> {
    match facets.max_length {
        Some(MaxLength::Max) => json.string_field("$MaxLength", "max")?,
        Some(MaxLength::Value(n)) => {
            json.name("$MaxLength")?;
            json.number(&n.to_string())?;
        }
        None => {}
    }
    if let Some(precision) = facets.precision {
        json.name("$Precision")?;
        json.number(&precision.to_string())?;
    }
    match facets.scale {
        Some(Scale::Value(n)) => {
            json.name("$Scale")?;
            json.number(&n.to_string())?;
        }
        Some(Scale::Variable) => json.string_field("$Scale", "variable")?,
        Some(Scale::Floating) => json.string_field("$Scale", "floating")?,
        None => {}
    }
    json.opt_string_field("$SRID", facets.srid.as_deref())?;
    if facets.unicode == Some(false) {
        json.name("$Unicode")?;
        json.bool(false)?;
    }
    Ok(())
}

fn write_bindings<W: Write>(
    json: &mut JsonWriter<W>,
    bindings: &[NavigationPropertyBinding],
) -> SerResult<()> {
    if bindings.is_empty() {
        return Ok(());
    }
    json.name("$NavigationPropertyBinding")?;
    json.begin_object()?;
    for binding in bindings {
        json.string_field(&binding.path, &binding.target)?;
    }
    json.end_object()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edm::{ComparisonOp, Edm, SchemaBuilder, StructuredTypeBuilder};
    use std::sync::Arc;

    fn render(schema: Schema) -> serde_json::Value {
        let md = ServiceMetadata::new(Arc::new(Edm::new(vec![schema])));
        let mut json = JsonWriter::new(Vec::new());
        CsdlJsonWriter::new(&md).write(&mut json).unwrap();
        serde_json::from_slice(&json.into_inner()).unwrap()
    }

    #[test]
    fn test_derived_type_lists_own_members() {
        let doc = render(
            SchemaBuilder::new("ns")
                .alias("n")
                .structured_type(
                    StructuredTypeBuilder::complex("ns.CTBase")
                        .primitive("PropertyInt16", EdmPrimitiveKind::Int16)
                        .build(),
                )
                .structured_type(
                    StructuredTypeBuilder::complex("ns.CTDerived")
                        .base("ns.CTBase")
                        .primitive("PropertyString", EdmPrimitiveKind::String)
                        .build(),
                )
                .build(),
        );
        let derived = &doc["ns"]["CTDerived"];
        assert_eq!(derived["$Kind"], "ComplexType");
        assert_eq!(derived["$BaseType"], "n.CTBase");
        assert_eq!(derived["PropertyString"]["$Type"], "Edm.String");
        assert!(derived.get("PropertyInt16").is_none());
        assert_eq!(doc["ns"]["$Alias"], "n");
        assert_eq!(doc["$Version"], "4.0");
    }

    #[test]
    fn test_expressions() {
        let annotation = Annotation::new("ns.Check").value(Expression::compare(
            ComparisonOp::Gt,
            Expression::path("PropertyInt16"),
            Expression::int(5),
        ));
        let record = Annotation::new("ns.Info").qualifier("Q").value(
            Expression::record(Some("ns.CTInfo".into()))
                .with_property("Name", Expression::string("x"))
                .with_property("Items", Expression::collection(vec![Expression::null()])),
        );
        let doc = render(SchemaBuilder::new("ns").annotate(annotation).annotate(record).build());
        assert_eq!(
            doc["ns"]["@ns.Check"],
            serde_json::json!({"$Gt": [{"$Path": "PropertyInt16"}, 5]})
        );
        assert_eq!(
            doc["ns"]["@ns.Info#Q"],
            serde_json::json!({"$Type": "ns.CTInfo", "Name": "x", "Items": [null]})
        );
    }
}
