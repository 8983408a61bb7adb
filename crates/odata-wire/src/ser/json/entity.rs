// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity, complex value and property emission.
//!
//! The body of every JSON document that carries structured data goes
//! through [`EntityWriter`]. Per entity the member order is:
//!
//! 1. document header (context, metadata etag) when top level
//! 2. control information: etag, type, id, read/edit links, media fields
//! 3. instance annotations
//! 4. structural properties, filtered by `$select`
//! 5. navigation properties: inlined when expanded, links at full metadata
//! 6. bound operation adverts at full metadata

use super::writer::JsonWriter;
use crate::config::{
    ContentType, ODATA_ASSOCIATION_LINK, ODATA_COUNT, ODATA_EDIT_LINK, ODATA_ETAG, ODATA_ID,
    ODATA_MEDIA_CONTENT_TYPE, ODATA_MEDIA_EDIT_LINK, ODATA_MEDIA_ETAG, ODATA_MEDIA_READ_LINK,
    ODATA_NAVIGATION_LINK, ODATA_READ_LINK, ODATA_TYPE, OPERATION_TARGET, OPERATION_TITLE,
};
use crate::data::{
    ComplexValue, Entity, EnumValue, InstanceAnnotation, Link, Operation, PrimitiveValue,
    Property, StreamValue, Value,
};
use crate::edm::{
    EdmPrimitiveKind, EdmProvider, EdmTypeRef, EnumType, FullQualifiedName, NavigationProperty,
    StructuralProperty, StructuredType, TypeFacets,
};
use crate::error::{SerResult, SerializerError};
use crate::ser::cycle::Ancestors;
use crate::ser::primitive::{encode, encode_enum, infer_kind};
use crate::ser::projection::{self, expansion, Expansion, Projection};
use crate::ser::resolve::{
    known_entity_id, nested_set, primitive_facets, property_type, resolve_derived, resolved_name,
    type_annotation,
};
use crate::ser::uri::resolve_entity_id;
use std::io::Write;

fn annotated(name: &str, suffix: &str) -> String {
    format!("{}{}", name, suffix)
}

/// Writes structured values for one content type.
pub(crate) struct EntityWriter<'a> {
    pub(crate) edm: &'a dyn EdmProvider,
    pub(crate) content_type: ContentType,
}

impl<'a> EntityWriter<'a> {
    pub(crate) fn new(edm: &'a dyn EdmProvider, content_type: ContentType) -> Self {
        Self { edm, content_type }
    }

    pub(crate) fn full(&self) -> bool {
        self.content_type.metadata_full()
    }

    pub(crate) fn none(&self) -> bool {
        self.content_type.metadata_none()
    }

    // ===== Control information =====

    /// `name: count`, quoted when IEEE754Compatible.
    pub(crate) fn write_count<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        name: &str,
        count: i64,
    ) -> SerResult<()> {
        json.name(name)?;
        let text = count.to_string();
        if self.content_type.ieee754_compatible {
            json.string(&text)?;
        } else {
            json.number(&text)?;
        }
        Ok(())
    }

    pub(crate) fn write_operations<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        operations: &[Operation],
    ) -> SerResult<()> {
        if !self.full() {
            return Ok(());
        }
        for operation in operations {
            json.name(&operation.metadata_anchor)?;
            json.begin_object()?;
            json.opt_string_field(OPERATION_TITLE, operation.title.as_deref())?;
            json.opt_string_field(OPERATION_TARGET, operation.target.as_deref())?;
            json.end_object()?;
        }
        Ok(())
    }

    /// `<prefix>@ns.term` members; `prefix` is empty for the instance itself.
    pub(crate) fn write_instance_annotations<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        prefix: &str,
        annotations: &[InstanceAnnotation],
    ) -> SerResult<()> {
        if self.none() {
            return Ok(());
        }
        for annotation in annotations {
            json.name(&format!("{}@{}", prefix, annotation.key()))?;
            self.write_annotation_value(json, annotation)?;
        }
        Ok(())
    }

    fn write_annotation_value<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        annotation: &InstanceAnnotation,
    ) -> SerResult<()> {
        let declared = annotation
            .type_name
            .as_deref()
            .and_then(EdmPrimitiveKind::from_qualified_name);
        let ieee754 = self.content_type.ieee754_compatible;
        let term = annotation.term.as_str();
        match &annotation.value {
            Value::Null => json.null()?,
            Value::Primitive(v) => {
                let kind = declared.unwrap_or_else(|| infer_kind(v));
                json.literal(&encode(kind, Some(v), &TypeFacets::default(), ieee754, term)?)?;
            }
            Value::PrimitiveCollection(items) => {
                json.begin_array()?;
                for item in items {
                    let kind = declared
                        .or_else(|| item.as_ref().map(infer_kind))
                        .unwrap_or(EdmPrimitiveKind::String);
                    json.literal(&encode(kind, item.as_ref(), &TypeFacets::default(), ieee754, term)?)?;
                }
                json.end_array()?;
            }
            Value::Enum(EnumValue::Names(names)) => json.string(names)?,
            Value::Enum(EnumValue::Number(n)) => json.number(&n.to_string())?,
            _ => return Err(SerializerError::UnsupportedPropertyType(term.to_string())),
        }
        Ok(())
    }

    /// Media control information; etag and content type from minimal
    /// metadata on, links at full metadata only.
    pub(crate) fn write_media<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        prefix: &str,
        stream: &StreamValue,
    ) -> SerResult<()> {
        if self.none() {
            return Ok(());
        }
        json.opt_string_field(&annotated(prefix, ODATA_MEDIA_ETAG), stream.media_etag.as_deref())?;
        json.opt_string_field(
            &annotated(prefix, ODATA_MEDIA_CONTENT_TYPE),
            stream.content_type.as_deref(),
        )?;
        if self.full() {
            json.opt_string_field(
                &annotated(prefix, ODATA_MEDIA_READ_LINK),
                stream.read_link.as_deref(),
            )?;
            json.opt_string_field(
                &annotated(prefix, ODATA_MEDIA_EDIT_LINK),
                stream.edit_link.as_deref(),
            )?;
        }
        Ok(())
    }

    /// Id if explicit or computable; `None` without an entity set.
    pub(crate) fn entity_id<'e>(
        &self,
        set: Option<&str>,
        ty: &StructuredType,
        entity: &'e Entity,
    ) -> SerResult<Option<&'e str>> {
        known_entity_id(self.edm, set, ty, entity)
    }

    // ===== Entities =====

    /// `{ header..., "@odata.id": id }`.
    pub(crate) fn write_reference<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        header: &[(&str, &str)],
        id: &str,
    ) -> SerResult<()> {
        json.begin_object()?;
        for (name, value) in header {
            json.string_field(name, value)?;
        }
        json.string_field(ODATA_ID, id)?;
        json.end_object()?;
        Ok(())
    }

    /// Write one entity.
    ///
    /// While an expansion is active every entity is entered into
    /// `ancestors` under its id; an entity already on the path is written
    /// as a reference only.
    pub(crate) fn write_entity<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        static_type: &StructuredType,
        entity: &Entity,
        set: Option<&str>,
        header: &[(&str, &str)],
        projection: Projection<'_>,
        only_reference: bool,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = resolve_derived(self.edm, static_type, entity.type_name.as_deref())?;
        if only_reference {
            let id = resolve_entity_id(self.edm, set, ty, entity)?;
            return self.write_reference(json, header, id);
        }
        let tracking = projection::has_expand(projection.expand) || !ancestors.is_empty();
        if !tracking {
            return self.write_entity_body(json, static_type, ty, entity, set, header, projection, ancestors);
        }
        let id = resolve_entity_id(self.edm, set, ty, entity)?;
        let mut scope = ancestors.enter(id);
        if scope.is_cycle() {
            log::debug!("[json] {} already on the expansion path, writing reference", id);
            return self.write_reference(json, header, id);
        }
        self.write_entity_body(json, static_type, ty, entity, set, header, projection, &mut scope)
    }

    fn write_entity_body<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        static_type: &StructuredType,
        ty: &StructuredType,
        entity: &Entity,
        set: Option<&str>,
        header: &[(&str, &str)],
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        json.begin_object()?;
        for (name, value) in header {
            json.string_field(name, value)?;
        }
        if !self.none() {
            json.opt_string_field(ODATA_ETAG, entity.etag.as_deref())?;
            if self.full() || ty.name != static_type.name {
                json.string_field(ODATA_TYPE, &type_annotation(&ty.name, false))?;
            }
            if self.full() {
                json.opt_string_field(ODATA_ID, self.entity_id(set, ty, entity)?)?;
                json.opt_string_field(ODATA_READ_LINK, entity.read_link.as_deref())?;
                json.opt_string_field(ODATA_EDIT_LINK, entity.edit_link.as_deref())?;
            }
            if ty.has_stream || entity.is_media_entity() {
                let media = StreamValue {
                    media_etag: entity.media_etag.clone(),
                    content_type: entity.media_content_type.clone(),
                    read_link: entity.media_read_link.clone(),
                    edit_link: entity.media_edit_link.clone(),
                };
                self.write_media(json, "", &media)?;
            }
            self.write_instance_annotations(json, "", &entity.annotations)?;
        }
        self.write_properties(json, ty, &entity.properties, set, projection, ancestors)?;
        self.write_navigation(
            json,
            ty,
            &entity.navigation_links,
            &entity.association_links,
            set,
            projection,
            ancestors,
        )?;
        self.write_operations(json, &entity.operations)?;
        json.end_object()?;
        Ok(())
    }

    // ===== Structural properties =====

    fn write_properties<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        ty: &StructuredType,
        properties: &[Property],
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let selection = projection::selected_properties(self.edm, ty, projection.select);
        let declared = self.edm.structural_properties(ty);
        for decl in &declared {
            if !selection.contains(&decl.name) {
                continue;
            }
            let property = properties.iter().find(|p| p.name == decl.name);
            let select = projection::reduced_select(projection.select, &decl.name);
            let expand = projection::reduced_expand(projection.expand, &decl.name);
            let inner = Projection {
                select: select.as_ref(),
                expand: expand.as_ref(),
                to_depth: projection.to_depth,
            };
            self.write_property(json, decl, property, set, inner, ancestors)?;
        }
        if ty.is_open && selection.is_all() {
            for dynamic in properties
                .iter()
                .filter(|p| !declared.iter().any(|d| d.name == p.name))
            {
                self.write_inferred_property(json, dynamic, ancestors)?;
            }
        }
        Ok(())
    }

    /// Declared property with its value; a missing value counts as null.
    pub(crate) fn write_property<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        decl: &StructuralProperty,
        property: Option<&Property>,
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let name = decl.name.as_str();
        let resolved = property_type(self.edm, decl)?;
        if matches!(resolved, EdmTypeRef::Primitive(EdmPrimitiveKind::Stream)) {
            if let Some(Property {
                value: Value::Stream(stream),
                ..
            }) = property
            {
                self.write_media(json, name, stream)?;
            }
            return Ok(());
        }
        if let Some(p) = property {
            self.write_instance_annotations(json, name, &p.annotations)?;
        }
        let Some(value) = property.map(|p| &p.value).filter(|v| !v.is_null()) else {
            if !decl.nullable {
                return Err(SerializerError::MissingProperty(name.to_string()));
            }
            json.name(name)?;
            if decl.collection {
                json.begin_array()?;
                json.end_array()?;
            } else {
                json.null()?;
            }
            return Ok(());
        };
        if decl.collection != value.is_collection() {
            return Err(SerializerError::InconsistentPropertyType(name.to_string()));
        }
        if self.full() {
            let needs_type = match resolved {
                EdmTypeRef::Primitive(kind) => decl.collection || !kind.is_json_guessable(),
                // a single complex value carries its type inside the object
                EdmTypeRef::Complex(_) => decl.collection,
                _ => true,
            };
            if needs_type {
                json.string_field(
                    &annotated(name, ODATA_TYPE),
                    &type_annotation(&resolved_name(resolved), decl.collection),
                )?;
            }
        }
        json.name(name)?;
        self.write_value(json, name, resolved, &decl.facets, value, set, projection, ancestors)
    }

    /// Value token(s) of a property whose declared type is `resolved`.
    pub(crate) fn write_value<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        name: &str,
        resolved: EdmTypeRef<'_>,
        facets: &TypeFacets,
        value: &Value,
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        if let Value::Geospatial(_) | Value::GeospatialCollection(_) = value {
            return Err(SerializerError::UnsupportedPropertyType(name.to_string()));
        }
        if let Some((kind, facets)) = primitive_facets(resolved, facets) {
            if kind.is_geospatial() {
                return Err(SerializerError::UnsupportedPropertyType(name.to_string()));
            }
            return match value {
                Value::Primitive(v) => self.write_primitive(json, kind, facets, Some(v), name),
                Value::PrimitiveCollection(items) => {
                    json.begin_array()?;
                    for item in items {
                        self.write_primitive(json, kind, facets, item.as_ref(), name)?;
                    }
                    json.end_array()?;
                    Ok(())
                }
                _ => Err(SerializerError::InconsistentPropertyType(name.to_string())),
            };
        }
        match (resolved, value) {
            (EdmTypeRef::Enum(e), Value::Enum(v)) => self.write_enum(json, e, Some(v), name),
            (EdmTypeRef::Enum(e), Value::Primitive(v)) => {
                let n = v
                    .as_i64()
                    .ok_or_else(|| SerializerError::wrong_value(name, v.raw_string()))?;
                self.write_enum(json, e, Some(&EnumValue::Number(n)), name)
            }
            (EdmTypeRef::Enum(e), Value::EnumCollection(items)) => {
                json.begin_array()?;
                for item in items {
                    self.write_enum(json, e, item.as_ref(), name)?;
                }
                json.end_array()?;
                Ok(())
            }
            (EdmTypeRef::Complex(ct), Value::Complex(cv)) => {
                self.write_complex(json, ct, cv, set, &[], &[], projection, ancestors)
            }
            (EdmTypeRef::Complex(ct), Value::ComplexCollection(items)) => {
                json.begin_array()?;
                for item in items {
                    match item {
                        Some(cv) => self.write_complex(json, ct, cv, set, &[], &[], projection, ancestors)?,
                        None => json.null()?,
                    }
                }
                json.end_array()?;
                Ok(())
            }
            _ => Err(SerializerError::InconsistentPropertyType(name.to_string())),
        }
    }

    fn write_primitive<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        kind: EdmPrimitiveKind,
        facets: &TypeFacets,
        value: Option<&PrimitiveValue>,
        name: &str,
    ) -> SerResult<()> {
        let literal = encode(kind, value, facets, self.content_type.ieee754_compatible, name)?;
        json.literal(&literal)?;
        Ok(())
    }

    fn write_enum<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        enum_type: &EnumType,
        value: Option<&EnumValue>,
        name: &str,
    ) -> SerResult<()> {
        match value {
            Some(v) => json.string(&encode_enum(enum_type, v, name)?)?,
            None => json.null()?,
        }
        Ok(())
    }

    /// Complex value as an object. `header` and `operations` are only
    /// non-empty for top-level documents.
    pub(crate) fn write_complex<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        static_type: &StructuredType,
        value: &ComplexValue,
        set: Option<&str>,
        header: &[(&str, &str)],
        operations: &[Operation],
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = resolve_derived(self.edm, static_type, value.type_name.as_deref())?;
        json.begin_object()?;
        for (name, v) in header {
            json.string_field(name, v)?;
        }
        if !self.none() {
            if self.full() || ty.name != static_type.name {
                json.string_field(ODATA_TYPE, &type_annotation(&ty.name, false))?;
            }
            self.write_instance_annotations(json, "", &value.annotations)?;
        }
        self.write_properties(json, ty, &value.properties, set, projection, ancestors)?;
        self.write_navigation(json, ty, &value.navigation_links, &[], set, projection, ancestors)?;
        self.write_operations(json, operations)?;
        json.end_object()?;
        Ok(())
    }

    // ===== Navigation =====

    fn write_navigation<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        ty: &StructuredType,
        links: &[Link],
        associations: &[Link],
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        for nav in self.edm.navigation_properties(ty) {
            let link = links.iter().find(|l| l.title == nav.name);
            if let Some(exp) = expansion(projection.expand, &nav.name, projection.to_depth) {
                self.write_expanded(json, nav, link, &exp, set, ancestors)?;
            } else if self.full() && projection::is_navigation_selected(projection.select, &nav.name) {
                if let Some(href) = link.and_then(|l| l.href.as_deref()) {
                    json.string_field(&annotated(&nav.name, ODATA_NAVIGATION_LINK), href)?;
                }
            }
        }
        if self.full() {
            for link in associations {
                if let Some(href) = &link.href {
                    json.string_field(&annotated(&link.title, ODATA_ASSOCIATION_LINK), href)?;
                }
            }
        }
        Ok(())
    }

    /// Inline content of an expanded navigation property. Absent inline
    /// data is written as `[]` or `null`, never omitted.
    fn write_expanded<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        nav: &NavigationProperty,
        link: Option<&Link>,
        exp: &Expansion<'_>,
        set: Option<&str>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let target = self
            .edm
            .entity_type(&nav.type_name)
            .ok_or_else(|| SerializerError::UnknownType(nav.type_name.to_string()))?;
        let child_set = nested_set(self.edm, set, &nav.name);
        let child = exp.child();
        let item = exp.item;

        if !nav.collection {
            json.name(&nav.name)?;
            return match link.and_then(Link::inline_entity_ref) {
                Some(entity) => self.write_entity(
                    json,
                    target,
                    entity,
                    child_set.as_deref(),
                    &[],
                    child,
                    item.is_ref,
                    ancestors,
                ),
                None => Ok(json.null()?),
            };
        }

        let collection = link.and_then(Link::inline_collection_ref);
        let count = collection.map_or(0, |c| c.count.unwrap_or(c.len() as i64));
        let count_name = annotated(&nav.name, ODATA_COUNT);
        if item.count_path {
            return self.write_count(json, &count_name, count);
        }
        if item.count {
            self.write_count(json, &count_name, count)?;
        }
        json.name(&nav.name)?;
        json.begin_array()?;
        for entity in collection.iter().flat_map(|c| c.entities.iter()) {
            self.write_entity(
                json,
                target,
                entity,
                child_set.as_deref(),
                &[],
                child,
                item.is_ref,
                ancestors,
            )?;
        }
        json.end_array()?;
        Ok(())
    }

    // ===== Undeclared values =====

    /// Property rendered from its value alone; a type name on the property
    /// is used when it resolves.
    pub(crate) fn write_inferred_property<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        property: &Property,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let name = property.name.as_str();
        let declared = property
            .type_name
            .as_deref()
            .and_then(|t| self.edm.resolve_type(&FullQualifiedName::parse(t)));
        self.write_instance_annotations(json, name, &property.annotations)?;
        match &property.value {
            Value::Null => {
                json.name(name)?;
                json.null()?;
            }
            Value::Primitive(v) => {
                let kind = declared
                    .and_then(EdmTypeRef::primitive_kind)
                    .unwrap_or_else(|| infer_kind(v));
                if self.full() && !kind.is_json_guessable() {
                    json.string_field(
                        &annotated(name, ODATA_TYPE),
                        &type_annotation(&kind.into(), false),
                    )?;
                }
                json.name(name)?;
                self.write_primitive(json, kind, &TypeFacets::default(), Some(v), name)?;
            }
            Value::PrimitiveCollection(items) => {
                let kind = declared
                    .and_then(EdmTypeRef::primitive_kind)
                    .or_else(|| items.iter().flatten().next().map(infer_kind))
                    .unwrap_or(EdmPrimitiveKind::String);
                if self.full() {
                    json.string_field(
                        &annotated(name, ODATA_TYPE),
                        &type_annotation(&kind.into(), true),
                    )?;
                }
                json.name(name)?;
                json.begin_array()?;
                for item in items {
                    self.write_primitive(json, kind, &TypeFacets::default(), item.as_ref(), name)?;
                }
                json.end_array()?;
            }
            Value::Enum(v) => {
                json.name(name)?;
                self.write_inferred_enum(json, declared, v, name)?;
            }
            Value::EnumCollection(items) => {
                json.name(name)?;
                json.begin_array()?;
                for item in items {
                    match item {
                        Some(v) => self.write_inferred_enum(json, declared, v, name)?,
                        None => json.null()?,
                    }
                }
                json.end_array()?;
            }
            Value::Complex(cv) => {
                json.name(name)?;
                self.write_inferred_complex(json, cv, ancestors)?;
            }
            Value::ComplexCollection(items) => {
                json.name(name)?;
                json.begin_array()?;
                for item in items {
                    match item {
                        Some(cv) => self.write_inferred_complex(json, cv, ancestors)?,
                        None => json.null()?,
                    }
                }
                json.end_array()?;
            }
            Value::Stream(stream) => self.write_media(json, name, stream)?,
            Value::Geospatial(_) | Value::GeospatialCollection(_) => {
                return Err(SerializerError::UnsupportedPropertyType(name.to_string()));
            }
        }
        Ok(())
    }

    fn write_inferred_enum<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        declared: Option<EdmTypeRef<'_>>,
        value: &EnumValue,
        name: &str,
    ) -> SerResult<()> {
        match (declared, value) {
            (Some(EdmTypeRef::Enum(e)), v) => self.write_enum(json, e, Some(v), name),
            (_, EnumValue::Names(names)) => Ok(json.string(names)?),
            (_, EnumValue::Number(n)) => Ok(json.number(&n.to_string())?),
        }
    }

    /// Complex value with a resolvable type goes through the declared
    /// path; otherwise every member is inferred.
    pub(crate) fn write_inferred_complex<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        value: &ComplexValue,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let declared = value
            .type_name
            .as_deref()
            .and_then(|t| self.edm.complex_type(&FullQualifiedName::parse(t.trim_start_matches('#'))));
        if let Some(ct) = declared {
            return self.write_complex(json, ct, value, None, &[], &[], Projection::default(), ancestors);
        }
        json.begin_object()?;
        if self.full() {
            if let Some(t) = &value.type_name {
                json.string_field(ODATA_TYPE, &format!("#{}", t.trim_start_matches('#')))?;
            }
        }
        self.write_instance_annotations(json, "", &value.annotations)?;
        for property in &value.properties {
            self.write_inferred_property(json, property, ancestors)?;
        }
        json.end_object()?;
        Ok(())
    }
}
