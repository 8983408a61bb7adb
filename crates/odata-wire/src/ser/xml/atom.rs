// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Atom entries, feeds and `m:properties` content.
//!
//! ```text
//! <a:entry m:context m:metadata-etag m:etag>
//!   <a:id/> <a:title/> <a:summary/> <a:author><a:name/></a:author>
//!   <a:link rel="edit|self"/>               read / edit link
//!   <a:link rel="edit-media"/>              media entities
//!   <a:link rel=".../related/Nav">          navigation; <m:inline> when expanded
//!   <a:category term="#ns.ET"/>
//!   <m:action|m:function/>                  bound operations
//!   <a:content type="application/xml"><m:properties>...</m:properties></a:content>
//! </a:entry>
//! ```
//!
//! Atom always carries type information, so the metadata level of the
//! content type does not change the output.

use super::writer::{Attrs, XmlWriter};
use crate::config::{
    NS_ASSOCIATION_LINK_REL, NS_ATOM, NS_DATA, NS_MEDIA_EDIT_LINK_REL, NS_MEDIA_READ_LINK_REL,
    NS_METADATA, NS_NAVIGATION_LINK_REL, NS_SCHEME,
};
use crate::data::{
    ComplexValue, Entity, EntityCollection, EnumValue, InstanceAnnotation, Link, Operation,
    PrimitiveValue, Property, StreamValue, Value,
};
use crate::edm::{
    EdmPrimitiveKind, EdmProvider, EdmTypeRef, EnumType, FullQualifiedName, NavigationProperty,
    OperationKind, StructuralProperty, StructuredType, TypeFacets,
};
use crate::error::{SerResult, SerializerError};
use crate::ser::cycle::Ancestors;
use crate::ser::primitive::{canonical, encode_enum, infer_kind};
use crate::ser::projection::{self, expansion, Expansion, Projection};
use crate::ser::resolve::{
    known_entity_id, nested_set, primitive_facets, property_type, resolve_derived, resolved_name,
    type_annotation,
};
use crate::ser::uri::resolve_entity_id;
use std::io::Write;

pub(crate) const A_FEED: &str = "a:feed";
pub(crate) const A_ENTRY: &str = "a:entry";
pub(crate) const A_ID: &str = "a:id";
pub(crate) const A_TITLE: &str = "a:title";
const A_SUMMARY: &str = "a:summary";
const A_AUTHOR: &str = "a:author";
const A_NAME: &str = "a:name";
pub(crate) const A_LINK: &str = "a:link";
const A_CATEGORY: &str = "a:category";
const A_CONTENT: &str = "a:content";
const M_PROPERTIES: &str = "m:properties";
const M_INLINE: &str = "m:inline";
pub(crate) const M_COUNT: &str = "m:count";
pub(crate) const M_REF: &str = "m:ref";
pub(crate) const M_VALUE: &str = "m:value";
const M_ELEMENT: &str = "m:element";
const M_ANNOTATION: &str = "m:annotation";
pub(crate) const M_CONTEXT: &str = "m:context";
pub(crate) const M_METADATA_ETAG: &str = "m:metadata-etag";
const M_ETAG: &str = "m:etag";
pub(crate) const M_TYPE: &str = "m:type";
pub(crate) const M_NULL: &str = "m:null";

const REL_DELTA: &str = "http://docs.oasis-open.org/odata/ns/delta";
const ATOM_ENTRY: &str = "application/atom+xml;type=entry";
const ATOM_FEED: &str = "application/atom+xml;type=feed";
const XML_CONTENT: &str = "application/xml";

/// Namespace declarations of a document element.
pub(crate) const NAMESPACES: [(&str, &str); 3] = [
    ("xmlns:a", NS_ATOM),
    ("xmlns:m", NS_METADATA),
    ("xmlns:d", NS_DATA),
];

fn data_tag(name: &str) -> String {
    format!("d:{}", name)
}

fn with_attr<'t>(attrs: &Attrs<'t>, extra: Option<(&'t str, &'t str)>) -> Vec<(&'t str, &'t str)> {
    let mut all = attrs.to_vec();
    all.extend(extra);
    all
}

/// `m:type` value: bare kind names for primitives (none for `String`),
/// `#`-qualified names otherwise.
fn xml_type(resolved: EdmTypeRef<'_>, collection: bool) -> Option<String> {
    match resolved {
        EdmTypeRef::Primitive(kind) if !collection => {
            (kind != EdmPrimitiveKind::String).then(|| kind.name().to_string())
        }
        _ => Some(type_annotation(&resolved_name(resolved), collection)),
    }
}

fn kind_type(kind: EdmPrimitiveKind, collection: bool) -> Option<String> {
    xml_type(EdmTypeRef::Primitive(kind), collection)
}

/// Writes Atom content against one EDM.
pub(crate) struct AtomWriter<'a> {
    pub(crate) edm: &'a dyn EdmProvider,
}

impl<'a> AtomWriter<'a> {
    pub(crate) fn new(edm: &'a dyn EdmProvider) -> Self {
        Self { edm }
    }

    // ===== Feeds =====

    /// `<a:feed>` with the collection's entries; `attrs` carries the
    /// namespace declarations and context of a top-level feed.
    pub(crate) fn write_feed<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        static_type: &StructuredType,
        collection: &EntityCollection,
        set: Option<&str>,
        attrs: &Attrs<'_>,
        count: Option<i64>,
        projection: Projection<'_>,
        only_reference: bool,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        xml.start(A_FEED, attrs)?;
        if !attrs.is_empty() {
            if let Some(set) = set {
                xml.text_element(A_ID, &[], set)?;
            }
        }
        if let Some(count) = count {
            xml.text_element(M_COUNT, &[], &count.to_string())?;
        }
        for entity in &collection.entities {
            self.write_entry(xml, static_type, entity, set, &[], projection, only_reference, ancestors)?;
        }
        if let Some(next) = &collection.next_link {
            xml.empty(A_LINK, &[("rel", "next"), ("href", next.as_str())])?;
        }
        if let Some(delta) = &collection.delta_link {
            xml.empty(A_LINK, &[("rel", REL_DELTA), ("href", delta.as_str())])?;
        }
        xml.end(A_FEED)
    }

    // ===== Entries =====

    pub(crate) fn write_reference<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        attrs: &Attrs<'_>,
        id: &str,
    ) -> SerResult<()> {
        xml.empty(M_REF, &with_attr(attrs, Some(("id", id))))
    }

    /// One entry. While an expansion is active entries are tracked by id
    /// and one already on the path is written as `<m:ref>`.
    pub(crate) fn write_entry<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        static_type: &StructuredType,
        entity: &Entity,
        set: Option<&str>,
        attrs: &Attrs<'_>,
        projection: Projection<'_>,
        only_reference: bool,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = resolve_derived(self.edm, static_type, entity.type_name.as_deref())?;
        if only_reference {
            let id = resolve_entity_id(self.edm, set, ty, entity)?;
            return self.write_reference(xml, attrs, id);
        }
        let tracking = projection::has_expand(projection.expand) || !ancestors.is_empty();
        if !tracking {
            return self.write_entry_body(xml, ty, entity, set, attrs, projection, ancestors);
        }
        let id = resolve_entity_id(self.edm, set, ty, entity)?;
        let mut scope = ancestors.enter(id);
        if scope.is_cycle() {
            log::debug!("[xml] {} already on the expansion path, writing reference", id);
            return self.write_reference(xml, attrs, id);
        }
        self.write_entry_body(xml, ty, entity, set, attrs, projection, &mut scope)
    }

    fn write_entry_body<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        ty: &StructuredType,
        entity: &Entity,
        set: Option<&str>,
        attrs: &Attrs<'_>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let entry_attrs = with_attr(attrs, entity.etag.as_deref().map(|e| (M_ETAG, e)));
        xml.start(A_ENTRY, &entry_attrs)?;
        let id = known_entity_id(self.edm, set, ty, entity)?;
        if let Some(id) = id {
            xml.text_element(A_ID, &[], id)?;
        }
        xml.empty(A_TITLE, &[])?;
        xml.empty(A_SUMMARY, &[])?;
        xml.start(A_AUTHOR, &[])?;
        xml.empty(A_NAME, &[])?;
        xml.end(A_AUTHOR)?;

        if let Some(read) = &entity.read_link {
            xml.empty(A_LINK, &[("rel", "self"), ("href", read.as_str())])?;
        }
        if let Some(edit) = entity.edit_link.as_deref().or(id) {
            xml.empty(A_LINK, &[("rel", "edit"), ("href", edit)])?;
        }
        let media = ty.has_stream || entity.is_media_entity();
        if media {
            if let Some(edit) = &entity.media_edit_link {
                let attrs = with_attr(
                    &[("rel", "edit-media"), ("href", edit.as_str())],
                    entity.media_etag.as_deref().map(|e| (M_ETAG, e)),
                );
                xml.empty(A_LINK, &attrs)?;
            }
        }
        self.write_stream_links(xml, ty, &entity.properties, projection)?;
        self.write_navigation(xml, ty, entity, id, set, projection, ancestors)?;

        let term = type_annotation(&ty.name, false);
        xml.empty(A_CATEGORY, &[("scheme", NS_SCHEME), ("term", term.as_str())])?;
        self.write_operations(xml, &entity.operations)?;
        self.write_instance_annotations(xml, None, &entity.annotations)?;

        if media {
            let content_type = entity
                .media_content_type
                .as_deref()
                .unwrap_or("application/octet-stream");
            let mut content = vec![("type", content_type)];
            if let Some(src) = entity.media_read_link.as_deref().or(id) {
                content.push(("src", src));
            }
            xml.empty(A_CONTENT, &content)?;
            self.write_property_list(xml, ty, &entity.properties, set, projection, ancestors)?;
        } else {
            xml.start(A_CONTENT, &[("type", XML_CONTENT)])?;
            self.write_property_list(xml, ty, &entity.properties, set, projection, ancestors)?;
            xml.end(A_CONTENT)?;
        }
        xml.end(A_ENTRY)
    }

    fn write_property_list<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        ty: &StructuredType,
        properties: &[Property],
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        xml.start(M_PROPERTIES, &[])?;
        self.write_properties(xml, ty, properties, set, projection, ancestors)?;
        xml.end(M_PROPERTIES)
    }

    /// Bound operation adverts; the anchor names the operation, whose kind
    /// picks the element.
    pub(crate) fn write_operations<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        operations: &[Operation],
    ) -> SerResult<()> {
        for operation in operations {
            let name = FullQualifiedName::parse(operation.metadata_anchor.trim_start_matches('#'));
            let is_function = self
                .edm
                .operations(&name)
                .first()
                .is_some_and(|o| o.kind == OperationKind::Function);
            let tag = if is_function { "m:function" } else { "m:action" };
            let mut attrs = vec![("metadata", operation.metadata_anchor.as_str())];
            attrs.extend(operation.title.as_deref().map(|t| ("title", t)));
            attrs.extend(operation.target.as_deref().map(|t| ("target", t)));
            xml.empty(tag, &attrs)?;
        }
        Ok(())
    }

    /// `<m:annotation term target?>` for primitive and enum values; other
    /// shapes have no Atom rendering and are skipped.
    fn write_instance_annotations<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        target: Option<&str>,
        annotations: &[InstanceAnnotation],
    ) -> SerResult<()> {
        for annotation in annotations {
            let term = annotation.key();
            let mut attrs = vec![("term", term.as_str())];
            attrs.extend(target.map(|t| ("target", t)));
            match &annotation.value {
                Value::Null => {
                    attrs.push((M_NULL, "true"));
                    xml.empty(M_ANNOTATION, &attrs)?;
                }
                Value::Primitive(v) => {
                    let kind = infer_kind(v);
                    let text = canonical(kind, v, &TypeFacets::default(), &term)?;
                    let type_attr = kind_type(kind, false);
                    attrs.extend(type_attr.as_deref().map(|t| (M_TYPE, t)));
                    xml.text_element(M_ANNOTATION, &attrs, &text)?;
                }
                Value::Enum(EnumValue::Names(names)) => {
                    xml.text_element(M_ANNOTATION, &attrs, names)?;
                }
                other => {
                    log::debug!("[xml] skipping {} instance annotation {}", other.shape(), term);
                }
            }
        }
        Ok(())
    }

    // ===== Links =====

    fn write_stream_links<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        ty: &StructuredType,
        properties: &[Property],
        projection: Projection<'_>,
    ) -> SerResult<()> {
        let selection = projection::selected_properties(self.edm, ty, projection.select);
        for decl in self.edm.structural_properties(ty) {
            let is_stream = decl.primitive_kind() == Some(EdmPrimitiveKind::Stream);
            if !is_stream || !selection.contains(&decl.name) {
                continue;
            }
            let stream = properties.iter().find_map(|p| match &p.value {
                Value::Stream(s) if p.name == decl.name => Some(s),
                _ => None,
            });
            if let Some(stream) = stream {
                self.write_stream_link(xml, &decl.name, stream)?;
            }
        }
        Ok(())
    }

    fn write_stream_link<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        name: &str,
        stream: &StreamValue,
    ) -> SerResult<()> {
        let links = [
            (NS_MEDIA_READ_LINK_REL, stream.read_link.as_deref()),
            (NS_MEDIA_EDIT_LINK_REL, stream.edit_link.as_deref()),
        ];
        for (rel_base, href) in links {
            let Some(href) = href else { continue };
            let rel = format!("{}{}", rel_base, name);
            let mut attrs = vec![("rel", rel.as_str()), ("title", name), ("href", href)];
            attrs.extend(stream.content_type.as_deref().map(|t| ("type", t)));
            attrs.extend(stream.media_etag.as_deref().map(|e| (M_ETAG, e)));
            xml.empty(A_LINK, &attrs)?;
        }
        Ok(())
    }

    fn write_navigation<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        ty: &StructuredType,
        entity: &Entity,
        id: Option<&str>,
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        for nav in self.edm.navigation_properties(ty) {
            let link = entity.navigation_link(&nav.name);
            let rel = format!("{}{}", NS_NAVIGATION_LINK_REL, nav.name);
            let link_type = if nav.collection { ATOM_FEED } else { ATOM_ENTRY };
            let fallback = id.map(|id| format!("{}/{}", id, nav.name));
            let href = link.and_then(|l| l.href.as_deref()).or(fallback.as_deref());
            let mut attrs = vec![
                ("rel", rel.as_str()),
                ("type", link_type),
                ("title", nav.name.as_str()),
            ];
            attrs.extend(href.map(|h| ("href", h)));

            if let Some(exp) = expansion(projection.expand, &nav.name, projection.to_depth) {
                xml.start(A_LINK, &attrs)?;
                xml.start(M_INLINE, &[])?;
                self.write_expanded(xml, nav, link, &exp, set, ancestors)?;
                xml.end(M_INLINE)?;
                xml.end(A_LINK)?;
            } else if href.is_some() && projection::is_navigation_selected(projection.select, &nav.name) {
                xml.empty(A_LINK, &attrs)?;
            }
        }
        for link in &entity.association_links {
            if let Some(href) = &link.href {
                let rel = format!("{}{}", NS_ASSOCIATION_LINK_REL, link.title);
                xml.empty(
                    A_LINK,
                    &[
                        ("rel", rel.as_str()),
                        ("type", XML_CONTENT),
                        ("title", link.title.as_str()),
                        ("href", href.as_str()),
                    ],
                )?;
            }
        }
        Ok(())
    }

    /// Content of `<m:inline>`: an entry, a feed, or nothing for an absent
    /// single entity.
    fn write_expanded<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
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
            return match link.and_then(Link::inline_entity_ref) {
                Some(entity) => self.write_entry(
                    xml,
                    target,
                    entity,
                    child_set.as_deref(),
                    &[],
                    child,
                    item.is_ref,
                    ancestors,
                ),
                None => Ok(()),
            };
        }

        let collection = link.and_then(Link::inline_collection_ref);
        let count = collection.map_or(0, |c| c.count.unwrap_or(c.len() as i64));
        xml.start(A_FEED, &[])?;
        if item.count || item.count_path {
            xml.text_element(M_COUNT, &[], &count.to_string())?;
        }
        if !item.count_path {
            for entity in collection.iter().flat_map(|c| c.entities.iter()) {
                self.write_entry(
                    xml,
                    target,
                    entity,
                    child_set.as_deref(),
                    &[],
                    child,
                    item.is_ref,
                    ancestors,
                )?;
            }
        }
        xml.end(A_FEED)
    }

    // ===== Properties =====

    pub(crate) fn write_properties<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
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
            self.write_property(xml, decl, property, set, inner, ancestors)?;
        }
        if ty.is_open && selection.is_all() {
            for dynamic in properties
                .iter()
                .filter(|p| !declared.iter().any(|d| d.name == p.name))
            {
                self.write_inferred_property(xml, dynamic, ancestors)?;
            }
        }
        Ok(())
    }

    fn write_property<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        decl: &StructuralProperty,
        property: Option<&Property>,
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let name = decl.name.as_str();
        let resolved = property_type(self.edm, decl)?;
        if matches!(resolved, EdmTypeRef::Primitive(EdmPrimitiveKind::Stream)) {
            return Ok(());
        }
        let tag = data_tag(name);
        let Some(value) = property.map(|p| &p.value).filter(|v| !v.is_null()) else {
            if !decl.nullable {
                return Err(SerializerError::MissingProperty(name.to_string()));
            }
            return self.write_null(xml, &tag, resolved, decl.collection);
        };
        if decl.collection != value.is_collection() {
            return Err(SerializerError::InconsistentPropertyType(name.to_string()));
        }
        self.write_value(xml, &tag, &[], name, resolved, &decl.facets, value, set, projection, ancestors)
    }

    /// Null single values carry `m:null`; a null collection is an empty
    /// typed element.
    pub(crate) fn write_null<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        tag: &str,
        resolved: EdmTypeRef<'_>,
        collection: bool,
    ) -> SerResult<()> {
        if collection {
            let type_attr = xml_type(resolved, true);
            xml.empty(tag, &with_attr(&[], type_attr.as_deref().map(|t| (M_TYPE, t))))
        } else {
            xml.empty(tag, &[(M_NULL, "true")])
        }
    }

    /// `<tag m:type>` element holding `value` typed as `resolved`.
    pub(crate) fn write_value<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        tag: &str,
        attrs: &Attrs<'_>,
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
        let collection = value.is_collection();
        let type_attr = xml_type(resolved, collection);
        let typed = with_attr(attrs, type_attr.as_deref().map(|t| (M_TYPE, t)));

        if let Some((kind, facets)) = primitive_facets(resolved, facets) {
            if kind.is_geospatial() {
                return Err(SerializerError::UnsupportedPropertyType(name.to_string()));
            }
            return match value {
                Value::Primitive(v) => xml.text_element(tag, &typed, &canonical(kind, v, facets, name)?),
                Value::PrimitiveCollection(items) => {
                    xml.start(tag, &typed)?;
                    for item in items {
                        self.write_primitive_element(xml, kind, facets, item.as_ref(), name)?;
                    }
                    xml.end(tag)
                }
                _ => Err(SerializerError::InconsistentPropertyType(name.to_string())),
            };
        }
        match (resolved, value) {
            (EdmTypeRef::Enum(e), Value::Enum(v)) => {
                xml.text_element(tag, &typed, &encode_enum(e, v, name)?)
            }
            (EdmTypeRef::Enum(e), Value::Primitive(v)) => {
                let n = v
                    .as_i64()
                    .ok_or_else(|| SerializerError::wrong_value(name, v.raw_string()))?;
                xml.text_element(tag, &typed, &encode_enum(e, &EnumValue::Number(n), name)?)
            }
            (EdmTypeRef::Enum(e), Value::EnumCollection(items)) => {
                xml.start(tag, &typed)?;
                for item in items {
                    self.write_enum_element(xml, e, item.as_ref(), name)?;
                }
                xml.end(tag)
            }
            (EdmTypeRef::Complex(ct), Value::Complex(cv)) => {
                self.write_complex(xml, tag, attrs, ct, cv, set, projection, ancestors)
            }
            (EdmTypeRef::Complex(ct), Value::ComplexCollection(items)) => {
                xml.start(tag, &typed)?;
                for item in items {
                    match item {
                        Some(cv) => self.write_complex(xml, M_ELEMENT, &[], ct, cv, set, projection, ancestors)?,
                        None => xml.empty(M_ELEMENT, &[(M_NULL, "true")])?,
                    }
                }
                xml.end(tag)
            }
            _ => Err(SerializerError::InconsistentPropertyType(name.to_string())),
        }
    }

    fn write_primitive_element<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        kind: EdmPrimitiveKind,
        facets: &TypeFacets,
        value: Option<&PrimitiveValue>,
        name: &str,
    ) -> SerResult<()> {
        match value {
            Some(v) => xml.text_element(M_ELEMENT, &[], &canonical(kind, v, facets, name)?),
            None => xml.empty(M_ELEMENT, &[(M_NULL, "true")]),
        }
    }

    fn write_enum_element<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        enum_type: &EnumType,
        value: Option<&EnumValue>,
        name: &str,
    ) -> SerResult<()> {
        match value {
            Some(v) => xml.text_element(M_ELEMENT, &[], &encode_enum(enum_type, v, name)?),
            None => xml.empty(M_ELEMENT, &[(M_NULL, "true")]),
        }
    }

    /// Complex value as `<tag m:type="#ns.CT">` with its properties.
    pub(crate) fn write_complex<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        tag: &str,
        attrs: &Attrs<'_>,
        static_type: &StructuredType,
        value: &ComplexValue,
        set: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = resolve_derived(self.edm, static_type, value.type_name.as_deref())?;
        let type_attr = type_annotation(&ty.name, false);
        xml.start(tag, &with_attr(attrs, Some((M_TYPE, type_attr.as_str()))))?;
        self.write_properties(xml, ty, &value.properties, set, projection, ancestors)?;
        xml.end(tag)
    }

    // ===== Undeclared values =====

    fn write_inferred_property<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        property: &Property,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let name = property.name.as_str();
        let tag = data_tag(name);
        let declared = property
            .type_name
            .as_deref()
            .map(|t| FullQualifiedName::parse(t.trim_start_matches('#')));
        let declared = declared.as_ref().and_then(|t| self.edm.resolve_type(t));
        match &property.value {
            Value::Null => xml.empty(&tag, &[(M_NULL, "true")]),
            Value::Primitive(v) => {
                let kind = declared
                    .and_then(EdmTypeRef::primitive_kind)
                    .unwrap_or_else(|| infer_kind(v));
                let type_attr = kind_type(kind, false);
                let attrs = with_attr(&[], type_attr.as_deref().map(|t| (M_TYPE, t)));
                xml.text_element(&tag, &attrs, &canonical(kind, v, &TypeFacets::default(), name)?)
            }
            Value::PrimitiveCollection(items) => {
                let kind = declared
                    .and_then(EdmTypeRef::primitive_kind)
                    .or_else(|| items.iter().flatten().next().map(infer_kind))
                    .unwrap_or(EdmPrimitiveKind::String);
                let type_attr = kind_type(kind, true);
                xml.start(&tag, &with_attr(&[], type_attr.as_deref().map(|t| (M_TYPE, t))))?;
                for item in items {
                    self.write_primitive_element(xml, kind, &TypeFacets::default(), item.as_ref(), name)?;
                }
                xml.end(&tag)
            }
            Value::Enum(v) => match declared {
                Some(EdmTypeRef::Enum(e)) => {
                    let type_attr = type_annotation(&e.name, false);
                    xml.text_element(&tag, &[(M_TYPE, type_attr.as_str())], &encode_enum(e, v, name)?)
                }
                _ => xml.text_element(&tag, &[], &inferred_enum_text(v)),
            },
            Value::EnumCollection(items) => {
                xml.start(&tag, &[])?;
                for item in items {
                    match (declared, item) {
                        (Some(EdmTypeRef::Enum(e)), item) => {
                            self.write_enum_element(xml, e, item.as_ref(), name)?
                        }
                        (_, Some(v)) => xml.text_element(M_ELEMENT, &[], &inferred_enum_text(v))?,
                        (_, None) => xml.empty(M_ELEMENT, &[(M_NULL, "true")])?,
                    }
                }
                xml.end(&tag)
            }
            Value::Complex(cv) => self.write_inferred_complex(xml, &tag, cv, ancestors),
            Value::ComplexCollection(items) => {
                xml.start(&tag, &[])?;
                for item in items {
                    match item {
                        Some(cv) => self.write_inferred_complex(xml, M_ELEMENT, cv, ancestors)?,
                        None => xml.empty(M_ELEMENT, &[(M_NULL, "true")])?,
                    }
                }
                xml.end(&tag)
            }
            // media links of undeclared streams have no Atom position
            Value::Stream(_) => Ok(()),
            Value::Geospatial(_) | Value::GeospatialCollection(_) => {
                Err(SerializerError::UnsupportedPropertyType(name.to_string()))
            }
        }
    }

    fn write_inferred_complex<W: Write>(
        &self,
        xml: &mut XmlWriter<W>,
        tag: &str,
        value: &ComplexValue,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let declared = value
            .type_name
            .as_deref()
            .and_then(|t| self.edm.complex_type(&FullQualifiedName::parse(t.trim_start_matches('#'))));
        if let Some(ct) = declared {
            return self.write_complex(xml, tag, &[], ct, value, None, Projection::default(), ancestors);
        }
        let type_attr = value
            .type_name
            .as_deref()
            .map(|t| format!("#{}", t.trim_start_matches('#')));
        xml.start(tag, &with_attr(&[], type_attr.as_deref().map(|t| (M_TYPE, t))))?;
        for property in &value.properties {
            self.write_inferred_property(xml, property, ancestors)?;
        }
        xml.end(tag)
    }
}

fn inferred_enum_text(value: &EnumValue) -> String {
    match value {
        EnumValue::Names(names) => names.clone(),
        EnumValue::Number(n) => n.to_string(),
    }
}
