// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OData Atom/XML format.
//!
//! Entities and feeds are Atom documents, property documents are a single
//! `m:value` element, the service document is an Atom Publishing service
//! and `$metadata` is CSDL XML. Every document element declares the `a`,
//! `m` and `d` prefixes and carries `m:context`; a context URL is therefore
//! required for every payload document regardless of the metadata level.
//!
//! Delta payloads have no Atom rendering here and fail with
//! `NotImplemented`.

mod atom;
mod csdl;
mod writer;

pub use writer::XmlWriter;

use self::atom::{
    AtomWriter, A_FEED, A_LINK, A_TITLE, M_CONTEXT, M_COUNT, M_METADATA_ETAG, M_NULL, M_TYPE,
    M_VALUE, NAMESPACES,
};
use self::csdl::CsdlXmlWriter;
use crate::config::{
    ContentType, Format, ERROR, ERROR_CODE, ERROR_DETAILS, ERROR_INNER, ERROR_MESSAGE,
    ERROR_TARGET, METADATA_SEGMENT, NS_APP, NS_ATOM, NS_METADATA,
};
use crate::data::{
    ContextUrl, Delta, Entity, EntityCollection, ODataServerError, Property, ServiceMetadata, Value,
};
use crate::edm::{EdmTypeRef, FullQualifiedName, StructuredType};
use crate::error::{SerResult, SerializerError};
use crate::query::{ExpandOption, SelectOption};
use crate::ser::cycle::Ancestors;
use crate::ser::projection::Projection;
use crate::ser::resolve::{context_string, entity_set_scope, resolve_derived, type_annotation};
use crate::ser::uri::{encode_segment, resolve_entity_id};
use crate::ser::{
    ComplexOptions, DeltaOptions, EntityCollectionOptions, EntityOptions, ODataSerializer,
    PrimitiveOptions, ReferenceCollectionOptions, ReferenceOptions, SerializedContent,
};

const APP_SERVICE: &str = "app:service";
const APP_WORKSPACE: &str = "app:workspace";
const APP_COLLECTION: &str = "app:collection";
const M_FUNCTION_IMPORT: &str = "m:function-import";
const M_SINGLETON: &str = "m:singleton";
const M_DETAIL: &str = "m:detail";

fn m_tag(name: &str) -> String {
    format!("m:{}", name)
}

/// Attributes of a document element: prefixes, context and metadata etag.
struct Header {
    context: Option<String>,
    metadata_etag: Option<String>,
}

impl Header {
    fn attrs(&self) -> Vec<(&str, &str)> {
        let mut attrs = NAMESPACES.to_vec();
        if let Some(context) = &self.context {
            attrs.push((M_CONTEXT, context.as_str()));
        }
        if let Some(etag) = &self.metadata_etag {
            attrs.push((M_METADATA_ETAG, etag.as_str()));
        }
        attrs
    }
}

/// OData Atom/XML serializer.
#[derive(Debug, Clone, Copy)]
pub struct XmlSerializer {
    content_type: ContentType,
}

impl XmlSerializer {
    /// Output is always XML; the metadata level does not change Atom
    /// output.
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type: ContentType {
                format: Format::Xml,
                ..content_type
            },
        }
    }

    fn document(&self) -> SerResult<XmlWriter<Vec<u8>>> {
        let mut xml = XmlWriter::new(Vec::new());
        xml.declaration()?;
        Ok(xml)
    }

    fn finish(&self, xml: XmlWriter<Vec<u8>>) -> SerializedContent {
        SerializedContent::new(xml.into_inner(), self.content_type)
    }

    fn header(
        &self,
        metadata: &ServiceMetadata,
        context: Option<&ContextUrl>,
        select: Option<&SelectOption>,
        expand: Option<&ExpandOption>,
    ) -> SerResult<Header> {
        Ok(Header {
            context: context_string(context, select, expand, true)?,
            metadata_etag: metadata.etag.clone(),
        })
    }

    fn reference_header(service_root: Option<&str>, collection: bool) -> SerResult<Header> {
        let mut reference = ContextUrl::reference(collection);
        reference.service_root = service_root.map(str::to_string);
        Ok(Header {
            context: Some(reference.encode()?),
            metadata_etag: None,
        })
    }

    // ===== Properties =====

    fn write_primitive_document(
        &self,
        metadata: &ServiceMetadata,
        type_name: &FullQualifiedName,
        property: &Property,
        options: &PrimitiveOptions,
        collection: bool,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let resolved = edm
            .resolve_type(type_name)
            .filter(|t| t.structured().is_none())
            .ok_or_else(|| SerializerError::UnknownType(type_name.to_string()))?;
        let header = self.header(metadata, options.context_url.as_ref(), None, None)?;
        let value = &property.value;
        if !value.is_null() && value.is_collection() != collection {
            return Err(SerializerError::InconsistentPropertyType(property.name.clone()));
        }

        let mut xml = self.document()?;
        let collection_type = match resolved {
            EdmTypeRef::Primitive(kind) => type_annotation(&kind.into(), true),
            _ => type_annotation(type_name, true),
        };
        let mut attrs = header.attrs();
        if value.is_null() {
            if !options.nullable {
                return Err(SerializerError::MissingProperty(property.name.clone()));
            }
            if collection {
                attrs.push((M_TYPE, collection_type.as_str()));
            } else {
                attrs.push((M_NULL, "true"));
            }
            xml.empty(M_VALUE, &attrs)?;
        } else {
            AtomWriter::new(edm).write_value(
                &mut xml,
                M_VALUE,
                &attrs,
                &property.name,
                resolved,
                &options.facets,
                value,
                None,
                Projection::default(),
                &mut Ancestors::new(),
            )?;
        }
        Ok(self.finish(xml))
    }

    fn write_complex_document(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
        collection: bool,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(edm, options.context_url.as_ref());
        if !options.operations.is_empty() {
            log::debug!("[xml] operation adverts on complex values are not written");
        }

        let mut xml = self.document()?;
        let collection_type = type_annotation(&complex_type.name, true);
        let mut attrs = header.attrs();
        match (&property.value, collection) {
            (Value::Complex(_), false) | (Value::ComplexCollection(_), true) => {
                AtomWriter::new(edm).write_value(
                    &mut xml,
                    M_VALUE,
                    &attrs,
                    &property.name,
                    EdmTypeRef::Complex(complex_type),
                    &Default::default(),
                    &property.value,
                    set.as_deref(),
                    Projection::new(select, expand),
                    &mut Ancestors::new(),
                )?;
            }
            (Value::Null, true) => {
                attrs.push((M_TYPE, collection_type.as_str()));
                xml.empty(M_VALUE, &attrs)?;
            }
            (Value::Null, false) => {
                return Err(SerializerError::MissingProperty(property.name.clone()));
            }
            _ => return Err(SerializerError::InconsistentPropertyType(property.name.clone())),
        }
        Ok(self.finish(xml))
    }
}

impl ODataSerializer for XmlSerializer {
    fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Atom Publishing service document with one workspace.
    fn service_document(
        &self,
        metadata: &ServiceMetadata,
        service_root: Option<&str>,
    ) -> SerResult<SerializedContent> {
        let root = service_root.unwrap_or_default();
        let context = format!("{}{}", root, METADATA_SEGMENT);
        let mut attrs = vec![
            ("xmlns:app", NS_APP),
            ("xmlns:a", NS_ATOM),
            ("xmlns:m", NS_METADATA),
            (M_CONTEXT, context.as_str()),
        ];
        if let Some(etag) = metadata.etag.as_deref() {
            attrs.push((M_METADATA_ETAG, etag));
        }
        if service_root.is_some() {
            attrs.push(("xml:base", root));
        }

        let mut xml = self.document()?;
        xml.start(APP_SERVICE, &attrs)?;
        xml.start(APP_WORKSPACE, &[])?;
        match metadata.edm.entity_container() {
            Some(container) => {
                xml.text_element(A_TITLE, &[], &container.name.to_string())?;
                for set in container
                    .entity_sets
                    .iter()
                    .filter(|s| s.include_in_service_document)
                {
                    write_resource(&mut xml, APP_COLLECTION, &set.name, set.title.as_deref())?;
                }
                for import in container
                    .function_imports
                    .iter()
                    .filter(|f| f.include_in_service_document)
                {
                    write_resource(&mut xml, M_FUNCTION_IMPORT, &import.name, import.title.as_deref())?;
                }
                for singleton in &container.singletons {
                    write_resource(&mut xml, M_SINGLETON, &singleton.name, singleton.title.as_deref())?;
                }
            }
            None => log::debug!("[xml] service document without entity container"),
        }
        xml.end(APP_WORKSPACE)?;
        xml.end(APP_SERVICE)?;
        Ok(self.finish(xml))
    }

    fn metadata_document(&self, metadata: &ServiceMetadata) -> SerResult<SerializedContent> {
        let mut xml = XmlWriter::new(Vec::new());
        CsdlXmlWriter::new(metadata).write(&mut xml)?;
        Ok(self.finish(xml))
    }

    /// `<m:error>` with `m:code`, `m:message`, optional `m:target`,
    /// `m:details` and `m:innererror`. A missing code is an empty element.
    fn error(&self, error: &ODataServerError) -> SerResult<SerializedContent> {
        let mut xml = self.document()?;
        let root = m_tag(ERROR);
        let code = m_tag(ERROR_CODE);
        let message = m_tag(ERROR_MESSAGE);
        let target = m_tag(ERROR_TARGET);
        xml.start(&root, &[("xmlns:m", NS_METADATA)])?;
        xml.text_element(&code, &[], error.code.as_deref().unwrap_or_default())?;
        xml.text_element(&message, &[], &error.message)?;
        if let Some(t) = &error.target {
            xml.text_element(&target, &[], t)?;
        }
        if !error.details.is_empty() {
            let details = m_tag(ERROR_DETAILS);
            xml.start(&details, &[])?;
            for detail in &error.details {
                xml.start(M_DETAIL, &[])?;
                xml.text_element(&code, &[], detail.code.as_deref().unwrap_or_default())?;
                xml.text_element(&message, &[], &detail.message)?;
                if let Some(t) = &detail.target {
                    xml.text_element(&target, &[], t)?;
                }
                xml.end(M_DETAIL)?;
            }
            xml.end(&details)?;
        }
        if !error.inner_error.is_empty() {
            let inner = m_tag(ERROR_INNER);
            xml.start(&inner, &[])?;
            for (key, value) in &error.inner_error {
                xml.text_element(&m_tag(key), &[], value)?;
            }
            xml.end(&inner)?;
        }
        xml.end(&root)?;
        Ok(self.finish(xml))
    }

    fn entity_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &EntityCollectionOptions,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(edm, options.context_url.as_ref());
        let count = options
            .count
            .then(|| collection.count.unwrap_or(collection.len() as i64));
        let mut xml = self.document()?;
        AtomWriter::new(edm).write_feed(
            &mut xml,
            entity_type,
            collection,
            set.as_deref(),
            &header.attrs(),
            count,
            Projection::new(select, expand),
            options.write_only_references,
            &mut Ancestors::new(),
        )?;
        Ok(self.finish(xml))
    }

    fn entity(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entity: &Entity,
        options: &EntityOptions,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(edm, options.context_url.as_ref());
        let mut xml = self.document()?;
        AtomWriter::new(edm).write_entry(
            &mut xml,
            entity_type,
            entity,
            set.as_deref(),
            &header.attrs(),
            Projection::new(select, expand),
            options.write_only_references,
            &mut Ancestors::new(),
        )?;
        Ok(self.finish(xml))
    }

    fn primitive(
        &self,
        metadata: &ServiceMetadata,
        type_name: &FullQualifiedName,
        property: &Property,
        options: &PrimitiveOptions,
    ) -> SerResult<SerializedContent> {
        self.write_primitive_document(metadata, type_name, property, options, false)
    }

    fn complex(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
    ) -> SerResult<SerializedContent> {
        self.write_complex_document(metadata, complex_type, property, options, false)
    }

    fn primitive_collection(
        &self,
        metadata: &ServiceMetadata,
        type_name: &FullQualifiedName,
        property: &Property,
        options: &PrimitiveOptions,
    ) -> SerResult<SerializedContent> {
        self.write_primitive_document(metadata, type_name, property, options, true)
    }

    fn complex_collection(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
    ) -> SerResult<SerializedContent> {
        self.write_complex_document(metadata, complex_type, property, options, true)
    }

    fn reference(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entity: &Entity,
        options: &ReferenceOptions,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let ty = resolve_derived(edm, entity_type, entity.type_name.as_deref())?;
        let id = resolve_entity_id(edm, options.entity_set.as_deref(), ty, entity)?;
        let header = Self::reference_header(options.service_root.as_deref(), false)?;
        let mut xml = self.document()?;
        AtomWriter::new(edm).write_reference(&mut xml, &header.attrs(), id)?;
        Ok(self.finish(xml))
    }

    /// Feed of `<m:ref>` elements.
    fn reference_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &ReferenceCollectionOptions,
    ) -> SerResult<SerializedContent> {
        let edm = metadata.edm.as_ref();
        let writer = AtomWriter::new(edm);
        let header = Self::reference_header(options.service_root.as_deref(), true)?;
        let mut xml = self.document()?;
        xml.start(A_FEED, &header.attrs())?;
        if options.count {
            let count = collection.count.unwrap_or(collection.len() as i64);
            xml.text_element(M_COUNT, &[], &count.to_string())?;
        }
        for entity in &collection.entities {
            let ty = resolve_derived(edm, entity_type, entity.type_name.as_deref())?;
            let id = resolve_entity_id(edm, options.entity_set.as_deref(), ty, entity)?;
            writer.write_reference(&mut xml, &[], id)?;
        }
        if let Some(next) = &collection.next_link {
            xml.empty(A_LINK, &[("rel", "next"), ("href", next.as_str())])?;
        }
        xml.end(A_FEED)?;
        Ok(self.finish(xml))
    }

    fn delta(
        &self,
        _metadata: &ServiceMetadata,
        _entity_type: &StructuredType,
        _delta: &Delta,
        _options: &DeltaOptions,
    ) -> SerResult<SerializedContent> {
        Err(SerializerError::NotImplemented("delta payloads in Atom/XML".to_string()))
    }
}

/// `<tag href><a:title/></tag>` entry of the service workspace.
fn write_resource<W: std::io::Write>(
    xml: &mut XmlWriter<W>,
    tag: &str,
    name: &str,
    title: Option<&str>,
) -> SerResult<()> {
    let href = encode_segment(name);
    xml.start(tag, &[("href", href.as_str())])?;
    xml.text_element(A_TITLE, &[], title.unwrap_or(name))?;
    xml.end(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NS_DATA;
    use crate::data::ComplexValue;
    use crate::edm::{
        Edm, EdmPrimitiveKind, EntityContainer, EntitySet, SchemaBuilder, Singleton,
        StructuredTypeBuilder,
    };
    use std::sync::Arc;

    fn metadata() -> ServiceMetadata {
        ServiceMetadata::new(Arc::new(Edm::new(vec![SchemaBuilder::new("ns")
            .structured_type(
                StructuredTypeBuilder::entity("ns.ETTwoPrim")
                    .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
                    .primitive("PropertyString", EdmPrimitiveKind::String)
                    .build(),
            )
            .structured_type(
                StructuredTypeBuilder::complex("ns.CTTwoPrim")
                    .primitive("PropertyInt16", EdmPrimitiveKind::Int16)
                    .primitive("PropertyString", EdmPrimitiveKind::String)
                    .build(),
            )
            .container(
                EntityContainer::new("ns.Container")
                    .entity_set(EntitySet::new("ESTwoPrim", "ns.ETTwoPrim"))
                    .singleton(Singleton::new("SINav", "ns.ETTwoPrim")),
            )
            .build()])))
        .etag("W/\"1\"")
    }

    fn entity(key: i16) -> Entity {
        Entity::new()
            .property(Property::primitive("PropertyInt16", key))
            .property(Property::primitive("PropertyString", "x"))
    }

    #[test]
    fn test_feed_document() {
        let md = metadata();
        let ty = md.edm.entity_type(&"ns.ETTwoPrim".into()).unwrap();
        let collection = EntityCollection::new().push(entity(1)).push(entity(2)).next_link("next");
        let options = EntityCollectionOptions {
            context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
            count: true,
            ..Default::default()
        };
        let content = XmlSerializer::new(ContentType::xml())
            .entity_collection(&md, ty, &collection, &options)
            .unwrap();
        let doc = roxmltree::Document::parse(content.as_str().unwrap()).unwrap();
        let feed = doc.root_element();
        assert!(feed.has_tag_name((NS_ATOM, "feed")));
        assert_eq!(feed.attribute((NS_METADATA, "context")), Some("$metadata#ESTwoPrim"));
        assert_eq!(feed.attribute((NS_METADATA, "metadata-etag")), Some("W/\"1\""));
        let count = feed.children().find(|n| n.has_tag_name((NS_METADATA, "count"))).unwrap();
        assert_eq!(count.text(), Some("2"));
        let entries = feed.children().filter(|n| n.has_tag_name((NS_ATOM, "entry"))).count();
        assert_eq!(entries, 2);
        let next = feed
            .children()
            .find(|n| n.has_tag_name((NS_ATOM, "link")) && n.attribute("rel") == Some("next"))
            .unwrap();
        assert_eq!(next.attribute("href"), Some("next"));
    }

    #[test]
    fn test_context_required() {
        let md = metadata();
        let ty = md.edm.entity_type(&"ns.ETTwoPrim".into()).unwrap();
        let result = XmlSerializer::new(ContentType::xml()).entity(&md, ty, &entity(1), &EntityOptions::default());
        assert!(matches!(result, Err(SerializerError::NoContextUrl)));
    }

    #[test]
    fn test_primitive_and_complex_values() {
        let md = metadata();
        let serializer = XmlSerializer::new(ContentType::xml());
        let options = PrimitiveOptions {
            context_url: Some(ContextUrl::collection_of("Edm.Int16")),
            ..Default::default()
        };
        let property = Property::primitive("PropertyInt16", 7i16);
        let content = serializer
            .primitive(&md, &EdmPrimitiveKind::Int16.into(), &property, &options)
            .unwrap();
        let doc = roxmltree::Document::parse(content.as_str().unwrap()).unwrap();
        let value = doc.root_element();
        assert!(value.has_tag_name((NS_METADATA, "value")));
        assert_eq!(value.attribute((NS_METADATA, "type")), Some("Int16"));
        assert_eq!(value.text(), Some("7"));

        let ct = md.edm.complex_type(&"ns.CTTwoPrim".into()).unwrap();
        let property = Property::complex(
            "PropertyComp",
            ComplexValue::new().property(Property::primitive("PropertyInt16", 3i16)),
        );
        let options = ComplexOptions {
            context_url: Some(ContextUrl::collection_of("ns.CTTwoPrim")),
            ..Default::default()
        };
        let content = serializer.complex(&md, ct, &property, &options).unwrap();
        let doc = roxmltree::Document::parse(content.as_str().unwrap()).unwrap();
        let value = doc.root_element();
        assert_eq!(value.attribute((NS_METADATA, "type")), Some("#ns.CTTwoPrim"));
        let int16 = value.children().find(|n| n.has_tag_name((NS_DATA, "PropertyInt16"))).unwrap();
        assert_eq!(int16.text(), Some("3"));
        let null = value.children().find(|n| n.has_tag_name((NS_DATA, "PropertyString"))).unwrap();
        assert_eq!(null.attribute((NS_METADATA, "null")), Some("true"));
    }

    #[test]
    fn test_service_document() {
        let md = metadata();
        let content = XmlSerializer::new(ContentType::xml())
            .service_document(&md, Some("http://host/svc/"))
            .unwrap();
        let doc = roxmltree::Document::parse(content.as_str().unwrap()).unwrap();
        let root = doc.root_element();
        assert!(root.has_tag_name((NS_APP, "service")));
        assert_eq!(root.attribute((NS_METADATA, "context")), Some("http://host/svc/$metadata"));
        let collection = root.descendants().find(|n| n.has_tag_name((NS_APP, "collection"))).unwrap();
        assert_eq!(collection.attribute("href"), Some("ESTwoPrim"));
        assert!(root.descendants().any(|n| n.has_tag_name((NS_METADATA, "singleton"))));
    }

    #[test]
    fn test_error_and_delta() {
        let serializer = XmlSerializer::new(ContentType::xml());
        let error = ODataServerError::new(400, "bad <input>").code("E1").inner("trace", "t");
        let content = serializer.error(&error).unwrap();
        let doc = roxmltree::Document::parse(content.as_str().unwrap()).unwrap();
        let root = doc.root_element();
        assert!(root.has_tag_name((NS_METADATA, "error")));
        let message = root.children().find(|n| n.has_tag_name((NS_METADATA, "message"))).unwrap();
        assert_eq!(message.text(), Some("bad <input>"));

        let md = metadata();
        let ty = md.edm.entity_type(&"ns.ETTwoPrim".into()).unwrap();
        let result = serializer.delta(&md, ty, &Delta::default(), &DeltaOptions::default());
        assert!(matches!(result, Err(SerializerError::NotImplemented(_))));
    }
}
