// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OData JSON format.
//!
//! [`JsonSerializer`] writes every document through a [`JsonWriter`] over
//! an in-memory buffer, or over a relay for streamed collections. The
//! metadata level of the content type decides which control information
//! is written:
//!
//! | level   | context / metadataEtag | etag | type               | id, links |
//! |---------|------------------------|------|--------------------|-----------|
//! | none    | -                      | -    | -                  | -         |
//! | minimal | yes                    | yes  | derived types only | -         |
//! | full    | yes                    | yes  | yes                | yes       |

mod csdl;
mod delta;
mod document;
mod edm_assisted;
mod entity;
mod writer;

pub use edm_assisted::{EdmAssistedOptions, EdmAssistedSerializer};
pub use writer::JsonWriter;

use self::csdl::CsdlJsonWriter;
use self::entity::EntityWriter;
use crate::config::{
    ContentType, Format, SerializerConfig, ODATA_CONTEXT, ODATA_COUNT, ODATA_DELTA_LINK,
    ODATA_METADATA_ETAG, ODATA_NEXT_LINK, ODATA_TYPE, VALUE,
};
use crate::data::{
    ContextUrl, Delta, Entity, EntityCollection, ODataServerError, Property, ServiceMetadata, Value,
};
use crate::edm::{EdmTypeRef, FullQualifiedName, StructuredType};
use crate::error::{close_after, SerResult, SerializerError};
use crate::query::{ExpandOption, SelectOption};
use crate::ser::cycle::Ancestors;
use crate::ser::projection::Projection;
use crate::ser::resolve::{context_string, entity_set_scope, resolve_derived, type_annotation};
use crate::ser::stream::EntityIterator;
use crate::ser::uri::resolve_entity_id;
use crate::ser::{
    ComplexOptions, DeltaOptions, EntityCollectionOptions, EntityOptions, ODataSerializer,
    PrimitiveOptions, ReferenceCollectionOptions, ReferenceOptions, SerializedContent,
};
use std::io::Write;
#[cfg(feature = "streaming")]
use {crate::ser::stream::ContentStream, std::sync::Arc};

/// Document header members (`@odata.context`, `@odata.metadataEtag`).
struct Header {
    context: Option<String>,
    metadata_etag: Option<String>,
}

impl Header {
    fn fields(&self) -> Vec<(&str, &str)> {
        let mut fields = Vec::with_capacity(2);
        if let Some(context) = &self.context {
            fields.push((ODATA_CONTEXT, context.as_str()));
        }
        if let Some(etag) = &self.metadata_etag {
            fields.push((ODATA_METADATA_ETAG, etag.as_str()));
        }
        fields
    }

    fn write<W: Write>(&self, json: &mut JsonWriter<W>) -> SerResult<()> {
        for (name, value) in self.fields() {
            json.string_field(name, value)?;
        }
        Ok(())
    }
}

/// OData JSON serializer for one content type.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    config: SerializerConfig,
}

impl JsonSerializer {
    pub fn new(content_type: ContentType) -> Self {
        Self::with_config(SerializerConfig::new(content_type))
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        let mut config = config;
        config.content_type.format = Format::Json;
        Self { config }
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    fn writer<'a>(&self, metadata: &'a ServiceMetadata) -> EntityWriter<'a> {
        EntityWriter::new(metadata.edm.as_ref(), self.config.content_type)
    }

    fn finish(&self, json: JsonWriter<Vec<u8>>) -> SerializedContent {
        SerializedContent::new(json.into_inner(), self.config.content_type)
    }

    /// Header of a document; empty at metadata none, `NoContextUrl` when
    /// the context is needed but missing.
    fn header(
        &self,
        metadata: &ServiceMetadata,
        context: Option<&ContextUrl>,
        select: Option<&SelectOption>,
        expand: Option<&ExpandOption>,
    ) -> SerResult<Header> {
        if self.config.content_type.metadata_none() {
            return Ok(Header {
                context: None,
                metadata_etag: None,
            });
        }
        Ok(Header {
            context: context_string(context, select, expand, true)?,
            metadata_etag: metadata.etag.clone(),
        })
    }

    // ===== Collections =====

    fn write_collection_head<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        writer: &EntityWriter<'_>,
        header: &Header,
        count: Option<i64>,
        collection: Option<&EntityCollection>,
    ) -> SerResult<()> {
        json.begin_object()?;
        header.write(json)?;
        if let Some(count) = count {
            writer.write_count(json, ODATA_COUNT, count)?;
        }
        if let Some(collection) = collection {
            writer.write_operations(json, &collection.operations)?;
        }
        json.name(VALUE)?;
        json.begin_array()?;
        Ok(())
    }

    fn write_collection_tail<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        next_link: Option<&str>,
        delta_link: Option<&str>,
    ) -> SerResult<()> {
        json.end_array()?;
        json.opt_string_field(ODATA_NEXT_LINK, next_link)?;
        json.opt_string_field(ODATA_DELTA_LINK, delta_link)?;
        json.end_object()?;
        Ok(())
    }

    fn write_entity_collection<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &EntityCollectionOptions,
    ) -> SerResult<()> {
        let writer = self.writer(metadata);
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(writer.edm, options.context_url.as_ref());
        let count = options
            .count
            .then(|| collection.count.unwrap_or(collection.len() as i64));

        self.write_collection_head(json, &writer, &header, count, Some(collection))?;
        let projection = Projection::new(select, expand);
        let mut ancestors = Ancestors::new();
        for entity in &collection.entities {
            writer.write_entity(
                json,
                entity_type,
                entity,
                set.as_deref(),
                &[],
                projection,
                options.write_only_references,
                &mut ancestors,
            )?;
        }
        self.write_collection_tail(json, collection.next_link.as_deref(), collection.delta_link.as_deref())
    }

    /// Stream a lazily produced collection into `sink`.
    ///
    /// The count, when requested and reported by the iterator, follows the
    /// `value` array since it is only known once iteration has ended. The
    /// sink is flushed on every exit path; a flush failure never hides an
    /// earlier error.
    pub fn write_entity_collection_streamed<W: Write>(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entities: &mut dyn EntityIterator<Item = SerResult<Entity>>,
        options: &EntityCollectionOptions,
        sink: W,
    ) -> SerResult<W> {
        let mut json = JsonWriter::new(sink);
        let body = self.write_streamed_body(&mut json, metadata, entity_type, entities, options);
        let flushed = json.flush();
        close_after(body, flushed).map(|()| json.into_inner())
    }

    fn write_streamed_body<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entities: &mut dyn EntityIterator<Item = SerResult<Entity>>,
        options: &EntityCollectionOptions,
    ) -> SerResult<()> {
        let writer = self.writer(metadata);
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(writer.edm, options.context_url.as_ref());

        self.write_collection_head(json, &writer, &header, None, None)?;
        let projection = Projection::new(select, expand);
        let mut ancestors = Ancestors::new();
        let mut written = 0usize;
        for entity in &mut *entities {
            let entity = entity?;
            writer.write_entity(
                json,
                entity_type,
                &entity,
                set.as_deref(),
                &[],
                projection,
                options.write_only_references,
                &mut ancestors,
            )?;
            written += 1;
        }
        json.end_array()?;
        if options.count {
            let count = entities.inline_count().unwrap_or(written as i64);
            writer.write_count(json, ODATA_COUNT, count)?;
        }
        json.opt_string_field(ODATA_NEXT_LINK, entities.next_link().as_deref())?;
        json.end_object()?;
        log::debug!("[json] streamed {} entities", written);
        Ok(())
    }

    /// Serialize `entities` on a producer thread; the returned stream
    /// yields the document as it is written.
    #[cfg(feature = "streaming")]
    pub fn entity_collection_streamed(
        &self,
        metadata: Arc<ServiceMetadata>,
        entity_type: FullQualifiedName,
        entities: Box<dyn EntityIterator<Item = SerResult<Entity>> + Send>,
        options: EntityCollectionOptions,
    ) -> SerResult<ContentStream> {
        if metadata.edm.entity_type(&entity_type).is_none() {
            return Err(SerializerError::UnknownType(entity_type.to_string()));
        }
        let serializer = self.clone();
        let mut entities = entities;
        ContentStream::spawn(
            self.config.relay_capacity,
            self.config.relay_chunk_size,
            move |relay| {
                let ty = metadata
                    .edm
                    .entity_type(&entity_type)
                    .ok_or_else(|| SerializerError::UnknownType(entity_type.to_string()))?;
                serializer
                    .write_entity_collection_streamed(&metadata, ty, entities.as_mut(), &options, relay)
                    .map(|_| ())
            },
        )
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
        let writer = self.writer(metadata);
        let resolved = writer
            .edm
            .resolve_type(type_name)
            .filter(|t| t.structured().is_none())
            .ok_or_else(|| SerializerError::UnknownType(type_name.to_string()))?;
        let header = self.header(metadata, options.context_url.as_ref(), None, None)?;
        let value = &property.value;
        if !value.is_null() && value.is_collection() != collection {
            return Err(SerializerError::InconsistentPropertyType(property.name.clone()));
        }

        let mut json = JsonWriter::new(Vec::new());
        json.begin_object()?;
        header.write(&mut json)?;
        if writer.full() {
            let guessable = matches!(resolved, EdmTypeRef::Primitive(k) if k.is_json_guessable());
            if collection || !guessable {
                let name = match resolved {
                    EdmTypeRef::Primitive(kind) => kind.into(),
                    _ => type_name.clone(),
                };
                json.string_field(ODATA_TYPE, &type_annotation(&name, collection))?;
            }
        }
        writer.write_instance_annotations(&mut json, VALUE, &property.annotations)?;
        json.name(VALUE)?;
        if value.is_null() {
            if !options.nullable {
                return Err(SerializerError::MissingProperty(property.name.clone()));
            }
            if collection {
                json.begin_array()?;
                json.end_array()?;
            } else {
                json.null()?;
            }
        } else {
            writer.write_value(
                &mut json,
                &property.name,
                resolved,
                &options.facets,
                value,
                None,
                Projection::default(),
                &mut Ancestors::new(),
            )?;
        }
        json.end_object()?;
        Ok(self.finish(json))
    }

    fn write_complex_document(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
        collection: bool,
    ) -> SerResult<SerializedContent> {
        let writer = self.writer(metadata);
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(writer.edm, options.context_url.as_ref());
        let projection = Projection::new(select, expand);
        let mut ancestors = Ancestors::new();
        let mut json = JsonWriter::new(Vec::new());

        match (&property.value, collection) {
            (Value::Complex(value), false) => {
                writer.write_complex(
                    &mut json,
                    complex_type,
                    value,
                    set.as_deref(),
                    &header.fields(),
                    &options.operations,
                    projection,
                    &mut ancestors,
                )?;
            }
            (Value::ComplexCollection(items), true) => {
                json.begin_object()?;
                header.write(&mut json)?;
                if writer.full() {
                    json.string_field(ODATA_TYPE, &type_annotation(&complex_type.name, true))?;
                }
                writer.write_operations(&mut json, &options.operations)?;
                json.name(VALUE)?;
                json.begin_array()?;
                for item in items {
                    match item {
                        Some(value) => writer.write_complex(
                            &mut json,
                            complex_type,
                            value,
                            set.as_deref(),
                            &[],
                            &[],
                            projection,
                            &mut ancestors,
                        )?,
                        None => json.null()?,
                    }
                }
                json.end_array()?;
                json.end_object()?;
            }
            (Value::Null, true) => {
                json.begin_object()?;
                header.write(&mut json)?;
                json.name(VALUE)?;
                json.begin_array()?;
                json.end_array()?;
                json.end_object()?;
            }
            (Value::Null, false) => {
                return Err(SerializerError::MissingProperty(property.name.clone()));
            }
            _ => return Err(SerializerError::InconsistentPropertyType(property.name.clone())),
        }
        Ok(self.finish(json))
    }
}

impl ODataSerializer for JsonSerializer {
    fn content_type(&self) -> ContentType {
        self.config.content_type
    }

    fn service_document(
        &self,
        metadata: &ServiceMetadata,
        service_root: Option<&str>,
    ) -> SerResult<SerializedContent> {
        let mut json = JsonWriter::new(Vec::new());
        let with_context = !self.config.content_type.metadata_none();
        document::write_service_document(&mut json, metadata, service_root, with_context)?;
        Ok(self.finish(json))
    }

    fn metadata_document(&self, metadata: &ServiceMetadata) -> SerResult<SerializedContent> {
        let mut json = JsonWriter::new(Vec::new());
        CsdlJsonWriter::new(metadata).write(&mut json)?;
        Ok(self.finish(json))
    }

    fn error(&self, error: &ODataServerError) -> SerResult<SerializedContent> {
        let mut json = JsonWriter::new(Vec::new());
        document::write_error(&mut json, error)?;
        Ok(self.finish(json))
    }

    fn entity_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &EntityCollectionOptions,
    ) -> SerResult<SerializedContent> {
        let mut json = JsonWriter::new(Vec::new());
        self.write_entity_collection(&mut json, metadata, entity_type, collection, options)?;
        Ok(self.finish(json))
    }

    fn entity(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entity: &Entity,
        options: &EntityOptions,
    ) -> SerResult<SerializedContent> {
        let writer = self.writer(metadata);
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let header = self.header(metadata, options.context_url.as_ref(), select, expand)?;
        let set = entity_set_scope(writer.edm, options.context_url.as_ref());
        let mut json = JsonWriter::new(Vec::new());
        writer.write_entity(
            &mut json,
            entity_type,
            entity,
            set.as_deref(),
            &header.fields(),
            Projection::new(select, expand),
            options.write_only_references,
            &mut Ancestors::new(),
        )?;
        Ok(self.finish(json))
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
        let writer = self.writer(metadata);
        let ty = resolve_derived(writer.edm, entity_type, entity.type_name.as_deref())?;
        let id = resolve_entity_id(writer.edm, options.entity_set.as_deref(), ty, entity)?;
        let mut header = Vec::with_capacity(1);
        let context;
        if !writer.none() {
            let mut reference = ContextUrl::reference(false);
            reference.service_root = options.service_root.clone();
            context = reference.encode()?;
            header.push((ODATA_CONTEXT, context.as_str()));
        }
        let mut json = JsonWriter::new(Vec::new());
        writer.write_reference(&mut json, &header, id)?;
        Ok(self.finish(json))
    }

    fn reference_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &ReferenceCollectionOptions,
    ) -> SerResult<SerializedContent> {
        let writer = self.writer(metadata);
        let context = if writer.none() {
            None
        } else {
            let mut reference = ContextUrl::reference(true);
            reference.service_root = options.service_root.clone();
            Some(reference.encode()?)
        };
        let header = Header {
            context,
            metadata_etag: None,
        };
        let count = options
            .count
            .then(|| collection.count.unwrap_or(collection.len() as i64));
        let mut json = JsonWriter::new(Vec::new());
        self.write_collection_head(&mut json, &writer, &header, count, None)?;
        for entity in &collection.entities {
            let ty = resolve_derived(writer.edm, entity_type, entity.type_name.as_deref())?;
            let id = resolve_entity_id(writer.edm, options.entity_set.as_deref(), ty, entity)?;
            writer.write_reference(&mut json, &[], id)?;
        }
        self.write_collection_tail(&mut json, collection.next_link.as_deref(), None)?;
        Ok(self.finish(json))
    }

    fn delta(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        delta: &Delta,
        options: &DeltaOptions,
    ) -> SerResult<SerializedContent> {
        let writer = self.writer(metadata);
        let mut json = JsonWriter::new(Vec::new());
        writer.write_delta(&mut json, metadata, entity_type, delta, options)?;
        Ok(self.finish(json))
    }
}
