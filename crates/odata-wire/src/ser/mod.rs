// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! OData Serializers
//!
//! Converts a data graph plus its EDM catalog into OData v4 JSON or
//! Atom/XML documents, and the catalog itself into CSDL.
//!
//! # Architecture
//!
//! Each wire format has its own module implementing [`ODataSerializer`].
//! The [`create_serializer`] factory picks one from a [`ContentType`].
//!
//! ```text
//! +-------------------------------------------------------------+
//! |                   ODataSerializer Trait                     |
//! +-------------------------------------------------------------+
//! | service_document()  metadata_document()  error()            |
//! | entity()  entity_collection()  primitive()  complex()       |
//! | primitive_collection()  complex_collection()                |
//! | reference()  reference_collection()  delta()                |
//! +-------------------------------------------------------------+
//!                 |                             |
//!                 v                             v
//!         +---------------+             +---------------+
//!         |     JSON      |             |   Atom/XML    |
//!         | + CSDL JSON   |             | + CSDL XML    |
//!         | + streaming   |             | (feature xml) |
//!         +---------------+             +---------------+
//!                 |                             |
//!                 +--------------+--------------+
//!                                v
//!   projection (select/expand) . cycle (ancestor ids) . primitive codec
//!   uri (key predicates, canonical ids) . resolve (derived types, sets)
//! ```
//!
//! Serializers are stateless: every call allocates its own output buffer,
//! ancestor set and (for CSDL) alias map, so one instance can be shared
//! between threads.

pub mod cycle;
pub mod json;
pub mod primitive;
pub mod projection;
pub mod stream;
pub mod uri;
#[cfg(feature = "xml")]
pub mod xml;

mod csdl;
mod resolve;

pub use json::{EdmAssistedOptions, EdmAssistedSerializer, JsonSerializer};
#[cfg(feature = "streaming")]
pub use stream::ContentStream;
pub use stream::{EntityIterator, VecEntityIterator};
#[cfg(feature = "xml")]
pub use xml::XmlSerializer;

use crate::config::{ContentType, Format};
use crate::data::{
    ContextUrl, Delta, Entity, EntityCollection, ODataServerError, Operation, Property,
    ServiceMetadata,
};
use crate::edm::{FullQualifiedName, StructuredType, TypeFacets};
use crate::error::SerResult;
use crate::query::{ExpandOption, SelectOption};

/// Finished document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedContent {
    bytes: Vec<u8>,
    content_type: ContentType,
}

impl SerializedContent {
    pub(crate) fn new(bytes: Vec<u8>, content_type: ContentType) -> Self {
        Self {
            bytes,
            content_type,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Payload as text; every serializer emits UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

// ===== Options =====

#[derive(Debug, Clone, Default)]
pub struct EntityOptions {
    pub context_url: Option<ContextUrl>,
    pub select: Option<SelectOption>,
    pub expand: Option<ExpandOption>,
    /// Write the entity id only.
    pub write_only_references: bool,
}

#[derive(Debug, Clone, Default)]
pub struct EntityCollectionOptions {
    pub context_url: Option<ContextUrl>,
    pub select: Option<SelectOption>,
    pub expand: Option<ExpandOption>,
    /// `$count=true`.
    pub count: bool,
    pub write_only_references: bool,
}

#[derive(Debug, Clone)]
pub struct PrimitiveOptions {
    pub context_url: Option<ContextUrl>,
    pub facets: TypeFacets,
    pub nullable: bool,
}

impl Default for PrimitiveOptions {
    fn default() -> Self {
        Self {
            context_url: None,
            facets: TypeFacets::default(),
            nullable: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ComplexOptions {
    pub context_url: Option<ContextUrl>,
    pub select: Option<SelectOption>,
    pub expand: Option<ExpandOption>,
    /// Bound operation adverts for the value (full metadata only).
    pub operations: Vec<Operation>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceOptions {
    /// Prefix of the `$metadata#$ref` context.
    pub service_root: Option<String>,
    /// Set used to compute the id of entities without one.
    pub entity_set: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceCollectionOptions {
    pub service_root: Option<String>,
    pub entity_set: Option<String>,
    pub count: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DeltaOptions {
    /// Context of the feed; the `$delta` suffix is added when missing.
    pub context_url: Option<ContextUrl>,
    pub select: Option<SelectOption>,
    pub expand: Option<ExpandOption>,
    pub count: bool,
}

// ===== Serializer trait =====

/// Format-specific document writer.
///
/// Every method produces one complete document or fails as a whole; on
/// error no partial output is returned.
pub trait ODataSerializer: Send + Sync {
    /// Content type the documents are produced for.
    fn content_type(&self) -> ContentType;

    // ===== Service level =====

    fn service_document(
        &self,
        metadata: &ServiceMetadata,
        service_root: Option<&str>,
    ) -> SerResult<SerializedContent>;

    fn metadata_document(&self, metadata: &ServiceMetadata) -> SerResult<SerializedContent>;

    fn error(&self, error: &ODataServerError) -> SerResult<SerializedContent>;

    // ===== Entities =====

    fn entity_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &EntityCollectionOptions,
    ) -> SerResult<SerializedContent>;

    fn entity(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entity: &Entity,
        options: &EntityOptions,
    ) -> SerResult<SerializedContent>;

    // ===== Properties =====

    /// `type_name` names a primitive type, type definition or enum type.
    fn primitive(
        &self,
        metadata: &ServiceMetadata,
        type_name: &FullQualifiedName,
        property: &Property,
        options: &PrimitiveOptions,
    ) -> SerResult<SerializedContent>;

    fn complex(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
    ) -> SerResult<SerializedContent>;

    fn primitive_collection(
        &self,
        metadata: &ServiceMetadata,
        type_name: &FullQualifiedName,
        property: &Property,
        options: &PrimitiveOptions,
    ) -> SerResult<SerializedContent>;

    fn complex_collection(
        &self,
        metadata: &ServiceMetadata,
        complex_type: &StructuredType,
        property: &Property,
        options: &ComplexOptions,
    ) -> SerResult<SerializedContent>;

    // ===== References =====

    fn reference(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        entity: &Entity,
        options: &ReferenceOptions,
    ) -> SerResult<SerializedContent>;

    fn reference_collection(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        collection: &EntityCollection,
        options: &ReferenceCollectionOptions,
    ) -> SerResult<SerializedContent>;

    // ===== Change tracking =====

    fn delta(
        &self,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        delta: &Delta,
        options: &DeltaOptions,
    ) -> SerResult<SerializedContent>;
}

/// Serializer for `content_type`.
pub fn create_serializer(content_type: &ContentType) -> SerResult<Box<dyn ODataSerializer>> {
    log::debug!("[ser] creating serializer for {}", content_type);
    match content_type.format {
        Format::Json => Ok(Box::new(JsonSerializer::new(*content_type))),
        #[cfg(feature = "xml")]
        Format::Xml => Ok(Box::new(XmlSerializer::new(*content_type))),
        #[cfg(not(feature = "xml"))]
        Format::Xml => Err(crate::error::SerializerError::NotImplemented(
            "XML output (crate built without the `xml` feature)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_picks_format() {
        let json = create_serializer(&ContentType::json_full()).unwrap();
        assert!(json.content_type().metadata_full());
        #[cfg(feature = "xml")]
        {
            let xml = create_serializer(&ContentType::xml()).unwrap();
            assert_eq!(xml.content_type().format, Format::Xml);
        }
        #[cfg(not(feature = "xml"))]
        assert!(create_serializer(&ContentType::xml()).is_err());
    }

    #[test]
    fn test_serialized_content() {
        let content = SerializedContent::new(b"{}".to_vec(), ContentType::json());
        assert_eq!(content.as_str(), Some("{}"));
        assert_eq!(content.len(), 2);
        assert!(!content.is_empty());
    }
}
