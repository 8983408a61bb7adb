// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # odata-wire - OData v4 payload encoding
//!
//! Turns an in-memory data graph (entities, collections, properties,
//! change sets) plus its Entity Data Model into OData v4 wire documents:
//! JSON, Atom/XML, and the CSDL JSON/XML `$metadata` document.
//!
//! ## Quick Start
//!
//! ```rust
//! use odata_wire::data::{ContextSuffix, ContextUrl, Entity, Property, ServiceMetadata};
//! use odata_wire::edm::{Edm, EdmPrimitiveKind, EdmProvider, SchemaBuilder, StructuredTypeBuilder};
//! use odata_wire::ser::{create_serializer, EntityOptions};
//! use odata_wire::ContentType;
//! use std::sync::Arc;
//!
//! let edm = Edm::new(vec![SchemaBuilder::new("ns")
//!     .structured_type(
//!         StructuredTypeBuilder::entity("ns.ETTwoPrim")
//!             .key_property("PropertyInt16", EdmPrimitiveKind::Int16)
//!             .primitive("PropertyString", EdmPrimitiveKind::String)
//!             .build(),
//!     )
//!     .build()]);
//! let metadata = ServiceMetadata::new(Arc::new(edm));
//! let ty = metadata.edm.entity_type(&"ns.ETTwoPrim".into()).unwrap();
//!
//! let entity = Entity::new()
//!     .property(Property::primitive("PropertyInt16", 1i16))
//!     .property(Property::primitive("PropertyString", "a"));
//! let options = EntityOptions {
//!     context_url: Some(ContextUrl::entity_set("ESTwoPrim").suffix(ContextSuffix::Entity)),
//!     ..Default::default()
//! };
//!
//! let serializer = create_serializer(&ContentType::json()).unwrap();
//! let doc = serializer.entity(&metadata, ty, &entity, &options).unwrap();
//! assert_eq!(
//!     doc.as_str().unwrap(),
//!     r#"{"@odata.context":"$metadata#ESTwoPrim/$entity","PropertyInt16":1,"PropertyString":"a"}"#
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                    ser::create_serializer(ContentType)              |
//! |        JsonSerializer | XmlSerializer | EdmAssistedSerializer       |
//! +---------------------------------------------------------------------+
//! |   projection ($select/$expand) | cycle detection | context URLs     |
//! |   primitive codec | key predicates and canonical ids                |
//! +---------------------------------------------------------------------+
//! |   data: Entity, EntityCollection, Property, Value, Delta            |
//! |   edm:  EdmProvider, StructuredType, Schema, annotation expressions |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Modules Overview
//!
//! - [`ser`] - serializers, options and streaming (start here)
//! - [`data`] - the data graph being serialized
//! - [`edm`] - the type catalog the data is checked against
//! - [`query`] - parsed `$select` / `$expand` trees
//! - [`config`] - content types, wire constants, relay sizing
//! - [`error`] - [`SerializerError`]
//!
//! ## Features
//!
//! - `xml` (default): Atom/XML payloads and CSDL XML
//! - `streaming` (default): collections written on a producer thread
//!   through a bounded relay ([`ser::ContentStream`])

/// Content types, metadata levels, wire constants and serializer config.
pub mod config;
/// Data graph: entities, values, links, delta records, service metadata.
pub mod data;
/// Entity Data Model catalog and the `EdmProvider` lookup seam.
pub mod edm;
/// Serializer error taxonomy.
pub mod error;
/// Already-parsed `$select` / `$expand` options.
pub mod query;
/// OData JSON and Atom/XML serializers.
pub mod ser;

pub use config::{ContentType, Format, MetadataLevel, SerializerConfig};
pub use error::{SerResult, SerializerError};
pub use ser::{create_serializer, ODataSerializer, SerializedContent};
