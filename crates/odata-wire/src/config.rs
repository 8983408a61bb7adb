// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wire constants and runtime configuration.
//!
//! Every control-information name, namespace URI and context suffix the
//! serializers emit is defined here. **Never hardcode them elsewhere.**
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: OData v4 wire names (`@odata.*`, Atom/CSDL namespaces)
//! - **Level 2 (Dynamic)**: [`ContentType`] and [`SerializerConfig`], chosen per call
//!
//! # Example
//!
//! ```
//! use odata_wire::config::{ContentType, MetadataLevel};
//!
//! let ct = ContentType::json().with_metadata(MetadataLevel::Full).ieee754(true);
//! assert_eq!(
//!     ct.mime_type(),
//!     "application/json;odata.metadata=full;IEEE754Compatible=true"
//! );
//! ```

use serde::Deserialize;
use std::fmt;

// =======================================================================
// JSON control information (OData JSON Format v4.0 Sec.4.5)
// =======================================================================

pub const ODATA_CONTEXT: &str = "@odata.context";
pub const ODATA_METADATA_ETAG: &str = "@odata.metadataEtag";
pub const ODATA_ETAG: &str = "@odata.etag";
pub const ODATA_TYPE: &str = "@odata.type";
pub const ODATA_ID: &str = "@odata.id";
pub const ODATA_COUNT: &str = "@odata.count";
pub const ODATA_NEXT_LINK: &str = "@odata.nextLink";
pub const ODATA_DELTA_LINK: &str = "@odata.deltaLink";
pub const ODATA_READ_LINK: &str = "@odata.readLink";
pub const ODATA_EDIT_LINK: &str = "@odata.editLink";
pub const ODATA_MEDIA_ETAG: &str = "@odata.mediaEtag";
pub const ODATA_MEDIA_CONTENT_TYPE: &str = "@odata.mediaContentType";
pub const ODATA_MEDIA_READ_LINK: &str = "@odata.mediaReadLink";
pub const ODATA_MEDIA_EDIT_LINK: &str = "@odata.mediaEditLink";
pub const ODATA_NAVIGATION_LINK: &str = "@odata.navigationLink";
pub const ODATA_ASSOCIATION_LINK: &str = "@odata.associationLink";

/// Name of the array member carrying collection payloads.
pub const VALUE: &str = "value";

// Delta record members
pub const DELTA_ID: &str = "id";
pub const DELTA_REASON: &str = "reason";
pub const DELTA_SOURCE: &str = "source";
pub const DELTA_RELATIONSHIP: &str = "relationship";
pub const DELTA_TARGET: &str = "target";

// Bound operation advert members
pub const OPERATION_TITLE: &str = "title";
pub const OPERATION_TARGET: &str = "target";

// Error document members
pub const ERROR: &str = "error";
pub const ERROR_CODE: &str = "code";
pub const ERROR_MESSAGE: &str = "message";
pub const ERROR_TARGET: &str = "target";
pub const ERROR_DETAILS: &str = "details";
pub const ERROR_INNER: &str = "innererror";

// =======================================================================
// Context URL grammar (OData Protocol v4.0 Sec.10)
// =======================================================================

pub const METADATA_SEGMENT: &str = "$metadata";
pub const CONTEXT_MARKER: char = '#';

// =======================================================================
// XML namespaces (Atom, OData metadata/data, CSDL, EDMX, AtomPub)
// =======================================================================

pub const NS_ATOM: &str = "http://www.w3.org/2005/Atom";
pub const NS_APP: &str = "http://www.w3.org/2007/app";
pub const NS_METADATA: &str = "http://docs.oasis-open.org/odata/ns/metadata";
pub const NS_DATA: &str = "http://docs.oasis-open.org/odata/ns/data";
pub const NS_EDMX: &str = "http://docs.oasis-open.org/odata/ns/edmx";
pub const NS_EDM: &str = "http://docs.oasis-open.org/odata/ns/edm";
pub const NS_SCHEME: &str = "http://docs.oasis-open.org/odata/ns/scheme";
pub const NS_NAVIGATION_LINK_REL: &str = "http://docs.oasis-open.org/odata/ns/related/";
pub const NS_ASSOCIATION_LINK_REL: &str = "http://docs.oasis-open.org/odata/ns/relatedlinks/";
pub const NS_MEDIA_READ_LINK_REL: &str = "http://docs.oasis-open.org/odata/ns/mediaresource/";
pub const NS_MEDIA_EDIT_LINK_REL: &str = "http://docs.oasis-open.org/odata/ns/edit-media/";

/// CSDL version written into `$Version` / `edmx:Edmx Version`.
pub const CSDL_VERSION: &str = "4.0";

/// Namespace of the built-in primitive types.
pub const EDM_NAMESPACE: &str = "Edm";

// =======================================================================
// Runtime configuration
// =======================================================================

/// Amount of control information embedded in a JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataLevel {
    None,
    #[default]
    Minimal,
    Full,
}

impl MetadataLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Minimal => "minimal",
            Self::Full => "full",
        }
    }
}

/// Wire format family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Xml,
}

/// Negotiated output shape: format plus the content-type parameters that
/// change the payload (`odata.metadata`, `IEEE754Compatible`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(default)]
pub struct ContentType {
    pub format: Format,
    pub metadata: MetadataLevel,
    #[serde(rename = "IEEE754Compatible", alias = "ieee754_compatible")]
    pub ieee754_compatible: bool,
}

impl ContentType {
    /// `application/json;odata.metadata=minimal`.
    pub fn json() -> Self {
        Self::default()
    }

    /// `application/json;odata.metadata=full`.
    pub fn json_full() -> Self {
        Self::json().with_metadata(MetadataLevel::Full)
    }

    /// `application/json;odata.metadata=none`.
    pub fn json_no_metadata() -> Self {
        Self::json().with_metadata(MetadataLevel::None)
    }

    /// Atom/XML payloads, CSDL XML metadata.
    pub fn xml() -> Self {
        Self {
            format: Format::Xml,
            ..Self::default()
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataLevel) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn ieee754(mut self, compatible: bool) -> Self {
        self.ieee754_compatible = compatible;
        self
    }

    pub fn is_json(&self) -> bool {
        self.format == Format::Json
    }

    pub fn metadata_none(&self) -> bool {
        self.metadata == MetadataLevel::None
    }

    pub fn metadata_full(&self) -> bool {
        self.metadata == MetadataLevel::Full
    }

    /// Media type string with the parameters that shaped the payload.
    pub fn mime_type(&self) -> String {
        match self.format {
            Format::Json => {
                let mut s = format!("application/json;odata.metadata={}", self.metadata.as_str());
                if self.ieee754_compatible {
                    s.push_str(";IEEE754Compatible=true");
                }
                s
            }
            Format::Xml => "application/xml".to_string(),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mime_type())
    }
}

/// Default number of chunks the streaming relay buffers before the producer blocks.
pub const DEFAULT_RELAY_CAPACITY: usize = 16;

/// Default size of a relay chunk in bytes.
pub const DEFAULT_RELAY_CHUNK_SIZE: usize = 8 * 1024;

/// Serializer configuration, loadable from any serde source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SerializerConfig {
    pub content_type: ContentType,
    /// Chunks buffered between a streaming producer and its reader.
    pub relay_capacity: usize,
    /// Bytes accumulated before a chunk is handed to the reader.
    pub relay_chunk_size: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            content_type: ContentType::default(),
            relay_capacity: DEFAULT_RELAY_CAPACITY,
            relay_chunk_size: DEFAULT_RELAY_CHUNK_SIZE,
        }
    }
}

impl SerializerConfig {
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type,
            ..Self::default()
        }
    }
}
