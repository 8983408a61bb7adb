// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service metadata handle and server error payloads.

use crate::edm::{EdmProvider, EdmxReference};
use crate::error::SerializerError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// EDM catalog plus document-level metadata.
#[derive(Clone)]
pub struct ServiceMetadata {
    pub edm: Arc<dyn EdmProvider>,
    /// Written as `@odata.metadataEtag` when present.
    pub etag: Option<String>,
    pub references: Vec<EdmxReference>,
}

impl ServiceMetadata {
    pub fn new(edm: Arc<dyn EdmProvider>) -> Self {
        Self {
            edm,
            etag: None,
            references: Vec::new(),
        }
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn reference(mut self, reference: EdmxReference) -> Self {
        self.references.push(reference);
        self
    }
}

impl fmt::Debug for ServiceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceMetadata")
            .field("schemas", &self.edm.schemas().len())
            .field("etag", &self.etag)
            .field("references", &self.references)
            .finish()
    }
}

/// Entry of the `details` array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetail {
    pub code: Option<String>,
    pub message: String,
    pub target: Option<String>,
}

/// Error reported to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ODataServerError {
    pub status_code: u16,
    pub code: Option<String>,
    pub message: String,
    pub target: Option<String>,
    pub details: Vec<ErrorDetail>,
    /// Rendered as `innererror`; ordered for reproducible output.
    pub inner_error: BTreeMap<String, String>,
}

impl ODataServerError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            code: None,
            message: message.into(),
            target: None,
            details: Vec::new(),
            inner_error: BTreeMap::new(),
        }
    }

    pub fn code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn detail(mut self, detail: ErrorDetail) -> Self {
        self.details.push(detail);
        self
    }

    pub fn inner(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner_error.insert(key.into(), value.into());
        self
    }
}

impl From<&SerializerError> for ODataServerError {
    fn from(err: &SerializerError) -> Self {
        ODataServerError::new(500, err.to_string()).code(err.code())
    }
}
