// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Serializer error taxonomy.

use std::fmt;
use std::io;
use thiserror::Error;

/// Failure of a serialize call.
///
/// Every variant aborts the call; the partially written output must be
/// discarded by the caller.
#[derive(Debug, Error)]
pub enum SerializerError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Entity id is null and cannot be computed")]
    MissingId,

    #[error("Non-nullable property not present: {0}")]
    MissingProperty(String),

    #[error("Wrong value for property {property}: {value}")]
    WrongPropertyValue { property: String, value: String },

    #[error("Property type not supported: {0}")]
    UnsupportedPropertyType(String),

    #[error("Inconsistent property type: {0}")]
    InconsistentPropertyType(String),

    #[error("Context URL is required but absent")]
    NoContextUrl,

    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type {derived} does not derive from {base}")]
    WrongBaseType { derived: String, base: String },

    #[error("Delta record is missing {0}")]
    MissingDeltaProperty(&'static str),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Illegal context URL: {0}")]
    IllegalContextUrl(&'static str),
}

impl SerializerError {
    /// Stable machine key for the failure category.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_EXCEPTION",
            Self::MissingId => "MISSING_ID",
            Self::MissingProperty(_) => "MISSING_PROPERTY",
            Self::WrongPropertyValue { .. } => "WRONG_PROPERTY_VALUE",
            Self::UnsupportedPropertyType(_) => "UNSUPPORTED_PROPERTY_TYPE",
            Self::InconsistentPropertyType(_) => "INCONSISTENT_PROPERTY_TYPE",
            Self::NoContextUrl => "NO_CONTEXT_URL",
            Self::UnknownType(_) => "UNKNOWN_TYPE",
            Self::WrongBaseType { .. } => "WRONG_BASE_TYPE",
            Self::MissingDeltaProperty(_) => "MISSING_DELTA_PROPERTY",
            Self::NotImplemented(_) => "NOT_IMPLEMENTED",
            Self::IllegalContextUrl(_) => "ILLEGAL_CONTEXT_URL",
        }
    }

    pub(crate) fn wrong_value(property: &str, value: impl fmt::Display) -> Self {
        Self::WrongPropertyValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    /// Wrap a writer-side failure (XML event writer, formatter) as I/O.
    pub(crate) fn sink(err: impl fmt::Display) -> Self {
        Self::Io(io::Error::other(err.to_string()))
    }
}

/// Result type for serializer operations.
pub type SerResult<T> = Result<T, SerializerError>;

/// Combine the outcome of a document body with the outcome of closing its sink.
///
/// A body failure always wins; a close failure after it is only logged. A
/// close failure on an otherwise successful body surfaces as `Io`.
pub(crate) fn close_after<T>(body: SerResult<T>, close: io::Result<()>) -> SerResult<T> {
    match (body, close) {
        (Ok(v), Ok(())) => Ok(v),
        (Ok(_), Err(e)) => Err(SerializerError::Io(e)),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(close_err)) => {
            log::debug!("[error] close failure suppressed after {}: {}", e.code(), close_err);
            Err(e)
        }
    }
}
