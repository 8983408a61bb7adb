// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Data graph handed to the serializers.
//!
//! Everything here is built by the data layer and read-only during a
//! serialize call; the only interior mutability is the write-once entity id
//! and the write-once inline content of links.

mod context;
mod delta;
mod entity;
mod metadata;
mod value;

pub use context::{ContextSuffix, ContextUrl};
pub use delta::{DeletedEntity, DeletedReason, Delta, DeltaLink};
pub use entity::{Entity, EntityCollection, Inline, Link, Operation};
pub use metadata::{ErrorDetail, ODataServerError, ServiceMetadata};
pub use value::{
    ComplexValue, EnumValue, InstanceAnnotation, PrimitiveValue, Property, StreamValue, Value,
};
