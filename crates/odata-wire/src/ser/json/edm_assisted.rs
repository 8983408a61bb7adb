// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON serializer for data that is only partly described by the EDM.
//!
//! Properties the entity type declares go through the regular typed path;
//! everything else (or everything, without a type) is rendered from the
//! value itself. Inline navigation content is written recursively as
//! found on the links, without `$expand`.

use super::entity::EntityWriter;
use super::writer::JsonWriter;
use crate::config::{
    ContentType, Format, ODATA_CONTEXT, ODATA_COUNT, ODATA_DELTA_LINK, ODATA_EDIT_LINK,
    ODATA_ETAG, ODATA_ID, ODATA_METADATA_ETAG, ODATA_NAVIGATION_LINK, ODATA_NEXT_LINK,
    ODATA_READ_LINK, ODATA_TYPE, VALUE,
};
use crate::data::{ContextUrl, Entity, EntityCollection, Inline, ServiceMetadata};
use crate::edm::{Edm, EdmProvider, StructuredType};
use crate::error::{SerResult, SerializerError};
use crate::ser::cycle::Ancestors;
use crate::ser::projection::Projection;
use crate::ser::resolve::{
    context_string, entity_set_scope, nested_set, resolve_derived, type_annotation,
};
use crate::ser::SerializedContent;
use std::io::Write;

#[derive(Debug, Clone, Default)]
pub struct EdmAssistedOptions {
    pub context_url: Option<ContextUrl>,
}

/// JSON serializer working from values first, EDM second.
#[derive(Debug, Clone, Copy)]
pub struct EdmAssistedSerializer {
    content_type: ContentType,
}

impl EdmAssistedSerializer {
    /// Output is always JSON; only the metadata level and IEEE754 flag of
    /// `content_type` are used.
    pub fn new(content_type: ContentType) -> Self {
        Self {
            content_type: ContentType {
                format: Format::Json,
                ..content_type
            },
        }
    }

    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Serialize `collection`. Without `metadata` every property is
    /// inferred; without `entity_type` the same holds for each entity.
    pub fn entity_collection(
        &self,
        metadata: Option<&ServiceMetadata>,
        entity_type: Option<&StructuredType>,
        collection: &EntityCollection,
        options: &EdmAssistedOptions,
    ) -> SerResult<SerializedContent> {
        let empty;
        let edm: &dyn EdmProvider = match metadata {
            Some(md) => md.edm.as_ref(),
            None => {
                empty = Edm::new(Vec::new());
                &empty
            }
        };
        let writer = EntityWriter::new(edm, self.content_type);
        let context = context_string(options.context_url.as_ref(), None, None, false)?;
        let set = entity_set_scope(edm, options.context_url.as_ref());
        let mut json = JsonWriter::new(Vec::new());
        let mut ancestors = Ancestors::new();

        json.begin_object()?;
        if !writer.none() {
            json.opt_string_field(ODATA_CONTEXT, context.as_deref())?;
            json.opt_string_field(ODATA_METADATA_ETAG, metadata.and_then(|m| m.etag.as_deref()))?;
        }
        if let Some(count) = collection.count {
            writer.write_count(&mut json, ODATA_COUNT, count)?;
        }
        json.name(VALUE)?;
        json.begin_array()?;
        for entity in &collection.entities {
            writer.write_assisted_entity(&mut json, entity_type, entity, set.as_deref(), &mut ancestors)?;
        }
        json.end_array()?;
        json.opt_string_field(ODATA_NEXT_LINK, collection.next_link.as_deref())?;
        json.opt_string_field(ODATA_DELTA_LINK, collection.delta_link.as_deref())?;
        json.end_object()?;
        Ok(SerializedContent::new(json.into_inner(), self.content_type))
    }
}

impl EntityWriter<'_> {
    fn write_assisted_entity<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        entity_type: Option<&StructuredType>,
        entity: &Entity,
        set: Option<&str>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = match entity_type {
            Some(base) => Some(resolve_derived(self.edm, base, entity.type_name.as_deref())?),
            None => None,
        };
        let id = match ty {
            Some(ty) => self.entity_id(set, ty, entity)?,
            None => entity.id(),
        };
        // entities without an id are keyed by address for cycle detection
        let key = id.map_or_else(|| format!("{:p}", entity), str::to_string);
        let mut scope = ancestors.enter(&key);
        if scope.is_cycle() {
            let id = id.ok_or(SerializerError::MissingId)?;
            log::debug!("[json] {} reached again through inline content, writing reference", id);
            return self.write_reference(json, &[], id);
        }

        json.begin_object()?;
        if !self.none() {
            json.opt_string_field(ODATA_ETAG, entity.etag.as_deref())?;
        }
        if self.full() {
            let type_name = match (ty, &entity.type_name) {
                (Some(ty), _) => Some(type_annotation(&ty.name, false)),
                (None, Some(name)) => Some(format!("#{}", name.trim_start_matches('#'))),
                (None, None) => None,
            };
            json.opt_string_field(ODATA_TYPE, type_name.as_deref())?;
            json.opt_string_field(ODATA_ID, id)?;
            json.opt_string_field(ODATA_READ_LINK, entity.read_link.as_deref())?;
            json.opt_string_field(ODATA_EDIT_LINK, entity.edit_link.as_deref())?;
        }
        self.write_instance_annotations(json, "", &entity.annotations)?;

        for property in &entity.properties {
            let declared = ty.and_then(|ty| self.edm.structural_property(ty, &property.name));
            match declared {
                Some(decl) => self.write_property(
                    json,
                    decl,
                    Some(property),
                    set,
                    Projection::default(),
                    &mut scope,
                )?,
                None => self.write_inferred_property(json, property, &mut scope)?,
            }
        }

        for link in &entity.navigation_links {
            let navigation = ty.and_then(|ty| self.edm.navigation_property(ty, &link.title));
            let target = navigation.and_then(|n| self.edm.entity_type(&n.type_name));
            let child_set = navigation.and_then(|n| nested_set(self.edm, set, &n.name));
            match link.inline() {
                Some(Inline::Entity(child)) => {
                    json.name(&link.title)?;
                    self.write_assisted_entity(json, target, child, child_set.as_deref(), &mut scope)?;
                }
                Some(Inline::Collection(children)) => {
                    if let Some(count) = children.count {
                        self.write_count(json, &format!("{}{}", link.title, ODATA_COUNT), count)?;
                    }
                    json.name(&link.title)?;
                    json.begin_array()?;
                    for child in &children.entities {
                        self.write_assisted_entity(json, target, child, child_set.as_deref(), &mut scope)?;
                    }
                    json.end_array()?;
                }
                None => {
                    if self.full() {
                        if let Some(href) = &link.href {
                            json.string_field(&format!("{}{}", link.title, ODATA_NAVIGATION_LINK), href)?;
                        }
                    }
                }
            }
        }
        self.write_operations(json, &entity.operations)?;
        json.end_object()?;
        Ok(())
    }
}
