// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Delta (change tracking) payloads.
//!
//! ```text
//! { "@odata.context": "...#Set/$delta", ["@odata.count"],
//!   "value": [ changed entities..., deleted entities..., added links...,
//!              deleted links... ],
//!   ["@odata.nextLink"], ["@odata.deltaLink"] }
//! ```
//!
//! Records other than plain entities of the feed's set carry their own
//! context fragment (`#Set/$entity`, `#Set/$deletedEntity`, `#Set/$link`,
//! `#Set/$deletedLink`).

use super::entity::EntityWriter;
use super::writer::JsonWriter;
use crate::config::{
    CONTEXT_MARKER, DELTA_ID, DELTA_REASON, DELTA_RELATIONSHIP, DELTA_SOURCE, DELTA_TARGET,
    ODATA_CONTEXT, ODATA_COUNT, ODATA_DELTA_LINK, ODATA_ID, ODATA_METADATA_ETAG, ODATA_NEXT_LINK,
    VALUE,
};
use crate::data::{ContextSuffix, DeletedEntity, Delta, DeltaLink, Entity, ServiceMetadata};
use crate::edm::StructuredType;
use crate::error::{SerResult, SerializerError};
use crate::ser::cycle::Ancestors;
use crate::ser::projection::Projection;
use crate::ser::resolve::{context_string, resolve_derived};
use crate::ser::uri::resolve_entity_id;
use crate::ser::DeltaOptions;
use std::io::Write;

/// `#<set>/<suffix>` fragment of a delta record.
fn fragment(set: &str, suffix: ContextSuffix) -> String {
    format!("{}{}/{}", CONTEXT_MARKER, set, suffix.as_str())
}

fn required<'d>(value: Option<&'d str>, field: &'static str) -> SerResult<&'d str> {
    value.ok_or(SerializerError::MissingDeltaProperty(field))
}

/// Set name an id was built from (`ESAllPrim(1)` -> `ESAllPrim`,
/// `ESTwoPrim(1)/NavContained(2)` -> `ESTwoPrim`).
///
/// The path is taken relative to `service_root` when the id starts with it.
/// An absolute id under another root keeps the segment before the first key.
fn id_set<'i>(id: &'i str, service_root: Option<&str>) -> &'i str {
    let path = service_root
        .and_then(|root| id.strip_prefix(root))
        .unwrap_or(id)
        .trim_start_matches('/');
    let head = path.split('(').next().unwrap_or(path);
    if head.contains("://") {
        head.rsplit('/').next().unwrap_or(head)
    } else {
        head.split('/').next().unwrap_or(head)
    }
}

impl EntityWriter<'_> {
    pub(crate) fn write_delta<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        metadata: &ServiceMetadata,
        entity_type: &StructuredType,
        delta: &Delta,
        options: &DeltaOptions,
    ) -> SerResult<()> {
        let context = options
            .context_url
            .as_ref()
            .ok_or(SerializerError::NoContextUrl)?;
        let set = context
            .entity_set_or_singleton_or_type
            .clone()
            .ok_or(SerializerError::IllegalContextUrl("delta feed without entity set"))?;
        let mut feed_context = context.clone();
        if feed_context.suffix.is_none() {
            feed_context.suffix = Some(ContextSuffix::Delta);
        }
        let select = options.select.as_ref();
        let expand = options.expand.as_ref();
        let context = context_string(Some(&feed_context), select, expand, true)?;

        log::debug!(
            "[delta] feed for {}: {} changed, {} deleted, {} links",
            set,
            delta.entities.len(),
            delta.deleted_entities.len(),
            delta.added_links.len() + delta.deleted_links.len()
        );

        json.begin_object()?;
        if !self.none() {
            json.opt_string_field(ODATA_CONTEXT, context.as_deref())?;
            json.opt_string_field(ODATA_METADATA_ETAG, metadata.etag.as_deref())?;
        }
        if options.count {
            let count = delta.count.unwrap_or(delta.entities.len() as i64);
            self.write_count(json, ODATA_COUNT, count)?;
        }
        json.name(VALUE)?;
        json.begin_array()?;
        let projection = Projection::new(select, expand);
        let mut ancestors = Ancestors::new();
        let root = feed_context.service_root.as_deref();
        for entity in &delta.entities {
            self.write_changed(json, entity_type, entity, &set, root, projection, &mut ancestors)?;
        }
        for deleted in &delta.deleted_entities {
            self.write_deleted(json, &set, deleted)?;
        }
        for link in &delta.added_links {
            self.write_link(json, &set, link, ContextSuffix::Link)?;
        }
        for link in &delta.deleted_links {
            self.write_link(json, &set, link, ContextSuffix::DeletedLink)?;
        }
        json.end_array()?;
        json.opt_string_field(ODATA_NEXT_LINK, delta.next_link.as_deref())?;
        json.opt_string_field(ODATA_DELTA_LINK, delta.delta_link.as_deref())?;
        json.end_object()?;
        Ok(())
    }

    /// Added or changed entity. An entity whose id points into another set
    /// gets that set's `$entity` fragment.
    fn write_changed<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        entity_type: &StructuredType,
        entity: &Entity,
        set: &str,
        service_root: Option<&str>,
        projection: Projection<'_>,
        ancestors: &mut Ancestors,
    ) -> SerResult<()> {
        let ty = resolve_derived(self.edm, entity_type, entity.type_name.as_deref())?;
        let id = resolve_entity_id(self.edm, Some(set), ty, entity)?;
        let foreign = id_set(id, service_root);
        let crossing = (foreign != set).then(|| fragment(foreign, ContextSuffix::Entity));
        let mut header: Vec<(&str, &str)> = Vec::with_capacity(2);
        if let Some(context) = &crossing {
            header.push((ODATA_CONTEXT, context.as_str()));
        }
        // full metadata writes the id with the rest of the control information
        if !self.full() {
            header.push((ODATA_ID, id));
        }
        self.write_entity(json, entity_type, entity, Some(set), &header, projection, false, ancestors)
    }

    fn write_deleted<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        set: &str,
        deleted: &DeletedEntity,
    ) -> SerResult<()> {
        let id = required(deleted.id.as_deref(), DELTA_ID)?;
        let reason = deleted
            .reason
            .ok_or(SerializerError::MissingDeltaProperty(DELTA_REASON))?;
        json.begin_object()?;
        json.string_field(ODATA_CONTEXT, &fragment(set, ContextSuffix::DeletedEntity))?;
        json.string_field(DELTA_ID, id)?;
        json.string_field(DELTA_REASON, reason.as_str())?;
        json.end_object()?;
        Ok(())
    }

    fn write_link<W: Write>(
        &self,
        json: &mut JsonWriter<W>,
        set: &str,
        link: &DeltaLink,
        suffix: ContextSuffix,
    ) -> SerResult<()> {
        let source = required(link.source.as_deref(), DELTA_SOURCE)?;
        let relationship = required(link.relationship.as_deref(), DELTA_RELATIONSHIP)?;
        let target = required(link.target.as_deref(), DELTA_TARGET)?;
        json.begin_object()?;
        json.string_field(ODATA_CONTEXT, &fragment(set, suffix))?;
        json.string_field(DELTA_SOURCE, source)?;
        json.string_field(DELTA_RELATIONSHIP, relationship)?;
        json.string_field(DELTA_TARGET, target)?;
        json.end_object()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_set() {
        assert_eq!(id_set("ESDelta(1)", None), "ESDelta");
        assert_eq!(id_set("http://host/svc/ESAllPrim(PropertyInt16=1)", None), "ESAllPrim");
        assert_eq!(id_set("SI", None), "SI");
        assert_eq!(id_set("ESTwoPrim(1)/NavContained(2)", None), "ESTwoPrim");
        assert_eq!(id_set("SI/NavContained(2)", None), "SI");
        assert_eq!(
            id_set("http://host/svc/ESTwoPrim(1)/NavContained(2)", Some("http://host/svc/")),
            "ESTwoPrim"
        );
        assert_eq!(id_set("http://host/svc/ESTwoPrim(1)/NavContained(2)", None), "ESTwoPrim");
        assert_eq!(fragment("ESDelta", ContextSuffix::DeletedEntity), "#ESDelta/$deletedEntity");
    }
}
