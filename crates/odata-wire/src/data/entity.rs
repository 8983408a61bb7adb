// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entities, links and collections.

use crate::data::value::{InstanceAnnotation, Property};
use crate::error::{SerResult, SerializerError};
use std::sync::{Arc, OnceLock};

/// Bound action/function advert (`"#ns.Action": {"title", "target"}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    /// `#`-prefixed metadata anchor, usually `#<qualified operation name>`.
    pub metadata_anchor: String,
    pub title: Option<String>,
    pub target: Option<String>,
}

impl Operation {
    pub fn new(metadata_anchor: impl Into<String>) -> Self {
        Self {
            metadata_anchor: metadata_anchor.into(),
            title: None,
            target: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }
}

/// Inline content of a navigation link.
#[derive(Debug, Clone)]
pub enum Inline {
    Entity(Arc<Entity>),
    Collection(Arc<EntityCollection>),
}

/// Navigation, association or media link.
///
/// Inline content is write-once so that graphs with back references can be
/// assembled after their nodes are shared.
#[derive(Debug, Clone, Default)]
pub struct Link {
    /// Name of the navigation property.
    pub title: String,
    pub rel: Option<String>,
    pub href: Option<String>,
    pub link_type: Option<String>,
    pub media_etag: Option<String>,
    inline: OnceLock<Inline>,
}

impl Link {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }

    pub fn inline_entity(self, entity: Arc<Entity>) -> Self {
        let _ = self.inline.set(Inline::Entity(entity));
        self
    }

    pub fn inline_collection(self, collection: Arc<EntityCollection>) -> Self {
        let _ = self.inline.set(Inline::Collection(collection));
        self
    }

    /// Attach inline content to an already shared link. Returns `false`
    /// when content was attached before.
    pub fn set_inline(&self, inline: Inline) -> bool {
        self.inline.set(inline).is_ok()
    }

    pub fn inline(&self) -> Option<&Inline> {
        self.inline.get()
    }

    pub fn inline_entity_ref(&self) -> Option<&Arc<Entity>> {
        match self.inline.get()? {
            Inline::Entity(e) => Some(e),
            Inline::Collection(_) => None,
        }
    }

    pub fn inline_collection_ref(&self) -> Option<&Arc<EntityCollection>> {
        match self.inline.get()? {
            Inline::Collection(c) => Some(c),
            Inline::Entity(_) => None,
        }
    }
}

// Inline content compares by identity; structural comparison could recurse
// forever on cyclic graphs.
impl PartialEq for Link {
    fn eq(&self, other: &Self) -> bool {
        let inline_eq = match (self.inline.get(), other.inline.get()) {
            (None, None) => true,
            (Some(Inline::Entity(a)), Some(Inline::Entity(b))) => Arc::ptr_eq(a, b),
            (Some(Inline::Collection(a)), Some(Inline::Collection(b))) => Arc::ptr_eq(a, b),
            _ => false,
        };
        inline_eq
            && self.title == other.title
            && self.rel == other.rel
            && self.href == other.href
            && self.link_type == other.link_type
            && self.media_etag == other.media_etag
    }
}

/// Entity instance.
#[derive(Debug, Clone, Default)]
pub struct Entity {
    id: OnceLock<String>,
    pub type_name: Option<String>,
    pub etag: Option<String>,
    pub read_link: Option<String>,
    pub edit_link: Option<String>,
    pub media_etag: Option<String>,
    pub media_content_type: Option<String>,
    pub media_read_link: Option<String>,
    pub media_edit_link: Option<String>,
    pub properties: Vec<Property>,
    pub navigation_links: Vec<Link>,
    pub association_links: Vec<Link>,
    pub annotations: Vec<InstanceAnnotation>,
    pub operations: Vec<Operation>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit id; it can no longer be computed from the key.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let _ = self.id.set(id.into());
        self
    }

    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn etag(mut self, etag: impl Into<String>) -> Self {
        self.etag = Some(etag.into());
        self
    }

    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn navigation(mut self, link: Link) -> Self {
        self.navigation_links.push(link);
        self
    }

    pub fn association(mut self, link: Link) -> Self {
        self.association_links.push(link);
        self
    }

    pub fn annotate(mut self, annotation: InstanceAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Id if explicit or already resolved.
    pub fn id(&self) -> Option<&str> {
        self.id.get().map(String::as_str)
    }

    /// Id, computing and caching it with `compute` on first use. Once set
    /// the id never changes.
    pub fn resolve_id(
        &self,
        compute: impl FnOnce(&Entity) -> SerResult<String>,
    ) -> SerResult<&str> {
        if let Some(id) = self.id.get() {
            return Ok(id);
        }
        let computed = compute(self)?;
        // a concurrent resolver may have won; its value is equally valid
        let _ = self.id.set(computed);
        self.id
            .get()
            .map(String::as_str)
            .ok_or(SerializerError::MissingId)
    }

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_link(&self, name: &str) -> Option<&Link> {
        self.navigation_links.iter().find(|l| l.title == name)
    }

    pub fn association_link(&self, name: &str) -> Option<&Link> {
        self.association_links.iter().find(|l| l.title == name)
    }

    /// `true` when any media field is populated.
    pub fn is_media_entity(&self) -> bool {
        self.media_etag.is_some()
            || self.media_content_type.is_some()
            || self.media_read_link.is_some()
            || self.media_edit_link.is_some()
    }
}

/// Ordered entities with paging information.
#[derive(Debug, Clone, Default)]
pub struct EntityCollection {
    pub entities: Vec<Arc<Entity>>,
    pub count: Option<i64>,
    pub next_link: Option<String>,
    pub delta_link: Option<String>,
    pub operations: Vec<Operation>,
}

impl EntityCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, entity: Entity) -> Self {
        self.entities.push(Arc::new(entity));
        self
    }

    pub fn push_shared(mut self, entity: Arc<Entity>) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }

    pub fn next_link(mut self, link: impl Into<String>) -> Self {
        self.next_link = Some(link.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_cached_once() {
        let entity = Entity::new();
        assert_eq!(entity.id(), None);
        let id = entity.resolve_id(|_| Ok("ESAllPrim(1)".to_string())).unwrap();
        assert_eq!(id, "ESAllPrim(1)");
        let again = entity.resolve_id(|_| Ok("other".to_string())).unwrap();
        assert_eq!(again, "ESAllPrim(1)");
    }

    #[test]
    fn test_explicit_id_wins() {
        let entity = Entity::new().with_id("ESTwoPrim(32766)");
        let id = entity.resolve_id(|_| Err(SerializerError::MissingId)).unwrap();
        assert_eq!(id, "ESTwoPrim(32766)");
    }

    #[test]
    fn test_cycle_can_be_built() {
        let a = Arc::new(Entity::new().with_id("A").navigation(Link::new("Next")));
        let b = Arc::new(
            Entity::new()
                .with_id("B")
                .navigation(Link::new("Next").inline_entity(a.clone())),
        );
        assert!(a.navigation_link("Next").unwrap().set_inline(Inline::Entity(b.clone())));
        assert!(!a.navigation_link("Next").unwrap().set_inline(Inline::Entity(b)));
        let back = a.navigation_link("Next").unwrap().inline_entity_ref().unwrap();
        assert_eq!(back.id(), Some("B"));
    }
}
