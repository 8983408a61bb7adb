// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Change sets for delta payloads.

use crate::data::entity::Entity;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletedReason {
    /// The entity was deleted.
    Deleted,
    /// The entity left the result set for another reason.
    Changed,
}

impl DeletedReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deleted => "deleted",
            Self::Changed => "changed",
        }
    }
}

/// Deleted-entity record. Both fields are mandatory on the wire; they are
/// optional here so an incomplete record is reported, not unrepresentable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletedEntity {
    pub id: Option<String>,
    pub reason: Option<DeletedReason>,
}

impl DeletedEntity {
    pub fn new(id: impl Into<String>, reason: DeletedReason) -> Self {
        Self {
            id: Some(id.into()),
            reason: Some(reason),
        }
    }
}

/// Added or deleted relationship between two entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaLink {
    pub source: Option<String>,
    pub relationship: Option<String>,
    pub target: Option<String>,
}

impl DeltaLink {
    pub fn new(
        source: impl Into<String>,
        relationship: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            source: Some(source.into()),
            relationship: Some(relationship.into()),
            target: Some(target.into()),
        }
    }
}

/// Entity collection plus deletions and link changes.
#[derive(Debug, Clone, Default)]
pub struct Delta {
    /// Added or changed entities.
    pub entities: Vec<Arc<Entity>>,
    pub deleted_entities: Vec<DeletedEntity>,
    pub added_links: Vec<DeltaLink>,
    pub deleted_links: Vec<DeltaLink>,
    pub count: Option<i64>,
    pub next_link: Option<String>,
    pub delta_link: Option<String>,
}

impl Delta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entities.push(Arc::new(entity));
        self
    }

    pub fn deleted(mut self, deleted: DeletedEntity) -> Self {
        self.deleted_entities.push(deleted);
        self
    }

    pub fn added_link(mut self, link: DeltaLink) -> Self {
        self.added_links.push(link);
        self
    }

    pub fn deleted_link(mut self, link: DeltaLink) -> Self {
        self.deleted_links.push(link);
        self
    }

    pub fn delta_link(mut self, link: impl Into<String>) -> Self {
        self.delta_link = Some(link.into());
        self
    }

    pub fn next_link(mut self, link: impl Into<String>) -> Self {
        self.next_link = Some(link.into());
        self
    }

    pub fn count(mut self, count: i64) -> Self {
        self.count = Some(count);
        self
    }
}
