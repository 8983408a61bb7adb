// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Context URL descriptor and its rendering.
//!
//! Grammar (subset used by responses):
//!
//! ```text
//! [root] "$metadata" [ "#" ( name | "Collection(" name ")" ) [ "(" key ")" ]
//!                          [ "/" path ] [ "/" derived ] [ "(" select ")" ]
//!                          [ "/" suffix ] ]
//!                    | "#$ref" | "#Collection($ref)"
//! ```

use crate::config::{CONTEXT_MARKER, METADATA_SEGMENT};
use crate::error::{SerResult, SerializerError};
use crate::ser::uri::encode_path;

/// Trailing fragment kind of a context URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextSuffix {
    Entity,
    Reference,
    Delta,
    DeletedEntity,
    Link,
    DeletedLink,
}

impl ContextSuffix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "$entity",
            Self::Reference => "$ref",
            Self::Delta => "$delta",
            Self::DeletedEntity => "$deletedEntity",
            Self::Link => "$link",
            Self::DeletedLink => "$deletedLink",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextUrl {
    pub service_root: Option<String>,
    pub entity_set_or_singleton_or_type: Option<String>,
    pub collection: bool,
    pub derived_entity: Option<String>,
    pub select_list: Option<String>,
    pub nav_or_property_path: Option<String>,
    pub key_path: Option<String>,
    pub suffix: Option<ContextSuffix>,
}

impl ContextUrl {
    /// Context of an entity set, singleton or type name.
    pub fn entity_set(name: impl Into<String>) -> Self {
        Self {
            entity_set_or_singleton_or_type: Some(name.into()),
            ..Self::default()
        }
    }

    /// `Collection(<type>)` context.
    pub fn collection_of(type_name: impl Into<String>) -> Self {
        Self {
            entity_set_or_singleton_or_type: Some(type_name.into()),
            collection: true,
            ..Self::default()
        }
    }

    /// `$ref` context.
    pub fn reference(collection: bool) -> Self {
        Self {
            collection,
            suffix: Some(ContextSuffix::Reference),
            ..Self::default()
        }
    }

    pub fn service_root(mut self, root: impl Into<String>) -> Self {
        self.service_root = Some(root.into());
        self
    }

    pub fn suffix(mut self, suffix: ContextSuffix) -> Self {
        self.suffix = Some(suffix);
        self
    }

    pub fn select_list(mut self, list: impl Into<String>) -> Self {
        self.select_list = Some(list.into());
        self
    }

    pub fn key_path(mut self, key: impl Into<String>) -> Self {
        self.key_path = Some(key.into());
        self
    }

    pub fn navigation_path(mut self, path: impl Into<String>) -> Self {
        self.nav_or_property_path = Some(path.into());
        self
    }

    pub fn derived(mut self, derived: impl Into<String>) -> Self {
        self.derived_entity = Some(derived.into());
        self
    }

    /// Render the wire value of `@odata.context`.
    pub fn encode(&self) -> SerResult<String> {
        let mut out = String::new();
        if let Some(root) = &self.service_root {
            out.push_str(root);
        }
        out.push_str(METADATA_SEGMENT);

        if let Some(name) = &self.entity_set_or_singleton_or_type {
            out.push(CONTEXT_MARKER);
            if self.collection {
                out.push_str("Collection(");
                out.push_str(&encode_path(name));
                out.push(')');
            } else {
                out.push_str(&encode_path(name));
            }
        }
        if let Some(key) = &self.key_path {
            out.push('(');
            out.push_str(key);
            out.push(')');
        }
        if let Some(path) = &self.nav_or_property_path {
            out.push('/');
            out.push_str(&encode_path(path));
        }
        if let Some(derived) = &self.derived_entity {
            if self.entity_set_or_singleton_or_type.is_none() {
                return Err(SerializerError::IllegalContextUrl(
                    "derived type without anything to derive from",
                ));
            }
            out.push('/');
            out.push_str(&encode_path(derived));
        }
        if let Some(select) = &self.select_list {
            out.push('(');
            out.push_str(select);
            out.push(')');
        }
        match self.suffix {
            None => {}
            Some(ContextSuffix::Reference) => {
                if self.entity_set_or_singleton_or_type.is_some() {
                    return Err(SerializerError::IllegalContextUrl("$ref with entity set"));
                }
                out.push(CONTEXT_MARKER);
                if self.collection {
                    out.push_str("Collection($ref)");
                } else {
                    out.push_str(ContextSuffix::Reference.as_str());
                }
            }
            Some(suffix) => {
                if self.entity_set_or_singleton_or_type.is_none() {
                    return Err(SerializerError::IllegalContextUrl(
                        "suffix without preceding entity set",
                    ));
                }
                out.push('/');
                out.push_str(suffix.as_str());
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_set_contexts() {
        assert_eq!(ContextUrl::entity_set("ESAllPrim").encode().unwrap(), "$metadata#ESAllPrim");
        assert_eq!(
            ContextUrl::entity_set("ESAllPrim")
                .suffix(ContextSuffix::Entity)
                .service_root("http://host/svc/")
                .encode()
                .unwrap(),
            "http://host/svc/$metadata#ESAllPrim/$entity"
        );
        assert_eq!(
            ContextUrl::entity_set("ESTwoPrim")
                .select_list("PropertyInt16,PropertyString")
                .encode()
                .unwrap(),
            "$metadata#ESTwoPrim(PropertyInt16,PropertyString)"
        );
        assert_eq!(
            ContextUrl::entity_set("ESKeyNav")
                .key_path("1")
                .navigation_path("NavPropertyETTwoKeyNavMany")
                .encode()
                .unwrap(),
            "$metadata#ESKeyNav(1)/NavPropertyETTwoKeyNavMany"
        );
        assert_eq!(
            ContextUrl::collection_of("Edm.String").encode().unwrap(),
            "$metadata#Collection(Edm.String)"
        );
    }

    #[test]
    fn test_reference_contexts() {
        assert_eq!(ContextUrl::reference(false).encode().unwrap(), "$metadata#$ref");
        assert_eq!(ContextUrl::reference(true).encode().unwrap(), "$metadata#Collection($ref)");
        let bad = ContextUrl::entity_set("ESAllPrim").suffix(ContextSuffix::Reference);
        assert!(matches!(bad.encode(), Err(SerializerError::IllegalContextUrl(_))));
    }

    #[test]
    fn test_suffix_requires_set() {
        let bad = ContextUrl::default().suffix(ContextSuffix::Delta);
        assert!(matches!(bad.encode(), Err(SerializerError::IllegalContextUrl(_))));
        let derived = ContextUrl::default().derived("ns.ETBase");
        assert!(derived.encode().is_err());
    }
}
