// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "xml")]
#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! Atom/XML payloads parsed back with roxmltree.

mod common;

use common::{all_prim, cyclic_pair, entity_context, entity_type, two_prim};
use odata_wire::config::{NS_ATOM, NS_DATA, NS_METADATA};
use odata_wire::data::{ContextUrl, Delta, EntityCollection, Link};
use odata_wire::query::{ExpandItem, ExpandOption, Levels};
use odata_wire::ser::{DeltaOptions, EntityCollectionOptions, EntityOptions, XmlSerializer};
use odata_wire::{create_serializer, ContentType, ODataSerializer, SerializerError};
use roxmltree::{Document, Node};
use std::sync::Arc;

fn child<'a, 'i>(node: Node<'a, 'i>, ns: &str, name: &str) -> Node<'a, 'i> {
    node.children()
        .find(|n| n.has_tag_name((ns, name)))
        .unwrap_or_else(|| panic!("no {} under {:?}", name, node.tag_name()))
}

fn serializer() -> XmlSerializer {
    XmlSerializer::new(ContentType::xml())
}

#[test]
fn test_entry_document() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETAllPrim");
    let options = EntityOptions {
        context_url: Some(entity_context("ESAllPrim")),
        ..Default::default()
    };
    let content = serializer().entity(&md, ty, &all_prim(1), &options).unwrap();
    let text = content.as_str().unwrap();
    assert!(text.starts_with("<?xml"));

    let doc = Document::parse(text).unwrap();
    let entry = doc.root_element();
    assert!(entry.has_tag_name((NS_ATOM, "entry")));
    assert_eq!(entry.attribute((NS_METADATA, "context")), Some("$metadata#ESAllPrim/$entity"));
    assert_eq!(entry.attribute((NS_METADATA, "metadata-etag")), Some("W/\"metadata-1\""));
    assert_eq!(child(entry, NS_ATOM, "id").text(), Some("ESAllPrim(1)"));
    assert_eq!(
        child(entry, NS_ATOM, "category").attribute("term"),
        Some("#odata.test1.ETAllPrim")
    );

    let props = child(child(entry, NS_ATOM, "content"), NS_METADATA, "properties");
    let int64 = child(props, NS_DATA, "PropertyInt64");
    assert_eq!(int64.attribute((NS_METADATA, "type")), Some("Int64"));
    assert_eq!(int64.text(), Some("9223372036854775807"));
    let date = child(props, NS_DATA, "PropertyDate");
    assert_eq!(date.text(), Some("2012-12-03"));
    let string = child(props, NS_DATA, "PropertyString");
    assert_eq!(string.attribute((NS_METADATA, "type")), None);
    let decimal = child(props, NS_DATA, "PropertyDecimal");
    assert_eq!(decimal.attribute((NS_METADATA, "null")), Some("true"));
    let comp = child(props, NS_DATA, "PropertyComp");
    assert_eq!(child(comp, NS_DATA, "PropertyInt16").text(), Some("111"));
}

#[test]
fn test_feed_document() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let collection = EntityCollection::new()
        .push(two_prim(1, "a"))
        .push(two_prim(2, "b"))
        .next_link("ESTwoPrim?$skiptoken=2");
    let options = EntityCollectionOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
        count: true,
        ..Default::default()
    };
    let content = serializer().entity_collection(&md, ty, &collection, &options).unwrap();
    let doc = Document::parse(content.as_str().unwrap()).unwrap();
    let feed = doc.root_element();
    assert!(feed.has_tag_name((NS_ATOM, "feed")));
    assert_eq!(feed.attribute((NS_METADATA, "context")), Some("$metadata#ESTwoPrim"));
    assert_eq!(child(feed, NS_METADATA, "count").text(), Some("2"));

    let ids: Vec<&str> = feed
        .children()
        .filter(|n| n.has_tag_name((NS_ATOM, "entry")))
        .filter_map(|e| child(e, NS_ATOM, "id").text())
        .collect();
    assert_eq!(ids, ["ESTwoPrim(1)", "ESTwoPrim(2)"]);

    let next = feed
        .children()
        .find(|n| n.has_tag_name((NS_ATOM, "link")) && n.attribute("rel") == Some("next"))
        .unwrap();
    assert_eq!(next.attribute("href"), Some("ESTwoPrim?$skiptoken=2"));
}

#[test]
fn test_expanded_entry_inline() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETAllPrim");
    let entity = all_prim(1).navigation(
        Link::new("NavPropertyETTwoPrimOne").inline_entity(Arc::new(two_prim(32, "inline"))),
    );
    let options = EntityOptions {
        context_url: Some(entity_context("ESAllPrim")),
        expand: Some(ExpandOption::new(vec![ExpandItem::path("NavPropertyETTwoPrimOne")])),
        ..Default::default()
    };
    let content = serializer().entity(&md, ty, &entity, &options).unwrap();
    let doc = Document::parse(content.as_str().unwrap()).unwrap();
    let entry = doc.root_element();
    assert_eq!(
        entry.attribute((NS_METADATA, "context")),
        Some("$metadata#ESAllPrim(NavPropertyETTwoPrimOne())/$entity")
    );

    let link = entry
        .children()
        .find(|n| n.has_tag_name((NS_ATOM, "link")) && n.attribute("title") == Some("NavPropertyETTwoPrimOne"))
        .unwrap();
    assert_eq!(link.attribute("type"), Some("application/atom+xml;type=entry"));
    let inline_entry = child(child(link, NS_METADATA, "inline"), NS_ATOM, "entry");
    assert_eq!(child(inline_entry, NS_ATOM, "id").text(), Some("ESTwoPrim(32)"));

    // the collection navigation is only linked
    let many = entry
        .children()
        .find(|n| n.attribute("title") == Some("NavPropertyETTwoPrimMany"))
        .unwrap();
    assert!(child_opt(many, NS_METADATA, "inline").is_none());
}

fn child_opt<'a, 'i>(node: Node<'a, 'i>, ns: &str, name: &str) -> Option<Node<'a, 'i>> {
    node.children().find(|n| n.has_tag_name((ns, name)))
}

#[test]
fn test_cycle_written_as_ref() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let options = EntityOptions {
        context_url: Some(entity_context("ESTwoPrim")),
        expand: Some(ExpandOption::new(vec![
            ExpandItem::path("NavPropertyETTwoPrimOne").levels(Levels::Max)
        ])),
        ..Default::default()
    };
    let content = serializer().entity(&md, ty, &cyclic_pair(), &options).unwrap();
    let doc = Document::parse(content.as_str().unwrap()).unwrap();
    let reference = doc
        .descendants()
        .find(|n| n.has_tag_name((NS_METADATA, "ref")))
        .unwrap();
    assert_eq!(reference.attribute("id"), Some("ESTwoPrim(1)"));
    let entries = doc.descendants().filter(|n| n.has_tag_name((NS_ATOM, "entry"))).count();
    assert_eq!(entries, 2);
}

#[test]
fn test_factory_and_failures() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let xml = create_serializer(&ContentType::xml()).unwrap();

    let result = xml.entity(&md, ty, &two_prim(1, "a"), &EntityOptions::default());
    assert!(matches!(result, Err(SerializerError::NoContextUrl)));

    let options = DeltaOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
        ..Default::default()
    };
    let result = xml.delta(&md, ty, &Delta::new(), &options);
    assert!(matches!(result, Err(SerializerError::NotImplemented(_))));
}
