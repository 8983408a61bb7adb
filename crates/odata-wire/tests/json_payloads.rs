// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::too_many_lines)] // Scenario tests
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! JSON payload scenarios against the shared fixture service.

mod common;

use common::{all_prim, cyclic_pair, entity_context, entity_type, json, two_prim};
use odata_wire::data::{
    ComplexValue, ContextUrl, DeletedEntity, DeletedReason, Delta, DeltaLink, Entity,
    EntityCollection, Link, ODataServerError, Property,
};
use odata_wire::query::{ExpandItem, ExpandOption, Levels, SelectOption};
use odata_wire::ser::{
    ComplexOptions, DeltaOptions, EdmAssistedOptions, EdmAssistedSerializer,
    EntityCollectionOptions, EntityOptions, JsonSerializer, ReferenceCollectionOptions,
};
use odata_wire::{ContentType, MetadataLevel, ODataSerializer, SerializerError};
use std::sync::Arc;

// ===== Helpers =====

fn entity_doc(content_type: ContentType, entity: &Entity, options: &EntityOptions) -> serde_json::Value {
    let md = common::metadata();
    let ty = entity_type(&md, "ETAllPrim");
    let content = JsonSerializer::new(content_type)
        .entity(&md, ty, entity, options)
        .unwrap();
    json(content.bytes())
}

fn with_context() -> EntityOptions {
    EntityOptions {
        context_url: Some(entity_context("ESAllPrim")),
        ..Default::default()
    }
}

/// Every `@`-bearing member name anywhere in the document.
fn control_keys(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                if key.contains('@') {
                    out.push(key.clone());
                }
                control_keys(child, out);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                control_keys(item, out);
            }
        }
        _ => {}
    }
}

// ===== Entities =====

#[test]
fn test_entity_minimal_metadata() {
    let v = entity_doc(ContentType::json(), &all_prim(1), &with_context());
    assert_eq!(v["@odata.context"], "$metadata#ESAllPrim/$entity");
    assert_eq!(v["@odata.metadataEtag"], "W/\"metadata-1\"");
    assert!(v.get("@odata.type").is_none());
    assert!(v.get("@odata.id").is_none());
    assert_eq!(v["PropertyInt16"], 1);
    assert_eq!(v["PropertyInt64"], 9_223_372_036_854_775_807i64);
    assert_eq!(v["PropertyDate"], "2012-12-03");
    assert!(v["PropertyDecimal"].is_null());
    assert!(v["PropertyEnum"].is_null());
    assert_eq!(v["PropertyComp"]["PropertyInt16"], 111);
}

#[test]
fn test_entity_full_metadata() {
    let entity = all_prim(1).navigation(Link::new("NavPropertyETTwoPrimOne").href("ESAllPrim(1)/NavPropertyETTwoPrimOne"));
    let v = entity_doc(ContentType::json_full(), &entity, &with_context());
    assert_eq!(v["@odata.type"], "#odata.test1.ETAllPrim");
    assert_eq!(v["@odata.id"], "ESAllPrim(1)");
    assert_eq!(v["PropertyInt64@odata.type"], "#Int64");
    assert_eq!(v["PropertyDate@odata.type"], "#Date");
    assert!(v.get("PropertyString@odata.type").is_none());
    assert_eq!(
        v["NavPropertyETTwoPrimOne@odata.navigationLink"],
        "ESAllPrim(1)/NavPropertyETTwoPrimOne"
    );
}

#[test]
fn test_metadata_levels_only_add_control_information() {
    let levels = [MetadataLevel::None, MetadataLevel::Minimal, MetadataLevel::Full];
    let mut previous: Option<Vec<String>> = None;
    for level in levels {
        let content_type = ContentType::json().with_metadata(level);
        let v = entity_doc(content_type, &all_prim(1), &with_context());
        let mut keys = Vec::new();
        control_keys(&v, &mut keys);
        if level == MetadataLevel::None {
            assert!(keys.is_empty(), "control information at none: {:?}", keys);
        }
        if let Some(previous) = &previous {
            for key in previous {
                assert!(keys.contains(key), "{} lost at {:?}", key, level);
            }
        }
        previous = Some(keys);
    }
}

#[test]
fn test_serialization_is_repeatable() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETAllPrim");
    let serializer = JsonSerializer::new(ContentType::json_full());
    let entity = all_prim(1);
    let first = serializer.entity(&md, ty, &entity, &with_context()).unwrap();
    let second = serializer.entity(&md, ty, &entity, &with_context()).unwrap();
    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn test_select_keeps_key_and_fills_context() {
    let select = SelectOption::paths(["PropertyString"]);
    let options = EntityOptions {
        select: Some(select),
        ..with_context()
    };
    let v = entity_doc(ContentType::json(), &all_prim(1), &options);
    assert_eq!(v["@odata.context"], "$metadata#ESAllPrim(PropertyString)/$entity");
    let names: Vec<&str> = v
        .as_object()
        .unwrap()
        .keys()
        .filter(|k| !k.starts_with('@'))
        .map(String::as_str)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"PropertyInt16"));
    assert!(names.contains(&"PropertyString"));
}

#[test]
fn test_expand_single_navigation() {
    let entity = all_prim(1).navigation(
        Link::new("NavPropertyETTwoPrimOne").inline_entity(Arc::new(two_prim(32, "inline"))),
    );
    let options = EntityOptions {
        expand: Some(ExpandOption::new(vec![ExpandItem::path("NavPropertyETTwoPrimOne")])),
        ..with_context()
    };
    let v = entity_doc(ContentType::json(), &entity, &options);
    assert_eq!(v["@odata.context"], "$metadata#ESAllPrim(NavPropertyETTwoPrimOne())/$entity");
    assert_eq!(v["NavPropertyETTwoPrimOne"]["PropertyInt16"], 32);
    assert_eq!(v["NavPropertyETTwoPrimOne"]["PropertyString"], "inline");
}

#[test]
fn test_expand_without_inline_data() {
    let options = EntityOptions {
        expand: Some(ExpandOption::new(vec![
            ExpandItem::path("NavPropertyETTwoPrimOne"),
            ExpandItem::path("NavPropertyETTwoPrimMany").with_count(),
        ])),
        ..with_context()
    };
    let v = entity_doc(ContentType::json(), &all_prim(1), &options);
    assert!(v["NavPropertyETTwoPrimOne"].is_null());
    assert_eq!(v["NavPropertyETTwoPrimMany"], serde_json::json!([]));
    assert_eq!(v["NavPropertyETTwoPrimMany@odata.count"], 0);
}

#[test]
fn test_expand_collection_count_only() {
    let many = EntityCollection::new().push(two_prim(1, "a")).push(two_prim(2, "b"));
    let entity = all_prim(1).navigation(Link::new("NavPropertyETTwoPrimMany").inline_collection(Arc::new(many)));
    let options = EntityOptions {
        expand: Some(ExpandOption::new(vec![ExpandItem::path("NavPropertyETTwoPrimMany").count_only()])),
        ..with_context()
    };
    let v = entity_doc(ContentType::json(), &entity, &options);
    assert_eq!(v["NavPropertyETTwoPrimMany@odata.count"], 2);
    assert!(v.get("NavPropertyETTwoPrimMany").is_none());
}

#[test]
fn test_cycle_with_levels_max_becomes_reference() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let options = EntityOptions {
        context_url: Some(entity_context("ESTwoPrim")),
        expand: Some(ExpandOption::new(vec![
            ExpandItem::path("NavPropertyETTwoPrimOne").levels(Levels::Max)
        ])),
        ..Default::default()
    };
    let content = JsonSerializer::new(ContentType::json())
        .entity(&md, ty, &cyclic_pair(), &options)
        .unwrap();
    let v = json(content.bytes());
    let second = &v["NavPropertyETTwoPrimOne"];
    assert_eq!(second["PropertyInt16"], 2);
    assert_eq!(
        second["NavPropertyETTwoPrimOne"],
        serde_json::json!({ "@odata.id": "ESTwoPrim(1)" })
    );
}

#[test]
fn test_derived_entity_carries_type() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let entity = two_prim(1, "derived")
        .typed("odata.test1.ETTwoPrimDerived")
        .property(Property::primitive("PropertyDate", chrono::NaiveDate::from_ymd_opt(2020, 1, 31).unwrap()));
    let options = EntityOptions {
        context_url: Some(entity_context("ESTwoPrim")),
        ..Default::default()
    };
    let content = JsonSerializer::new(ContentType::json()).entity(&md, ty, &entity, &options).unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.type"], "#odata.test1.ETTwoPrimDerived");
    assert_eq!(v["PropertyDate"], "2020-01-31");
}

// ===== Collections =====

#[test]
fn test_collection_ieee754_count_and_int64() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETAllPrim");
    let collection = EntityCollection::new()
        .push(all_prim(1))
        .push(all_prim(2))
        .next_link("ESAllPrim?$skiptoken=2");
    let options = EntityCollectionOptions {
        context_url: Some(ContextUrl::entity_set("ESAllPrim")),
        count: true,
        ..Default::default()
    };
    let content = JsonSerializer::new(ContentType::json().ieee754(true))
        .entity_collection(&md, ty, &collection, &options)
        .unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.context"], "$metadata#ESAllPrim");
    assert_eq!(v["@odata.count"], "2");
    assert_eq!(v["value"][0]["PropertyInt64"], "9223372036854775807");
    assert_eq!(v["value"][1]["PropertyInt16"], 2);
    assert_eq!(v["@odata.nextLink"], "ESAllPrim?$skiptoken=2");

    // count goes before the value array in a buffered document
    let text = content.as_str().unwrap();
    assert!(text.find("@odata.count").unwrap() < text.find("\"value\"").unwrap());
}

#[test]
fn test_reference_collection() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let collection = EntityCollection::new().push(two_prim(1, "a")).push(two_prim(2, "b"));
    let options = ReferenceCollectionOptions {
        service_root: Some("http://host/service/".to_string()),
        entity_set: Some("ESTwoPrim".to_string()),
        count: true,
    };
    let content = JsonSerializer::new(ContentType::json())
        .reference_collection(&md, ty, &collection, &options)
        .unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.context"], "http://host/service/$metadata#Collection($ref)");
    assert_eq!(v["@odata.count"], 2);
    assert_eq!(v["value"][1]["@odata.id"], "ESTwoPrim(2)");
}

// ===== Properties =====

#[test]
fn test_complex_missing_non_nullable_member() {
    let md = common::metadata();
    let ct = common::complex_type(&md, "CTTwoPrim");
    let property = Property::complex(
        "PropertyComp",
        ComplexValue::new().property(Property::primitive("PropertyString", "no key")),
    );
    let options = ComplexOptions {
        context_url: Some(ContextUrl::entity_set("ESAllPrim").key_path("1").navigation_path("PropertyComp")),
        ..Default::default()
    };
    let result = JsonSerializer::new(ContentType::json()).complex(&md, ct, &property, &options);
    match result {
        Err(SerializerError::MissingProperty(name)) => assert_eq!(name, "PropertyInt16"),
        other => panic!("expected MissingProperty, got {:?}", other.map(|c| c.len())),
    }
}

// ===== Delta =====

#[test]
fn test_delta_feed() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let delta = Delta::new()
        .entity(two_prim(1, "changed"))
        .deleted(DeletedEntity::new("ESTwoPrim(3)", DeletedReason::Deleted))
        .added_link(DeltaLink::new("ESTwoPrim(1)", "NavPropertyETTwoPrimOne", "ESTwoPrim(2)"))
        .delta_link("ESTwoPrim?$deltatoken=5");
    let options = DeltaOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
        ..Default::default()
    };
    let content = JsonSerializer::new(ContentType::json()).delta(&md, ty, &delta, &options).unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.context"], "$metadata#ESTwoPrim/$delta");
    let records = v["value"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["@odata.id"], "ESTwoPrim(1)");
    assert_eq!(records[0]["PropertyString"], "changed");
    assert_eq!(records[1]["@odata.context"], "#ESTwoPrim/$deletedEntity");
    assert_eq!(records[1]["reason"], "deleted");
    assert_eq!(records[2]["@odata.context"], "#ESTwoPrim/$link");
    assert_eq!(records[2]["target"], "ESTwoPrim(2)");
    assert_eq!(v["@odata.deltaLink"], "ESTwoPrim?$deltatoken=5");
}

fn cross_set_delta() -> Delta {
    Delta::new()
        .entity(two_prim(1, "changed"))
        .entity(two_prim(5, "moved").with_id("ESAllPrim(5)"))
        .deleted_link(DeltaLink::new("ESTwoPrim(1)", "NavPropertyETTwoPrimOne", "ESTwoPrim(4)"))
}

fn delta_doc(content_type: ContentType) -> (String, serde_json::Value) {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let options = DeltaOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
        count: true,
        ..Default::default()
    };
    let content = JsonSerializer::new(content_type)
        .delta(&md, ty, &cross_set_delta(), &options)
        .unwrap();
    let text = content.as_str().unwrap().to_string();
    let v = json(text.as_bytes());
    (text, v)
}

#[test]
fn test_delta_cross_set_entity_and_deleted_link() {
    let (_, v) = delta_doc(ContentType::json());
    let records = v["value"].as_array().unwrap();
    assert_eq!(records.len(), 3);

    // same-set entity carries no fragment of its own
    assert!(records[0].get("@odata.context").is_none());
    assert_eq!(records[0]["@odata.id"], "ESTwoPrim(1)");

    assert_eq!(records[1]["@odata.context"], "#ESAllPrim/$entity");
    assert_eq!(records[1]["@odata.id"], "ESAllPrim(5)");
    assert_eq!(records[1]["PropertyString"], "moved");

    assert_eq!(records[2]["@odata.context"], "#ESTwoPrim/$deletedLink");
    assert_eq!(records[2]["source"], "ESTwoPrim(1)");
    assert_eq!(records[2]["relationship"], "NavPropertyETTwoPrimOne");
    assert_eq!(records[2]["target"], "ESTwoPrim(4)");
}

#[test]
fn test_delta_count_follows_ieee754() {
    let (text, v) = delta_doc(ContentType::json().ieee754(true));
    assert_eq!(v["@odata.count"], "2");
    assert!(text.contains(r#""@odata.count":"2""#));

    let (text, v) = delta_doc(ContentType::json());
    assert_eq!(v["@odata.count"], 2);
    assert!(text.contains(r#""@odata.count":2,"#));
}

#[test]
fn test_delta_record_missing_id() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let delta = Delta::new().deleted(DeletedEntity::default());
    let options = DeltaOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
        ..Default::default()
    };
    let result = JsonSerializer::new(ContentType::json()).delta(&md, ty, &delta, &options);
    assert!(matches!(result, Err(SerializerError::MissingDeltaProperty("id"))));
}

// ===== EDM-assisted =====

#[test]
fn test_edm_assisted_mixes_declared_and_dynamic() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let collection = EntityCollection::new()
        .push(two_prim(7, "declared").property(Property::primitive("Dynamic", 2.5f64)))
        .count(1);
    let options = EdmAssistedOptions {
        context_url: Some(ContextUrl::entity_set("ESTwoPrim")),
    };
    let content = EdmAssistedSerializer::new(ContentType::json())
        .entity_collection(Some(&md), Some(ty), &collection, &options)
        .unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.context"], "$metadata#ESTwoPrim");
    assert_eq!(v["@odata.count"], 1);
    assert_eq!(v["value"][0]["PropertyInt16"], 7);
    assert_eq!(v["value"][0]["Dynamic"], 2.5);

    let bare = EdmAssistedSerializer::new(ContentType::json())
        .entity_collection(None, None, &collection, &EdmAssistedOptions::default())
        .unwrap();
    let v = json(bare.bytes());
    assert!(v.get("@odata.context").is_none());
    assert_eq!(v["value"][0]["PropertyString"], "declared");
}

// ===== Errors =====

#[test]
fn test_failures() {
    let md = common::metadata();
    let ty = entity_type(&md, "ETTwoPrim");
    let serializer = JsonSerializer::new(ContentType::json());

    let result = serializer.entity(&md, ty, &two_prim(1, "a"), &EntityOptions::default());
    assert!(matches!(result, Err(SerializerError::NoContextUrl)));

    let wrong = two_prim(1, "a").typed("odata.test1.ETAllPrim");
    let options = EntityOptions {
        context_url: Some(entity_context("ESTwoPrim")),
        ..Default::default()
    };
    let result = serializer.entity(&md, ty, &wrong, &options);
    assert!(matches!(result, Err(SerializerError::WrongBaseType { .. })));

    let unknown = two_prim(1, "a").typed("odata.test1.Nope");
    let result = serializer.entity(&md, ty, &unknown, &options);
    assert!(matches!(result, Err(SerializerError::UnknownType(_))));
}

#[test]
fn test_service_and_error_documents() {
    let md = common::metadata();
    let serializer = JsonSerializer::new(ContentType::json());
    let content = serializer.service_document(&md, Some("http://host/service/")).unwrap();
    let v = json(content.bytes());
    assert_eq!(v["@odata.context"], "http://host/service/$metadata");
    let names: Vec<&str> = v["value"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|r| r["name"].as_str())
        .collect();
    assert_eq!(names, ["ESAllPrim", "ESTwoPrim", "FICRTString", "SINav"]);
    assert_eq!(v["value"][2]["kind"], "FunctionImport");
    assert_eq!(v["value"][3]["kind"], "Singleton");

    let error = ODataServerError::new(404, "Not found").code("E404").target("ESAllPrim(99)");
    let v = json(serializer.error(&error).unwrap().bytes());
    assert_eq!(v["error"]["code"], "E404");
    assert_eq!(v["error"]["message"], "Not found");
    assert_eq!(v["error"]["target"], "ESAllPrim(99)");
}
