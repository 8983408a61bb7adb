// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure

//! `$metadata` documents of the fixture service in both CSDL encodings.

mod common;

use common::json;
use odata_wire::{create_serializer, ContentType};

#[test]
fn test_csdl_json_document() {
    let md = common::metadata();
    let content = create_serializer(&ContentType::json())
        .unwrap()
        .metadata_document(&md)
        .unwrap();
    let v = json(content.bytes());

    assert_eq!(v["$Version"], "4.0");
    assert_eq!(v["$EntityContainer"], "odata.test1.Container");
    let core = &v["$Reference"]["http://docs.oasis-open.org/odata/odata/v4.0/os/vocabularies/Org.OData.Core.V1.xml"];
    assert_eq!(core["$Include"][0]["$Namespace"], "Org.OData.Core.V1");
    assert_eq!(core["$Include"][0]["$Alias"], "Core");

    let schema = &v["odata.test1"];
    assert_eq!(schema["$Alias"], "namespace");

    let en = &schema["ENString"];
    assert_eq!(en["$Kind"], "EnumType");
    assert_eq!(en["$IsFlags"], true);
    assert_eq!(en["String3"], 4);
    assert!(en.get("$UnderlyingType").is_none());

    let all_prim = &schema["ETAllPrim"];
    assert_eq!(all_prim["$Kind"], "EntityType");
    assert_eq!(all_prim["$Key"], serde_json::json!(["PropertyInt16"]));
    assert!(all_prim["PropertyInt16"].get("$Nullable").is_none());
    assert_eq!(all_prim["PropertyString"]["$Nullable"], true);
    assert_eq!(all_prim["PropertyDecimal"]["$Precision"], 11);
    assert_eq!(all_prim["PropertyDecimal"]["$Scale"], 5);
    assert_eq!(all_prim["PropertyEnum"]["$Type"], "namespace.ENString");
    assert_eq!(all_prim["NavPropertyETTwoPrimMany"]["$Kind"], "NavigationProperty");
    assert_eq!(all_prim["NavPropertyETTwoPrimMany"]["$Collection"], true);

    let derived = &schema["ETTwoPrimDerived"];
    assert_eq!(derived["$BaseType"], "namespace.ETTwoPrim");
    assert!(derived.get("$Key").is_none());

    let derived_complex = &schema["CTTwoPrimDerived"];
    assert_eq!(derived_complex["$Kind"], "ComplexType");
    assert_eq!(derived_complex["$BaseType"], "namespace.CTTwoPrim");
    assert!(derived_complex.get("PropertyInt16").is_none());
    assert_eq!(derived_complex["PropertyDate"]["$Type"], "Edm.Date");

    assert_eq!(schema["TDString"]["$Kind"], "TypeDefinition");
    assert_eq!(schema["TDString"]["$UnderlyingType"], "Edm.String");
    assert_eq!(schema["TDString"]["$MaxLength"], 15);

    let action = &schema["UARTString"][0];
    assert_eq!(action["$Kind"], "Action");
    assert_eq!(action["$Parameter"][0]["$Name"], "ParameterInt16");
    assert_eq!(action["$ReturnType"]["$Type"], "Edm.String");
    let function = &schema["UFCRTString"][0];
    assert_eq!(function["$Kind"], "Function");
    assert_eq!(function["$IsComposable"], true);
    assert_eq!(function["$ReturnType"]["$Type"], "namespace.TDString");

    let container = &schema["Container"];
    assert_eq!(container["$Kind"], "EntityContainer");
    assert_eq!(container["ESAllPrim"]["$Collection"], true);
    assert_eq!(container["ESAllPrim"]["$Type"], "namespace.ETAllPrim");
    assert_eq!(
        container["ESTwoPrim"]["$NavigationPropertyBinding"]["NavPropertyETAllPrimOne"],
        "ESAllPrim"
    );
    assert_eq!(container["SINav"]["$Type"], "namespace.ETTwoPrim");
    assert_eq!(container["AIRTString"]["$Action"], "namespace.UARTString");
    assert_eq!(container["FICRTString"]["$Function"], "namespace.UFCRTString");
    assert_eq!(container["FICRTString"]["$IncludeInServiceDocument"], true);

    assert_eq!(
        schema["@namespace.Check"],
        serde_json::json!({"$Gt": [{"$Path": "PropertyInt16"}, 0]})
    );
}

#[cfg(feature = "xml")]
#[test]
fn test_csdl_xml_document() {
    use odata_wire::config::{NS_EDM, NS_EDMX};

    let md = common::metadata();
    let content = create_serializer(&ContentType::xml())
        .unwrap()
        .metadata_document(&md)
        .unwrap();
    let text = content.as_str().unwrap();
    let doc = roxmltree::Document::parse(text).unwrap();

    let root = doc.root_element();
    assert!(root.has_tag_name((NS_EDMX, "Edmx")));
    assert_eq!(root.attribute("Version"), Some("4.0"));

    let include = doc
        .descendants()
        .find(|n| n.has_tag_name((NS_EDMX, "Include")))
        .unwrap();
    assert_eq!(include.attribute("Namespace"), Some("Org.OData.Core.V1"));
    assert_eq!(include.attribute("Alias"), Some("Core"));

    let schema = doc.descendants().find(|n| n.has_tag_name((NS_EDM, "Schema"))).unwrap();
    assert_eq!(schema.attribute("Namespace"), Some("odata.test1"));
    assert_eq!(schema.attribute("Alias"), Some("namespace"));

    let entity_types: Vec<&str> = schema
        .children()
        .filter(|n| n.has_tag_name((NS_EDM, "EntityType")))
        .filter_map(|n| n.attribute("Name"))
        .collect();
    assert_eq!(entity_types, ["ETAllPrim", "ETTwoPrim", "ETTwoPrimDerived"]);

    let complex_types: Vec<(&str, Option<&str>)> = schema
        .children()
        .filter(|n| n.has_tag_name((NS_EDM, "ComplexType")))
        .filter_map(|n| Some((n.attribute("Name")?, n.attribute("BaseType"))))
        .collect();
    assert_eq!(
        complex_types,
        [("CTTwoPrim", None), ("CTTwoPrimDerived", Some("namespace.CTTwoPrim"))]
    );

    let function = schema.children().find(|n| n.has_tag_name((NS_EDM, "Function"))).unwrap();
    assert_eq!(function.attribute("Name"), Some("UFCRTString"));
    assert_eq!(function.attribute("IsComposable"), Some("true"));
    let returns = function.children().find(|n| n.has_tag_name((NS_EDM, "ReturnType"))).unwrap();
    assert_eq!(returns.attribute("Type"), Some("namespace.TDString"));

    let enum_type = schema.children().find(|n| n.has_tag_name((NS_EDM, "EnumType"))).unwrap();
    assert_eq!(enum_type.attribute("IsFlags"), Some("true"));
    assert_eq!(enum_type.attribute("UnderlyingType"), None);

    let decimal = doc
        .descendants()
        .find(|n| n.has_tag_name((NS_EDM, "Property")) && n.attribute("Name") == Some("PropertyDecimal"))
        .unwrap();
    assert_eq!(decimal.attribute("Precision"), Some("11"));
    assert_eq!(decimal.attribute("Scale"), Some("5"));

    let many = doc
        .descendants()
        .find(|n| n.attribute("Name") == Some("NavPropertyETTwoPrimMany"))
        .unwrap();
    assert_eq!(many.attribute("Type"), Some("Collection(namespace.ETTwoPrim)"));
    assert_eq!(many.attribute("Nullable"), None);

    let set = doc
        .descendants()
        .find(|n| n.has_tag_name((NS_EDM, "EntitySet")) && n.attribute("Name") == Some("ESTwoPrim"))
        .unwrap();
    assert_eq!(set.attribute("EntityType"), Some("namespace.ETTwoPrim"));
    let bindings: Vec<(&str, &str)> = set
        .children()
        .filter(|n| n.has_tag_name((NS_EDM, "NavigationPropertyBinding")))
        .filter_map(|n| Some((n.attribute("Path")?, n.attribute("Target")?)))
        .collect();
    assert_eq!(
        bindings,
        [("NavPropertyETTwoPrimOne", "ESTwoPrim"), ("NavPropertyETAllPrimOne", "ESAllPrim")]
    );

    assert!(text.contains("<Annotation Term=\"namespace.Check\"><Gt><Path>PropertyInt16</Path><Int>0</Int></Gt></Annotation>"));
}
