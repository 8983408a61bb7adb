// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service document and error document.

use super::writer::JsonWriter;
use crate::config::{
    ERROR, ERROR_CODE, ERROR_DETAILS, ERROR_INNER, ERROR_MESSAGE, ERROR_TARGET, METADATA_SEGMENT,
    ODATA_CONTEXT, ODATA_METADATA_ETAG, VALUE,
};
use crate::data::{ODataServerError, ServiceMetadata};
use crate::error::SerResult;
use crate::ser::uri::encode_segment;
use std::io::Write;

const NAME: &str = "name";
const URL: &str = "url";
const TITLE: &str = "title";
const KIND: &str = "kind";
const KIND_SINGLETON: &str = "Singleton";
const KIND_FUNCTION_IMPORT: &str = "FunctionImport";

fn write_resource<W: Write>(
    json: &mut JsonWriter<W>,
    name: &str,
    title: Option<&str>,
    kind: Option<&str>,
) -> SerResult<()> {
    json.begin_object()?;
    json.string_field(NAME, name)?;
    json.string_field(URL, &encode_segment(name))?;
    json.opt_string_field(TITLE, title)?;
    json.opt_string_field(KIND, kind)?;
    json.end_object()?;
    Ok(())
}

/// `{"@odata.context":"<root>$metadata","value":[...]}` listing the
/// container's entity sets, singletons and function imports that are
/// visible in the service document.
pub(crate) fn write_service_document<W: Write>(
    json: &mut JsonWriter<W>,
    metadata: &ServiceMetadata,
    service_root: Option<&str>,
    with_context: bool,
) -> SerResult<()> {
    json.begin_object()?;
    if with_context {
        let context = format!("{}{}", service_root.unwrap_or_default(), METADATA_SEGMENT);
        json.string_field(ODATA_CONTEXT, &context)?;
        json.opt_string_field(ODATA_METADATA_ETAG, metadata.etag.as_deref())?;
    }
    json.name(VALUE)?;
    json.begin_array()?;
    if let Some(container) = metadata.edm.entity_container() {
        for set in container
            .entity_sets
            .iter()
            .filter(|s| s.include_in_service_document)
        {
            write_resource(json, &set.name, set.title.as_deref(), None)?;
        }
        for import in container
            .function_imports
            .iter()
            .filter(|f| f.include_in_service_document)
        {
            write_resource(json, &import.name, import.title.as_deref(), Some(KIND_FUNCTION_IMPORT))?;
        }
        for singleton in &container.singletons {
            write_resource(json, &singleton.name, singleton.title.as_deref(), Some(KIND_SINGLETON))?;
        }
    } else {
        log::debug!("[json] service document without entity container");
    }
    json.end_array()?;
    json.end_object()?;
    Ok(())
}

/// `{"error":{"code","message"[,"target"][,"details"][,"innererror"]}}`.
/// A missing code is written as `null`.
pub(crate) fn write_error<W: Write>(
    json: &mut JsonWriter<W>,
    error: &ODataServerError,
) -> SerResult<()> {
    json.begin_object()?;
    json.name(ERROR)?;
    json.begin_object()?;
    json.name(ERROR_CODE)?;
    match &error.code {
        Some(code) => json.string(code)?,
        None => json.null()?,
    }
    json.string_field(ERROR_MESSAGE, &error.message)?;
    json.opt_string_field(ERROR_TARGET, error.target.as_deref())?;
    if !error.details.is_empty() {
        json.name(ERROR_DETAILS)?;
        json.begin_array()?;
        for detail in &error.details {
            json.begin_object()?;
            json.name(ERROR_CODE)?;
            match &detail.code {
                Some(code) => json.string(code)?,
                None => json.null()?,
            }
            json.string_field(ERROR_MESSAGE, &detail.message)?;
            json.opt_string_field(ERROR_TARGET, detail.target.as_deref())?;
            json.end_object()?;
        }
        json.end_array()?;
    }
    if !error.inner_error.is_empty() {
        json.name(ERROR_INNER)?;
        json.begin_object()?;
        for (key, value) in &error.inner_error {
            json.string_field(key, value)?;
        }
        json.end_object()?;
    }
    json.end_object()?;
    json.end_object()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ErrorDetail;
    use crate::edm::{Edm, EntityContainer, EntitySet, FunctionImport, SchemaBuilder, Singleton};
    use std::sync::Arc;

    #[test]
    fn test_service_document() {
        let edm = Edm::new(vec![SchemaBuilder::new("ns")
            .container(
                EntityContainer::new("ns.Container")
                    .entity_set(EntitySet::new("ESAllPrim", "ns.ETAllPrim").title("All"))
                    .entity_set(EntitySet::new("ESHidden", "ns.ETAllPrim").hidden())
                    .singleton(Singleton::new("SI", "ns.ETAllPrim"))
                    .function_import(FunctionImport::new("FICRTString", "ns.UFCRTString").in_service_document()),
            )
            .build()]);
        let md = ServiceMetadata::new(Arc::new(edm));
        let mut json = JsonWriter::new(Vec::new());
        write_service_document(&mut json, &md, Some("http://host/svc/"), true).unwrap();
        let text = String::from_utf8(json.into_inner()).unwrap();
        assert_eq!(
            text,
            r#"{"@odata.context":"http://host/svc/$metadata","value":[{"name":"ESAllPrim","url":"ESAllPrim","title":"All"},{"name":"FICRTString","url":"FICRTString","kind":"FunctionImport"},{"name":"SI","url":"SI","kind":"Singleton"}]}"#
        );
    }

    #[test]
    fn test_error_document() {
        let error = ODataServerError::new(400, "Bad request")
            .target("PropertyInt16")
            .detail(ErrorDetail {
                code: Some("D1".into()),
                message: "detail".into(),
                target: None,
            })
            .inner("stacktrace", "none");
        let mut json = JsonWriter::new(Vec::new());
        write_error(&mut json, &error).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&json.into_inner()).unwrap();
        assert!(v["error"]["code"].is_null());
        assert_eq!(v["error"]["message"], "Bad request");
        assert_eq!(v["error"]["target"], "PropertyInt16");
        assert_eq!(v["error"]["details"][0]["code"], "D1");
        assert_eq!(v["error"]["innererror"]["stacktrace"], "none");
    }
}
