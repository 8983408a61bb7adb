// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Thin element-level layer over the quick-xml event writer.

use crate::error::{SerResult, SerializerError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Write;

/// Attribute list of one element.
pub type Attrs<'a> = [(&'a str, &'a str)];

/// Event writer with element helpers; text and attribute values are
/// escaped by quick-xml.
pub struct XmlWriter<W: Write> {
    inner: Writer<W>,
}

impl<W: Write> XmlWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Writer::new(out),
        }
    }

    fn emit(&mut self, event: Event<'_>) -> SerResult<()> {
        self.inner.write_event(event).map_err(SerializerError::sink)
    }

    fn element<'a>(name: &'a str, attrs: &Attrs<'_>) -> BytesStart<'a> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        start
    }

    /// `<?xml version="1.0" encoding="UTF-8"?>`
    pub fn declaration(&mut self) -> SerResult<()> {
        self.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start(&mut self, name: &str, attrs: &Attrs<'_>) -> SerResult<()> {
        self.emit(Event::Start(Self::element(name, attrs)))
    }

    pub fn end(&mut self, name: &str) -> SerResult<()> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &Attrs<'_>) -> SerResult<()> {
        self.emit(Event::Empty(Self::element(name, attrs)))
    }

    pub fn text(&mut self, text: &str) -> SerResult<()> {
        self.emit(Event::Text(BytesText::new(text)))
    }

    /// `<name attrs>text</name>`, or `<name attrs/>` for empty text.
    pub fn text_element(&mut self, name: &str, attrs: &Attrs<'_>, text: &str) -> SerResult<()> {
        if text.is_empty() {
            return self.empty(name, attrs);
        }
        self.start(name, attrs)?;
        self.text(text)?;
        self.end(name)
    }

    pub fn flush(&mut self) -> SerResult<()> {
        self.inner.get_mut().flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping() {
        let mut xml = XmlWriter::new(Vec::new());
        xml.start("m:value", &[("m:type", "String")]).unwrap();
        xml.text("a<b & 'c'").unwrap();
        xml.end("m:value").unwrap();
        xml.text_element("d:Empty", &[("note", "\"q\"")], "").unwrap();
        let out = String::from_utf8(xml.into_inner()).unwrap();
        assert!(out.starts_with(r#"<m:value m:type="String">a&lt;b &amp; "#));
        assert!(out.ends_with(r#"<d:Empty note="&quot;q&quot;"/>"#));
    }
}
