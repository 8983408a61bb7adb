// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property values.

use crate::data::entity::Link;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Raw scalar as supplied by the data layer.
///
/// The variant need not match the declared EDM kind exactly: the codec
/// converts between compatible representations (any integer into any wider
/// or range-checked integer kind, integers into floating/decimal kinds,
/// date-time into date).
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    Byte(u8),
    SByte(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    String(String),
    Binary(Vec<u8>),
    Date(NaiveDate),
    DateTimeOffset(DateTime<FixedOffset>),
    TimeOfDay(NaiveTime),
    Duration(TimeDelta),
    Guid(Uuid),
}

impl PrimitiveValue {
    /// Integer payload widened to `i64`, for integer variants.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Byte(v) => Some(i64::from(*v)),
            Self::SByte(v) => Some(i64::from(*v)),
            Self::Int16(v) => Some(i64::from(*v)),
            Self::Int32(v) => Some(i64::from(*v)),
            Self::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Debug-friendly rendering of the raw value, used in error reports.
    pub fn raw_string(&self) -> String {
        match self {
            Self::Boolean(v) => v.to_string(),
            Self::Byte(v) => v.to_string(),
            Self::SByte(v) => v.to_string(),
            Self::Int16(v) => v.to_string(),
            Self::Int32(v) => v.to_string(),
            Self::Int64(v) => v.to_string(),
            Self::Single(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Decimal(v) => v.to_string(),
            Self::String(v) => v.clone(),
            Self::Binary(v) => format!("{:?}", v),
            Self::Date(v) => v.to_string(),
            Self::DateTimeOffset(v) => v.to_rfc3339(),
            Self::TimeOfDay(v) => v.to_string(),
            Self::Duration(v) => v.to_string(),
            Self::Guid(v) => v.to_string(),
        }
    }
}

impl From<bool> for PrimitiveValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<i16> for PrimitiveValue {
    fn from(v: i16) -> Self {
        Self::Int16(v)
    }
}

impl From<i32> for PrimitiveValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for PrimitiveValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Decimal> for PrimitiveValue {
    fn from(v: Decimal) -> Self {
        Self::Decimal(v)
    }
}

impl From<Uuid> for PrimitiveValue {
    fn from(v: Uuid) -> Self {
        Self::Guid(v)
    }
}

impl From<NaiveDate> for PrimitiveValue {
    fn from(v: NaiveDate) -> Self {
        Self::Date(v)
    }
}

/// Enum value: member name(s) (`"String1,String3"` for flags) or the
/// underlying number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumValue {
    Names(String),
    Number(i64),
}

/// Media information of a stream-typed property.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamValue {
    pub media_etag: Option<String>,
    pub content_type: Option<String>,
    pub read_link: Option<String>,
    pub edit_link: Option<String>,
}

/// Value of a property, tagged by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Primitive(PrimitiveValue),
    Enum(EnumValue),
    Complex(ComplexValue),
    /// Well-known-text payload; not serializable.
    Geospatial(String),
    Stream(StreamValue),
    PrimitiveCollection(Vec<Option<PrimitiveValue>>),
    EnumCollection(Vec<Option<EnumValue>>),
    ComplexCollection(Vec<Option<ComplexValue>>),
    GeospatialCollection(Vec<String>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_collection(&self) -> bool {
        matches!(
            self,
            Self::PrimitiveCollection(_)
                | Self::EnumCollection(_)
                | Self::ComplexCollection(_)
                | Self::GeospatialCollection(_)
        )
    }

    /// Shape name, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Primitive(_) => "primitive",
            Self::Enum(_) => "enum",
            Self::Complex(_) => "complex",
            Self::Geospatial(_) => "geospatial",
            Self::Stream(_) => "stream",
            Self::PrimitiveCollection(_) => "collection(primitive)",
            Self::EnumCollection(_) => "collection(enum)",
            Self::ComplexCollection(_) => "collection(complex)",
            Self::GeospatialCollection(_) => "collection(geospatial)",
        }
    }
}

/// Instance annotation (`@ns.term` / `Prop@ns.term`).
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceAnnotation {
    /// Qualified term name.
    pub term: String,
    pub qualifier: Option<String>,
    pub type_name: Option<String>,
    pub value: Value,
}

impl InstanceAnnotation {
    pub fn new(term: impl Into<String>, value: Value) -> Self {
        Self {
            term: term.into(),
            qualifier: None,
            type_name: None,
            value,
        }
    }

    /// Wire key suffix: `ns.term` or `ns.term#qualifier`.
    pub fn key(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}#{}", self.term, q),
            None => self.term.clone(),
        }
    }
}

/// Named value with an optional declared type name.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub type_name: Option<String>,
    pub value: Value,
    pub annotations: Vec<InstanceAnnotation>,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            value,
            annotations: Vec::new(),
        }
    }

    pub fn primitive(name: impl Into<String>, value: impl Into<PrimitiveValue>) -> Self {
        Self::new(name, Value::Primitive(value.into()))
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self::new(name, Value::Null)
    }

    pub fn complex(name: impl Into<String>, value: ComplexValue) -> Self {
        Self::new(name, Value::Complex(value))
    }

    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn annotate(mut self, annotation: InstanceAnnotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

/// Complex value: ordered properties and optional runtime type name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComplexValue {
    pub type_name: Option<String>,
    pub properties: Vec<Property>,
    pub navigation_links: Vec<Link>,
    pub annotations: Vec<InstanceAnnotation>,
}

impl ComplexValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn typed(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
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

    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    pub fn navigation_link(&self, name: &str) -> Option<&Link> {
        self.navigation_links.iter().find(|l| l.title == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_shapes() {
        assert!(Value::Null.is_null());
        assert!(Value::PrimitiveCollection(vec![]).is_collection());
        assert!(!Value::Complex(ComplexValue::new()).is_collection());
        assert_eq!(Value::EnumCollection(vec![]).shape(), "collection(enum)");
    }

    #[test]
    fn test_annotation_key() {
        let a = InstanceAnnotation::new("ns.Term", Value::Null);
        assert_eq!(a.key(), "ns.Term");
        let mut q = a.clone();
        q.qualifier = Some("Q".into());
        assert_eq!(q.key(), "ns.Term#Q");
    }

    #[test]
    fn test_widen() {
        assert_eq!(PrimitiveValue::SByte(-3).as_i64(), Some(-3));
        assert_eq!(PrimitiveValue::Double(1.0).as_i64(), None);
    }
}
