// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in `Edm.*` primitive type kinds.

use crate::config::EDM_NAMESPACE;
use std::fmt;

/// Primitive type kinds of the `Edm` namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdmPrimitiveKind {
    Binary,
    Boolean,
    Byte,
    Date,
    DateTimeOffset,
    Decimal,
    Double,
    Duration,
    Guid,
    Int16,
    Int32,
    Int64,
    SByte,
    Single,
    Stream,
    String,
    TimeOfDay,
    Geography,
    GeographyPoint,
    GeographyLineString,
    GeographyPolygon,
    GeographyMultiPoint,
    GeographyMultiLineString,
    GeographyMultiPolygon,
    GeographyCollection,
    Geometry,
    GeometryPoint,
    GeometryLineString,
    GeometryPolygon,
    GeometryMultiPoint,
    GeometryMultiLineString,
    GeometryMultiPolygon,
    GeometryCollection,
}

const ALL: [EdmPrimitiveKind; 33] = [
    EdmPrimitiveKind::Binary,
    EdmPrimitiveKind::Boolean,
    EdmPrimitiveKind::Byte,
    EdmPrimitiveKind::Date,
    EdmPrimitiveKind::DateTimeOffset,
    EdmPrimitiveKind::Decimal,
    EdmPrimitiveKind::Double,
    EdmPrimitiveKind::Duration,
    EdmPrimitiveKind::Guid,
    EdmPrimitiveKind::Int16,
    EdmPrimitiveKind::Int32,
    EdmPrimitiveKind::Int64,
    EdmPrimitiveKind::SByte,
    EdmPrimitiveKind::Single,
    EdmPrimitiveKind::Stream,
    EdmPrimitiveKind::String,
    EdmPrimitiveKind::TimeOfDay,
    EdmPrimitiveKind::Geography,
    EdmPrimitiveKind::GeographyPoint,
    EdmPrimitiveKind::GeographyLineString,
    EdmPrimitiveKind::GeographyPolygon,
    EdmPrimitiveKind::GeographyMultiPoint,
    EdmPrimitiveKind::GeographyMultiLineString,
    EdmPrimitiveKind::GeographyMultiPolygon,
    EdmPrimitiveKind::GeographyCollection,
    EdmPrimitiveKind::Geometry,
    EdmPrimitiveKind::GeometryPoint,
    EdmPrimitiveKind::GeometryLineString,
    EdmPrimitiveKind::GeometryPolygon,
    EdmPrimitiveKind::GeometryMultiPoint,
    EdmPrimitiveKind::GeometryMultiLineString,
    EdmPrimitiveKind::GeometryMultiPolygon,
    EdmPrimitiveKind::GeometryCollection,
];

impl EdmPrimitiveKind {
    /// Unqualified type name (`Int16`, `GeographyPoint`, ...).
    pub fn name(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Byte => "Byte",
            Self::Date => "Date",
            Self::DateTimeOffset => "DateTimeOffset",
            Self::Decimal => "Decimal",
            Self::Double => "Double",
            Self::Duration => "Duration",
            Self::Guid => "Guid",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::SByte => "SByte",
            Self::Single => "Single",
            Self::Stream => "Stream",
            Self::String => "String",
            Self::TimeOfDay => "TimeOfDay",
            Self::Geography => "Geography",
            Self::GeographyPoint => "GeographyPoint",
            Self::GeographyLineString => "GeographyLineString",
            Self::GeographyPolygon => "GeographyPolygon",
            Self::GeographyMultiPoint => "GeographyMultiPoint",
            Self::GeographyMultiLineString => "GeographyMultiLineString",
            Self::GeographyMultiPolygon => "GeographyMultiPolygon",
            Self::GeographyCollection => "GeographyCollection",
            Self::Geometry => "Geometry",
            Self::GeometryPoint => "GeometryPoint",
            Self::GeometryLineString => "GeometryLineString",
            Self::GeometryPolygon => "GeometryPolygon",
            Self::GeometryMultiPoint => "GeometryMultiPoint",
            Self::GeometryMultiLineString => "GeometryMultiLineString",
            Self::GeometryMultiPolygon => "GeometryMultiPolygon",
            Self::GeometryCollection => "GeometryCollection",
        }
    }

    /// Qualified name (`Edm.Int16`).
    pub fn qualified_name(self) -> String {
        format!("{}.{}", EDM_NAMESPACE, self.name())
    }

    /// Look up a kind by its unqualified name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Look up a kind by its qualified name (`Edm.Int16`).
    pub fn from_qualified_name(name: &str) -> Option<Self> {
        let (ns, local) = name.rsplit_once('.')?;
        if ns == EDM_NAMESPACE {
            Self::from_name(local)
        } else {
            None
        }
    }

    pub fn is_geospatial(self) -> bool {
        self.name().starts_with("Geo")
    }

    /// Kinds whose JSON token shape already identifies them, so a type
    /// annotation adds nothing.
    pub fn is_json_guessable(self) -> bool {
        matches!(self, Self::Boolean | Self::Double | Self::String)
    }
}

impl fmt::Display for EdmPrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", EDM_NAMESPACE, self.name())
    }
}
