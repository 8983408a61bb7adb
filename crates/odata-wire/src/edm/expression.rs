// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Annotation expressions.
//!
//! Two families: constant expressions carrying a typed literal, and dynamic
//! expressions (boolean and comparison operators, paths, records, casts, ...)
//! that may carry nested annotations of their own. Both CSDL serializers
//! dispatch over these with exhaustive matches.

use crate::edm::schema::Annotation;
use crate::edm::types::{FullQualifiedName, TypeFacets};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeDelta};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(ConstantExpression),
    Dynamic(DynamicExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConstantExpression {
    Binary(Vec<u8>),
    Bool(bool),
    Date(NaiveDate),
    DateTimeOffset(DateTime<FixedOffset>),
    Decimal(Decimal),
    Duration(TimeDelta),
    /// One member, or several for flags enums.
    EnumMember {
        enum_type: FullQualifiedName,
        members: Vec<String>,
    },
    Float(f64),
    Guid(Uuid),
    Int(i64),
    String(String),
    TimeOfDay(NaiveTime),
}

impl ConstantExpression {
    /// CSDL element name of the constant (`Binary`, `Bool`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::Binary(_) => "Binary",
            Self::Bool(_) => "Bool",
            Self::Date(_) => "Date",
            Self::DateTimeOffset(_) => "DateTimeOffset",
            Self::Decimal(_) => "Decimal",
            Self::Duration(_) => "Duration",
            Self::EnumMember { .. } => "EnumMember",
            Self::Float(_) => "Float",
            Self::Guid(_) => "Guid",
            Self::Int(_) => "Int",
            Self::String(_) => "String",
            Self::TimeOfDay(_) => "TimeOfDay",
        }
    }
}

/// Comparison operators of the `Eq`..`Le` expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl ComparisonOp {
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "Eq",
            Self::Ne => "Ne",
            Self::Gt => "Gt",
            Self::Ge => "Ge",
            Self::Lt => "Lt",
            Self::Le => "Le",
        }
    }
}

/// Target type of `Cast` and `IsOf`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    pub type_name: FullQualifiedName,
    pub collection: bool,
    pub facets: TypeFacets,
}

impl TypeReference {
    pub fn new(type_name: impl Into<FullQualifiedName>) -> Self {
        Self {
            type_name: type_name.into(),
            collection: false,
            facets: TypeFacets::default(),
        }
    }

    pub fn collection(mut self) -> Self {
        self.collection = true;
        self
    }
}

/// `PropertyValue` member of a `Record`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyValue {
    pub property: String,
    pub value: Expression,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DynamicKind {
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
    Comparison(ComparisonOp, Box<Expression>, Box<Expression>),
    Apply {
        function: FullQualifiedName,
        parameters: Vec<Expression>,
    },
    Cast {
        type_ref: TypeReference,
        value: Box<Expression>,
    },
    Collection(Vec<Expression>),
    If {
        guard: Box<Expression>,
        then: Box<Expression>,
        otherwise: Option<Box<Expression>>,
    },
    IsOf {
        type_ref: TypeReference,
        value: Box<Expression>,
    },
    LabeledElement {
        name: String,
        value: Box<Expression>,
    },
    LabeledElementReference(FullQualifiedName),
    Null,
    AnnotationPath(String),
    NavigationPropertyPath(String),
    Path(String),
    PropertyPath(String),
    Record {
        type_name: Option<FullQualifiedName>,
        properties: Vec<PropertyValue>,
    },
    UrlRef(Box<Expression>),
}

impl DynamicKind {
    /// CSDL element name (`And`, `Apply`, `Record`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            Self::And(..) => "And",
            Self::Or(..) => "Or",
            Self::Not(_) => "Not",
            Self::Comparison(op, ..) => op.name(),
            Self::Apply { .. } => "Apply",
            Self::Cast { .. } => "Cast",
            Self::Collection(_) => "Collection",
            Self::If { .. } => "If",
            Self::IsOf { .. } => "IsOf",
            Self::LabeledElement { .. } => "LabeledElement",
            Self::LabeledElementReference(_) => "LabeledElementReference",
            Self::Null => "Null",
            Self::AnnotationPath(_) => "AnnotationPath",
            Self::NavigationPropertyPath(_) => "NavigationPropertyPath",
            Self::Path(_) => "Path",
            Self::PropertyPath(_) => "PropertyPath",
            Self::Record { .. } => "Record",
            Self::UrlRef(_) => "UrlRef",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DynamicExpression {
    pub kind: DynamicKind,
    pub annotations: Vec<Annotation>,
}

impl Expression {
    pub fn string(value: impl Into<String>) -> Self {
        Self::Constant(ConstantExpression::String(value.into()))
    }

    pub fn bool(value: bool) -> Self {
        Self::Constant(ConstantExpression::Bool(value))
    }

    pub fn int(value: i64) -> Self {
        Self::Constant(ConstantExpression::Int(value))
    }

    pub fn dynamic(kind: DynamicKind) -> Self {
        Self::Dynamic(DynamicExpression {
            kind,
            annotations: Vec::new(),
        })
    }

    pub fn path(path: impl Into<String>) -> Self {
        Self::dynamic(DynamicKind::Path(path.into()))
    }

    pub fn null() -> Self {
        Self::dynamic(DynamicKind::Null)
    }

    pub fn collection(items: Vec<Expression>) -> Self {
        Self::dynamic(DynamicKind::Collection(items))
    }

    pub fn compare(op: ComparisonOp, left: Expression, right: Expression) -> Self {
        Self::dynamic(DynamicKind::Comparison(op, Box::new(left), Box::new(right)))
    }

    /// Record builder entry; members are added with [`Expression::with_property`].
    pub fn record(type_name: Option<FullQualifiedName>) -> Self {
        Self::dynamic(DynamicKind::Record {
            type_name,
            properties: Vec::new(),
        })
    }

    /// Append a `PropertyValue` to a record; no-op on anything else.
    pub fn with_property(mut self, property: impl Into<String>, value: Expression) -> Self {
        if let Self::Dynamic(DynamicExpression {
            kind: DynamicKind::Record { properties, .. },
            ..
        }) = &mut self
        {
            properties.push(PropertyValue {
                property: property.into(),
                value,
                annotations: Vec::new(),
            });
        }
        self
    }

    /// Attach an annotation to a dynamic expression. Constants cannot be
    /// annotated; the annotation is dropped for them.
    pub fn annotated(mut self, annotation: Annotation) -> Self {
        if let Self::Dynamic(dynamic) = &mut self {
            dynamic.annotations.push(annotation);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let rec = Expression::record(Some("ns.CTTwoPrim".into()))
            .with_property("PropertyInt16", Expression::int(1))
            .with_property("PropertyString", Expression::string("x"));
        match rec {
            Expression::Dynamic(DynamicExpression {
                kind: DynamicKind::Record { properties, type_name },
                ..
            }) => {
                assert_eq!(properties.len(), 2);
                assert_eq!(type_name.map(|t| t.name), Some("CTTwoPrim".to_string()));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_names() {
        let e = Expression::compare(ComparisonOp::Ge, Expression::path("a"), Expression::int(2));
        match e {
            Expression::Dynamic(d) => assert_eq!(d.kind.name(), "Ge"),
            Expression::Constant(_) => panic!("expected dynamic"),
        }
        assert_eq!(ConstantExpression::TimeOfDay(NaiveTime::MIN).name(), "TimeOfDay");
    }
}
