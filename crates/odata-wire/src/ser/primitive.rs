// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Primitive value codec.
//!
//! Two steps: [`canonical`] converts a raw value into the canonical text of
//! the declared kind (checking facets), [`encode`] picks the wire token shape
//! (boolean, number or quoted string) for that text.
//!
//! | Kind                               | JSON token                        |
//! |------------------------------------|-----------------------------------|
//! | Boolean                            | `true` / `false`                  |
//! | Byte, SByte, Int16, Int32          | number                            |
//! | Single, Double                     | number, `"NaN"`/`"INF"`/`"-INF"`  |
//! | Int64, Decimal                     | number, string if IEEE754Compatible |
//! | everything else                    | string                            |

use crate::data::{EnumValue, PrimitiveValue};
use crate::edm::{EdmPrimitiveKind, EnumType, MaxLength, Scale, TypeFacets};
use crate::error::{SerResult, SerializerError};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike};
use rust_decimal::Decimal;

/// Wire token chosen for a primitive value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Bare numeric token; the text is already valid JSON number syntax.
    Number(String),
    /// Quoted string token; the text is unescaped.
    String(String),
}

impl Literal {
    /// Text content as it appears inside XML elements.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Null => None,
            Self::Bool(true) => Some("true"),
            Self::Bool(false) => Some("false"),
            Self::Number(s) | Self::String(s) => Some(s),
        }
    }
}

/// Encode `value` as a wire token for `kind`.
///
/// `None` always encodes as [`Literal::Null`]; whether null is acceptable is
/// the caller's decision. `property` names the value in error reports.
pub fn encode(
    kind: EdmPrimitiveKind,
    value: Option<&PrimitiveValue>,
    facets: &TypeFacets,
    ieee754_compatible: bool,
    property: &str,
) -> SerResult<Literal> {
    let Some(value) = value else {
        return Ok(Literal::Null);
    };
    let text = canonical(kind, value, facets, property)?;
    let literal = match kind {
        EdmPrimitiveKind::Boolean => Literal::Bool(text == "true"),
        EdmPrimitiveKind::Byte
        | EdmPrimitiveKind::SByte
        | EdmPrimitiveKind::Int16
        | EdmPrimitiveKind::Int32 => Literal::Number(text),
        EdmPrimitiveKind::Single | EdmPrimitiveKind::Double => {
            if is_special_float(&text) {
                Literal::String(text)
            } else {
                Literal::Number(text)
            }
        }
        EdmPrimitiveKind::Int64 | EdmPrimitiveKind::Decimal => {
            if ieee754_compatible {
                Literal::String(text)
            } else {
                Literal::Number(text)
            }
        }
        _ => Literal::String(text),
    };
    Ok(literal)
}

/// Canonical enum text: member names, comma separated for flags.
pub fn encode_enum(enum_type: &EnumType, value: &EnumValue, property: &str) -> SerResult<String> {
    match value {
        EnumValue::Number(n) => enum_type
            .value_to_names(*n)
            .ok_or_else(|| SerializerError::wrong_value(property, n)),
        EnumValue::Names(names) => {
            let parts: Vec<&str> = names.split(',').map(str::trim).collect();
            if parts.len() > 1 && !enum_type.is_flags {
                return Err(SerializerError::wrong_value(property, names));
            }
            if parts.iter().any(|p| enum_type.member_by_name(p).is_none()) {
                return Err(SerializerError::wrong_value(property, names));
            }
            Ok(parts.join(","))
        }
    }
}

/// Kind a raw value is written as when nothing declares its type.
pub fn infer_kind(value: &PrimitiveValue) -> EdmPrimitiveKind {
    match value {
        PrimitiveValue::Boolean(_) => EdmPrimitiveKind::Boolean,
        PrimitiveValue::Byte(_) => EdmPrimitiveKind::Byte,
        PrimitiveValue::SByte(_) => EdmPrimitiveKind::SByte,
        PrimitiveValue::Int16(_) => EdmPrimitiveKind::Int16,
        PrimitiveValue::Int32(_) => EdmPrimitiveKind::Int32,
        PrimitiveValue::Int64(_) => EdmPrimitiveKind::Int64,
        PrimitiveValue::Single(_) => EdmPrimitiveKind::Single,
        PrimitiveValue::Double(_) => EdmPrimitiveKind::Double,
        PrimitiveValue::Decimal(_) => EdmPrimitiveKind::Decimal,
        PrimitiveValue::String(_) => EdmPrimitiveKind::String,
        PrimitiveValue::Binary(_) => EdmPrimitiveKind::Binary,
        PrimitiveValue::Date(_) => EdmPrimitiveKind::Date,
        PrimitiveValue::DateTimeOffset(_) => EdmPrimitiveKind::DateTimeOffset,
        PrimitiveValue::TimeOfDay(_) => EdmPrimitiveKind::TimeOfDay,
        PrimitiveValue::Duration(_) => EdmPrimitiveKind::Duration,
        PrimitiveValue::Guid(_) => EdmPrimitiveKind::Guid,
    }
}

fn is_special_float(text: &str) -> bool {
    matches!(text, "NaN" | "INF" | "-INF")
}

/// Canonical text of `value` as a `kind` value, checked against `facets`.
pub fn canonical(
    kind: EdmPrimitiveKind,
    value: &PrimitiveValue,
    facets: &TypeFacets,
    property: &str,
) -> SerResult<String> {
    let wrong = || SerializerError::wrong_value(property, value.raw_string());
    match kind {
        EdmPrimitiveKind::Boolean => match value {
            PrimitiveValue::Boolean(b) => Ok(b.to_string()),
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::Byte => int_in_range(value, 0, i64::from(u8::MAX)).ok_or_else(wrong),
        EdmPrimitiveKind::SByte => {
            int_in_range(value, i64::from(i8::MIN), i64::from(i8::MAX)).ok_or_else(wrong)
        }
        EdmPrimitiveKind::Int16 => {
            int_in_range(value, i64::from(i16::MIN), i64::from(i16::MAX)).ok_or_else(wrong)
        }
        EdmPrimitiveKind::Int32 => {
            int_in_range(value, i64::from(i32::MIN), i64::from(i32::MAX)).ok_or_else(wrong)
        }
        EdmPrimitiveKind::Int64 => int_in_range(value, i64::MIN, i64::MAX).ok_or_else(wrong),
        EdmPrimitiveKind::Single => {
            let v = match value {
                PrimitiveValue::Single(f) => *f,
                // narrowing is accepted only when the magnitude fits
                PrimitiveValue::Double(d) if !d.is_finite() || d.abs() <= f64::from(f32::MAX) => {
                    *d as f32
                }
                other => other.as_i64().ok_or_else(wrong)? as f32,
            };
            float_text(f64::from(v), serde_json::to_string(&v).map_err(|_| wrong()))
        }
        EdmPrimitiveKind::Double => {
            let v = match value {
                PrimitiveValue::Double(d) => *d,
                PrimitiveValue::Single(f) => f64::from(*f),
                other => other.as_i64().ok_or_else(wrong)? as f64,
            };
            float_text(v, serde_json::to_string(&v).map_err(|_| wrong()))
        }
        EdmPrimitiveKind::Decimal => {
            let d = match value {
                PrimitiveValue::Decimal(d) => *d,
                PrimitiveValue::Double(f) => Decimal::try_from(*f).map_err(|_| wrong())?,
                PrimitiveValue::Single(f) => Decimal::try_from(*f).map_err(|_| wrong())?,
                other => Decimal::from(other.as_i64().ok_or_else(wrong)?),
            };
            if decimal_fits(d, facets) {
                Ok(d.to_string())
            } else {
                Err(wrong())
            }
        }
        EdmPrimitiveKind::String => match value {
            PrimitiveValue::String(s) => {
                let too_long = matches!(facets.max_length,
                    Some(MaxLength::Value(max)) if s.chars().count() > max as usize);
                let not_ascii = facets.unicode == Some(false) && !s.is_ascii();
                if too_long || not_ascii {
                    Err(wrong())
                } else {
                    Ok(s.clone())
                }
            }
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::Binary => match value {
            PrimitiveValue::Binary(bytes) => {
                if matches!(facets.max_length,
                    Some(MaxLength::Value(max)) if bytes.len() > max as usize)
                {
                    return Err(wrong());
                }
                Ok(URL_SAFE.encode(bytes))
            }
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::Date => match value {
            PrimitiveValue::Date(d) => Ok(d.format("%Y-%m-%d").to_string()),
            PrimitiveValue::DateTimeOffset(dt) => Ok(dt.date_naive().format("%Y-%m-%d").to_string()),
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::DateTimeOffset => match value {
            PrimitiveValue::DateTimeOffset(dt) => date_time_offset(dt, facets).ok_or_else(wrong),
            PrimitiveValue::Date(d) => {
                let dt = d.and_time(NaiveTime::MIN).and_utc().fixed_offset();
                date_time_offset(&dt, facets).ok_or_else(wrong)
            }
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::TimeOfDay => {
            let t = match value {
                PrimitiveValue::TimeOfDay(t) => *t,
                PrimitiveValue::DateTimeOffset(dt) => dt.time(),
                _ => return Err(wrong()),
            };
            let mut out = t.format("%H:%M:%S").to_string();
            push_fraction(&mut out, t.nanosecond(), facets.precision).ok_or_else(wrong)?;
            Ok(out)
        }
        EdmPrimitiveKind::Duration => match value {
            PrimitiveValue::Duration(d) => duration(*d, facets.precision).ok_or_else(wrong),
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::Guid => match value {
            PrimitiveValue::Guid(g) => Ok(g.hyphenated().to_string()),
            _ => Err(wrong()),
        },
        EdmPrimitiveKind::Stream => Err(SerializerError::InconsistentPropertyType(
            property.to_string(),
        )),
        _ => Err(SerializerError::UnsupportedPropertyType(property.to_string())),
    }
}

fn int_in_range(value: &PrimitiveValue, min: i64, max: i64) -> Option<String> {
    let v = value.as_i64()?;
    (min..=max).contains(&v).then(|| v.to_string())
}

fn float_text(v: f64, finite: SerResult<String>) -> SerResult<String> {
    if v.is_nan() {
        Ok("NaN".to_string())
    } else if v == f64::INFINITY {
        Ok("INF".to_string())
    } else if v == f64::NEG_INFINITY {
        Ok("-INF".to_string())
    } else {
        finite
    }
}

fn decimal_fits(d: Decimal, facets: &TypeFacets) -> bool {
    let n = d.normalize();
    let scale = n.scale();
    let digits = {
        let m = n.mantissa().unsigned_abs().to_string();
        // leading "0." contributes no significant digit
        (m.len() as u32).max(scale)
    };
    if let Some(Scale::Value(max_scale)) = facets.scale {
        if scale > max_scale {
            return false;
        }
        if let Some(precision) = facets.precision {
            return digits - scale <= precision.saturating_sub(max_scale);
        }
    }
    facets.precision.map_or(true, |p| digits <= p)
}

/// Append `.fffffffff` with trailing zeros removed. Fails when the
/// fraction needs more digits than `precision` allows.
fn push_fraction(out: &mut String, nanos: u32, precision: Option<u32>) -> Option<()> {
    // leap-second representation
    let nanos = nanos % 1_000_000_000;
    if nanos == 0 {
        return Some(());
    }
    let digits = format!("{:09}", nanos);
    let trimmed = digits.trim_end_matches('0');
    if precision.is_some_and(|p| trimmed.len() as u32 > p) {
        return None;
    }
    out.push('.');
    out.push_str(trimmed);
    Some(())
}

fn date_time_offset(dt: &DateTime<FixedOffset>, facets: &TypeFacets) -> Option<String> {
    let mut out = dt.format("%Y-%m-%dT%H:%M:%S").to_string();
    push_fraction(&mut out, dt.nanosecond(), facets.precision)?;
    let offset = dt.offset().local_minus_utc();
    if offset == 0 {
        out.push('Z');
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let abs = offset.unsigned_abs();
        out.push_str(&format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60));
    }
    Some(out)
}

/// ISO 8601 duration: `[-]P[nD][T[nH][nM][n[.f]S]]`, zero as `PT0S`.
fn duration(d: TimeDelta, precision: Option<u32>) -> Option<String> {
    let negative = d < TimeDelta::zero();
    let abs = d.abs();
    let total = abs.num_seconds();
    let nanos = abs.subsec_nanos().unsigned_abs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        out.push_str(&format!("{}D", days));
    }
    let has_time = hours > 0 || minutes > 0 || seconds > 0 || nanos > 0;
    if has_time || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{}H", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}M", minutes));
        }
        if seconds > 0 || nanos > 0 || !has_time {
            out.push_str(&seconds.to_string());
            push_fraction(&mut out, nanos, precision)?;
            out.push('S');
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};
    use std::str::FromStr;

    fn enc(kind: EdmPrimitiveKind, v: PrimitiveValue, ieee: bool) -> Literal {
        encode(kind, Some(&v), &TypeFacets::default(), ieee, "P").unwrap()
    }

    #[test]
    fn test_token_shapes() {
        assert_eq!(
            enc(EdmPrimitiveKind::Int16, PrimitiveValue::Int16(32767), false),
            Literal::Number("32767".into())
        );
        assert_eq!(
            enc(EdmPrimitiveKind::Boolean, PrimitiveValue::Boolean(true), false),
            Literal::Bool(true)
        );
        assert_eq!(
            enc(
                EdmPrimitiveKind::Date,
                PrimitiveValue::Date(NaiveDate::from_ymd_opt(2012, 12, 3).unwrap()),
                false
            ),
            Literal::String("2012-12-03".into())
        );
        assert_eq!(
            encode(EdmPrimitiveKind::Int32, None, &TypeFacets::default(), false, "P").unwrap(),
            Literal::Null
        );
    }

    #[test]
    fn test_ieee754_quoting() {
        let big = PrimitiveValue::Int64(9_223_372_036_854_775_807);
        assert_eq!(
            enc(EdmPrimitiveKind::Int64, big.clone(), false),
            Literal::Number("9223372036854775807".into())
        );
        assert_eq!(
            enc(EdmPrimitiveKind::Int64, big, true),
            Literal::String("9223372036854775807".into())
        );
        let dec = PrimitiveValue::Decimal(Decimal::from_str("34").unwrap());
        assert_eq!(enc(EdmPrimitiveKind::Decimal, dec, true), Literal::String("34".into()));
        // Int32 stays numeric regardless
        assert_eq!(
            enc(EdmPrimitiveKind::Int32, PrimitiveValue::Int32(7), true),
            Literal::Number("7".into())
        );
    }

    #[test]
    fn test_range_checks() {
        let err = encode(
            EdmPrimitiveKind::Int16,
            Some(&PrimitiveValue::Int32(40_000)),
            &TypeFacets::default(),
            false,
            "PropertyInt16",
        )
        .unwrap_err();
        match err {
            SerializerError::WrongPropertyValue { property, value } => {
                assert_eq!(property, "PropertyInt16");
                assert_eq!(value, "40000");
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(
            enc(EdmPrimitiveKind::Byte, PrimitiveValue::Int32(255), false),
            Literal::Number("255".into())
        );
        assert!(encode(
            EdmPrimitiveKind::SByte,
            Some(&PrimitiveValue::Int16(200)),
            &TypeFacets::default(),
            false,
            "P"
        )
        .is_err());
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            enc(EdmPrimitiveKind::Double, PrimitiveValue::Double(-1.5e300), false),
            Literal::Number("-1.5e300".into())
        );
        assert_eq!(
            enc(EdmPrimitiveKind::Double, PrimitiveValue::Double(f64::NAN), false),
            Literal::String("NaN".into())
        );
        assert_eq!(
            enc(EdmPrimitiveKind::Single, PrimitiveValue::Double(f64::NEG_INFINITY), false),
            Literal::String("-INF".into())
        );
        assert!(encode(
            EdmPrimitiveKind::Single,
            Some(&PrimitiveValue::Double(1e300)),
            &TypeFacets::default(),
            false,
            "P"
        )
        .is_err());
    }

    #[test]
    fn test_string_facets() {
        let facets = TypeFacets {
            max_length: Some(MaxLength::Value(3)),
            unicode: Some(false),
            ..TypeFacets::default()
        };
        let ok = encode(
            EdmPrimitiveKind::String,
            Some(&PrimitiveValue::from("abc")),
            &facets,
            false,
            "P",
        );
        assert_eq!(ok.unwrap(), Literal::String("abc".into()));
        assert!(canonical(EdmPrimitiveKind::String, &"abcd".into(), &facets, "P").is_err());
        assert!(canonical(EdmPrimitiveKind::String, &"äb".into(), &facets, "P").is_err());
    }

    #[test]
    fn test_decimal_facets() {
        let facets = TypeFacets {
            precision: Some(5),
            scale: Some(Scale::Value(2)),
            ..TypeFacets::default()
        };
        let d = |s: &str| PrimitiveValue::Decimal(Decimal::from_str(s).unwrap());
        assert!(canonical(EdmPrimitiveKind::Decimal, &d("123.45"), &facets, "P").is_ok());
        assert!(canonical(EdmPrimitiveKind::Decimal, &d("123.456"), &facets, "P").is_err());
        assert!(canonical(EdmPrimitiveKind::Decimal, &d("1234.5"), &facets, "P").is_err());
        assert!(canonical(EdmPrimitiveKind::Decimal, &d("0.01"), &facets, "P").is_ok());
    }

    #[test]
    fn test_temporal() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let dt = utc.with_ymd_and_hms(2012, 12, 3, 7, 16, 23).unwrap();
        assert_eq!(
            canonical(
                EdmPrimitiveKind::DateTimeOffset,
                &PrimitiveValue::DateTimeOffset(dt),
                &TypeFacets::default(),
                "P"
            )
            .unwrap(),
            "2012-12-03T07:16:23Z"
        );
        let plus = FixedOffset::east_opt(5400).unwrap();
        let dt = plus.with_ymd_and_hms(2012, 12, 3, 7, 16, 23).unwrap()
            + TimeDelta::milliseconds(120);
        assert_eq!(
            canonical(
                EdmPrimitiveKind::DateTimeOffset,
                &PrimitiveValue::DateTimeOffset(dt),
                &TypeFacets::default(),
                "P"
            )
            .unwrap(),
            "2012-12-03T07:16:23.12+01:30"
        );
        let strict = TypeFacets {
            precision: Some(1),
            ..TypeFacets::default()
        };
        assert!(canonical(
            EdmPrimitiveKind::DateTimeOffset,
            &PrimitiveValue::DateTimeOffset(dt),
            &strict,
            "P"
        )
        .is_err());
        let t = NaiveTime::from_hms_milli_opt(3, 26, 5, 500).unwrap();
        assert_eq!(
            canonical(
                EdmPrimitiveKind::TimeOfDay,
                &PrimitiveValue::TimeOfDay(t),
                &TypeFacets::default(),
                "P"
            )
            .unwrap(),
            "03:26:05.5"
        );
    }

    #[test]
    fn test_duration() {
        assert_eq!(duration(TimeDelta::seconds(6), None).unwrap(), "PT6S");
        assert_eq!(duration(TimeDelta::zero(), None).unwrap(), "PT0S");
        assert_eq!(duration(TimeDelta::days(1), None).unwrap(), "P1D");
        let d = TimeDelta::days(12) + TimeDelta::hours(23) + TimeDelta::minutes(59)
            + TimeDelta::milliseconds(59_999);
        assert_eq!(duration(d, None).unwrap(), "P12DT23H59M59.999S");
        assert_eq!(duration(-TimeDelta::minutes(90), None).unwrap(), "-PT1H30M");
    }

    #[test]
    fn test_binary_and_guid() {
        assert_eq!(
            canonical(
                EdmPrimitiveKind::Binary,
                &PrimitiveValue::Binary(vec![0xAB, 0xCD, 0xEF]),
                &TypeFacets::default(),
                "P"
            )
            .unwrap(),
            "q83v"
        );
        let g = uuid::Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);
        assert_eq!(
            canonical(EdmPrimitiveKind::Guid, &g.into(), &TypeFacets::default(), "P").unwrap(),
            "01234567-89ab-cdef-0123-456789abcdef"
        );
    }

    #[test]
    fn test_enum_and_unsupported() {
        let e = EnumType::new("ns.ENString")
            .flags()
            .member("String1", 1)
            .member("String2", 2);
        assert_eq!(encode_enum(&e, &EnumValue::Number(3), "P").unwrap(), "String1,String2");
        assert_eq!(
            encode_enum(&e, &EnumValue::Names("String2".into()), "P").unwrap(),
            "String2"
        );
        assert!(encode_enum(&e, &EnumValue::Names("Nope".into()), "P").is_err());
        assert!(matches!(
            canonical(
                EdmPrimitiveKind::GeographyPoint,
                &PrimitiveValue::from("POINT(1 2)"),
                &TypeFacets::default(),
                "P"
            ),
            Err(SerializerError::UnsupportedPropertyType(_))
        ));
    }
}
