//! Type-directed decoding of text-protocol values.
//!
//! One raw cell in, one [`Value`] out. The dispatch on the column's type
//! code sits at the leaf of the per-row loop; everything the branch needs
//! was resolved once when the column descriptors were built.

use std::borrow::Cow;
use std::str::{self, FromStr};

use atoi::atoi;
use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate};
use encoding_rs::Encoding;

use crate::column::MySqlColumn;
use crate::error::{Error, Result};
use crate::options::ResultOptions;
use crate::protocol::{FieldFlags, TypeId};
use crate::temporal;
use crate::value::{RawValue, Value};

/// Decode one raw (possibly NULL) cell according to its column descriptor.
///
/// A caller-supplied converter pre-empts default decoding; its input is the
/// raw bytes for a binary column, the decoded text otherwise.
pub(crate) fn decode_value(
    raw: Option<&[u8]>,
    column: &MySqlColumn,
    options: &ResultOptions,
) -> Result<Value> {
    let raw = match raw {
        Some(raw) => raw,
        None => return Ok(Value::Null),
    };

    if let Some(converter) = &column.converter {
        let input = match column.encoding {
            None => RawValue::Bytes(raw),
            Some(_) => RawValue::Text(decode_text(raw, column.encoding)?),
        };

        return converter(input).map_err(Error::Converter);
    }

    match column.type_id {
        TypeId::DECIMAL | TypeId::NEWDECIMAL => decode_decimal(raw, column),

        TypeId::TINY | TypeId::SHORT | TypeId::LONG | TypeId::LONGLONG | TypeId::INT24 => {
            if column.flags.contains(FieldFlags::UNSIGNED) {
                Ok(Value::UInt(parse_int::<u64>(raw)?))
            } else {
                Ok(Value::Int(parse_int::<i64>(raw)?))
            }
        }

        TypeId::FLOAT | TypeId::DOUBLE => Ok(Value::Double(parse_double(raw)?)),

        TypeId::NULL => Ok(Value::Null),

        TypeId::YEAR => {
            if raw.is_empty() {
                return Err(Error::decode("empty YEAR value"));
            }

            Ok(Value::UInt(parse_int::<u64>(raw)?))
        }

        TypeId::DATETIME | TypeId::TIMESTAMP => decode_datetime(raw, column),

        TypeId::DATE | TypeId::NEWDATE => decode_date(raw, column),

        TypeId::TIME => decode_time(raw, column),

        TypeId::BIT
        | TypeId::JSON
        | TypeId::TINY_BLOB
        | TypeId::MEDIUM_BLOB
        | TypeId::LONG_BLOB
        | TypeId::BLOB
        | TypeId::GEOMETRY
        | TypeId::ENUM
        | TypeId::SET
        | TypeId::VARCHAR
        | TypeId::VAR_STRING
        | TypeId::STRING => decode_string_like(raw, column, options),

        other => Err(Error::TypeCode(other)),
    }
}

/// Decode text in the column's declared encoding; no declared encoding
/// means UTF-8 here (binary columns are routed to [`Value::Bytes`] before
/// this is reached).
pub(crate) fn decode_text<'a>(
    raw: &'a [u8],
    encoding: Option<&'static Encoding>,
) -> Result<Cow<'a, str>> {
    match encoding {
        Some(encoding) if encoding != encoding_rs::UTF_8 => {
            let (text, _, had_errors) = encoding.decode(raw);
            if had_errors {
                return Err(Error::decode(format_args!(
                    "invalid {} data: {:X?}",
                    encoding.name(),
                    raw
                )));
            }

            Ok(text)
        }

        _ => str::from_utf8(raw)
            .map(Cow::Borrowed)
            .map_err(|err| Error::decode(format_args!("invalid UTF-8 data: {err}"))),
    }
}

pub(crate) fn decode_decimal(raw: &[u8], column: &MySqlColumn) -> Result<Value> {
    let text = decode_text(raw, column.encoding)?;
    let decimal = BigDecimal::from_str(&text)
        .map_err(|err| Error::decode(format_args!("invalid DECIMAL value {text:?}: {err}")))?;

    Ok(Value::Decimal(decimal))
}

pub(crate) fn parse_int<T: atoi::FromRadix10SignedChecked>(raw: &[u8]) -> Result<T> {
    atoi(raw).ok_or_else(|| Error::decode(format_args!("invalid integer value: {raw:X?}")))
}

pub(crate) fn parse_double(raw: &[u8]) -> Result<f64> {
    str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::decode(format_args!("invalid float value: {raw:X?}")))
}

/// BIT, JSON, the blob family, GEOMETRY, ENUM, SET, and the string family:
/// raw bytes when no encoding was declared, decoded text otherwise, with
/// JSON optionally parsed further.
pub(crate) fn decode_string_like(
    raw: &[u8],
    column: &MySqlColumn,
    options: &ResultOptions,
) -> Result<Value> {
    let encoding = match column.encoding {
        None => return Ok(Value::Bytes(raw.to_vec())),
        Some(encoding) => encoding,
    };

    let text = decode_text(raw, Some(encoding))?;

    if column.type_id == TypeId::JSON && options.parse_json {
        let json = serde_json::from_str(&text)
            .map_err(|err| Error::decode(format_args!("invalid JSON value: {err}")))?;

        return Ok(Value::Json(json));
    }

    Ok(Value::Text(text.into_owned()))
}

/// A temporal cell whose shape failed validation: emit the configured
/// substitute for this type code, or fall back to the original text.
fn invalid_temporal(raw: &[u8], column: &MySqlColumn) -> Result<Value> {
    match &column.invalid {
        Some(value) => Ok(value.clone()),
        None => utf8_fallback(raw),
    }
}

fn utf8_fallback(raw: &[u8]) -> Result<Value> {
    Ok(Value::Text(
        str::from_utf8(raw)
            .map_err(|err| Error::decode(format_args!("invalid UTF-8 data: {err}")))?
            .to_owned(),
    ))
}

fn decode_datetime(raw: &[u8], column: &MySqlColumn) -> Result<Value> {
    let p = match temporal::parse_datetime(raw) {
        Some(p) => p,
        None => return invalid_temporal(raw, column),
    };

    // the shape check bounds each digit but not the calendar; a day that
    // does not exist in its month falls back to the original text
    match NaiveDate::from_ymd_opt(p.year, p.month, p.day)
        .and_then(|date| date.and_hms_micro_opt(p.hour, p.minute, p.second, p.microsecond))
    {
        Some(datetime) => Ok(Value::DateTime(datetime)),
        None => utf8_fallback(raw),
    }
}

fn decode_date(raw: &[u8], column: &MySqlColumn) -> Result<Value> {
    let (year, month, day) = match temporal::parse_date(raw) {
        Some(parts) => parts,
        None => return invalid_temporal(raw, column),
    };

    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Ok(Value::Date(date)),
        None => utf8_fallback(raw),
    }
}

fn decode_time(raw: &[u8], column: &MySqlColumn) -> Result<Value> {
    let t = match temporal::parse_duration(raw) {
        Some(t) => t,
        None => return invalid_temporal(raw, column),
    };

    let duration = Duration::seconds(
        i64::from(t.hours) * 3600 + i64::from(t.minutes) * 60 + i64::from(t.seconds),
    ) + Duration::microseconds(i64::from(t.microseconds));

    Ok(Value::Time(if t.negative { -duration } else { duration }))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use bigdecimal::BigDecimal;
    use chrono::{Duration, NaiveDate};

    use super::decode_value;
    use crate::column::MySqlColumn;
    use crate::options::ResultOptions;
    use crate::protocol::{FieldFlags, TypeId};
    use crate::value::{RawValue, Value};

    fn column(type_id: TypeId, flags: FieldFlags, encoding: Option<&str>) -> MySqlColumn {
        MySqlColumn {
            type_id,
            flags,
            name: "c".into(),
            encoding: encoding.map(|label| encoding_rs::Encoding::for_label(label.as_bytes()).unwrap()),
            converter: None,
            invalid: None,
        }
    }

    fn decode(raw: &[u8], column: &MySqlColumn) -> Value {
        decode_value(Some(raw), column, &ResultOptions::default()).unwrap()
    }

    #[test]
    fn it_decodes_integers() {
        let signed = column(TypeId::LONG, FieldFlags::empty(), Some("utf8"));
        assert_eq!(decode(b"-12", &signed), Value::Int(-12));

        let unsigned = column(TypeId::TINY, FieldFlags::UNSIGNED, Some("utf8"));
        assert_eq!(decode(b"255", &unsigned), Value::UInt(255));

        let big = column(TypeId::LONGLONG, FieldFlags::UNSIGNED, Some("utf8"));
        assert_eq!(
            decode(b"18446744073709551615", &big),
            Value::UInt(u64::MAX)
        );
    }

    #[test]
    fn it_decodes_floats_and_decimals() {
        let double = column(TypeId::DOUBLE, FieldFlags::empty(), Some("utf8"));
        assert_eq!(decode(b"-2.5", &double), Value::Double(-2.5));

        let decimal = column(TypeId::NEWDECIMAL, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode(b"123.4500", &decimal),
            Value::Decimal(BigDecimal::from_str("123.4500").unwrap())
        );
    }

    #[test]
    fn it_decodes_strings_and_bytes() {
        let text = column(TypeId::VAR_STRING, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode("héllo".as_bytes(), &text),
            Value::Text("héllo".into())
        );

        let binary = column(TypeId::BLOB, FieldFlags::BINARY, None);
        assert_eq!(
            decode(b"\x00\x01\x02", &binary),
            Value::Bytes(vec![0, 1, 2])
        );
    }

    #[test]
    fn it_decodes_json_when_enabled() {
        let json = column(TypeId::JSON, FieldFlags::empty(), Some("utf8"));

        assert_eq!(
            decode(br#"{"a": 1}"#, &json),
            Value::Text(r#"{"a": 1}"#.into())
        );

        let options = ResultOptions {
            parse_json: true,
            ..ResultOptions::default()
        };
        assert_eq!(
            decode_value(Some(br#"{"a": 1}"#), &json, &options).unwrap(),
            Value::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn it_decodes_temporals() {
        let datetime = column(TypeId::DATETIME, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode(b"2024-06-01 12:34:56.000001", &datetime),
            Value::DateTime(
                NaiveDate::from_ymd_opt(2024, 6, 1)
                    .unwrap()
                    .and_hms_micro_opt(12, 34, 56, 1)
                    .unwrap()
            )
        );

        let date = column(TypeId::DATE, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode(b"2024-06-01", &date),
            Value::Date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        );

        let time = column(TypeId::TIME, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode(b"-838:59:59.000000", &time),
            Value::Time(Duration::seconds(-3_020_399))
        );
        assert_eq!(decode(b"00:00:00", &time), Value::Time(Duration::zero()));
    }

    #[test]
    fn an_empty_year_is_an_error() {
        let year = column(TypeId::YEAR, FieldFlags::UNSIGNED, Some("utf8"));

        assert!(decode_value(Some(b""), &year, &ResultOptions::default()).is_err());
        assert_eq!(decode(b"2024", &year), Value::UInt(2024));
    }

    #[test]
    fn valid_temporals_round_trip_through_their_canonical_text() {
        let datetime = column(TypeId::DATETIME, FieldFlags::empty(), Some("utf8"));
        for input in ["2024-06-01 12:34:56", "1999-12-31 23:59:59"] {
            match decode(input.as_bytes(), &datetime) {
                Value::DateTime(value) => {
                    assert_eq!(value.format("%Y-%m-%d %H:%M:%S").to_string(), input)
                }
                other => panic!("expected a datetime, got {other:?}"),
            }
        }

        let datetime_micro = decode(b"2024-06-01 12:34:56.000001", &datetime);
        match datetime_micro {
            Value::DateTime(value) => assert_eq!(
                value.format("%Y-%m-%d %H:%M:%S%.6f").to_string(),
                "2024-06-01 12:34:56.000001"
            ),
            other => panic!("expected a datetime, got {other:?}"),
        }

        let date = column(TypeId::DATE, FieldFlags::empty(), Some("utf8"));
        match decode(b"2024-06-01", &date) {
            Value::Date(value) => {
                assert_eq!(value.format("%Y-%m-%d").to_string(), "2024-06-01")
            }
            other => panic!("expected a date, got {other:?}"),
        }

        let time = column(TypeId::TIME, FieldFlags::empty(), Some("utf8"));
        match decode(b"8:01:02", &time) {
            Value::Time(value) => {
                let seconds = value.num_seconds();
                assert_eq!(
                    format!("{}:{:02}:{:02}", seconds / 3600, seconds / 60 % 60, seconds % 60),
                    "8:01:02"
                );
            }
            other => panic!("expected a duration, got {other:?}"),
        }
    }

    #[test]
    fn invalid_temporals_fall_back_to_text() {
        let datetime = column(TypeId::DATETIME, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode(b"0000-00-00 00:00:00", &datetime),
            Value::Text("0000-00-00 00:00:00".into())
        );

        // shape-valid but not a calendar day
        assert_eq!(
            decode(b"2024-02-30 00:00:00", &datetime),
            Value::Text("2024-02-30 00:00:00".into())
        );
    }

    #[test]
    fn invalid_temporals_use_the_configured_substitute() {
        let mut datetime = column(TypeId::DATETIME, FieldFlags::empty(), Some("utf8"));
        datetime.invalid = Some(Value::Null);

        assert_eq!(decode(b"0000-00-00 00:00:00", &datetime), Value::Null);
    }

    #[test]
    fn a_converter_preempts_default_decoding() {
        let mut tiny = column(TypeId::TINY, FieldFlags::empty(), Some("utf8"));
        tiny.converter = Some(Arc::new(|raw: RawValue<'_>| {
            Ok(match raw {
                RawValue::Text(text) => Value::Text(format!("<{text}>")),
                RawValue::Bytes(bytes) => Value::Bytes(bytes.to_vec()),
            })
        }));

        assert_eq!(decode(b"1", &tiny), Value::Text("<1>".into()));
    }

    #[test]
    fn nulls_are_never_converted() {
        let tiny = column(TypeId::TINY, FieldFlags::empty(), Some("utf8"));
        assert_eq!(
            decode_value(None, &tiny, &ResultOptions::default()).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn unknown_type_codes_are_an_error() {
        let bogus = column(TypeId(200), FieldFlags::empty(), Some("utf8"));
        assert!(decode_value(Some(b"x"), &bogus, &ResultOptions::default()).is_err());
    }
}
