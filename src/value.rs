use std::borrow::Cow;

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// A single decoded column value.
///
/// Which variant a non-NULL cell produces depends only on the column's type
/// code, flags, and encoding; see the decoding table in [`crate::decode`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,

    /// TINYINT through BIGINT
    Int(i64),

    /// TINYINT through BIGINT with the UNSIGNED flag; also YEAR
    UInt(u64),

    /// FLOAT and DOUBLE
    Double(f64),

    /// DECIMAL, preserving the exact decimal string
    Decimal(BigDecimal),

    /// any string-family column with no declared encoding
    Bytes(Vec<u8>),

    /// text columns, and the fallback form of a malformed temporal
    Text(String),

    Date(NaiveDate),

    DateTime(NaiveDateTime),

    /// TIME is a signed duration, not a clock time; hours may exceed 24
    Time(Duration),

    /// JSON columns when `parse_json` is enabled
    Json(serde_json::Value),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// The raw wire value handed to a user-supplied converter: bytes for a
/// binary column, decoded text otherwise.
#[derive(Debug)]
pub enum RawValue<'a> {
    Bytes(&'a [u8]),
    Text(Cow<'a, str>),
}
