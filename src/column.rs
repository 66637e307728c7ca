use std::sync::Arc;

use encoding_rs::Encoding;

use crate::error::{BoxDynError, Error, Result};
use crate::options::ResultOptions;
use crate::protocol::{FieldFlags, TypeId};
use crate::value::{RawValue, Value};

/// A caller-supplied conversion applied to a column's raw values in place
/// of default decoding.
pub type Converter = Arc<dyn Fn(RawValue<'_>) -> Result<Value, BoxDynError> + Send + Sync>;

/// Caller-provided metadata for one column, as produced by the
/// column-definition phase of the result set (out of scope here).
#[derive(Debug, Clone)]
pub struct MySqlField {
    pub type_code: TypeId,
    pub flags: FieldFlags,

    /// Declared decimal scale.
    pub scale: u8,

    pub name: String,
}

impl MySqlField {
    pub fn new(name: impl Into<String>, type_code: TypeId, flags: FieldFlags) -> Self {
        Self {
            type_code,
            flags,
            scale: 0,
            name: name.into(),
        }
    }
}

/// One column's compiled descriptor: everything the per-row loop needs,
/// resolved once at result-set open and immutable afterwards.
pub(crate) struct MySqlColumn {
    pub(crate) type_id: TypeId,
    pub(crate) flags: FieldFlags,
    pub(crate) name: Arc<str>,

    /// `None` means a binary column; raw bytes pass through undecoded.
    pub(crate) encoding: Option<&'static Encoding>,

    pub(crate) converter: Option<Converter>,

    /// Substitute emitted when a temporal cell fails shape validation.
    pub(crate) invalid: Option<Value>,
}

impl MySqlColumn {
    pub(crate) fn from_field(
        field: &MySqlField,
        converter_slot: Option<&(Option<String>, Option<Converter>)>,
        options: &ResultOptions,
    ) -> Result<Self> {
        let (encoding, converter) = match converter_slot {
            Some((encoding, converter)) => {
                let encoding = match encoding {
                    None => None,
                    Some(label) => Some(encoding_for(label)?),
                };

                // a converter identical to the registered default is
                // dropped so the fast default decoder stays in play
                let converter = converter.clone().filter(|converter| {
                    options
                        .default_converters
                        .get(&field.type_code)
                        .map_or(true, |default| !Arc::ptr_eq(converter, default))
                });

                (encoding, converter)
            }

            None => (Some(encoding_rs::UTF_8), None),
        };

        Ok(Self {
            type_id: field.type_code,
            flags: field.flags,
            name: field.name.as_str().into(),
            encoding,
            converter,
            invalid: options.invalid_values.get(&field.type_code).cloned(),
        })
    }
}

fn encoding_for(label: &str) -> Result<&'static Encoding> {
    match label {
        // not WHATWG labels, but common in column metadata
        "utf8mb3" | "utf8mb4" => Ok(encoding_rs::UTF_8),

        _ => Encoding::for_label(label.as_bytes())
            .ok_or_else(|| Error::decode(format_args!("unknown character encoding: {label:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{Converter, MySqlColumn, MySqlField};
    use crate::options::ResultOptions;
    use crate::protocol::{FieldFlags, TypeId};
    use crate::value::Value;

    #[test]
    fn a_missing_encoding_means_binary() {
        let field = MySqlField::new("data", TypeId::BLOB, FieldFlags::BINARY);
        let slot = (None, None);

        let column =
            MySqlColumn::from_field(&field, Some(&slot), &ResultOptions::default()).unwrap();

        assert!(column.encoding.is_none());
    }

    #[test]
    fn the_default_converter_is_suppressed() {
        let default: Converter = Arc::new(|_| Ok(Value::Null));
        let custom: Converter = Arc::new(|_| Ok(Value::Null));

        let mut options = ResultOptions::default();
        options
            .default_converters
            .insert(TypeId::TINY, Arc::clone(&default));

        let field = MySqlField::new("n", TypeId::TINY, FieldFlags::empty());

        let slot = (Some("utf8".to_owned()), Some(Arc::clone(&default)));
        let column = MySqlColumn::from_field(&field, Some(&slot), &options).unwrap();
        assert!(column.converter.is_none());

        let slot = (Some("utf8".to_owned()), Some(custom));
        let column = MySqlColumn::from_field(&field, Some(&slot), &options).unwrap();
        assert!(column.converter.is_some());
    }

    #[test]
    fn unknown_encodings_are_rejected() {
        let field = MySqlField::new("s", TypeId::VAR_STRING, FieldFlags::empty());
        let slot = (Some("no-such-encoding".to_owned()), None);

        assert!(MySqlColumn::from_field(&field, Some(&slot), &ResultOptions::default()).is_err());
    }
}
