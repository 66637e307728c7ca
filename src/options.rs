use std::collections::HashMap;

use crate::column::Converter;
use crate::protocol::TypeId;
use crate::value::Value;

/// Row assembly mode for a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain sequences of values.
    #[default]
    Tuples,

    /// Fixed-shape records addressable by column name.
    NamedTuples,

    /// Name-to-value mappings, preserving column order.
    Dicts,

    /// Columnar buffer published through an array-interface descriptor.
    Numpy,

    /// Same columnar buffer; the caller materializes a dataframe on top.
    Pandas,
}

impl OutputFormat {
    /// Parse the caller-facing option value. Singular forms are accepted;
    /// anything unrecognized selects tuples.
    pub fn from_option(value: &str) -> Self {
        match value {
            "dict" | "dicts" => OutputFormat::Dicts,
            "namedtuple" | "namedtuples" => OutputFormat::NamedTuples,
            "numpy" => OutputFormat::Numpy,
            "pandas" => OutputFormat::Pandas,
            _ => OutputFormat::Tuples,
        }
    }

    pub(crate) fn is_columnar(self) -> bool {
        matches!(self, OutputFormat::Numpy | OutputFormat::Pandas)
    }
}

/// Options governing how a result set is decoded and assembled.
#[derive(Clone, Default)]
pub struct ResultOptions {
    pub output: OutputFormat,

    /// Feed decoded JSON columns through the JSON parser instead of
    /// returning their text.
    pub parse_json: bool,

    /// Per-type substitute emitted when a temporal cell fails shape
    /// validation.
    pub invalid_values: HashMap<TypeId, Value>,

    /// Registered default converters; a caller converter identical to its
    /// type's entry here is treated as absent.
    pub default_converters: HashMap<TypeId, Converter>,

    /// Single-row streaming mode: rows are handed out as they are read
    /// instead of accumulating the full result set.
    pub unbuffered: bool,
}

#[cfg(test)]
mod tests {
    use super::OutputFormat;

    #[test]
    fn it_parses_output_formats() {
        assert_eq!(OutputFormat::from_option("tuples"), OutputFormat::Tuples);
        assert_eq!(OutputFormat::from_option("dict"), OutputFormat::Dicts);
        assert_eq!(OutputFormat::from_option("dicts"), OutputFormat::Dicts);
        assert_eq!(
            OutputFormat::from_option("namedtuple"),
            OutputFormat::NamedTuples
        );
        assert_eq!(OutputFormat::from_option("numpy"), OutputFormat::Numpy);
        assert_eq!(OutputFormat::from_option("pandas"), OutputFormat::Pandas);

        // unrecognized values fall back to tuples
        assert_eq!(OutputFormat::from_option("csv"), OutputFormat::Tuples);
    }
}
