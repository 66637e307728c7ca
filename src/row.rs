use std::sync::Arc;

use indexmap::IndexMap;

use crate::columnar::Array;
use crate::options::OutputFormat;
use crate::value::Value;

/// A fixed-shape record addressable by column name. The name table is
/// generated once per result set and shared by every record.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub(crate) names: Arc<[Arc<str>]>,
    pub(crate) values: Vec<Value>,
}

impl Record {
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        let index = self.names.iter().position(|n| &**n == name)?;

        self.values.get(index)
    }
}

/// One decoded row in the caller's requested shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    Tuple(Vec<Value>),
    Record(Record),
    Map(IndexMap<String, Value>),
}

impl Row {
    /// The value at a column position, for any shape.
    pub fn get(&self, index: usize) -> Option<&Value> {
        match self {
            Row::Tuple(values) => values.get(index),
            Row::Record(record) => record.values.get(index),
            Row::Map(map) => map.get_index(index).map(|(_, value)| value),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Row::Tuple(values) => values.len(),
            Row::Record(record) => record.values.len(),
            Row::Map(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub(crate) fn assemble(output: OutputFormat, names: &Arc<[Arc<str>]>, values: Vec<Value>) -> Row {
    match output {
        OutputFormat::NamedTuples => Row::Record(Record {
            names: Arc::clone(names),
            values,
        }),

        OutputFormat::Dicts => Row::Map(
            names
                .iter()
                .map(|name| name.to_string())
                .zip(values)
                .collect(),
        ),

        _ => Row::Tuple(values),
    }
}

/// One batch of fetched output: assembled rows, or a finalized columnar
/// buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Batch {
    Rows(Vec<Row>),
    Array(Array),
}

impl Batch {
    pub fn len(&self) -> usize {
        match self {
            Batch::Rows(rows) => rows.len(),
            Batch::Array(array) => array.n_rows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The assembled rows, unless this is a columnar batch.
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            Batch::Rows(rows) => Some(rows),
            Batch::Array(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<Row>> {
        match self {
            Batch::Rows(rows) => Some(rows),
            Batch::Array(_) => None,
        }
    }

    /// The columnar buffer, when this batch was fetched in a columnar mode.
    pub fn array(&self) -> Option<&Array> {
        match self {
            Batch::Rows(_) => None,
            Batch::Array(array) => Some(array),
        }
    }
}
