//! Columnar output buffers and the array-interface descriptor.
//!
//! Rows stream into one contiguous buffer, `stride` bytes per row, laid out
//! column-after-column exactly as the descriptor announces. Primitive cells
//! hold little-endian machine values; object cells hold an 8-byte handle
//! into the batch's value arena.

use byteorder::{ByteOrder, LittleEndian};

use crate::column::MySqlColumn;
use crate::decode::{decode_decimal, decode_string_like, parse_double, parse_int};
use crate::error::{Error, Result};
use crate::options::ResultOptions;
use crate::protocol::{FieldFlags, TextRow, TypeId};
use crate::temporal;
use crate::value::Value;

/// Target size in bytes for the initial buffer when the caller did not
/// bound the batch.
const DEFAULT_BUFFER_BYTES: usize = 10_000_000;

/// Growth factor applied when a row write finds the buffer full.
const GROWTH_FACTOR: f64 = 1.7;

pub(crate) fn column_width(column: &MySqlColumn) -> Result<usize> {
    Ok(match column.type_id {
        TypeId::TINY => 1,
        TypeId::SHORT => 2,
        TypeId::INT24 | TypeId::LONG => 4,
        TypeId::LONGLONG => 8,

        TypeId::FLOAT => 4,
        TypeId::DOUBLE => 8,

        TypeId::YEAR => 2,

        // 8-byte nanosecond counts
        TypeId::DATETIME | TypeId::TIMESTAMP | TypeId::DATE | TypeId::NEWDATE | TypeId::TIME => 8,

        // 8-byte handles into the object arena
        TypeId::DECIMAL
        | TypeId::NEWDECIMAL
        | TypeId::NULL
        | TypeId::BIT
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
        | TypeId::STRING => 8,

        other => return Err(Error::TypeCode(other)),
    })
}

pub(crate) fn row_stride(columns: &[MySqlColumn]) -> Result<usize> {
    columns.iter().map(column_width).sum()
}

fn column_typestr(column: &MySqlColumn) -> Result<&'static str> {
    let unsigned = column.flags.contains(FieldFlags::UNSIGNED);

    Ok(match column.type_id {
        TypeId::TINY => {
            if unsigned {
                "<u1"
            } else {
                "<i1"
            }
        }

        TypeId::SHORT => {
            if unsigned {
                "<u2"
            } else {
                "<i2"
            }
        }

        TypeId::INT24 | TypeId::LONG => {
            if unsigned {
                "<u4"
            } else {
                "<i4"
            }
        }

        TypeId::LONGLONG => {
            if unsigned {
                "<u8"
            } else {
                "<i8"
            }
        }

        TypeId::FLOAT => "<f4",
        TypeId::DOUBLE => "<f8",

        TypeId::NULL => "<u8",

        TypeId::YEAR => "<u2",

        TypeId::DATETIME | TypeId::TIMESTAMP | TypeId::DATE | TypeId::NEWDATE => "<datetime64[ns]",

        TypeId::TIME => "<timedelta64[ns]",

        TypeId::DECIMAL
        | TypeId::NEWDECIMAL
        | TypeId::BIT
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
        | TypeId::STRING => "|O",

        other => return Err(Error::TypeCode(other)),
    })
}

pub(crate) struct ColumnarBuffer {
    stride: usize,

    /// Allocated capacity in rows.
    capacity: usize,

    n_rows: usize,

    /// Byte write offset; always `n_rows * stride` between rows.
    cursor: usize,

    buffer: Vec<u8>,
    objects: Vec<Value>,
    descr: Vec<(String, String)>,
}

impl ColumnarBuffer {
    pub(crate) fn new(
        columns: &[MySqlColumn],
        requested_rows: u64,
        unbuffered: bool,
    ) -> Result<Self> {
        let stride = row_stride(columns)?;

        let capacity = if requested_rows > 0 {
            requested_rows as usize
        } else if unbuffered {
            1
        } else {
            (DEFAULT_BUFFER_BYTES / stride).max(1)
        };

        let descr = columns
            .iter()
            .map(|column| Ok((column.name.to_string(), column_typestr(column)?.to_owned())))
            .collect::<Result<_>>()?;

        Ok(Self {
            stride,
            capacity,
            n_rows: 0,
            cursor: 0,
            buffer: vec![0; stride * capacity],
            objects: Vec::new(),
            descr,
        })
    }

    pub(crate) fn write_row(
        &mut self,
        row: &TextRow,
        columns: &[MySqlColumn],
        options: &ResultOptions,
    ) -> Result<()> {
        if self.n_rows == self.capacity {
            // grow, preserving prior contents
            self.capacity =
                ((self.capacity as f64 * GROWTH_FACTOR) as usize).max(self.capacity + 1);
            self.buffer.resize(self.stride * self.capacity, 0);
        }

        let mut loc = self.cursor;
        for (index, column) in columns.iter().enumerate() {
            loc += self.write_cell(loc, row.get(index), column, options)?;
        }

        debug_assert_eq!(loc, self.cursor + self.stride);

        self.cursor += self.stride;
        self.n_rows += 1;

        Ok(())
    }

    fn write_cell(
        &mut self,
        loc: usize,
        raw: Option<&[u8]>,
        column: &MySqlColumn,
        options: &ResultOptions,
    ) -> Result<usize> {
        let width = column_width(column)?;
        let unsigned = column.flags.contains(FieldFlags::UNSIGNED);

        match column.type_id {
            TypeId::TINY => {
                self.buffer[loc] = match (raw, unsigned) {
                    (None, true) => 0,
                    (None, false) => i8::MIN as u8,
                    (Some(raw), true) => parse_int::<u64>(raw)? as u8,
                    (Some(raw), false) => parse_int::<i64>(raw)? as i8 as u8,
                };
            }

            TypeId::SHORT => {
                let cell = match (raw, unsigned) {
                    (None, true) => 0,
                    (None, false) => i16::MIN as u16,
                    (Some(raw), true) => parse_int::<u64>(raw)? as u16,
                    (Some(raw), false) => parse_int::<i64>(raw)? as i16 as u16,
                };
                LittleEndian::write_u16(&mut self.buffer[loc..loc + 2], cell);
            }

            TypeId::INT24 | TypeId::LONG => {
                let cell = match (raw, unsigned) {
                    (None, true) => 0,
                    (None, false) => i32::MIN as u32,
                    (Some(raw), true) => parse_int::<u64>(raw)? as u32,
                    (Some(raw), false) => parse_int::<i64>(raw)? as i32 as u32,
                };
                LittleEndian::write_u32(&mut self.buffer[loc..loc + 4], cell);
            }

            TypeId::LONGLONG => {
                let cell = match (raw, unsigned) {
                    (None, true) => 0,
                    (None, false) => i64::MIN as u64,
                    (Some(raw), true) => parse_int::<u64>(raw)?,
                    (Some(raw), false) => parse_int::<i64>(raw)? as u64,
                };
                LittleEndian::write_u64(&mut self.buffer[loc..loc + 8], cell);
            }

            TypeId::FLOAT => {
                let cell = match raw {
                    None => f32::NAN,
                    Some(raw) => parse_double(raw)? as f32,
                };
                LittleEndian::write_f32(&mut self.buffer[loc..loc + 4], cell);
            }

            TypeId::DOUBLE => {
                let cell = match raw {
                    None => f64::NAN,
                    Some(raw) => parse_double(raw)?,
                };
                LittleEndian::write_f64(&mut self.buffer[loc..loc + 8], cell);
            }

            TypeId::YEAR => {
                let cell = match raw {
                    None | Some(b"") => 0,
                    Some(raw) => parse_int::<u64>(raw)? as u16,
                };
                LittleEndian::write_u16(&mut self.buffer[loc..loc + 2], cell);
            }

            TypeId::DATETIME | TypeId::TIMESTAMP => {
                let nanos = raw
                    .and_then(temporal::parse_datetime)
                    .map_or(i64::MIN, |p| temporal::datetime_nanos(&p));
                LittleEndian::write_i64(&mut self.buffer[loc..loc + 8], nanos);
            }

            TypeId::DATE | TypeId::NEWDATE => {
                let nanos = raw
                    .and_then(temporal::parse_date)
                    .map_or(i64::MIN, |(y, m, d)| temporal::date_nanos(y, m, d));
                LittleEndian::write_i64(&mut self.buffer[loc..loc + 8], nanos);
            }

            TypeId::TIME => {
                let nanos = raw
                    .and_then(temporal::parse_duration)
                    .map_or(i64::MIN, |t| temporal::duration_nanos(&t));
                LittleEndian::write_i64(&mut self.buffer[loc..loc + 8], nanos);
            }

            TypeId::NULL => self.write_object(loc, Value::Null),

            TypeId::DECIMAL | TypeId::NEWDECIMAL => {
                let value = match raw {
                    None => Value::Null,
                    Some(raw) => decode_decimal(raw, column)?,
                };
                self.write_object(loc, value);
            }

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
            | TypeId::STRING => {
                let value = match raw {
                    None => Value::Null,
                    Some(raw) => decode_string_like(raw, column, options)?,
                };
                self.write_object(loc, value);
            }

            other => return Err(Error::TypeCode(other)),
        }

        Ok(width)
    }

    fn write_object(&mut self, loc: usize, value: Value) {
        let handle = self.objects.len() as u64;
        self.objects.push(value);

        LittleEndian::write_u64(&mut self.buffer[loc..loc + 8], handle);
    }

    pub(crate) fn finish(mut self) -> Array {
        // shrink to the rows actually written
        self.buffer.truncate(self.stride * self.n_rows);

        Array {
            buffer: self.buffer,
            objects: self.objects,
            stride: self.stride,
            n_rows: self.n_rows,
            descr: self.descr,
        }
    }
}

/// A finalized columnar batch: `n_rows * stride` contiguous bytes plus the
/// arena of values referenced by object cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    buffer: Vec<u8>,
    objects: Vec<Value>,
    stride: usize,
    n_rows: usize,
    descr: Vec<(String, String)>,
}

impl Array {
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// The value behind an object cell's 8-byte handle.
    pub fn object(&self, handle: u64) -> Option<&Value> {
        self.objects.get(handle as usize)
    }

    pub fn array_interface(&self) -> ArrayInterface {
        ArrayInterface {
            typestr: format!("|V{}", self.stride),
            descr: self.descr.clone(),
            shape: (self.n_rows,),
            data: (self.buffer.as_ptr() as usize, false),
        }
    }
}

/// A numpy-style `__array_interface__` description of a columnar batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayInterface {
    /// `|V<stride>`: one opaque record per row.
    pub typestr: String,

    /// `(column name, typestring)` per column, in wire order.
    pub descr: Vec<(String, String)>,

    pub shape: (usize,),

    /// Buffer address and the read-only flag (always writable).
    pub data: (usize, bool),
}

#[cfg(test)]
mod tests {
    use byteorder::{ByteOrder, LittleEndian};
    use bytes::Bytes;

    use super::{row_stride, ColumnarBuffer};
    use crate::column::MySqlColumn;
    use crate::options::ResultOptions;
    use crate::protocol::{FieldFlags, TextRow, TypeId};
    use crate::value::Value;

    fn column(name: &str, type_id: TypeId, flags: FieldFlags) -> MySqlColumn {
        MySqlColumn {
            type_id,
            flags,
            name: name.into(),
            encoding: (!flags.contains(FieldFlags::BINARY)).then_some(encoding_rs::UTF_8),
            converter: None,
            invalid: None,
        }
    }

    fn row(cells: &[Option<&[u8]>]) -> TextRow {
        let mut payload = Vec::new();
        for cell in cells {
            match cell {
                None => payload.push(0xFB),
                Some(value) => {
                    assert!(value.len() < 0xFB);
                    payload.push(value.len() as u8);
                    payload.extend_from_slice(value);
                }
            }
        }

        TextRow::decode(Bytes::from(payload), cells.len())
    }

    #[test]
    fn it_computes_strides() {
        let columns = vec![
            column("a", TypeId::TINY, FieldFlags::UNSIGNED),
            column("b", TypeId::DOUBLE, FieldFlags::empty()),
            column("c", TypeId::VAR_STRING, FieldFlags::empty()),
            column("d", TypeId::YEAR, FieldFlags::UNSIGNED),
        ];

        assert_eq!(row_stride(&columns).unwrap(), 1 + 8 + 8 + 2);
    }

    #[test]
    fn it_writes_primitive_cells_and_null_sentinels() {
        let columns = vec![
            column("a", TypeId::TINY, FieldFlags::UNSIGNED),
            column("b", TypeId::LONG, FieldFlags::empty()),
            column("c", TypeId::DOUBLE, FieldFlags::empty()),
        ];
        let options = ResultOptions::default();

        let mut buffer = ColumnarBuffer::new(&columns, 2, false).unwrap();
        buffer
            .write_row(&row(&[Some(b"7"), Some(b"-5"), Some(b"2.5")]), &columns, &options)
            .unwrap();
        buffer
            .write_row(&row(&[None, None, None]), &columns, &options)
            .unwrap();

        let array = buffer.finish();
        let buf = array.buffer();
        assert_eq!(array.stride(), 13);
        assert_eq!(buf.len(), 26);

        assert_eq!(buf[0], 7);
        assert_eq!(LittleEndian::read_i32(&buf[1..5]), -5);
        assert_eq!(LittleEndian::read_f64(&buf[5..13]), 2.5);

        // NULL: 0 for unsigned, INT_MIN for signed, NaN for floats
        assert_eq!(buf[13], 0);
        assert_eq!(LittleEndian::read_i32(&buf[14..18]), i32::MIN);
        assert!(LittleEndian::read_f64(&buf[18..26]).is_nan());
    }

    #[test]
    fn it_boxes_object_cells() {
        let columns = vec![column("s", TypeId::VAR_STRING, FieldFlags::empty())];
        let options = ResultOptions::default();

        let mut buffer = ColumnarBuffer::new(&columns, 3, false).unwrap();
        for cell in [Some(&b"abc"[..]), None, Some(&b"d"[..])] {
            buffer.write_row(&row(&[cell]), &columns, &options).unwrap();
        }

        let array = buffer.finish();
        let handles: Vec<u64> = (0..3)
            .map(|r| LittleEndian::read_u64(&array.buffer()[r * 8..r * 8 + 8]))
            .collect();

        assert_eq!(array.object(handles[0]), Some(&Value::Text("abc".into())));
        assert_eq!(array.object(handles[1]), Some(&Value::Null));
        assert_eq!(array.object(handles[2]), Some(&Value::Text("d".into())));
    }

    #[test]
    fn it_grows_preserving_contents_and_shrinks_on_finish() {
        let columns = vec![column("n", TypeId::LONGLONG, FieldFlags::empty())];
        let options = ResultOptions::default();

        let mut buffer = ColumnarBuffer::new(&columns, 2, false).unwrap();
        for i in 0..5_i64 {
            let text = i.to_string();
            buffer
                .write_row(&row(&[Some(text.as_bytes())]), &columns, &options)
                .unwrap();
        }

        let array = buffer.finish();
        assert_eq!(array.n_rows(), 5);
        assert_eq!(array.buffer().len(), 5 * 8);

        for i in 0..5_i64 {
            let cell = &array.buffer()[i as usize * 8..][..8];
            assert_eq!(LittleEndian::read_i64(cell), i);
        }
    }

    #[test]
    fn it_publishes_the_array_interface() {
        let columns = vec![
            column("id", TypeId::LONG, FieldFlags::UNSIGNED),
            column("ts", TypeId::DATETIME, FieldFlags::empty()),
            column("note", TypeId::VAR_STRING, FieldFlags::empty()),
        ];
        let options = ResultOptions::default();

        let mut buffer = ColumnarBuffer::new(&columns, 1, false).unwrap();
        buffer
            .write_row(
                &row(&[Some(b"1"), Some(b"1970-01-01 00:00:00"), Some(b"x")]),
                &columns,
                &options,
            )
            .unwrap();

        let array = buffer.finish();
        let interface = array.array_interface();

        assert_eq!(interface.typestr, "|V20");
        assert_eq!(interface.shape, (1,));
        assert_eq!(interface.data.0, array.buffer().as_ptr() as usize);
        assert!(!interface.data.1);
        assert_eq!(
            interface.descr,
            vec![
                ("id".to_owned(), "<u4".to_owned()),
                ("ts".to_owned(), "<datetime64[ns]".to_owned()),
                ("note".to_owned(), "|O".to_owned()),
            ]
        );
    }
}
