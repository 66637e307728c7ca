use std::ops::Range;

use bytes::Bytes;

use crate::io::BufExt;

/// One text-protocol row, split into per-column raw value slices.
///
/// The packet payload is kept whole; each column is either a byte range into
/// it or `None` for SQL NULL.
pub struct TextRow {
    buffer: Bytes,
    values: Box<[Option<Range<usize>>]>,
}

impl TextRow {
    pub fn decode(buffer: Bytes, columns: usize) -> Self {
        let mut values = Vec::with_capacity(columns);

        let mut buf: &[u8] = &buffer;
        let mut index = 0;

        for _ in 0..columns {
            let before = buf.len();

            match buf.get_bytes_lenenc() {
                Some(value) => {
                    let consumed = before - buf.len();
                    let start = index + (consumed - value.len());

                    values.push(Some(start..start + value.len()));
                    index += consumed;
                }

                None => {
                    values.push(None);
                    index += before - buf.len();
                }
            }
        }

        Self {
            buffer,
            values: values.into_boxed_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> Option<&[u8]> {
        let range = self.values.get(index)?.as_ref()?;

        Some(&self.buffer[range.start..range.end])
    }
}
