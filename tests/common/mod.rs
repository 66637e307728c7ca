//! Shared test transport: an in-memory socket plus wire-format builders.

#![allow(dead_code)]

use std::io::{self, Read};
use std::time::Duration;

use mysql_rowdata::{
    FieldFlags, MySqlField, MySqlStream, ResultOptions, Socket, TextResults, TypeId,
};

pub struct TestSocket {
    data: io::Cursor<Vec<u8>>,
    pub closed: bool,
    pub timeouts: Vec<Option<Duration>>,
}

impl TestSocket {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: io::Cursor::new(data),
            closed: false,
            timeouts: Vec::new(),
        }
    }

    /// Bytes not yet consumed by the reader.
    pub fn remaining(&self) -> usize {
        self.data.get_ref().len() - self.data.position() as usize
    }
}

impl Read for TestSocket {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Socket for TestSocket {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        self.timeouts.push(timeout);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.closed = true;
    }
}

/// One wire frame: 3-byte little-endian length, sequence byte, payload.
pub fn frame(seq: u8, payload: &[u8]) -> Vec<u8> {
    let mut out = vec![0; 4];
    out[..3].copy_from_slice(&(payload.len() as u32).to_le_bytes()[..3]);
    out[3] = seq;
    out.extend_from_slice(payload);
    out
}

/// A row packet: one length-coded string per column, `None` for NULL.
pub fn row_packet(cells: &[Option<&[u8]>]) -> Vec<u8> {
    let mut out = Vec::new();

    for cell in cells {
        match cell {
            None => out.push(0xFB),

            Some(value) if value.len() < 0xFB => {
                out.push(value.len() as u8);
                out.extend_from_slice(value);
            }

            Some(value) => {
                assert!(value.len() <= u16::MAX as usize, "test rows stay small");
                out.push(0xFC);
                out.extend_from_slice(&(value.len() as u16).to_le_bytes());
                out.extend_from_slice(value);
            }
        }
    }

    out
}

pub fn eof_packet(warnings: u16, status: u16) -> Vec<u8> {
    let mut out = vec![0xFE];
    out.extend_from_slice(&warnings.to_le_bytes());
    out.extend_from_slice(&status.to_le_bytes());
    out
}

/// Frame a sequence of packets consecutively, starting at `first_seq`.
pub fn wire(first_seq: u8, packets: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut seq = first_seq;

    for packet in packets {
        out.extend_from_slice(&frame(seq, packet));
        seq = seq.wrapping_add(1);
    }

    out
}

/// A stream positioned at the first row packet of a result set.
pub fn stream(first_seq: u8, packets: &[Vec<u8>]) -> MySqlStream<TestSocket> {
    MySqlStream::new(TestSocket::new(wire(first_seq, packets)), None, first_seq)
}

pub fn field(name: &str, type_code: TypeId, flags: FieldFlags) -> MySqlField {
    MySqlField::new(name, type_code, flags)
}

/// A result handle over UTF-8 text columns with no custom converters.
pub fn text_results(fields: Vec<MySqlField>, options: ResultOptions) -> TextResults {
    let converters = fields
        .iter()
        .map(|_| (Some("utf8".to_owned()), None))
        .collect();

    TextResults::new(fields, converters, options)
}
