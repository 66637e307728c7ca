use std::{io, str};

use byteorder::ByteOrder;

pub trait Buf<'a> {
    fn advance(&mut self, cnt: usize);

    fn get_u8(&mut self) -> io::Result<u8>;

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16>;

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32>;

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64>;

    fn get_str(&mut self, len: usize) -> io::Result<&'a str>;

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]>;
}

impl<'a> Buf<'a> for &'a [u8] {
    fn advance(&mut self, cnt: usize) {
        *self = &self[cnt..];
    }

    fn get_u8(&mut self) -> io::Result<u8> {
        let val = *self.first().ok_or(io::ErrorKind::UnexpectedEof)?;
        self.advance(1);

        Ok(val)
    }

    fn get_u16<T: ByteOrder>(&mut self) -> io::Result<u16> {
        let val = T::read_u16(self.get_bytes(2)?);

        Ok(val)
    }

    fn get_u24<T: ByteOrder>(&mut self) -> io::Result<u32> {
        let val = T::read_u24(self.get_bytes(3)?);

        Ok(val)
    }

    fn get_u64<T: ByteOrder>(&mut self) -> io::Result<u64> {
        let val = T::read_u64(self.get_bytes(8)?);

        Ok(val)
    }

    fn get_str(&mut self, len: usize) -> io::Result<&'a str> {
        str::from_utf8(self.get_bytes(len)?)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn get_bytes(&mut self, len: usize) -> io::Result<&'a [u8]> {
        if self.len() < len {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }

        let buf = &self[..len];
        self.advance(len);

        Ok(buf)
    }
}
