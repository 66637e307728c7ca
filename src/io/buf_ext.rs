use byteorder::LittleEndian;

use crate::io::Buf;

/// Length-coded primitives for the text protocol.
///
/// `None` is returned both for the explicit NULL marker (`0xFB`) and for a
/// buffer too short to hold the announced width; row decoding treats either
/// as SQL NULL.
pub trait BufExt<'a> {
    fn get_uint_lenenc(&mut self) -> Option<u64>;

    fn get_bytes_lenenc(&mut self) -> Option<&'a [u8]>;
}

impl<'a> BufExt<'a> for &'a [u8] {
    fn get_uint_lenenc(&mut self) -> Option<u64> {
        match self.get_u8().ok()? {
            0xFB => None,

            0xFC => self.get_u16::<LittleEndian>().ok().map(u64::from),
            0xFD => self.get_u24::<LittleEndian>().ok().map(u64::from),
            0xFE => self.get_u64::<LittleEndian>().ok(),

            value if value < 0xFB => Some(u64::from(value)),

            // 0xFF is not a valid length prefix
            _ => None,
        }
    }

    fn get_bytes_lenenc(&mut self) -> Option<&'a [u8]> {
        let len = self.get_uint_lenenc()? as usize;

        // a length running past the payload is clamped to what remains
        let len = len.min(self.len());
        let buf = &self[..len];
        self.advance(len);

        Some(buf)
    }
}
