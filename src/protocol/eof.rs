use byteorder::LittleEndian;

use crate::error::{Error, Result};
use crate::io::Buf;
use crate::protocol::Status;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_eof_packet.html
// https://mariadb.com/kb/en/eof_packet/
#[derive(Debug)]
pub struct EofPacket {
    pub warnings: u16,
    pub status: Status,
}

impl EofPacket {
    /// An EOF packet is identified by its first byte together with a total
    /// length under 9; longer `0xFE`-leading payloads are row data whose
    /// first column begins with an 8-byte length prefix.
    pub fn is_eof(data: &[u8]) -> bool {
        !data.is_empty() && data[0] == 0xFE && data.len() < 9
    }

    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFE {
            return Err(Error::protocol(format_args!(
                "expected EOF (0xFE); received 0x{:X}",
                header
            )));
        }

        let warnings = buf.get_u16::<LittleEndian>()?;
        let status = buf.get_u16::<LittleEndian>()?;

        Ok(Self {
            warnings,
            status: Status::from_bits_truncate(status),
        })
    }

    pub fn has_next(&self) -> bool {
        self.status.contains(Status::SERVER_MORE_RESULTS_EXISTS)
    }
}
