use byteorder::LittleEndian;

use crate::error::{Error, Result};
use crate::io::Buf;

// https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_err_packet.html
// https://mariadb.com/kb/en/err_packet/
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: Option<Box<str>>,
    pub error_message: Box<str>,
}

impl ErrPacket {
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        let header = buf.get_u8()?;
        if header != 0xFF {
            return Err(Error::protocol(format_args!(
                "expected ERR (0xFF); received 0x{:X}",
                header
            )));
        }

        let error_code = buf.get_u16::<LittleEndian>()?;

        // the '#' marker and 5-byte SQLSTATE are only present in 4.1+ errors
        let sql_state = if buf.first() == Some(&b'#') {
            buf.advance(1);

            Some(buf.get_str(5)?.into())
        } else {
            None
        };

        let error_message = String::from_utf8_lossy(buf).into();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ErrPacket;

    const ERR_HANDSHAKE_UNKNOWN_DB: &[u8] = b"\xff\x19\x04#42000Unknown database \'unknown\'";

    #[test]
    fn it_decodes_err_packets() {
        let p = ErrPacket::decode(ERR_HANDSHAKE_UNKNOWN_DB).unwrap();

        assert_eq!(p.error_code, 1049);
        assert_eq!(p.sql_state.as_deref(), Some("42000"));
        assert_eq!(&*p.error_message, "Unknown database \'unknown\'");
    }

    #[test]
    fn it_decodes_err_packets_without_sql_state() {
        let p = ErrPacket::decode(b"\xff\x10\x04Too many connections").unwrap();

        assert_eq!(p.error_code, 1040);
        assert_eq!(p.sql_state, None);
        assert_eq!(&*p.error_message, "Too many connections");
    }
}
