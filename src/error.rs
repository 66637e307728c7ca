//! Error and result types.

use std::fmt::{self, Display};
use std::io;

use crate::protocol::{ErrPacket, TypeId};

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A boxed error from a user-supplied converter.
pub type BoxDynError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// All the ways driving a result set can fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The connection is presumed dead; the socket has been force-closed.
    ///
    /// Raised for transport failures (I/O error, timeout, short read) and
    /// for a frame carrying sequence number 0 where a later one was
    /// expected.
    #[error("OperationalError({code}, {message:?})")]
    Operational { code: u16, message: String },

    /// A client-side protocol-state violation (wrong sequence number).
    #[error("InternalError({code}, {message:?})")]
    Internal { code: u16, message: String },

    /// An error returned by the server as an ERR packet.
    #[error("{0}")]
    Database(#[from] MySqlDatabaseError),

    /// Unexpected or malformed packet contents.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A column announced a type code this crate does not know.
    #[error("unknown type code: {0:?}")]
    TypeCode(TypeId),

    /// A raw value could not be converted to its target type.
    #[error("error decoding column value: {0}")]
    Decode(String),

    /// A user-supplied converter failed; the source error is surfaced
    /// unchanged.
    #[error("error occurred while converting a column value: {0}")]
    Converter(#[source] BoxDynError),
}

impl Error {
    pub(crate) fn lost_connection() -> Self {
        Error::Operational {
            code: 0,
            message: "Lost connection to MySQL server during query".into(),
        }
    }

    pub(crate) fn packet_sequence_wrong() -> Self {
        Error::Internal {
            code: 0,
            message: "Packet sequence number wrong".into(),
        }
    }

    pub(crate) fn protocol(message: impl Display) -> Self {
        Error::Protocol(message.to_string())
    }

    pub(crate) fn decode(message: impl Display) -> Self {
        Error::Decode(message.to_string())
    }
}

// short packet payloads surface as `UnexpectedEof` from the buffer getters
impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        Error::Protocol(error.to_string())
    }
}

/// An error returned from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlDatabaseError(pub(crate) ErrPacket);

impl MySqlDatabaseError {
    /// Decode the payload of an ERR packet (first byte `0xFF`).
    pub fn decode(buf: &[u8]) -> Result<Self> {
        Ok(Self(ErrPacket::decode(buf)?))
    }

    /// The server error code, e.g. `1062`.
    pub fn code(&self) -> u16 {
        self.0.error_code
    }

    /// The five-character SQLSTATE, when the server sent one.
    pub fn sql_state(&self) -> Option<&str> {
        self.0.sql_state.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.0.error_message
    }
}

impl Display for MySqlDatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sql_state() {
            Some(state) => write!(f, "{} ({}): {}", self.code(), state, self.message()),
            None => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for MySqlDatabaseError {}
