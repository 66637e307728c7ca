//! Client-side reader for the **MySQL** text-protocol row phase.
//!
//! Given a connected, authenticated transport that has already dispatched a
//! query and consumed the column-definition phase, this crate reassembles
//! logical packets from the wire, decodes each row's length-coded text
//! values into typed values, and accumulates them in the caller's choice of
//! shape: plain sequences, fixed-shape named records, ordered maps, or a
//! contiguous columnar buffer published through a numpy-style
//! array-interface descriptor.
//!
//! Everything around the row phase — sockets and TLS, authentication,
//! query dispatch, pooling — belongs to the caller, reached through the
//! narrow [`Socket`] seam and the [`TextResults`] handle.
//!
//! ```no_run
//! use mysql_rowdata::{
//!     FieldFlags, MySqlField, MySqlStream, ResultOptions, TextResults, TypeId,
//! };
//!
//! # fn main() -> mysql_rowdata::Result<()> {
//! # let socket: std::net::TcpStream = unimplemented!();
//! // metadata from the column-definition phase
//! let fields = vec![MySqlField::new("id", TypeId::LONGLONG, FieldFlags::NOT_NULL)];
//! let converters = vec![(Some("utf8".to_owned()), None)];
//!
//! let mut results = TextResults::new(fields, converters, ResultOptions::default());
//! let mut stream = MySqlStream::new(socket, None, 1);
//!
//! while let Some(row) = stream.fetch_one(&mut results)? {
//!     println!("{:?}", row.get(0));
//! }
//! # Ok(())
//! # }
//! ```

mod column;
mod columnar;
mod decode;
mod error;
mod fetch;
mod io;
mod options;
mod protocol;
mod row;
mod stream;
mod temporal;
mod value;

pub use column::{Converter, MySqlField};

pub use columnar::{Array, ArrayInterface};

pub use error::{BoxDynError, Error, MySqlDatabaseError, Result};

pub use fetch::{ConverterSlot, TextResults};

pub use options::{OutputFormat, ResultOptions};

pub use protocol::{EofPacket, ErrPacket, FieldFlags, Status, TypeId};

pub use row::{Batch, Record, Row};

pub use stream::{MySqlStream, Socket};

pub use value::{RawValue, Value};
