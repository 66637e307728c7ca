mod eof;
mod err;
mod field;
mod row;
mod status;
mod r#type;

pub use eof::EofPacket;
pub use err::ErrPacket;
pub use field::FieldFlags;
pub use row::TextRow;
pub use status::Status;
pub use r#type::TypeId;
