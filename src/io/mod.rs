mod buf;
mod buf_ext;

pub use self::{buf::Buf, buf_ext::BufExt};
