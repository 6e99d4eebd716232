//! Bitstream codec shared by every embedder.
//!
//! A payload is written as its bytes in big-endian bit order followed by the
//! 16-bit terminator `1111111111111110`. There is no length prefix and no
//! escaping: a payload containing `0xFF 0xFE` on a byte boundary decodes
//! short. UTF-8 text never contains either byte, so this only affects raw
//! payloads passed to [`encode_bytes`].

mod decoder;
mod encoder;

pub use decoder::{decode, decode_message};
pub use encoder::{encode, encode_bytes, Bitstream};
