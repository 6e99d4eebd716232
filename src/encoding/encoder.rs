//! Message to bitstream conversion.

use crate::config::TERMINATOR;

/// An ordered sequence of payload bits followed by the terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitstream {
    bits: Vec<bool>,
}

impl Bitstream {
    /// Total number of bits, terminator included.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always false for encoder output; the terminator is never omitted.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.bits.iter().copied()
    }

    /// Number of payload bytes carried.
    pub fn payload_bytes(&self) -> usize {
        (self.bits.len() - TERMINATOR.len()) / 8
    }
}

/// Encode text into a terminated bitstream.
///
/// Each byte of the UTF-8 encoding becomes one 8-bit group, so ASCII text
/// costs `8 × chars + 16` bits.
///
/// # Example
///
/// ```
/// use stegscan::encoding::encode;
///
/// let bits = encode("Hi");
/// assert_eq!(bits.len(), 8 * 2 + 16);
/// ```
pub fn encode(message: &str) -> Bitstream {
    encode_bytes(message.as_bytes())
}

/// Encode raw bytes into a terminated bitstream.
pub fn encode_bytes(bytes: &[u8]) -> Bitstream {
    let mut bits = Vec::with_capacity(bytes.len() * 8 + TERMINATOR.len());
    for &byte in bytes {
        for shift in (0..8).rev() {
            bits.push((byte >> shift) & 1 == 1);
        }
    }
    bits.extend_from_slice(&TERMINATOR);
    Bitstream { bits }
}
