//! Bitstream to message conversion.

use crate::config::TERMINATOR;
use crate::error::{Error, Result};

/// Decode payload bytes from `bits`, starting at `offset`.
///
/// At every byte boundary the next 16 bits are compared with the
/// terminator; on a match decoding stops. Otherwise the next 8 bits are
/// read as one byte. Running out of bits before a terminator is an error,
/// never a silent truncation.
///
/// # Example
///
/// ```
/// use stegscan::encoding::{decode, encode};
///
/// let bits = encode("Hello");
/// assert_eq!(decode(bits.bits(), 0).unwrap(), b"Hello");
/// ```
pub fn decode(bits: &[bool], offset: usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pos = offset;

    loop {
        let window = match pos
            .checked_add(TERMINATOR.len())
            .and_then(|end| bits.get(pos..end))
        {
            Some(w) => w,
            None => {
                return Err(Error::TerminatorNotFound {
                    bits_scanned: bits.len().saturating_sub(offset),
                })
            }
        };
        if window == &TERMINATOR[..] {
            return Ok(out);
        }

        let byte = window[..8]
            .iter()
            .fold(0u8, |acc, &bit| (acc << 1) | bit as u8);
        out.push(byte);
        pos += 8;
    }
}

/// Decode and validate the payload as UTF-8 text.
pub fn decode_message(bits: &[bool], offset: usize) -> Result<String> {
    let bytes = decode(bits, offset)?;
    String::from_utf8(bytes).map_err(|_| Error::InvalidMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{encode, encode_bytes};

    #[test]
    fn test_decode_roundtrip() {
        let msg = "Celem DAP jest optymalizacja.";
        let bits = encode(msg);
        assert_eq!(decode_message(bits.bits(), 0).unwrap(), msg);
    }

    #[test]
    fn test_decode_with_offset() {
        let mut bits = vec![false, true, true];
        bits.extend(encode("ok").iter());

        assert_eq!(decode_message(&bits, 3).unwrap(), "ok");
    }

    #[test]
    fn test_decode_ignores_trailing_bits() {
        let mut bits = encode("abc").bits().to_vec();
        bits.extend(std::iter::repeat(true).take(40));

        assert_eq!(decode_message(&bits, 0).unwrap(), "abc");
    }

    #[test]
    fn test_decode_empty_message() {
        let bits = encode("");
        assert_eq!(decode_message(bits.bits(), 0).unwrap(), "");
    }

    #[test]
    fn test_terminator_not_found() {
        let bits = encode("lost");
        let cut = &bits.bits()[..bits.len() - 1];

        match decode(cut, 0) {
            Err(Error::TerminatorNotFound { bits_scanned }) => {
                assert_eq!(bits_scanned, cut.len())
            }
            other => panic!("expected TerminatorNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_offset_past_end() {
        let bits = [true; 32];
        assert!(matches!(
            decode(&bits, usize::MAX - 4),
            Err(Error::TerminatorNotFound { bits_scanned: 0 })
        ));
        assert!(matches!(
            decode(&bits, 40),
            Err(Error::TerminatorNotFound { bits_scanned: 0 })
        ));
    }

    #[test]
    fn test_all_zero_bits_have_no_terminator() {
        let bits = vec![false; 256];
        assert!(matches!(
            decode(&bits, 0),
            Err(Error::TerminatorNotFound { .. })
        ));
    }

    #[test]
    fn test_payload_containing_terminator_decodes_short() {
        // 0xFF 0xFE on a byte boundary is indistinguishable from the terminator.
        let bits = encode_bytes(&[b'A', 0xFF, 0xFE, b'B']);
        assert_eq!(decode(bits.bits(), 0).unwrap(), b"A");
    }

    #[test]
    fn test_invalid_utf8() {
        let bits = encode_bytes(&[0xC3]);
        assert!(matches!(
            decode_message(bits.bits(), 0),
            Err(Error::InvalidMessage)
        ));
    }
}
