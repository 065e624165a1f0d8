//! Flight identification payload decoding with the ICAO 6-bit charset.

use crate::bits::binary_to_decimal;
use crate::error::{DecodeError, Result};

/// Bits per character in an identification payload.
pub const CHAR_BITS: usize = 6;

/// Index -> display character. `#` marks unassigned codes, `_` is space.
const IDENT_CHARSET: &[u8; 64] = b"#ABCDEFGHIJKLMNOPQRSTUVWXYZ#####_###############0123456789######";

/// Look up one character of the 6-bit charset.
pub fn charset_char(position: u64) -> Result<char> {
    usize::try_from(position)
        .ok()
        .and_then(|idx| IDENT_CHARSET.get(idx))
        .map(|&b| b as char)
        .ok_or(DecodeError::InvalidPosition(position))
}

/// Decode a MESSAGE field as identification characters, six bits at a time
/// from the left. A 48-bit field gives exactly eight characters; unassigned
/// codes come out as `#` rather than failing.
///
/// The length must be a whole number of characters; a trailing partial
/// window is an `InvalidValue` error.
pub fn decode_identification(bits: &str) -> Result<String> {
    if bits.len() % CHAR_BITS != 0 {
        return Err(DecodeError::InvalidValue);
    }
    bits.as_bytes()
        .chunks(CHAR_BITS)
        .map(|window| {
            let window = std::str::from_utf8(window).map_err(|_| DecodeError::InvalidValue)?;
            let position = binary_to_decimal(window).ok_or(DecodeError::InvalidValue)?;
            charset_char(position)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six(n: u64) -> String {
        format!("{:06b}", n)
    }

    #[test]
    fn test_charset_layout() {
        assert_eq!(charset_char(0), Ok('#'));
        assert_eq!(charset_char(1), Ok('A'));
        assert_eq!(charset_char(26), Ok('Z'));
        for idx in 27..=31 {
            assert_eq!(charset_char(idx), Ok('#'));
        }
        assert_eq!(charset_char(32), Ok('_'));
        for idx in 33..=47 {
            assert_eq!(charset_char(idx), Ok('#'));
        }
        assert_eq!(charset_char(48), Ok('0'));
        assert_eq!(charset_char(57), Ok('9'));
        for idx in 58..=63 {
            assert_eq!(charset_char(idx), Ok('#'));
        }
    }

    #[test]
    fn test_charset_out_of_range() {
        let err = charset_char(64).unwrap_err();
        assert_eq!(err, DecodeError::InvalidPosition(64));
        assert_eq!(err.to_string(), "An invalid position was provided");
    }

    #[test]
    fn test_decode_known_callsign() {
        let bits = "001011001100001101110001110000110010110011100000";
        assert_eq!(decode_identification(bits), Ok("KLM1023_".to_string()));
    }

    #[test]
    fn test_decode_single_characters() {
        let bits: String = [1, 32, 48, 0, 26, 57, 63, 27].iter().map(|&n| six(n)).collect();
        assert_eq!(decode_identification(&bits), Ok("A_0#Z9##".to_string()));
    }

    #[test]
    fn test_decode_always_eight_chars() {
        for fill in ["0", "1"] {
            let out = decode_identification(&fill.repeat(48)).unwrap();
            assert_eq!(out.chars().count(), 8);
        }
        assert_eq!(decode_identification(&"0".repeat(48)).unwrap(), "########");
    }

    #[test]
    fn test_decode_rejects_non_binary() {
        assert_eq!(
            decode_identification("00000x"),
            Err(DecodeError::InvalidValue)
        );
    }

    #[test]
    fn test_decode_rejects_partial_window() {
        let known = "001011001100001101110001110000110010110011100000";
        assert_eq!(
            decode_identification(&known[..47]),
            Err(DecodeError::InvalidValue)
        );
        assert_eq!(decode_identification("0000011"), Err(DecodeError::InvalidValue));
        assert_eq!(decode_identification("1"), Err(DecodeError::InvalidValue));
        assert_eq!(decode_identification(""), Ok(String::new()));
    }
}
