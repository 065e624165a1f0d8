//! Conversions between hexadecimal text, binary-digit strings and integers.
//!
//! Mode S fields are unsigned by definition, so nothing here deals with sign
//! bits.

use serde_json::Value;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Expand a hexadecimal string into a string of `'0'`/`'1'` digits, four per
/// input character, in input order. Upper and lower case are both accepted.
///
/// Returns `None` if any character is not a hex digit; no partial output is
/// produced.
pub fn hex_to_binary(text: &str) -> Option<String> {
    let mut bits = String::with_capacity(text.len() * 4);
    for c in text.bytes() {
        let nibble = hex_digit_val(c)?;
        for shift in (0..4).rev() {
            bits.push(if (nibble >> shift) & 1 == 1 { '1' } else { '0' });
        }
    }
    Some(bits)
}

/// Same as [`hex_to_binary`] for an arbitrary JSON value. Anything that is
/// not a string (null, number, array, object) yields `None`.
pub fn hex_value_to_binary(value: &Value) -> Option<String> {
    value.as_str().and_then(hex_to_binary)
}

/// Parse a binary-digit string as an unsigned integer.
///
/// `None` for an empty string, a non-binary digit, or more than 64 bits.
pub fn binary_to_decimal(bits: &str) -> Option<u64> {
    if bits.is_empty() || bits.len() > 64 {
        return None;
    }
    bits.bytes().try_fold(0u64, |acc, b| match b {
        b'0' => Some(acc << 1),
        b'1' => Some((acc << 1) | 1),
        _ => None,
    })
}

/// Render a binary-digit string as uppercase hex, one digit per 4 bits.
/// Input that is not a multiple of 4 long is left-padded with zeros.
///
/// `None` if any character is not `'0'` or `'1'`.
pub fn binary_to_hex(bits: &str) -> Option<String> {
    let pad = (4 - bits.len() % 4) % 4;
    let padded: Vec<u8> = std::iter::repeat_n(b'0', pad).chain(bits.bytes()).collect();

    padded
        .chunks(4)
        .map(|nibble| {
            let val = nibble.iter().try_fold(0usize, |acc, &b| match b {
                b'0' => Some(acc << 1),
                b'1' => Some((acc << 1) | 1),
                _ => None,
            })?;
            Some(HEX_DIGITS[val] as char)
        })
        .collect()
}

fn hex_digit_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
