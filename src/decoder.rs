//! ADS-B extended squitter decoder
//!
//!  Turns a framed hex message such as `*8D4840D6202CC371C32CE0576098;` into
//!  a [`DecodedMessage`].
//!
//! Parity is not checked and the PI field is passed through untouched.
//! The MESSAGE field is always run through the identification charset, so
//! for position, velocity and status messages the text is well formed but
//! meaningless.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::bits::{binary_to_decimal, binary_to_hex, hex_to_binary};
use crate::error::{DecodeError, Result};
use crate::identification::decode_identification;
use crate::segment::{BinaryMessage, Segment};
use crate::type_code::{TypeCategory, classify};

/// Hex digits between the sentinels.
pub const MODES_LONG_MSG_HEX: usize = 28;
/// Full framed length: sentinel + hex digits + sentinel.
pub const RAW_MSG_LEN: usize = MODES_LONG_MSG_HEX + 2;

/// DATA field of a decoded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    /// Type code category name
    #[serde(rename = "TC")]
    pub tc: &'static str,
    /// Emitter category
    #[serde(rename = "EC")]
    pub ec: u8,
    /// MESSAGE field decoded with the identification charset
    #[serde(rename = "MESSAGE")]
    pub message: String,
    #[serde(skip)]
    pub type_category: TypeCategory,
}

/// Decoded extended squitter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedMessage {
    /// Downlink Format
    #[serde(rename = "DF")]
    pub df: u8,
    /// Capability
    #[serde(rename = "CA")]
    pub ca: u8,
    /// 24-bit aircraft address as 6 uppercase hex digits
    #[serde(rename = "ICAO")]
    pub icao: String,
    #[serde(rename = "DATA")]
    pub data: MessageData,
    /// Raw parity bits, not validated
    #[serde(rename = "PI")]
    pub pi: String,
}

impl DecodedMessage {
    pub fn is_identification(&self) -> bool {
        self.data.type_category.is_identification()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "DF {}: {}", self.df, downlink_format_str(self.df))?;
        writeln!(f, "  Capability     : {} ({})", self.ca, capability_str(self.ca))?;
        writeln!(f, "  ICAO Address   : {}", self.icao)?;
        writeln!(
            f,
            "  Type Code      : {} ({})",
            self.data.type_category.code, self.data.tc
        )?;
        writeln!(f, "  Emitter Cat.   : {}", self.data.ec)?;
        writeln!(f, "  Message        : {}", self.data.message)?;
        writeln!(f, "  PI             : {}", self.pi)
    }
}

/// Framing check done before any decoding: a non-empty string of exactly
/// 30 characters. Sentinels and hex content are not inspected here.
pub fn is_valid_message(raw: &str) -> bool {
    !raw.is_empty() && raw.chars().count() == RAW_MSG_LEN
}

/// [`is_valid_message`] for an arbitrary JSON value; only strings can pass.
pub fn is_valid_value(value: &Value) -> bool {
    value.as_str().is_some_and(is_valid_message)
}

/// Decode one framed message.
pub fn decode(raw: &str) -> Result<DecodedMessage> {
    if !is_valid_message(raw) {
        return Err(DecodeError::InvalidValue);
    }

    let payload: String = raw.chars().skip(1).take(MODES_LONG_MSG_HEX).collect();
    let bits = hex_to_binary(&payload)
        .and_then(BinaryMessage::new)
        .ok_or(DecodeError::InvalidValue)?;

    decode_binary(&bits)
}

/// Decode an arbitrary JSON value. Anything but a valid framed string is
/// rejected with [`DecodeError::InvalidValue`].
pub fn decode_value(value: &Value) -> Result<DecodedMessage> {
    match value.as_str() {
        Some(raw) => decode(raw),
        None => Err(DecodeError::InvalidValue),
    }
}

/// Build the record from an already expanded 112-bit message.
pub fn decode_binary(bits: &BinaryMessage) -> Result<DecodedMessage> {
    let type_category = classify(field_value(bits, Segment::Type)?);

    // TODO: only identification messages (TC 1-4) carry charset text; other
    // type codes need their own payload decoders.
    let message = decode_identification(bits.segment(Segment::Message))?;

    Ok(DecodedMessage {
        df: field_value(bits, Segment::Df)? as u8,
        ca: field_value(bits, Segment::Ca)? as u8,
        icao: binary_to_hex(bits.segment(Segment::Icao)).ok_or(DecodeError::InvalidValue)?,
        data: MessageData {
            tc: type_category.name(),
            ec: field_value(bits, Segment::Ec)? as u8,
            message,
            type_category,
        },
        pi: bits.segment(Segment::Pi).to_string(),
    })
}

fn field_value(bits: &BinaryMessage, segment: Segment) -> Result<u64> {
    binary_to_decimal(bits.segment(segment)).ok_or(DecodeError::InvalidValue)
}

fn downlink_format_str(df: u8) -> &'static str {
    match df {
        17 => "ADS-B message",
        18 => "TIS-B message",
        _ => "Unexpected downlink format",
    }
}

fn capability_str(ca: u8) -> &'static str {
    match ca {
        0 => "Level 1 (Surveillance Only)",
        1..=3 => "Reserved",
        4 => "Level 2+ (on ground)",
        5 => "Level 2+ (airborne)",
        6 => "Level 2+ (on ground or airborne)",
        7 => "Level 7",
        _ => "Unknown",
    }
}
