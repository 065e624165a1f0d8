//! Fixed bit ranges of a 112-bit extended squitter.
//!
//! ```text
//! | DF  | CA  |  ICAO  | TYPE | EC  |  MESSAGE  |   PI   |
//! | 0-5 | 5-8 |  8-32  | 32-37|37-40|   40-88   | 88-112 |
//! ```
//!
//! TYPE, EC and MESSAGE together form the 56-bit DATA field, which is never
//! pulled out as a single value.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{DecodeError, Result};

/// Bits in an extended squitter.
pub const MODES_LONG_MSG_BITS: usize = 112;

/// Named sub-range of a [`BinaryMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Df,
    Ca,
    Icao,
    Type,
    Ec,
    Message,
    Pi,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::Df,
        Segment::Ca,
        Segment::Icao,
        Segment::Type,
        Segment::Ec,
        Segment::Message,
        Segment::Pi,
    ];

    /// Half-open bit range, 0-indexed from the first transmitted bit.
    pub const fn range(self) -> Range<usize> {
        match self {
            Segment::Df => 0..5,
            Segment::Ca => 5..8,
            Segment::Icao => 8..32,
            Segment::Type => 32..37,
            Segment::Ec => 37..40,
            Segment::Message => 40..88,
            Segment::Pi => 88..112,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Segment::Df => "DF",
            Segment::Ca => "CA",
            Segment::Icao => "ICAO",
            Segment::Type => "TYPE",
            Segment::Ec => "EC",
            Segment::Message => "MESSAGE",
            Segment::Pi => "PI",
        }
    }
}

impl FromStr for Segment {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        Segment::ALL
            .into_iter()
            .find(|seg| seg.name() == s)
            .ok_or_else(|| DecodeError::InvalidSegment(s.to_string()))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A string of exactly 112 `'0'`/`'1'` digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMessage(String);

impl BinaryMessage {
    /// Wrap a binary-digit string. `None` unless it is exactly 112 digits.
    pub fn new(bits: String) -> Option<Self> {
        let well_formed = bits.len() == MODES_LONG_MSG_BITS
            && bits.bytes().all(|b| b == b'0' || b == b'1');
        well_formed.then_some(Self(bits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bits of one segment.
    pub fn segment(&self, segment: Segment) -> &str {
        // length and ASCII content are checked in `new`
        &self.0[segment.range()]
    }

    /// Bits of a segment looked up by its name (`"DF"`, `"ICAO"`, ...).
    pub fn segment_named(&self, name: &str) -> Result<&str> {
        let segment: Segment = name.parse()?;
        Ok(self.segment(segment))
    }
}
