//! Errors produced by the message decoder.

use thiserror::Error;

use crate::status;

/// Every way a single decode can fail. None of these are fatal to the
/// process; the caller decides whether to log, count or surface them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input was not a 30 character framed message.
    #[error("{}", status::INVALID_VALUE)]
    InvalidValue,
    /// A segment name outside DF/CA/ICAO/TYPE/EC/MESSAGE/PI was requested.
    #[error("{}", status::INVALID_SEGMENT)]
    InvalidSegment(String),
    /// Character table lookup outside 0..=63.
    #[error("{}", status::INVALID_POSITION)]
    InvalidPosition(u64),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
