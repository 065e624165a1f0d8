//! ADS-B extended squitter decoding.
//!
//! ```text
//! raw "*8D...;" -> validate -> hex to bits -> segments -> { type code, identification text } -> DecodedMessage
//! ```
//!
//! The decoder is pure and holds no state between calls. The remaining
//! modules are the I/O around it: a raw TCP feed reader, an HTTP front end
//! and configuration.

pub mod bits;
pub mod config;
pub mod decoder;
pub mod error;
pub mod identification;
pub mod network;
pub mod segment;
pub mod stats;
pub mod status;
pub mod stream;
pub mod type_code;

pub use decoder::{DecodedMessage, MessageData, decode, decode_value, is_valid_message};
pub use error::DecodeError;
pub use segment::{BinaryMessage, Segment};
pub use type_code::{Category, TypeCategory, classify};
