//! Fixed status strings shared by the decoder and the HTTP routes.

pub const INVALID_VALUE: &str = "Invalid value provided";
pub const INVALID_SEGMENT: &str = "An invalid segment identifier was provided";
pub const INVALID_POSITION: &str = "An invalid position was provided";
pub const UNABLE_TO_CONNECT: &str = "Unable to connect to";
pub const DECODING: &str = "Decoding ADS-B Data";
pub const INDEX: &str = "ADSB data";
