//! Counters for frames seen on the feed.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Frames handed to the decoder
    pub frames: u64,
    /// Frames decoded into a record
    pub decoded: u64,
    /// Frames the decoder refused
    pub rejected: u64,
    /// Decoded records with an identification type code
    pub identification: u64,
    /// Records dropped because the processor queue was full
    pub dropped: u64,
}

pub type SharedStats = Arc<RwLock<FeedStats>>;

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} frames received", self.frames)?;
        writeln!(f, "{} decoded", self.decoded)?;
        writeln!(f, "{} rejected", self.rejected)?;
        writeln!(f, "{} identification messages", self.identification)?;
        write!(f, "{} dropped", self.dropped)
    }
}
