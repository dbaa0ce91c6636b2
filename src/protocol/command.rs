//! Command definitions
//!
//! Represents commands sent from clients.

/// A sequence-numbered command, immutable once sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPacket {
    /// Per-sender monotonically increasing identifier
    pub sequence: u32,

    /// Command text, e.g. `MOVE UP`
    pub payload: String,
}

impl CommandPacket {
    /// Create a new command packet
    pub fn new(sequence: u32, payload: impl Into<String>) -> Self {
        Self {
            sequence,
            payload: payload.into(),
        }
    }
}
