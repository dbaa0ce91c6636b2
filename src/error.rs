//! Error types for ackrelay
//!
//! Provides a unified error type for all operations, plus the codec's
//! decode failures.

use thiserror::Error;

/// Result type alias using RelayError
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type for ackrelay operations
#[derive(Debug, Error)]
pub enum RelayError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Socket creation, bind, connect or address resolution failed.
    #[error("Transport setup failed: {0}")]
    Setup(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    // -------------------------------------------------------------------------
    // Delivery Errors
    // -------------------------------------------------------------------------
    #[error("No ACK for seq {sequence} after {attempts} attempts")]
    DeliveryFailed { sequence: u32, attempts: u32 },

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons a datagram could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("frame too short: {len} bytes (min {min})")]
    FrameTooShort { len: usize, min: usize },

    #[error("frame too long: {len} bytes (max {max})")]
    FrameTooLong { len: usize, max: usize },

    #[error("payload is not valid UTF-8")]
    InvalidUtf8,

    /// Payload text would be read as an acknowledgment once relayed.
    #[error("payload starts with the reserved ACK prefix")]
    ReservedPayload,

    #[error("missing ACK prefix")]
    MissingAckPrefix,

    #[error("invalid ACK sequence number: {0:?}")]
    InvalidAckNumber(String),
}
