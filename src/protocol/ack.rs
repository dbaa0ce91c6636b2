//! Acknowledgment messages
//!
//! `ACK <n>` in ASCII, one per received command.

use crate::error::DecodeError;

/// Prefix every acknowledgment starts with
pub const ACK_PREFIX: &str = "ACK ";

/// Encode an acknowledgment for `sequence`
pub fn encode_ack(sequence: u32) -> String {
    format!("{}{}", ACK_PREFIX, sequence)
}

/// Decode an acknowledgment, returning the acknowledged sequence number
///
/// The whole suffix must be decimal digits; `ACK 12x` is rejected rather
/// than read as 12.
pub fn decode_ack(text: &str) -> Result<u32, DecodeError> {
    let digits = text
        .strip_prefix(ACK_PREFIX)
        .ok_or(DecodeError::MissingAckPrefix)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidAckNumber(digits.to_string()));
    }

    digits
        .parse::<u32>()
        .map_err(|_| DecodeError::InvalidAckNumber(digits.to_string()))
}
