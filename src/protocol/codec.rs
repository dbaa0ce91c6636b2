//! Protocol codec
//!
//! Encoding and decoding of command frames.
//!
//! ## Wire Format
//!
//! ```text
//! ┌──────────┬──────────────────────────────────────────┐
//! │ Seq (4)  │   Payload (1024, NUL-padded UTF-8 text)  │
//! └──────────┴──────────────────────────────────────────┘
//! ```
//!
//! The sequence number is big-endian. Senders always emit the full
//! [`MAX_FRAME_SIZE`] bytes; receivers also accept frames cut short after
//! the payload, as long as the sequence number is present.

use bytes::{BufMut, Bytes, BytesMut};

use super::{CommandPacket, ACK_PREFIX};
use crate::error::{DecodeError, RelayError, Result};

/// Sequence number size on the wire
pub const SEQ_SIZE: usize = 4;

/// Size of the NUL-padded payload buffer
pub const PAYLOAD_CAPACITY: usize = 1024;

/// Longest payload text; one byte is always left for the terminator
pub const MAX_PAYLOAD_LEN: usize = PAYLOAD_CAPACITY - 1;

/// Full frame size as emitted by `encode_command`
pub const MAX_FRAME_SIZE: usize = SEQ_SIZE + PAYLOAD_CAPACITY;

/// Smallest decodable frame: a sequence number and an empty payload
pub const MIN_FRAME_SIZE: usize = SEQ_SIZE;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to a fixed-layout frame
///
/// Format: seq (4) + payload buffer (1024, NUL-padded)
pub fn encode_command(sequence: u32, payload: &str) -> Result<Bytes> {
    if payload.len() > MAX_PAYLOAD_LEN {
        return Err(RelayError::PayloadTooLarge {
            len: payload.len(),
            max: MAX_PAYLOAD_LEN,
        });
    }
    if payload.as_bytes().contains(&0) {
        return Err(RelayError::InvalidPayload(
            "payload contains a NUL byte".to_string(),
        ));
    }
    if payload.starts_with(ACK_PREFIX) {
        return Err(RelayError::InvalidPayload(format!(
            "payload may not start with {:?}",
            ACK_PREFIX
        )));
    }

    let mut frame = BytesMut::with_capacity(MAX_FRAME_SIZE);
    frame.put_u32(sequence);
    frame.put_slice(payload.as_bytes());
    frame.put_bytes(0, PAYLOAD_CAPACITY - payload.len());

    Ok(frame.freeze())
}

/// Decode a command frame
///
/// The payload ends at the first NUL or at the end of the frame. Payloads
/// starting with the ACK prefix are rejected, since peers would take the
/// relayed text for an acknowledgment.
pub fn decode_command(bytes: &[u8]) -> std::result::Result<CommandPacket, DecodeError> {
    if bytes.len() < MIN_FRAME_SIZE {
        return Err(DecodeError::FrameTooShort {
            len: bytes.len(),
            min: MIN_FRAME_SIZE,
        });
    }
    if bytes.len() > MAX_FRAME_SIZE {
        return Err(DecodeError::FrameTooLong {
            len: bytes.len(),
            max: MAX_FRAME_SIZE,
        });
    }

    let sequence = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);

    let buffer = &bytes[SEQ_SIZE..];
    let end = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
    let payload = std::str::from_utf8(&buffer[..end]).map_err(|_| DecodeError::InvalidUtf8)?;
    if payload.starts_with(ACK_PREFIX) {
        return Err(DecodeError::ReservedPayload);
    }

    Ok(CommandPacket::new(sequence, payload))
}
