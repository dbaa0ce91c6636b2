//! Reliable Sender
//!
//! Stop-and-wait delivery of one command: transmit, wait for `ACK <seq>`,
//! retransmit on timeout, give up after a bounded number of attempts.
//!
//! ## Per-attempt wait
//! ```text
//! send ──▶ recv_deadline(remaining) ──┬── ACK seq == expected ──▶ delivered
//!   ▲                                 ├── anything else ──▶ discard, keep waiting
//!   │                                 └── deadline / error ──┐
//!   └──────────────── next attempt (if any left) ◀───────────┘
//! ```
//!
//! The timeout is fixed per attempt; there is no back-off.

use std::time::{Duration, Instant};

use crate::error::{DecodeError, RelayError, Result};
use crate::network::Link;
use crate::protocol::{decode_ack, encode_command, CommandPacket};

/// Receive buffer for acknowledgments and stray datagrams
pub const ACK_BUFFER_SIZE: usize = 1024;

/// A successful delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Sequence number that was acknowledged
    pub sequence: u32,

    /// Transmissions it took, 1-based
    pub attempts: u32,
}

/// Sends commands over a [`Link`] with bounded retry
pub struct ReliableSender<L> {
    link: L,
    max_attempts: u32,
    timeout: Duration,
}

impl<L: Link> ReliableSender<L> {
    /// Create a sender with the given retry budget and per-attempt timeout
    pub fn new(link: L, max_attempts: u32, timeout: Duration) -> Self {
        Self {
            link,
            max_attempts,
            timeout,
        }
    }

    /// Deliver `packet`, see [`send_with_retry`]
    pub fn send(&self, packet: &CommandPacket) -> Result<Delivery> {
        send_with_retry(&self.link, packet, self.max_attempts, self.timeout)
    }

    /// Borrow the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }
}

/// Transmit `packet` and wait for its acknowledgment, retrying on timeout
///
/// Returns [`RelayError::DeliveryFailed`] after `max_attempts` transmissions
/// without a matching ACK. Mismatched or undecodable datagrams seen while
/// waiting are discarded. A failed transmit still counts as an attempt.
pub fn send_with_retry<L: Link + ?Sized>(
    link: &L,
    packet: &CommandPacket,
    max_attempts: u32,
    timeout: Duration,
) -> Result<Delivery> {
    send_with_retry_observed(link, packet, max_attempts, timeout, |_| {})
}

/// [`send_with_retry`], calling `on_retry` with the failed attempt number
/// each time an attempt times out and another one follows
pub fn send_with_retry_observed<L, F>(
    link: &L,
    packet: &CommandPacket,
    max_attempts: u32,
    timeout: Duration,
    mut on_retry: F,
) -> Result<Delivery>
where
    L: Link + ?Sized,
    F: FnMut(u32),
{
    let frame = encode_command(packet.sequence, &packet.payload)?;
    let mut buf = [0u8; ACK_BUFFER_SIZE];

    for attempt in 1..=max_attempts {
        if let Err(e) = link.send(&frame) {
            tracing::warn!("Send failed for seq {} (attempt {}): {}", packet.sequence, attempt, e);
        }

        if wait_for_ack(link, &mut buf, packet.sequence, timeout) {
            tracing::debug!("ACK received for seq {} on attempt {}", packet.sequence, attempt);
            return Ok(Delivery {
                sequence: packet.sequence,
                attempts: attempt,
            });
        }

        if attempt < max_attempts {
            tracing::debug!(
                "ACK not received for seq {}, retrying ({}/{})",
                packet.sequence,
                attempt,
                max_attempts
            );
            on_retry(attempt);
        }
    }

    tracing::warn!(
        "Giving up on seq {} after {} attempts",
        packet.sequence,
        max_attempts
    );
    Err(RelayError::DeliveryFailed {
        sequence: packet.sequence,
        attempts: max_attempts,
    })
}

/// Wait until `timeout` elapses for `ACK <expected>`
fn wait_for_ack<L: Link + ?Sized>(
    link: &L,
    buf: &mut [u8],
    expected: u32,
    timeout: Duration,
) -> bool {
    let deadline = Instant::now() + timeout;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return false;
        }

        match link.recv_deadline(buf, remaining) {
            Ok(Some(n)) => match parse_ack(&buf[..n]) {
                Ok(seq) if seq == expected => return true,
                Ok(seq) => {
                    tracing::trace!("Discarding ACK {} while waiting for {}", seq, expected);
                }
                Err(e) => {
                    tracing::trace!("Discarding non-ACK datagram while waiting for {}: {}", expected, e);
                }
            },
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Receive failed while waiting for ACK {}: {}", expected, e);
                return false;
            }
        }
    }
}

/// Decode a raw datagram as an acknowledgment
pub(crate) fn parse_ack(bytes: &[u8]) -> std::result::Result<u32, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    decode_ack(text)
}
