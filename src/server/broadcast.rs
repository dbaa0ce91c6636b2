//! Broadcast dispatcher
//!
//! Relays a command's payload to registered peers. Fire-and-forget: no ACK,
//! no retry, and one failed peer never stops the rest.

use std::net::SocketAddr;

use super::ClientRegistry;
use crate::network::PeerSocket;

/// Whether the sender of a command gets its own payload back
///
/// Chosen once at startup and applied to every broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastPolicy {
    #[default]
    IncludeSender,
    ExcludeSender,
}

/// Result of one fan-out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FanOut {
    /// Transmissions the socket accepted
    pub sent: usize,
    /// Transmissions that failed
    pub failed: usize,
}

/// Sends payloads to every registered peer
#[derive(Debug, Clone, Copy)]
pub struct Broadcaster {
    policy: BroadcastPolicy,
}

impl Broadcaster {
    pub fn new(policy: BroadcastPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BroadcastPolicy {
        self.policy
    }

    /// Send `payload` to each peer in `registry`, honoring the policy
    /// for `origin`
    pub fn broadcast<S: PeerSocket + ?Sized>(
        &self,
        socket: &S,
        payload: &[u8],
        registry: &ClientRegistry,
        origin: SocketAddr,
    ) -> FanOut {
        let mut report = FanOut::default();

        for peer in registry.all_addresses() {
            if self.policy == BroadcastPolicy::ExcludeSender && peer == origin {
                continue;
            }
            match socket.send_to(payload, peer) {
                Ok(_) => report.sent += 1,
                Err(e) => {
                    tracing::warn!("Broadcast to {} failed: {}", peer, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}
