//! Relay server loop
//!
//! Single-threaded receive / acknowledge / broadcast cycle. Each datagram is
//! fully handled before the next receive, so no state is ever left half
//! updated when the loop stops.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::{Broadcaster, ClientRegistry, FanOut, Registration};
use crate::config::Config;
use crate::error::{DecodeError, Result};
use crate::network::{self, is_timeout, PeerSocket};
use crate::protocol::{decode_command, encode_ack, MAX_FRAME_SIZE};

/// What the server did with one datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Zero-length datagram; nothing to acknowledge
    Empty,
    /// Not a command frame; dropped without acknowledgment
    Malformed(DecodeError),
    /// Registered, acknowledged (if the ACK went out) and relayed
    Processed {
        sequence: u32,
        registration: Registration,
        acked: bool,
        fan_out: FanOut,
    },
}

/// Cloneable stop signal for a running [`Server`]
///
/// The receive is untimed, so `trigger` also sends an empty datagram to the
/// server to wake it.
#[derive(Debug, Clone)]
pub struct Shutdown {
    flag: Arc<AtomicBool>,
    wake_addr: SocketAddr,
}

impl Shutdown {
    fn new(local_addr: SocketAddr) -> Self {
        let wake_ip = match local_addr.ip() {
            IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
            IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
            ip => ip,
        };
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            wake_addr: SocketAddr::new(wake_ip, local_addr.port()),
        }
    }

    /// Ask the server to stop after the datagram it is handling
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);

        let any: SocketAddr = match self.wake_addr {
            SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
            SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
        };
        let woke = UdpSocket::bind(any).and_then(|s| s.send_to(&[], self.wake_addr));
        if let Err(e) = woke {
            tracing::debug!("Could not wake server at {}: {}", self.wake_addr, e);
        }
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// UDP relay server
pub struct Server<S> {
    socket: S,
    registry: ClientRegistry,
    broadcaster: Broadcaster,
    ack_send_attempts: u32,
    ack_retry_delay: Duration,
    shutdown: Shutdown,
}

impl Server<UdpSocket> {
    /// Bind a UDP socket on `config.listen_addr` and wrap it
    pub fn bind(config: &Config) -> Result<Self> {
        config.validate()?;
        let socket = network::bind(&config.listen_addr)?;
        Self::new(socket, config)
    }
}

impl<S: PeerSocket> Server<S> {
    /// Create a server over an already bound socket
    pub fn new(socket: S, config: &Config) -> Result<Self> {
        config.validate()?;
        let local_addr = socket.local_addr()?;
        Ok(Self {
            socket,
            registry: ClientRegistry::new(config.registry_capacity),
            broadcaster: Broadcaster::new(config.broadcast_policy),
            ack_send_attempts: config.ack_send_attempts,
            ack_retry_delay: config.ack_retry_delay(),
            shutdown: Shutdown::new(local_addr),
        })
    }

    /// Handle that stops [`Server::run`] from another thread
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Receive and handle datagrams until shut down (blocking)
    ///
    /// Receive failures are logged and the loop keeps listening.
    pub fn run(&mut self) -> Result<()> {
        tracing::info!("Listening on {}", self.socket.local_addr()?);

        let mut buf = vec![0u8; MAX_FRAME_SIZE + 1];

        while !self.shutdown.is_triggered() {
            let (n, from) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                Err(e) if is_timeout(&e) => continue,
                Err(e) => {
                    tracing::warn!("recv_from failed: {}", e);
                    continue;
                }
            };

            if self.shutdown.is_triggered() {
                break;
            }

            self.handle_datagram(&buf[..n], from);
        }

        tracing::info!(
            "Server stopped with {} registered peer(s)",
            self.registry.len()
        );
        Ok(())
    }

    /// Process one inbound datagram from `from`
    ///
    /// Order: decode, register, acknowledge, broadcast.
    pub fn handle_datagram(&mut self, bytes: &[u8], from: SocketAddr) -> Handled {
        if bytes.is_empty() {
            tracing::debug!("Empty datagram from {}", from);
            return Handled::Empty;
        }

        let packet = match decode_command(bytes) {
            Ok(packet) => packet,
            Err(e) => {
                tracing::warn!("Malformed datagram from {}: {}", from, e);
                return Handled::Malformed(e);
            }
        };

        let registration = self.registry.register(from);
        match registration {
            Registration::Added(slot) => {
                tracing::info!("Registered {} in slot {}", from, slot);
            }
            Registration::Known(_) => {}
            Registration::Full => {
                tracing::debug!(
                    "Registry full ({} slots), {} not registered",
                    self.registry.capacity(),
                    from
                );
            }
        }

        tracing::debug!("Received: {} | Seq: {} from {}", packet.payload, packet.sequence, from);

        let acked = self.send_ack(packet.sequence, from);

        let fan_out = self.broadcaster.broadcast(
            &self.socket,
            packet.payload.as_bytes(),
            &self.registry,
            from,
        );
        tracing::trace!(
            "Relayed seq {} to {} peer(s), {} failed",
            packet.sequence,
            fan_out.sent,
            fan_out.failed
        );

        Handled::Processed {
            sequence: packet.sequence,
            registration,
            acked,
            fan_out,
        }
    }

    /// Transmit `ACK <sequence>` to `to`, retrying failed transmits
    fn send_ack(&self, sequence: u32, to: SocketAddr) -> bool {
        let ack = encode_ack(sequence);

        for attempt in 1..=self.ack_send_attempts {
            match self.socket.send_to(ack.as_bytes(), to) {
                Ok(_) => return true,
                Err(e) => {
                    tracing::warn!(
                        "ACK {} to {} failed (attempt {}/{}): {}",
                        sequence,
                        to,
                        attempt,
                        self.ack_send_attempts,
                        e
                    );
                    if attempt < self.ack_send_attempts {
                        thread::sleep(self.ack_retry_delay);
                    }
                }
            }
        }

        tracing::warn!(
            "Failed to send ACK for seq {} after {} attempts, continuing",
            sequence,
            self.ack_send_attempts
        );
        false
    }
}
