//! Client session
//!
//! The single client loop: absorb input events, send queued commands one at
//! a time, and show server broadcasts while idle.

use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError, TryRecvError};

use super::sender::parse_ack;
use super::{send_with_retry_observed, CommandQueue, Delivery, InputEvent, ACK_BUFFER_SIZE};
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::network::Link;
use crate::protocol::CommandPacket;

/// How long each idle drain read waits for a broadcast
const DRAIN_WAIT: Duration = Duration::from_millis(1);

/// Display collaborator: where status lines and broadcasts end up
pub trait Console {
    /// A delivery status line
    fn status(&mut self, line: &str);

    /// Text relayed by the server from some peer
    fn broadcast(&mut self, text: &str);
}

/// What the loop should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// One client session against one server
pub struct Client<L> {
    link: L,
    queue: CommandQueue,
    next_sequence: u32,
    max_attempts: u32,
    ack_timeout: Duration,
    idle_poll: Duration,
    handshake: Option<String>,
}

impl<L: Link> Client<L> {
    /// Create a session over `link`
    pub fn new(link: L, config: &Config) -> Self {
        Self {
            link,
            queue: CommandQueue::new(),
            next_sequence: 0,
            max_attempts: config.max_attempts,
            ack_timeout: config.ack_timeout(),
            idle_poll: config.idle_poll(),
            handshake: config.handshake.clone(),
        }
    }

    /// Turn an input event into a queued command
    ///
    /// Unrecognized events produce nothing and consume no sequence number.
    pub fn submit(&mut self, event: InputEvent) -> Control {
        match event {
            InputEvent::Quit => Control::Quit,
            other => {
                if let Some(payload) = other.payload() {
                    let packet = self.next_packet(payload);
                    tracing::trace!("Queued seq {}: {}", packet.sequence, packet.payload);
                    self.queue.enqueue(packet);
                }
                Control::Continue
            }
        }
    }

    /// Send the greeting through the reliable path, ahead of anything queued
    pub fn handshake(&mut self, text: &str, console: &mut dyn Console) -> Result<Delivery> {
        let packet = self.next_packet(text);
        self.deliver(&packet, console)
    }

    /// Send the oldest queued command, if any
    pub fn pump(&mut self, console: &mut dyn Console) -> Option<Result<Delivery>> {
        let packet = self.queue.dequeue()?;
        Some(self.deliver(&packet, console))
    }

    /// Read whatever the server has relayed without waiting for more
    ///
    /// Late acknowledgments are skipped. Returns the number of broadcasts shown.
    pub fn drain_broadcasts(&mut self, console: &mut dyn Console) -> usize {
        let mut buf = [0u8; ACK_BUFFER_SIZE];
        let mut shown = 0;

        loop {
            match self.link.recv_deadline(&mut buf, DRAIN_WAIT) {
                Ok(Some(n)) => {
                    if let Ok(seq) = parse_ack(&buf[..n]) {
                        tracing::debug!("Late ACK {} ignored", seq);
                        continue;
                    }
                    console.broadcast(&String::from_utf8_lossy(&buf[..n]));
                    shown += 1;
                }
                Ok(None) => return shown,
                Err(e) => {
                    tracing::debug!("Broadcast drain stopped: {}", e);
                    return shown;
                }
            }
        }
    }

    /// Drive the session until `Quit` or until input closes and the queue
    /// is empty
    pub fn run(&mut self, events: &Receiver<InputEvent>, console: &mut dyn Console) -> Result<()> {
        if let Some(text) = self.handshake.clone() {
            // A lost greeting is reported like any other command
            match self.handshake(&text, console) {
                Ok(delivery) => {
                    tracing::debug!("Handshake acknowledged as seq {}", delivery.sequence);
                }
                Err(RelayError::DeliveryFailed { sequence, .. }) => {
                    tracing::info!("Handshake seq {} was not acknowledged", sequence);
                }
                Err(e) => tracing::warn!("Handshake not sent: {}", e),
            }
        }

        let mut input_open = true;

        loop {
            // Queue the whole burst before the next send blocks
            while input_open {
                match events.try_recv() {
                    Ok(event) => {
                        if self.submit(event) == Control::Quit {
                            tracing::info!("Quit requested");
                            return Ok(());
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => input_open = false,
                }
            }

            if self.pump(console).is_some() {
                continue;
            }

            if !input_open {
                tracing::info!("Input closed, queue drained");
                return Ok(());
            }

            match events.recv_timeout(self.idle_poll) {
                Ok(event) => {
                    if self.submit(event) == Control::Quit {
                        tracing::info!("Quit requested");
                        return Ok(());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.drain_broadcasts(console);
                }
                Err(RecvTimeoutError::Disconnected) => input_open = false,
            }
        }
    }

    /// Commands waiting to be sent
    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// Sequence number the next command will carry
    pub fn next_sequence(&self) -> u32 {
        self.next_sequence
    }

    /// Borrow the underlying link
    pub fn link(&self) -> &L {
        &self.link
    }

    fn next_packet(&mut self, payload: &str) -> CommandPacket {
        let packet = CommandPacket::new(self.next_sequence, payload);
        self.next_sequence = self.next_sequence.wrapping_add(1);
        packet
    }

    fn deliver(&self, packet: &CommandPacket, console: &mut dyn Console) -> Result<Delivery> {
        let result = send_with_retry_observed(
            &self.link,
            packet,
            self.max_attempts,
            self.ack_timeout,
            |_| {
                console.status(&format!(
                    "ACK not received for Seq: {}, retrying...",
                    packet.sequence
                ))
            },
        );
        match &result {
            Ok(delivery) => {
                console.status(&format!("ACK received for Seq: {}", delivery.sequence));
            }
            Err(RelayError::DeliveryFailed { sequence, attempts }) => {
                console.status(&format!(
                    "Failed to receive ACK for Seq: {} after {} attempts.",
                    sequence, attempts
                ));
            }
            Err(e) => {
                tracing::warn!("Dropping seq {}: {}", packet.sequence, e);
                console.status(&format!("Could not send Seq: {}: {}", packet.sequence, e));
            }
        }
        result
    }
}
