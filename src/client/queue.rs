//! Pending-command queue
//!
//! FIFO buffer between input capture and the sender loop.

use std::collections::VecDeque;

use crate::protocol::CommandPacket;

/// Commands waiting for the sender, oldest first
///
/// Entries are never reordered, coalesced or dropped; only `dequeue`
/// removes them.
#[derive(Debug, Default)]
pub struct CommandQueue {
    entries: VecDeque<CommandPacket>,
}

impl CommandQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a packet at the tail
    pub fn enqueue(&mut self, packet: CommandPacket) {
        self.entries.push_back(packet);
    }

    /// Remove the head, or `None` when empty. Never blocks.
    pub fn dequeue(&mut self) -> Option<CommandPacket> {
        self.entries.pop_front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
