//! Client registry
//!
//! Fixed-capacity, slot-ordered set of peer addresses. Peers are added on
//! their first datagram and never removed.

use std::net::SocketAddr;

/// Outcome of [`ClientRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// New peer stored in this slot
    Added(usize),
    /// Peer already present in this slot
    Known(usize),
    /// No free slot; the peer was not stored
    Full,
}

/// Known peers, one slot each
#[derive(Debug)]
pub struct ClientRegistry {
    slots: Box<[Option<SocketAddr>]>,
    len: usize,
}

impl ClientRegistry {
    /// Create a registry with `capacity` empty slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Record `addr` in the first free slot unless it is already present
    pub fn register(&mut self, addr: SocketAddr) -> Registration {
        let mut free = None;
        for (index, slot) in self.slots.iter().enumerate() {
            match slot {
                Some(known) if *known == addr => return Registration::Known(index),
                None if free.is_none() => free = Some(index),
                _ => {}
            }
        }

        match free {
            Some(index) => {
                self.slots[index] = Some(addr);
                self.len += 1;
                Registration::Added(index)
            }
            None => Registration::Full,
        }
    }

    /// Every registered address, in slot order
    pub fn all_addresses(&self) -> impl Iterator<Item = SocketAddr> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    pub fn contains(&self, addr: &SocketAddr) -> bool {
        self.slots.iter().any(|slot| slot.as_ref() == Some(addr))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }
}
