//! Fault-injecting link for deterministic testing.
//!
//! Real networks drop packets. To exercise the retry path without relying on
//! actual loss, [`LossyLink`] wraps any [`Link`] and silently discards chosen
//! outbound transmissions:
//!
//! | Fault        | Description                                       |
//! |--------------|---------------------------------------------------|
//! | Drop first N | The first `N` transmissions never reach the peer. |
//! | Drop every k | Every `k`-th transmission (1-based) is lost.      |
//!
//! A dropped send still reports success to the caller, as UDP would.

use std::io;
use std::time::Duration;

use parking_lot::Mutex;

use super::Link;

/// Which transmissions to lose
#[derive(Debug, Clone, Copy, Default)]
pub struct LossPlan {
    /// Lose this many transmissions at the start
    pub drop_first: u64,

    /// Lose every k-th transmission (`None` or `Some(0)` = never)
    pub drop_every: Option<u64>,
}

impl LossPlan {
    fn drops(&self, index: u64) -> bool {
        if index < self.drop_first {
            return true;
        }
        match self.drop_every {
            Some(k) if k > 0 => (index + 1) % k == 0,
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    transmitted: u64,
    dropped: u64,
}

/// A [`Link`] wrapper that loses outbound datagrams according to a [`LossPlan`]
pub struct LossyLink<L> {
    inner: L,
    plan: LossPlan,
    counters: Mutex<Counters>,
}

impl<L: Link> LossyLink<L> {
    /// Wrap `inner` with the given loss plan
    pub fn new(inner: L, plan: LossPlan) -> Self {
        Self {
            inner,
            plan,
            counters: Mutex::new(Counters::default()),
        }
    }

    /// Wrap `inner`, losing its first `n` transmissions
    pub fn drop_first(inner: L, n: u64) -> Self {
        Self::new(
            inner,
            LossPlan {
                drop_first: n,
                drop_every: None,
            },
        )
    }

    /// Transmit calls made through this link, lost or not
    pub fn transmitted(&self) -> u64 {
        self.counters.lock().transmitted
    }

    /// Transmit calls that were lost
    pub fn dropped(&self) -> u64 {
        self.counters.lock().dropped
    }

    /// Borrow the wrapped link
    pub fn inner(&self) -> &L {
        &self.inner
    }
}

impl<L: Link> Link for LossyLink<L> {
    fn send(&self, bytes: &[u8]) -> io::Result<usize> {
        let lose = {
            let mut counters = self.counters.lock();
            let lose = self.plan.drops(counters.transmitted);
            counters.transmitted += 1;
            if lose {
                counters.dropped += 1;
            }
            lose
        };

        if lose {
            tracing::trace!("Simulator dropped {} byte datagram", bytes.len());
            return Ok(bytes.len());
        }
        self.inner.send(bytes)
    }

    fn recv_deadline(&self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        self.inner.recv_deadline(buf, timeout)
    }
}
