//! Shared test fakes
//!
//! Scripted stand-ins for the client link and the server socket.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use ackrelay::client::Console;
use ackrelay::network::{Link, PeerSocket};
use parking_lot::Mutex;

/// Loopback address with the given port
pub fn addr(port: u16) -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], port))
}

// =============================================================================
// ScriptedLink
// =============================================================================

/// A client link whose replies are scripted per transmission
///
/// Each `send` consumes the next script entry and makes its datagrams
/// available to `recv_deadline`. An empty inbox reads as an expired
/// deadline, so tests never sleep.
#[derive(Default)]
pub struct ScriptedLink {
    script: Mutex<VecDeque<Vec<Vec<u8>>>>,
    inbox: Mutex<VecDeque<Vec<u8>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    recv_calls: AtomicUsize,
    failing_sends: AtomicUsize,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next transmission gets no reply
    pub fn then_silence(self) -> Self {
        self.script.lock().push_back(Vec::new());
        self
    }

    /// The next transmission is answered with these datagrams, in order
    pub fn then_reply(self, datagrams: &[&[u8]]) -> Self {
        self.script
            .lock()
            .push_back(datagrams.iter().map(|d| d.to_vec()).collect());
        self
    }

    /// The first `n` transmissions fail at the socket
    pub fn failing_sends(self, n: usize) -> Self {
        self.failing_sends.store(n, Ordering::SeqCst);
        self
    }

    /// Make a datagram readable right away, independent of any send
    pub fn preload(&self, datagram: &[u8]) {
        self.inbox.lock().push_back(datagram.to_vec());
    }

    /// Number of transmit calls, failed or not
    pub fn transmissions(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().clone()
    }

    pub fn recv_calls(&self) -> usize {
        self.recv_calls.load(Ordering::SeqCst)
    }
}

impl Link for ScriptedLink {
    fn send(&self, bytes: &[u8]) -> io::Result<usize> {
        self.sent.lock().push(bytes.to_vec());
        let replies = self.script.lock().pop_front().unwrap_or_default();

        // A failed transmit never reaches the peer, so its replies are lost
        let failing = self.failing_sends.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_sends.store(failing - 1, Ordering::SeqCst);
            return Err(io::Error::new(io::ErrorKind::Other, "scripted send failure"));
        }

        self.inbox.lock().extend(replies);
        Ok(bytes.len())
    }

    fn recv_deadline(&self, buf: &mut [u8], _timeout: Duration) -> io::Result<Option<usize>> {
        self.recv_calls.fetch_add(1, Ordering::SeqCst);
        match self.inbox.lock().pop_front() {
            Some(datagram) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(Some(n))
            }
            None => Ok(None),
        }
    }
}

// =============================================================================
// RecordingSocket
// =============================================================================

/// A server socket that records every successful transmit
pub struct RecordingSocket {
    local: SocketAddr,
    inbound: Mutex<VecDeque<(Vec<u8>, SocketAddr)>>,
    sent: Mutex<Vec<(Vec<u8>, SocketAddr)>>,
    unreachable: Mutex<HashSet<SocketAddr>>,
    failing_sends: AtomicUsize,
    send_attempts: AtomicUsize,
}

impl RecordingSocket {
    pub fn new() -> Self {
        Self {
            local: addr(9000),
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            unreachable: Mutex::new(HashSet::new()),
            failing_sends: AtomicUsize::new(0),
            send_attempts: AtomicUsize::new(0),
        }
    }

    /// Every transmit to `peer` fails
    pub fn unreachable(self, peer: SocketAddr) -> Self {
        self.unreachable.lock().insert(peer);
        self
    }

    /// The next `n` transmits fail, whatever the destination
    pub fn failing_sends(self, n: usize) -> Self {
        self.failing_sends.store(n, Ordering::SeqCst);
        self
    }

    pub fn push_inbound(&self, datagram: &[u8], from: SocketAddr) {
        self.inbound.lock().push_back((datagram.to_vec(), from));
    }

    pub fn sent(&self) -> Vec<(Vec<u8>, SocketAddr)> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, peer: SocketAddr) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .iter()
            .filter(|(_, to)| *to == peer)
            .map(|(bytes, _)| bytes.clone())
            .collect()
    }

    pub fn send_attempts(&self) -> usize {
        self.send_attempts.load(Ordering::SeqCst)
    }
}

impl PeerSocket for RecordingSocket {
    fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> io::Result<usize> {
        self.send_attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self.failing_sends.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_sends.store(failing - 1, Ordering::SeqCst);
            return Err(io::Error::new(io::ErrorKind::Other, "scripted send failure"));
        }
        if self.unreachable.lock().contains(&addr) {
            return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "unreachable"));
        }

        self.sent.lock().push((bytes.to_vec(), addr));
        Ok(bytes.len())
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        match self.inbound.lock().pop_front() {
            Some((datagram, from)) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok((n, from))
            }
            None => Err(io::Error::new(io::ErrorKind::WouldBlock, "no datagram")),
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        Ok(self.local)
    }
}

// =============================================================================
// RecordingConsole
// =============================================================================

/// Collects everything the client would display
#[derive(Debug, Default)]
pub struct RecordingConsole {
    pub statuses: Vec<String>,
    pub broadcasts: Vec<String>,
}

impl Console for RecordingConsole {
    fn status(&mut self, line: &str) {
        self.statuses.push(line.to_string());
    }

    fn broadcast(&mut self, text: &str) {
        self.broadcasts.push(text.to_string());
    }
}
