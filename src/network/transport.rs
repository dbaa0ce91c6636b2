//! UDP transport
//!
//! Thin traits over datagram I/O so the protocol state machines can run
//! against a real socket or a scripted one.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use crate::error::{RelayError, Result};

/// A datagram link to one fixed peer (client side)
pub trait Link {
    /// Transmit one datagram to the peer
    fn send(&self, bytes: &[u8]) -> io::Result<usize>;

    /// Wait up to `timeout` for one datagram from the peer
    ///
    /// Returns `Ok(None)` when the deadline passes with nothing received.
    fn recv_deadline(&self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>>;
}

/// An unconnected datagram socket serving many peers (server side)
pub trait PeerSocket {
    /// Transmit one datagram to `addr`
    fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> io::Result<usize>;

    /// Block until a datagram arrives
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// Address the socket is bound to
    fn local_addr(&self) -> io::Result<SocketAddr>;
}

impl<L: Link + ?Sized> Link for &L {
    fn send(&self, bytes: &[u8]) -> io::Result<usize> {
        (**self).send(bytes)
    }

    fn recv_deadline(&self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        (**self).recv_deadline(buf, timeout)
    }
}

impl<S: PeerSocket + ?Sized> PeerSocket for &S {
    fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> io::Result<usize> {
        (**self).send_to(bytes, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        (**self).recv_from(buf)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        (**self).local_addr()
    }
}

impl Link for UdpSocket {
    fn send(&self, bytes: &[u8]) -> io::Result<usize> {
        UdpSocket::send(self, bytes)
    }

    fn recv_deadline(&self, buf: &mut [u8], timeout: Duration) -> io::Result<Option<usize>> {
        // set_read_timeout rejects a zero duration
        if timeout.is_zero() {
            return Ok(None);
        }
        self.set_read_timeout(Some(timeout))?;
        match self.recv(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if is_timeout(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl PeerSocket for UdpSocket {
    fn send_to(&self, bytes: &[u8], addr: SocketAddr) -> io::Result<usize> {
        UdpSocket::send_to(self, bytes, addr)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        UdpSocket::recv_from(self, buf)
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        UdpSocket::local_addr(self)
    }
}

/// Whether an I/O error is an expired read timeout
///
/// Unix reports `WouldBlock`, Windows `TimedOut`.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Resolve `host:port` to the first matching socket address
pub fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()
        .map_err(|e| RelayError::Setup(format!("cannot resolve {}:{}: {}", host, port, e)))?
        .next()
        .ok_or_else(|| RelayError::Setup(format!("no address for {}:{}", host, port)))
}

/// Bind a server socket with a blocking, untimed receive
pub fn bind(addr: &str) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(addr)
        .map_err(|e| RelayError::Setup(format!("bind {} failed: {}", addr, e)))?;
    socket.set_read_timeout(None)?;
    Ok(socket)
}

/// Open a client socket on an ephemeral port, connected to `server`
///
/// Connecting filters out datagrams from any other source.
pub fn connect(server: SocketAddr) -> Result<UdpSocket> {
    let local: SocketAddr = match server.ip() {
        IpAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        IpAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    let socket = UdpSocket::bind(local)
        .map_err(|e| RelayError::Setup(format!("socket creation failed: {}", e)))?;
    socket
        .connect(server)
        .map_err(|e| RelayError::Setup(format!("connect to {} failed: {}", server, e)))?;
    Ok(socket)
}
