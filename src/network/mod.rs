//! Network Module
//!
//! UDP transport seams for both roles.
//!
//! ## Architecture
//! - [`Link`]: the client's single connected peer, with a receive-with-deadline
//!   primitive used by the reliable sender
//! - [`PeerSocket`]: the server's unconnected socket, blocking receive
//! - Both are implemented for `std::net::UdpSocket`; tests substitute fakes
//!   or wrap a real link in the [`simulator`]

mod transport;
pub mod simulator;

pub use transport::{bind, connect, is_timeout, resolve, Link, PeerSocket};
