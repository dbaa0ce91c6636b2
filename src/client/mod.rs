//! Client Module
//!
//! Everything between operator input and the wire.
//!
//! ## Data Flow
//! ```text
//! InputEvent ──▶ CommandQueue ──▶ send_with_retry ──▶ Link
//!                                       ▲
//!                                       └── ACK <seq> (matched or discarded)
//! ```
//!
//! At most one command is in flight; the queue absorbs input bursts while
//! the sender waits for an acknowledgment.

mod input;
mod queue;
mod sender;
mod session;

pub use input::InputEvent;
pub use queue::CommandQueue;
pub use sender::{
    send_with_retry, send_with_retry_observed, Delivery, ReliableSender, ACK_BUFFER_SIZE,
};
pub use session::{Client, Console, Control};
