//! Server Module
//!
//! Receives commands, acknowledges them and relays them to every known peer.
//!
//! ## Architecture
//! - Single thread, one blocking receive per iteration
//! - `LISTENING → PROCESSING → LISTENING`, never terminating on its own
//! - Registry and broadcaster are owned by the loop; no locking

mod broadcast;
mod registry;
mod relay;

pub use broadcast::{BroadcastPolicy, Broadcaster, FanOut};
pub use registry::{ClientRegistry, Registration};
pub use relay::{Handled, Server, Shutdown};
