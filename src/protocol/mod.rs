//! Protocol Module
//!
//! Defines the wire protocol between clients and the relay server.
//!
//! ## Protocol Format (UDP datagrams)
//!
//! ### Command Frame (client → server)
//! ```text
//! ┌──────────┬──────────────────────────────────────────┐
//! │ Seq (4)  │   Payload (1024, NUL-padded UTF-8 text)  │
//! └──────────┴──────────────────────────────────────────┘
//! ```
//!
//! ### Acknowledgment (server → client)
//! ASCII text `ACK <seq>`, decimal, no leading zeros.
//!
//! ### Broadcast (server → every registered peer)
//! The raw payload text of the command just received.

mod ack;
mod codec;
mod command;

pub use ack::{decode_ack, encode_ack, ACK_PREFIX};
pub use codec::{
    decode_command, encode_command, MAX_FRAME_SIZE, MAX_PAYLOAD_LEN, MIN_FRAME_SIZE,
    PAYLOAD_CAPACITY, SEQ_SIZE,
};
pub use command::CommandPacket;
