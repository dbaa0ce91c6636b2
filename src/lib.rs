//! # ackrelay
//!
//! Reliable command delivery over UDP:
//! - Sequence-numbered command frames, acknowledged one by one
//! - Stop-and-wait retry with a fixed per-attempt timeout
//! - Server-side peer registry with broadcast fan-out
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐                ┌──────────────────────────┐
//! │          Client          │   command      │          Server          │
//! │  InputEvent → Queue  ────┼───────────────▶│  decode → register       │
//! │  Reliable Sender  ◀──────┼── ACK <seq> ───┤  → ACK → broadcast       │
//! │  Console  ◀──────────────┼── payload ─────┤      │                   │
//! └──────────────────────────┘                └──────┼───────────────────┘
//!                                                    │ payload
//!                                                    ▼
//!                                           every registered peer
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;
pub mod server;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DecodeError, RelayError, Result};
pub use config::Config;
pub use client::{Client, InputEvent};
pub use server::{BroadcastPolicy, Server};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ackrelay
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
