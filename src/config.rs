//! Configuration for ackrelay
//!
//! Centralized configuration with sensible defaults. Server and client
//! settings live side by side; each role reads only its own section.

use std::time::Duration;

use crate::error::{RelayError, Result};
use crate::server::BroadcastPolicy;

/// Main configuration for a server or client instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Server Configuration
    // -------------------------------------------------------------------------
    /// UDP listen address
    pub listen_addr: String,

    /// Number of peer slots in the client registry
    pub registry_capacity: usize,

    /// Whether the sender of a command receives its own broadcast
    pub broadcast_policy: BroadcastPolicy,

    /// Transmit attempts for each ACK before giving up
    pub ack_send_attempts: u32,

    /// Pause between failed ACK transmits (milliseconds)
    pub ack_retry_delay_ms: u64,

    // -------------------------------------------------------------------------
    // Client Configuration
    // -------------------------------------------------------------------------
    /// Transmissions per command before it is dropped
    pub max_attempts: u32,

    /// Per-attempt ACK wait (milliseconds)
    pub ack_timeout_ms: u64,

    /// How long the idle client loop waits for input before draining
    /// broadcasts (milliseconds)
    pub idle_poll_ms: u64,

    /// Greeting sent reliably before any input is processed
    pub handshake: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9000".to_string(),
            registry_capacity: 100,
            broadcast_policy: BroadcastPolicy::IncludeSender,
            ack_send_attempts: 3,
            ack_retry_delay_ms: 100,
            max_attempts: 3,
            ack_timeout_ms: 2000,
            idle_poll_ms: 50,
            handshake: None,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Per-attempt ACK timeout as a Duration
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    /// Delay between ACK transmit retries as a Duration
    pub fn ack_retry_delay(&self) -> Duration {
        Duration::from_millis(self.ack_retry_delay_ms)
    }

    /// Idle input poll as a Duration
    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    /// Reject settings that would make a loop degenerate
    pub fn validate(&self) -> Result<()> {
        if self.registry_capacity == 0 {
            return Err(RelayError::Config("registry_capacity must be > 0".to_string()));
        }
        if self.ack_send_attempts == 0 {
            return Err(RelayError::Config("ack_send_attempts must be > 0".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(RelayError::Config("max_attempts must be > 0".to_string()));
        }
        if self.ack_timeout_ms == 0 {
            return Err(RelayError::Config("ack_timeout_ms must be > 0".to_string()));
        }
        if self.idle_poll_ms == 0 {
            return Err(RelayError::Config("idle_poll_ms must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the UDP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of registry slots
    pub fn registry_capacity(mut self, capacity: usize) -> Self {
        self.config.registry_capacity = capacity;
        self
    }

    /// Set the broadcast inclusion policy
    pub fn broadcast_policy(mut self, policy: BroadcastPolicy) -> Self {
        self.config.broadcast_policy = policy;
        self
    }

    /// Set the ACK transmit attempts
    pub fn ack_send_attempts(mut self, attempts: u32) -> Self {
        self.config.ack_send_attempts = attempts;
        self
    }

    /// Set the delay between ACK transmit retries (in milliseconds)
    pub fn ack_retry_delay_ms(mut self, ms: u64) -> Self {
        self.config.ack_retry_delay_ms = ms;
        self
    }

    /// Set the client's transmissions per command
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    /// Set the per-attempt ACK timeout (in milliseconds)
    pub fn ack_timeout_ms(mut self, ms: u64) -> Self {
        self.config.ack_timeout_ms = ms;
        self
    }

    /// Set the idle input poll (in milliseconds)
    pub fn idle_poll_ms(mut self, ms: u64) -> Self {
        self.config.idle_poll_ms = ms;
        self
    }

    /// Set the handshake greeting
    pub fn handshake(mut self, text: impl Into<String>) -> Self {
        self.config.handshake = Some(text.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
