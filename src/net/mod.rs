//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → tls.rs (mutual-TLS handshake, client chain verification)
//!     → Hand off to HTTP layer
//! ```
//!
//! # Design Decisions
//! - Bounded accept queue prevents resource exhaustion
//! - TLS is mandatory; there is no plaintext listener

pub mod listener;
pub mod tls;

pub use listener::{ConnectionPermit, Listener};
pub use tls::{build_server_config, install_crypto_provider};
