//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main):
//!     Load config → trust store → TLS → routes → forwarder → listener
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT → flush logs → exit 0
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then core, then the listener
//! - Fail fast: any startup error is fatal
//! - Shutdown is immediate; upstream callers own retry of anything cut
//!   off mid-flight

pub mod signals;

pub use signals::wait_for_termination;
