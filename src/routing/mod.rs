//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     allowed verbs from config
//!     → one (verb, pattern) rule per verb
//!     → compile patterns
//!     → freeze as immutable RouteTable
//!
//! Incoming Request (method, path):
//!     → table.rs (ordered rule scan)
//!     → Return: eligible or not (no-match is an explicit reject)
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - Deterministic: same input always yields the same answer
//! - First match wins (rule order is configuration order)
//! - An empty rule set is a startup error, never a silent allow/deny-all

pub mod table;

pub use table::{RouteError, RouteRule, RouteTable, MATCH_ALL_PATHS};
