//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (client chain already verified)
//!     → server.rs (Axum setup, accept loop, route gate)
//!     → request.rs (fresh session ID per request)
//!     → forward.rs (single bounded attempt against the backend)
//!     → response.rs (hop-by-hop stripping, deadline-bounded body relay)
//!     → Send to client
//! ```

pub mod forward;
pub mod request;
pub mod response;
pub mod server;

pub use forward::{ForwardError, Forwarder};
pub use request::SessionId;
pub use server::GatewayServer;
