//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → loader.rs (read, parse, reject bad values)
//!     → GatewayConfig (validated, immutable)
//!     → shared by value / via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read exactly once at startup; there is no reload path
//! - Any missing or malformed value aborts startup before the bind
//! - The loader is a pure function over a name -> value lookup, so tests
//!   never mutate process environment

pub mod loader;
pub mod schema;

pub use loader::ConfigError;
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::TlsConfig;
pub use schema::UpstreamConfig;
