//! Error types for middleman.
//!
//! Startup-phase failures are fatal: the process logs them and exits with
//! the internal-failure status before the listener ever binds. Per-request
//! failures (handshake, routing, forwarding) never appear here; they are
//! handled and logged inside the request path.

use std::io;

use thiserror::Error;

use crate::config::ConfigError;
use crate::routing::RouteError;
use crate::security::TrustStoreError;

/// Result type alias for middleman.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal startup errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or malformed environment configuration
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client CA trust store could not be built
    #[error("trust store error: {0}")]
    TrustStore(#[from] TrustStoreError),

    /// Server certificate, key, or TLS config construction failed
    #[error("TLS setup error: {0}")]
    Tls(String),

    /// Route table compilation failed
    #[error("routing error: {0}")]
    Routing(#[from] RouteError),

    /// Prometheus exporter could not be installed
    #[error("metrics exporter error: {0}")]
    Metrics(String),

    /// Listener bind or accept-loop failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
