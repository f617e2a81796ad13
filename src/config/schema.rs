//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. Values are populated from the process environment by the
//! loader; every struct has a `Default` so partial fixtures are cheap to
//! build in tests.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Root configuration for the gateway.
#[derive(Debug, Clone, Default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, connection bound).
    pub listener: ListenerConfig,

    /// Server identity and client-trust material.
    pub tls: TlsConfig,

    /// The single fixed upstream and its deadline.
    pub upstream: UpstreamConfig,

    /// Route admission policy.
    pub routing: RoutingConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8443").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            max_connections: 10_000,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Default)]
pub struct TlsConfig {
    /// Path to the server certificate chain file (PEM).
    pub cert_path: PathBuf,

    /// Path to the server private key file (PEM).
    pub key_path: PathBuf,

    /// Root directory of trusted client CA certificates, loaded
    /// recursively. Every file under it must parse as PEM certificates.
    pub client_ca_dir: PathBuf,
}

/// Upstream configuration.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base address of the fixed backend (e.g., "http://127.0.0.1:3000").
    /// Only scheme and authority are used; the inbound path and query are
    /// forwarded verbatim.
    pub base_address: String,

    /// Deadline for one forwarded exchange (connect, headers, and body
    /// relay) in seconds.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_address: String::new(),
            timeout_secs: 30,
        }
    }
}

/// Route admission policy.
///
/// One catch-all rule is compiled per allowed verb; requests whose method
/// is not listed are refused without an upstream call.
#[derive(Debug, Clone, Default)]
pub struct RoutingConfig {
    /// Allowed HTTP verbs, exact and case-sensitive.
    pub allowed_verbs: Vec<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Default)]
pub struct ObservabilityConfig {
    /// Log the verified client certificate chain for every request.
    pub verbose_tls_logging: bool,

    /// Prometheus exporter bind address. `None` disables the exporter.
    pub metrics_address: Option<SocketAddr>,
}
