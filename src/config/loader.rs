//! Configuration loading from the process environment.
//!
//! Reading happens once at startup; any missing or malformed value is
//! fatal before the listener binds. The loader is written against an
//! injected name -> value lookup so tests can drive it without touching
//! process-global environment state.

use std::fmt::Display;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;

/// Listener bind address, host:port.
pub const ENV_SERVE_ADDR: &str = "SERVE_ADDR";
/// Server certificate chain file (PEM).
pub const ENV_SERVER_CERT_FILE: &str = "PATH_SERVER_CERT_FILE";
/// Server private key file (PEM).
pub const ENV_SERVER_KEY_FILE: &str = "PATH_SERVER_KEY_FILE";
/// Root directory of trusted client CA certificates.
pub const ENV_CLIENT_CA_DIR: &str = "DIR_CLIENT_CA_FILES";
/// Upstream base address.
pub const ENV_ROUTE_BASE_ADDR: &str = "ROUTE_BASE_ADDR";
/// Whole-exchange upstream deadline, integer seconds.
pub const ENV_GATEWAY_TIMEOUT_SECS: &str = "GATEWAY_TIMEOUT_SECS";
/// Semicolon-delimited list of allowed HTTP verbs.
pub const ENV_ALLOWED_HTTP_VERBS: &str = "ALLOWED_HTTP_VERBS";
/// Set to "1" to log the client certificate chain per request.
pub const ENV_VERBOSE_LOGGING: &str = "VERBOSE_LOGGING";
/// Optional bound on concurrently served connections.
pub const ENV_MAX_CONNECTIONS: &str = "MAX_CONNECTIONS";
/// Optional Prometheus exporter bind address.
pub const ENV_METRICS_ADDR: &str = "METRICS_ADDR";

const VERB_DELIMITER: char = ';';
const VERBOSE_ENABLED: &str = "1";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl GatewayConfig {
    /// Read the full gateway configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the configuration from an arbitrary name -> value lookup.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = GatewayConfig::default();

        config.listener.bind_address = require(&lookup, ENV_SERVE_ADDR)?;
        if let Some(raw) = get(&lookup, ENV_MAX_CONNECTIONS) {
            config.listener.max_connections = parse(ENV_MAX_CONNECTIONS, &raw)?;
        }

        config.tls.cert_path = require(&lookup, ENV_SERVER_CERT_FILE)?.into();
        config.tls.key_path = require(&lookup, ENV_SERVER_KEY_FILE)?.into();
        config.tls.client_ca_dir = require(&lookup, ENV_CLIENT_CA_DIR)?.into();

        config.upstream.base_address = require(&lookup, ENV_ROUTE_BASE_ADDR)?;
        let timeout_secs: u64 = parse(
            ENV_GATEWAY_TIMEOUT_SECS,
            &require(&lookup, ENV_GATEWAY_TIMEOUT_SECS)?,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_GATEWAY_TIMEOUT_SECS,
                reason: "must be a positive number of seconds".to_string(),
            });
        }
        config.upstream.timeout_secs = timeout_secs;

        config.routing.allowed_verbs = require(&lookup, ENV_ALLOWED_HTTP_VERBS)?
            .split(VERB_DELIMITER)
            .map(str::trim)
            .filter(|verb| !verb.is_empty())
            .map(String::from)
            .collect();

        config.observability.verbose_tls_logging =
            lookup(ENV_VERBOSE_LOGGING).as_deref() == Some(VERBOSE_ENABLED);
        if let Some(raw) = get(&lookup, ENV_METRICS_ADDR) {
            config.observability.metrics_address = Some(parse(ENV_METRICS_ADDR, &raw)?);
        }

        Ok(config)
    }
}

/// An unset variable and an empty one are both treated as absent.
fn get(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Option<String> {
    lookup(name).filter(|value| !value.trim().is_empty())
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    get(lookup, name).ok_or(ConfigError::Missing(name))
}

fn parse<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim().parse().map_err(|err| ConfigError::Invalid {
        name,
        reason: format!("{err}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_SERVE_ADDR, "127.0.0.1:8443"),
            (ENV_SERVER_CERT_FILE, "/etc/tls/server.crt"),
            (ENV_SERVER_KEY_FILE, "/etc/tls/server.key"),
            (ENV_CLIENT_CA_DIR, "/etc/tls/clients"),
            (ENV_ROUTE_BASE_ADDR, "http://10.0.0.5:3000"),
            (ENV_GATEWAY_TIMEOUT_SECS, "15"),
            (ENV_ALLOWED_HTTP_VERBS, "GET;POST"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<GatewayConfig, ConfigError> {
        GatewayConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn loads_complete_environment() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert_eq!(config.listener.max_connections, 10_000);
        assert_eq!(config.tls.client_ca_dir, Path::new("/etc/tls/clients"));
        assert_eq!(config.upstream.base_address, "http://10.0.0.5:3000");
        assert_eq!(config.upstream.timeout_secs, 15);
        assert_eq!(config.routing.allowed_verbs, vec!["GET", "POST"]);
        assert!(!config.observability.verbose_tls_logging);
        assert!(config.observability.metrics_address.is_none());
    }

    #[test]
    fn missing_variable_is_fatal() {
        let mut env = base_env();
        env.remove(ENV_SERVE_ADDR);
        match load(&env) {
            Err(ConfigError::Missing(name)) => assert_eq!(name, ENV_SERVE_ADDR),
            other => panic!("expected missing error, got {other:?}"),
        }
    }

    #[test]
    fn empty_value_counts_as_missing() {
        let mut env = base_env();
        env.insert(ENV_ROUTE_BASE_ADDR, "   ");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Missing(ENV_ROUTE_BASE_ADDR))
        ));
    }

    #[test]
    fn unparsable_timeout_is_fatal() {
        let mut env = base_env();
        env.insert(ENV_GATEWAY_TIMEOUT_SECS, "soon");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: ENV_GATEWAY_TIMEOUT_SECS,
                ..
            })
        ));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut env = base_env();
        env.insert(ENV_GATEWAY_TIMEOUT_SECS, "0");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: ENV_GATEWAY_TIMEOUT_SECS,
                ..
            })
        ));
    }

    #[test]
    fn verb_list_is_trimmed_and_filtered() {
        let mut env = base_env();
        env.insert(ENV_ALLOWED_HTTP_VERBS, " GET ;; POST ;");
        let config = load(&env).unwrap();
        assert_eq!(config.routing.allowed_verbs, vec!["GET", "POST"]);
    }

    #[test]
    fn verbose_flag_requires_exact_value() {
        let mut env = base_env();
        env.insert(ENV_VERBOSE_LOGGING, "1");
        assert!(load(&env).unwrap().observability.verbose_tls_logging);

        env.insert(ENV_VERBOSE_LOGGING, "true");
        assert!(!load(&env).unwrap().observability.verbose_tls_logging);
    }

    #[test]
    fn optional_settings_are_parsed() {
        let mut env = base_env();
        env.insert(ENV_MAX_CONNECTIONS, "256");
        env.insert(ENV_METRICS_ADDR, "127.0.0.1:9100");
        let config = load(&env).unwrap();
        assert_eq!(config.listener.max_connections, 256);
        assert_eq!(
            config.observability.metrics_address,
            Some("127.0.0.1:9100".parse().unwrap())
        );
    }

    #[test]
    fn bad_metrics_address_is_fatal() {
        let mut env = base_env();
        env.insert(ENV_METRICS_ADDR, "not-an-address");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: ENV_METRICS_ADDR,
                ..
            })
        ));
    }
}
