//! TLS termination setup.
//!
//! Builds the rustls server configuration that enforces mutual TLS:
//! the gateway's own certificate and key on one side, required client
//! certificate verification against the loaded trust store on the other.
//!
//! All certificate and key files are expected in PEM format.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use tracing::debug;

use crate::config::TlsConfig;
use crate::error::Error;

/// Pin the process-level rustls crypto provider.
///
/// More than one provider can end up compiled in (reqwest's rustls
/// stack brings ring alongside aws-lc-rs in the test profile), and
/// rustls panics on first use if the choice is ambiguous. The first
/// installation wins; later calls are no-ops.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Build a `rustls::ServerConfig` for mutual TLS.
///
/// Clients without a certificate chaining to one of `roots` fail the
/// handshake; no HTTP bytes are ever exchanged with them. An empty root
/// store is rejected here rather than producing a listener that can
/// never complete a handshake.
pub fn build_server_config(
    config: &TlsConfig,
    roots: RootCertStore,
) -> Result<Arc<ServerConfig>, Error> {
    install_crypto_provider();

    if !config.cert_path.exists() {
        return Err(Error::Tls(format!(
            "certificate file not found: {}",
            config.cert_path.display()
        )));
    }
    if !config.key_path.exists() {
        return Err(Error::Tls(format!(
            "private key file not found: {}",
            config.key_path.display()
        )));
    }

    let certs = load_certs(&config.cert_path)?;
    let key = load_private_key(&config.key_path)?;

    let verifier = WebPkiClientVerifier::builder(Arc::new(roots))
        .build()
        .map_err(|e| Error::Tls(format!("cannot build client verifier: {e}")))?;

    let mut tls = ServerConfig::builder()
        .with_client_cert_verifier(verifier)
        .with_single_cert(certs, key)
        .map_err(|e| Error::Tls(format!("cert/key pair rejected: {e}")))?;

    // Prefer HTTP/2, fall back to HTTP/1.1.
    tls.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    debug!(
        cert = %config.cert_path.display(),
        key = %config.key_path.display(),
        "mutual-TLS server config built"
    );

    Ok(Arc::new(tls))
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, Error> {
    let pem = read_file(path)?;
    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| Error::Tls(format!("cannot parse certs from {}: {e}", path.display())))?;

    if certs.is_empty() {
        return Err(Error::Tls(format!(
            "no certificates found in {}",
            path.display()
        )));
    }

    Ok(certs)
}

fn load_private_key(path: &Path) -> Result<PrivateKeyDer<'static>, Error> {
    let pem = read_file(path)?;
    rustls_pemfile::private_key(&mut pem.as_slice())
        .map_err(|e| Error::Tls(format!("cannot parse key from {}: {e}", path.display())))?
        .ok_or_else(|| Error::Tls(format!("no private key found in {}", path.display())))
}

fn read_file(path: &Path) -> Result<Vec<u8>, Error> {
    fs::read(path).map_err(|e| Error::Tls(format!("cannot read {}: {e}", path.display())))
}
