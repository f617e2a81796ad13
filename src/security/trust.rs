//! Client CA trust store construction.
//!
//! The trust store is built once at startup from a directory tree of
//! PEM-encoded CA certificates and installed into the TLS configuration.
//! Loading is fail-fast: one unreadable or unparseable file aborts the
//! whole build, so the gateway never serves with a partial anchor set.

use std::io;
use std::path::{Path, PathBuf};

use rustls::pki_types::CertificateDer;
use rustls::RootCertStore;
use thiserror::Error;
use tracing::info;
use walkdir::WalkDir;

/// Error type for trust store construction.
#[derive(Debug, Error)]
pub enum TrustStoreError {
    #[error("failed reading directory {path}: {source}")]
    DirectoryRead { path: PathBuf, source: io::Error },

    #[error("failed reading file {path}: {source}")]
    FileRead { path: PathBuf, source: io::Error },

    #[error("failed to parse client CA certificate from {path}")]
    CertificateParse { path: PathBuf },
}

/// Build a verification pool from every file under `dir`, recursively.
///
/// Subdirectories are descended into, so operators can keep one directory
/// per issuing tenant. Every regular file must contain at least one PEM
/// certificate block; each parsed certificate becomes a trust anchor and
/// is reported with one info event.
pub fn load_trust_store(dir: impl AsRef<Path>) -> Result<RootCertStore, TrustStoreError> {
    let dir = dir.as_ref();
    let mut store = RootCertStore::empty();

    // The walker keeps an explicit work list and detects symlink loops, so
    // a cyclic tree terminates with an error instead of unbounded descent.
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|err| walk_error(dir, err))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        for cert in read_certificates(path)? {
            store
                .add(cert)
                .map_err(|_| TrustStoreError::CertificateParse {
                    path: path.to_path_buf(),
                })?;
            info!(path = %path.display(), "loaded client CA certificate");
        }
    }

    Ok(store)
}

fn walk_error(root: &Path, err: walkdir::Error) -> TrustStoreError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other("symlink cycle detected"));
    TrustStoreError::DirectoryRead { path, source }
}

fn read_certificates(path: &Path) -> Result<Vec<CertificateDer<'static>>, TrustStoreError> {
    let pem = std::fs::read(path).map_err(|source| TrustStoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| TrustStoreError::CertificateParse {
            path: path.to_path_buf(),
        })?;

    if certs.is_empty() {
        return Err(TrustStoreError::CertificateParse {
            path: path.to_path_buf(),
        });
    }

    Ok(certs)
}
