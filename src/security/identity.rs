//! Verified client chain identities for audit logging.
//!
//! Parses the DER chain captured at handshake time into subject/issuer
//! display strings. Parsing here is total: the chain was already verified
//! cryptographically by the TLS layer, so a link that fails re-parsing is
//! rendered with a placeholder instead of failing the connection.

use rustls::pki_types::CertificateDer;
use x509_parser::certificate::X509Certificate;
use x509_parser::prelude::FromDer;

const UNPARSEABLE: &str = "<unparseable>";

/// Subject and issuer of one chain link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLink {
    /// Subject distinguished name, RFC 4514 style.
    pub subject: String,

    /// Issuer distinguished name.
    pub issuer: String,
}

/// Display form of the verified client certificate chain, leaf first.
#[derive(Debug, Clone, Default)]
pub struct ClientChain {
    pub links: Vec<ChainLink>,
}

impl ClientChain {
    /// Extract subject/issuer pairs from a verified DER chain.
    pub fn from_der_chain(chain: &[CertificateDer<'_>]) -> Self {
        let links = chain
            .iter()
            .map(|der| match X509Certificate::from_der(der.as_ref()) {
                Ok((_, cert)) => ChainLink {
                    subject: cert.subject().to_string(),
                    issuer: cert.issuer().to_string(),
                },
                Err(_) => ChainLink {
                    subject: UNPARSEABLE.to_string(),
                    issuer: UNPARSEABLE.to_string(),
                },
            })
            .collect();

        Self { links }
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}
