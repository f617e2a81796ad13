//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     client CA directory
//!         → trust.rs (recursive load, fail-fast parse)
//!         → RootCertStore → TLS client verifier
//!
//! Per connection:
//!     verified peer DER chain
//!         → identity.rs (subject/issuer extraction)
//!         → audit log lines
//! ```
//!
//! # Design Decisions
//! - Fail closed: a single bad file in the CA directory aborts startup
//! - No trust in client input; identity strings come only from the
//!   chain rustls already verified
//! - Chain re-parsing for audit never fails a request

pub mod identity;
pub mod trust;

pub use identity::{ChainLink, ClientChain};
pub use trust::{load_trust_store, TrustStoreError};
