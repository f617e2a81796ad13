//! Request correlation.
//!
//! # Responsibilities
//! - Generate one SessionId per inbound request (UUID v4)
//! - Carry the id on the request-scoped extensions
//! - Make the id available to every log line for that request
//!
//! # Design Decisions
//! - The id is attached by middleware before any request processing
//! - Injection derives a new context; the parent is never mutated
//! - Absence is not an error: extraction yields None and callers treat
//!   it as "no session"

use axum::body::Body;
use axum::http::{Extensions, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Opaque per-operation correlation token.
///
/// One is generated per startup sequence and one per inbound request;
/// ids are never persisted and never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Return a derived copy of `parent` carrying `id`.
///
/// The parent is left untouched, so sibling derivations from the same
/// parent do not interfere.
pub fn inject(parent: &Extensions, id: SessionId) -> Extensions {
    let mut child = parent.clone();
    child.insert(id);
    child
}

/// The carried id, or `None` when no ancestor ever injected one.
pub fn extract(extensions: &Extensions) -> Option<SessionId> {
    extensions.get::<SessionId>().cloned()
}

/// Attach a fresh SessionId to the request before anything else runs and
/// tag every downstream log line with it.
pub async fn session_middleware(mut req: Request<Body>, next: Next) -> Response {
    let id = SessionId::generate();
    let span = info_span!("request", session_id = %id);
    req.extensions_mut().insert(id);
    next.run(req).instrument(span).await
}
