//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router and wire middleware (session IDs, tracing)
//! - Terminate mutual TLS on every accepted connection
//! - Capture the verified client chain before HTTP service begins
//! - Gate requests through the route table
//! - Hand matched requests to the forwarder and relay the outcome
//!
//! # Data Flow
//! ```text
//! Listener (TCP + permit)
//!     → TLS handshake (client cert verified or connection dropped)
//!     → client chain captured into request extensions
//!     → session middleware (fresh ID per request)
//!     → proxy_handler: audit chain → route gate → forward
//! ```
//!
//! # Design Decisions
//! - The accept loop is hand rolled so the handshake-verified peer
//!   certificates can travel into handlers; a plain `axum::serve` hides
//!   them
//! - One router instance is cloned per connection; Axum routers are cheap
//!   to clone
//! - Rejections and upstream failures are terminal responses, never
//!   retried here

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Extensions, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use rustls::ServerConfig;
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::config::ObservabilityConfig;
use crate::http::forward::Forwarder;
use crate::http::request;
use crate::net::Listener;
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::ClientChain;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub forwarder: Arc<Forwarder>,
    pub verbose_tls: bool,
}

/// Mutual-TLS gateway server.
pub struct GatewayServer {
    router: Router,
    acceptor: TlsAcceptor,
}

impl GatewayServer {
    pub fn new(
        tls: Arc<ServerConfig>,
        routes: RouteTable,
        forwarder: Forwarder,
        observability: &ObservabilityConfig,
    ) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            forwarder: Arc::new(forwarder),
            verbose_tls: observability.verbose_tls_logging,
        };

        Self {
            router: Self::build_router(state),
            acceptor: TlsAcceptor::from(tls),
        }
    }

    /// Build the Axum router with all middleware layers. The session
    /// middleware is outermost so even the trace layer's events land
    /// inside the request's session span.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(axum::middleware::from_fn(request::session_middleware))
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns only on accept errors; shutdown is handled by the caller
    /// racing this future against the signal watcher.
    pub async fn run(self, listener: Listener) -> Result<(), std::io::Error> {
        info!(
            address = %listener.local_addr()?,
            "gateway accepting mutual-TLS connections"
        );

        loop {
            let (stream, peer, permit) = listener.accept().await?;
            let acceptor = self.acceptor.clone();
            let router = self.router.clone();

            tokio::spawn(async move {
                serve_tls_connection(acceptor, stream, peer, router).await;
                drop(permit);
            });
        }
    }
}

/// Terminate TLS on one connection and serve HTTP over it.
///
/// A failed handshake drops the connection without writing any HTTP
/// bytes. On success the verified client chain is attached to every
/// request served over the connection.
async fn serve_tls_connection(
    acceptor: TlsAcceptor,
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
) {
    let tls_stream = match acceptor.accept(stream).await {
        Ok(tls_stream) => tls_stream,
        Err(err) => {
            metrics::record_handshake_failure();
            warn!(peer = %peer, error = %err, "TLS handshake failed");
            return;
        }
    };

    let chain = Arc::new(client_chain(&tls_stream));
    let io = TokioIo::new(tls_stream);

    let service = service_fn(move |mut req: Request<Incoming>| {
        let router = router.clone();
        let chain = chain.clone();
        async move {
            req.extensions_mut().insert(chain);
            router.oneshot(req).await
        }
    });

    if let Err(err) = hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
        .serve_connection(io, service)
        .await
    {
        debug!(peer = %peer, error = %err, "connection closed with error");
    }
}

fn client_chain(stream: &tokio_rustls::server::TlsStream<TcpStream>) -> ClientChain {
    let (_, connection) = stream.get_ref();
    match connection.peer_certificates() {
        Some(chain) => ClientChain::from_der_chain(chain),
        None => ClientChain::default(),
    }
}

/// Main proxy handler.
/// Audits the client chain, gates on the route table, and forwards.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let started = Instant::now();
    let session = request::extract(request.extensions()).unwrap_or_default();
    let method = request.method().as_str().to_string();
    let path = request.uri().path().to_string();

    audit_client_chain(request.extensions(), state.verbose_tls);

    if !state.routes.matches(&method, &path) {
        warn!(method = %method, path = %path, "no route matched; rejecting");
        metrics::record_request(&method, StatusCode::NOT_FOUND.as_u16(), started);
        return (StatusCode::NOT_FOUND, "No matching route found").into_response();
    }

    debug!(method = %method, path = %path, "forwarding request");

    match state.forwarder.forward(request).await {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(&method, status.as_u16(), started);
            debug!(status = %status, "upstream responded");

            let (parts, body) = response.into_parts();
            let body = Body::new(body.map_err(move |err| {
                // Polled after the request span has closed, so the
                // session travels into the closure.
                error!(
                    session_id = %session,
                    error = %err,
                    "relaying upstream body failed"
                );
                err
            }));
            Response::from_parts(parts, body)
        }
        Err(err) => {
            let status = err.status();
            error!(error = %err, status = %status, "upstream request failed");
            metrics::record_request(&method, status.as_u16(), started);
            (status, "Upstream request failed").into_response()
        }
    }
}

/// Log the verified chain when verbose auditing is on. A connection with
/// no captured chain should be unreachable behind required client auth,
/// but is still served; the gap is only recorded.
fn audit_client_chain(extensions: &Extensions, verbose: bool) {
    match extensions.get::<Arc<ClientChain>>() {
        Some(chain) if !chain.is_empty() => {
            if verbose {
                for (index, link) in chain.links.iter().enumerate() {
                    info!(
                        index,
                        subject = %link.subject,
                        issuer = %link.issuer,
                        "client certificate"
                    );
                }
            }
        }
        _ => warn!("no client certificate chain on connection"),
    }
}
