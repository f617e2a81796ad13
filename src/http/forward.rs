//! Upstream forwarding.
//!
//! # Responsibilities
//! - Rebuild the inbound request against the fixed backend authority
//! - Issue exactly one attempt, bounded by the exchange deadline
//! - Classify failures so the handler can map them to statuses
//!
//! # Design Decisions
//! - Typed results instead of error callbacks; the caller decides how to
//!   log and respond
//! - No retries: the gateway is stateless and retry policy belongs to the
//!   caller
//! - The deadline is armed once per exchange and shared with the body
//!   relay

use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{Request, Response, StatusCode, Uri, Version};
use hyper::body::Incoming;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use thiserror::Error;
use tokio::time::{timeout_at, Instant};

use crate::config::loader::ENV_ROUTE_BASE_ADDR;
use crate::config::{ConfigError, UpstreamConfig};
use crate::http::response::{strip_hop_by_hop, DeadlineBody};

/// Error type for one forwarding attempt.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream exchange exceeded {0:?}")]
    Timeout(Duration),

    #[error("upstream connect failed: {0}")]
    Connect(#[source] hyper_util::client::legacy::Error),

    #[error("upstream transport error: {0}")]
    Transport(#[source] hyper_util::client::legacy::Error),

    #[error("could not build upstream request: {0}")]
    Request(#[source] axum::http::Error),
}

impl ForwardError {
    /// Client-facing status for a failed attempt.
    pub fn status(&self) -> StatusCode {
        match self {
            ForwardError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Issues one deadline-bounded attempt per inbound request against the
/// fixed backend.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    scheme: Scheme,
    authority: Authority,
    timeout: Duration,
}

impl Forwarder {
    /// Build a forwarder from upstream configuration.
    ///
    /// The base address contributes scheme and authority only; inbound
    /// paths and queries are forwarded verbatim.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, ConfigError> {
        crate::net::tls::install_crypto_provider();
        let (scheme, authority) = parse_base_address(&upstream.base_address)?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .enable_http2()
            .build();
        let client = Client::builder(TokioExecutor::new()).build(connector);

        Ok(Self {
            client,
            scheme,
            authority,
            timeout: Duration::from_secs(upstream.timeout_secs),
        })
    }

    /// Forward one request. On success the response carries the backend's
    /// status, headers, and a streaming body that stays bounded by the
    /// same deadline that covered connect and headers.
    pub async fn forward(
        &self,
        req: Request<Body>,
    ) -> Result<Response<DeadlineBody<Incoming>>, ForwardError> {
        let deadline = Instant::now() + self.timeout;
        let (mut parts, body) = req.into_parts();

        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = Some(self.scheme.clone());
        uri_parts.authority = Some(self.authority.clone());
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        parts.uri = Uri::from_parts(uri_parts)
            .map_err(|err| ForwardError::Request(err.into()))?;

        // The upstream hop negotiates its own protocol; the inbound
        // version must not constrain it.
        parts.version = Version::HTTP_11;
        strip_hop_by_hop(&mut parts.headers);

        let outbound = Request::from_parts(parts, body);
        let response = timeout_at(deadline, self.client.request(outbound))
            .await
            .map_err(|_| ForwardError::Timeout(self.timeout))?
            .map_err(classify)?;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, DeadlineBody::new(body, deadline)))
    }
}

fn classify(err: hyper_util::client::legacy::Error) -> ForwardError {
    if err.is_connect() {
        ForwardError::Connect(err)
    } else {
        ForwardError::Transport(err)
    }
}

fn parse_base_address(base: &str) -> Result<(Scheme, Authority), ConfigError> {
    let invalid = |reason: String| ConfigError::Invalid {
        name: ENV_ROUTE_BASE_ADDR,
        reason,
    };

    let uri: Uri = base
        .parse()
        .map_err(|err| invalid(format!("{err}")))?;

    let scheme = uri.scheme().cloned().unwrap_or(Scheme::HTTP);
    if scheme != Scheme::HTTP && scheme != Scheme::HTTPS {
        return Err(invalid(format!("unsupported scheme {scheme}")));
    }

    let authority = uri
        .authority()
        .cloned()
        .ok_or_else(|| invalid("no host in address".to_string()))?;

    if uri.path() != "" && uri.path() != "/" || uri.query().is_some() {
        return Err(invalid(
            "must not carry a path or query; inbound paths are forwarded verbatim".to_string(),
        ));
    }

    Ok((scheme, authority))
}
