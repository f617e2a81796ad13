//! Response and relay mechanics.
//!
//! # Responsibilities
//! - Strip connection-scoped headers before forwarding upstream
//! - Stream backend bodies without whole-body buffering
//! - Enforce the exchange deadline while the body is still flowing
//!
//! # Design Decisions
//! - Response headers are relayed verbatim; framing is the HTTP stack's
//!   concern, not ours
//! - One deadline covers headers and body; a stalled backend body fails
//!   the stream instead of holding the connection open forever

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::http::{header, HeaderMap};
use axum::BoxError;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use thiserror::Error;
use tokio::time::{sleep_until, Instant, Sleep};

/// Headers that describe one hop's connection rather than the request
/// itself. The upstream connection negotiates its own.
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers from an outbound request. `host` goes too;
/// the upstream client derives a fresh one from the backend authority.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    for name in HOP_BY_HOP_HEADERS {
        headers.remove(name);
    }
    headers.remove(header::HOST);
}

/// Returned by the body stream when the exchange deadline expires while
/// the relay is still in flight.
#[derive(Debug, Error)]
#[error("upstream body read exceeded the exchange deadline")]
pub struct DeadlineElapsed;

/// A body wrapper that fails the stream once a fixed deadline passes.
///
/// The deadline is absolute and shared with the headers phase of the same
/// exchange, so connect time, header time, and relay time all draw from
/// one budget.
pub struct DeadlineBody<B> {
    inner: B,
    deadline: Pin<Box<Sleep>>,
}

impl<B> DeadlineBody<B> {
    pub fn new(inner: B, deadline: Instant) -> Self {
        Self {
            inner,
            deadline: Box::pin(sleep_until(deadline)),
        }
    }
}

impl<B> Body for DeadlineBody<B>
where
    B: Body<Data = Bytes> + Unpin,
    B::Error: Into<BoxError>,
{
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        // Deadline first: a backend still producing data past the budget
        // is cut off, matching the headers-phase timeout classification.
        if this.deadline.as_mut().poll(cx).is_ready() {
            return Poll::Ready(Some(Err(Box::new(DeadlineElapsed))));
        }

        match Pin::new(&mut this.inner).poll_frame(cx) {
            Poll::Ready(Some(Ok(frame))) => Poll::Ready(Some(Ok(frame))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(err.into()))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyExt, Full};
    use std::time::Duration;

    #[test]
    fn strips_connection_headers_and_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "gateway.internal".parse().unwrap());
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        headers.insert("x-custom", "kept".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert!(headers.get(header::HOST).is_none());
        assert!(headers.get(header::CONNECTION).is_none());
        assert!(headers.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get("x-custom").unwrap(), "kept");
    }

    #[tokio::test]
    async fn data_before_the_deadline_flows_through() {
        let inner = Full::new(Bytes::from_static(b"ok"));
        let mut body = DeadlineBody::new(inner, Instant::now() + Duration::from_secs(5));

        let frame = body.frame().await.unwrap().unwrap();
        assert_eq!(frame.into_data().unwrap(), Bytes::from_static(b"ok"));
        assert!(body.frame().await.is_none());
    }

    #[tokio::test]
    async fn expired_deadline_fails_the_stream() {
        let inner = Full::new(Bytes::from_static(b"late"));
        let mut body = DeadlineBody::new(inner, Instant::now() - Duration::from_millis(1));

        let frame = body.frame().await.unwrap();
        let err = frame.err().expect("deadline should cut the stream");
        assert!(err.is::<DeadlineElapsed>());
    }
}
