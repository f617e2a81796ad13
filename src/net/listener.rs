//! TCP listener with connection backpressure.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Accept incoming TCP connections
//! - Enforce max_connections via semaphore

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, info};

use crate::config::ListenerConfig;

/// A bounded TCP listener that limits concurrent connections.
///
/// When the limit is reached, `accept` waits until a slot frees up
/// instead of accepting more work than the gateway can hold.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
}

impl Listener {
    /// Bind to the configured address with connection limits.
    pub async fn bind(config: &ListenerConfig) -> io::Result<Self> {
        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let listener = TcpListener::bind(addr).await?;

        info!(
            address = %listener.local_addr()?,
            max_connections = config.max_connections,
            "listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
        })
    }

    /// Accept a new connection, waiting for a free slot first.
    ///
    /// The returned permit must be held for the connection's lifetime;
    /// dropping it releases the slot.
    pub async fn accept(&self) -> io::Result<(TcpStream, SocketAddr, ConnectionPermit)> {
        // The semaphore is never closed, so acquire cannot fail.
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .expect("connection limiter closed");

        let (stream, addr) = self.inner.accept().await?;

        debug!(
            peer = %addr,
            available_permits = self.connection_limit.available_permits(),
            "connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// Local address this listener is bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.local_addr()
    }
}

/// A held connection slot, released back on drop even if the connection
/// task panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: OwnedSemaphorePermit,
}
