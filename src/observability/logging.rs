//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber once at startup
//! - Route events through a non-blocking stdout writer
//! - Honor `RUST_LOG` overrides, defaulting to info for this crate
//!
//! # Design Decisions
//! - The non-blocking writer keeps slow terminals out of the request
//!   path; the returned guard must live until exit so buffered events
//!   flush

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber.
///
/// The returned guard flushes buffered log events when dropped; hold it
/// for the life of the process.
pub fn init() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("middleman=info")),
        )
        .init();

    guard
}
