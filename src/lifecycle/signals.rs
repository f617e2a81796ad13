//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT)
//! - Resolve on the first signal so the caller can flush and exit
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - First signal wins; there is no drain phase, in-flight exchanges
//!   are abandoned when the process exits

use tokio::signal;

/// Wait until the process receives a termination request.
///
/// Resolves with the signal's name for the shutdown log line.
pub async fn wait_for_termination() -> &'static str {
    let interrupt = async {
        signal::ctrl_c()
            .await
            .expect("failed to install interrupt handler");
    };

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut terminate =
            signal(SignalKind::terminate()).expect("failed to install terminate handler");

        tokio::select! {
            _ = interrupt => "interrupt",
            _ = terminate.recv() => "terminate",
        }
    }

    #[cfg(not(unix))]
    {
        interrupt.await;
        "interrupt"
    }
}
