//! middleman - mutual-TLS terminating reverse proxy
//!
//! Terminates HTTPS with required client certificate verification,
//! gates requests through a verb/path route table, and forwards matched
//! requests to a single fixed upstream under one per-request deadline.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌────────────────────────────────────────────┐
//!                      │                  GATEWAY                   │
//!                      │                                            │
//!     Client (mTLS)    │  ┌─────────┐   ┌─────────┐   ┌─────────┐  │
//!     ─────────────────┼─▶│   net   │──▶│  http   │──▶│ routing │  │
//!                      │  │ listener│   │ server  │   │  table  │  │
//!                      │  │ + tls   │   └─────────┘   └────┬────┘  │
//!                      │  └─────────┘                      │       │
//!                      │                                   ▼       │
//!     Client Response  │  ┌──────────┐               ┌──────────┐  │
//!     ◀────────────────┼──│ response │◀──────────────│ forward  │◀─┼── Backend
//!                      │  │  relay   │               │          │  │
//!                      │  └──────────┘               └──────────┘  │
//!                      │                                           │
//!                      │  config · security · observability ·      │
//!                      │  lifecycle                                │
//!                      └───────────────────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use http::GatewayServer;
