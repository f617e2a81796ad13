//! Process entry point.
//!
//! Resolves the CLI directive, then orchestrates startup in dependency
//! order and races the accept loop against the termination signal.

use std::env;
use std::process::ExitCode;

use tracing::{error, info, info_span, Instrument};

use middleman::cli::{self, Directive, EXIT_INPUT, EXIT_INTERNAL, EXIT_SUCCESS};
use middleman::config::GatewayConfig;
use middleman::http::{Forwarder, GatewayServer, SessionId};
use middleman::lifecycle;
use middleman::net::{self, Listener};
use middleman::observability::{logging, metrics};
use middleman::routing::RouteTable;
use middleman::security;

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = env::args().skip(1).collect();

    match Directive::from_args(&args) {
        Directive::Serve => {}
        Directive::PrintVersion => {
            println!("{}", cli::version_info());
            return ExitCode::from(EXIT_SUCCESS);
        }
        Directive::PrintHelp { styled } => {
            println!("{}", cli::help_message(styled));
            return ExitCode::from(EXIT_SUCCESS);
        }
        Directive::Reject { argument } => {
            eprintln!("middleman: unrecognized argument '{argument}'");
            println!("{}", cli::HELP_PROMPT);
            return ExitCode::from(EXIT_INPUT);
        }
    }

    // Held until exit so buffered log events flush.
    let _guard = logging::init();

    let session = SessionId::generate();
    let span = info_span!("startup", session_id = %session);

    match run().instrument(span).await {
        Ok(code) => code,
        Err(err) => {
            error!(error = %err, "startup failed");
            ExitCode::from(EXIT_INTERNAL)
        }
    }
}

async fn run() -> middleman::Result<ExitCode> {
    info!(version = env!("CARGO_PKG_VERSION"), "middleman starting");

    let config = GatewayConfig::from_env()?;
    log_configuration(&config);

    let roots = security::load_trust_store(&config.tls.client_ca_dir)?;
    info!(certificates = roots.len(), "client trust store loaded");

    let tls = net::build_server_config(&config.tls, roots)?;
    let routes = RouteTable::from_allowed_verbs(&config.routing.allowed_verbs)?;
    info!(rules = routes.len(), "route table compiled");

    let forwarder = Forwarder::new(&config.upstream)?;

    if let Some(addr) = config.observability.metrics_address {
        metrics::init_exporter(addr)?;
        info!(address = %addr, "metrics exporter listening");
    }

    let listener = Listener::bind(&config.listener).await?;
    let server = GatewayServer::new(tls, routes, forwarder, &config.observability);

    tokio::select! {
        result = server.run(listener) => {
            result?;
            Ok(ExitCode::from(EXIT_SUCCESS))
        }
        signal = lifecycle::wait_for_termination() => {
            info!(signal, "received termination signal");
            Ok(ExitCode::from(EXIT_SUCCESS))
        }
    }
}

fn log_configuration(config: &GatewayConfig) {
    info!(
        listen = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        cert = %config.tls.cert_path.display(),
        key = %config.tls.key_path.display(),
        client_ca_dir = %config.tls.client_ca_dir.display(),
        upstream = %config.upstream.base_address,
        timeout_secs = config.upstream.timeout_secs,
        allowed_verbs = ?config.routing.allowed_verbs,
        verbose_tls = config.observability.verbose_tls_logging,
        "configuration loaded"
    );
}
