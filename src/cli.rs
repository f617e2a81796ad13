//! Command-line surface.
//!
//! The binary takes at most one meaningful argument; everything else is
//! configured through the environment. `--raw` is a modifier rather than
//! a command: it is stripped before the remaining argument is matched
//! and suppresses ANSI styling in whatever output follows.

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_INPUT: u8 = 1;
pub const EXIT_INTERNAL: u8 = 2;

/// Printed for unrecognized arguments.
pub const HELP_PROMPT: &str = "Run 'middleman -h' for help.";

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Usage text with `**` bold markers, rendered or stripped on output.
const HELP_TEMPLATE: &str = "\
**middleman** - mutual-TLS terminating reverse proxy

**USAGE**
    middleman              start the gateway
    middleman version      print build metadata and exit
    middleman help         print this message (-hr or --raw for plain text)

**CONFIGURATION** (environment variables)
    SERVE_ADDR              host:port for the HTTPS listener
    PATH_SERVER_CERT_FILE   server certificate, PEM
    PATH_SERVER_KEY_FILE    server private key, PEM
    DIR_CLIENT_CA_FILES     directory tree of client CA certificates
    ROUTE_BASE_ADDR         upstream base address, scheme and authority only
    GATEWAY_TIMEOUT_SECS    whole-exchange backend timeout in seconds
    ALLOWED_HTTP_VERBS      allowed verbs, ';' separated
    VERBOSE_LOGGING         set to 1 to audit client chains per request
    MAX_CONNECTIONS         concurrent connection cap, optional
    METRICS_ADDR            Prometheus scrape address, optional";

/// What the process should do based on its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Start the gateway.
    Serve,
    /// Print version metadata and exit 0.
    PrintVersion,
    /// Print usage and exit 0.
    PrintHelp { styled: bool },
    /// Unrecognized argument: print the help prompt and exit 1.
    Reject { argument: String },
}

impl Directive {
    /// Decide what to do from the process arguments (program name
    /// excluded).
    pub fn from_args(args: &[String]) -> Self {
        let styled = !args.iter().any(|arg| arg == "--raw");
        let args: Vec<&String> = args.iter().filter(|arg| *arg != "--raw").collect();

        match args.as_slice() {
            [] => Directive::Serve,
            [arg] => match arg.as_str() {
                "version" | "--version" | "-v" => Directive::PrintVersion,
                "help" | "--help" | "-h" => Directive::PrintHelp { styled },
                "-hr" => Directive::PrintHelp { styled: false },
                other => Directive::Reject {
                    argument: other.to_string(),
                },
            },
            // Multiple arguments carry no directive; the server ignores
            // them and starts normally.
            _ => Directive::Serve,
        }
    }
}

/// Version line with the commit stamped at build time, if any.
pub fn version_info() -> String {
    format!(
        "middleman {} | commit: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("MIDDLEMAN_COMMIT").unwrap_or("unknown")
    )
}

/// Usage text, with ANSI bold when `styled`.
pub fn help_message(styled: bool) -> String {
    let mut out = String::with_capacity(HELP_TEMPLATE.len());
    let mut bold = false;
    let mut rest = HELP_TEMPLATE;

    while let Some(pos) = rest.find("**") {
        out.push_str(&rest[..pos]);
        if styled {
            out.push_str(if bold { RESET } else { BOLD });
        }
        bold = !bold;
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}
