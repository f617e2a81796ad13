//! Route admission rules.
//!
//! # Responsibilities
//! - Compile (verb, path-pattern) rules once at startup
//! - Decide per request whether a (method, path) pair may be forwarded
//!
//! # Design Decisions
//! - Immutable after compilation (thread-safe without locks)
//! - Ordered evaluation, first match wins
//! - Method comparison is exact and case-sensitive as configured
//! - Patterns are regular expressions searched against the full path
//!   (unanchored; anchor with ^...$ for exact paths)

use regex::Regex;
use thiserror::Error;

/// The deployed catch-all path pattern: every path is eligible and the
/// table degenerates to a verb allow-list.
pub const MATCH_ALL_PATHS: &str = ".*";

/// Error type for route table compilation.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route table compiled with zero rules")]
    EmptyRuleSet,

    #[error("invalid path pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// One admission rule: an HTTP verb plus a compiled path pattern.
#[derive(Debug, Clone)]
pub struct RouteRule {
    method: String,
    pattern: Regex,
}

impl RouteRule {
    pub fn new(method: impl Into<String>, pattern: &str) -> Result<Self, RouteError> {
        let compiled = Regex::new(pattern).map_err(|source| RouteError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            method: method.into(),
            pattern: compiled,
        })
    }

    fn matches(&self, method: &str, path: &str) -> bool {
        self.method == method && self.pattern.is_match(path)
    }
}

/// Ordered, immutable set of admission rules.
#[derive(Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Compile a table from an ordered rule sequence. A table with zero
    /// rules would silently refuse everything, so it is rejected instead.
    pub fn compile(rules: Vec<RouteRule>) -> Result<Self, RouteError> {
        if rules.is_empty() {
            return Err(RouteError::EmptyRuleSet);
        }
        Ok(Self { rules })
    }

    /// Build the deployed policy: one catch-all rule per allowed verb.
    pub fn from_allowed_verbs(verbs: &[String]) -> Result<Self, RouteError> {
        let rules = verbs
            .iter()
            .map(|verb| RouteRule::new(verb.clone(), MATCH_ALL_PATHS))
            .collect::<Result<Vec<_>, _>>()?;
        Self::compile(rules)
    }

    /// Evaluate rules in order; true on the first rule whose method and
    /// pattern both match, false when none does.
    pub fn matches(&self, method: &str, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(method, path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
