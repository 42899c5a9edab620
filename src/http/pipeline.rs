//! Ordered failure classification.
//!
//! DESIGN
//! ======
//! A failed request is normalized into a [`Failure`] and run through
//! [`RULES`] in order; the first rule that answers decides the [`Verdict`].
//! Rules are plain functions over the failure, the request's context flags
//! and the cached session flag, so priority order is testable without a
//! transport. Side effects belong to the caller.
//!
//! 1. login (or `skip_auth_handler`) 401 → hand back to the caller
//! 2. any other 401 → session expired
//! 3. network-looking transport failure → expired if the session was
//!    believed valid, network error otherwise
//! 4. 403 / 404 / 5xx → typed errors; anything else propagates

use serde::Deserialize;

use super::transport::HttpResponse;
use crate::error::ApiError;

const UNAUTHORIZED: u16 = 401;
const FORBIDDEN: u16 = 403;
const NOT_FOUND: u16 = 404;
const SERVER_ERROR_MIN: u16 = 500;
const MAX_MESSAGE_CHARS: usize = 200;

/// Per-request annotations read only by the interceptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// This is the login request; its 401 belongs to the login form.
    pub login: bool,
    /// Return a 401 to the caller instead of starting an expiry episode.
    pub skip_auth_handler: bool,
    /// Do not report failures to the user.
    pub silent: bool,
    /// The response is a file; skip envelope parsing.
    pub binary: bool,
}

/// A failed request, independent of transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A response arrived with a non-2xx status.
    Status { status: u16, message: String },
    /// No response arrived.
    Transport { message: String },
}

impl Failure {
    /// Normalize a non-2xx response, preferring the envelope's message.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self::Status { status: response.status, message: response_message(response) }
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }
}

fn response_message(response: &HttpResponse) -> String {
    #[derive(Deserialize)]
    struct MessageOnly {
        message: Option<String>,
    }

    if let Ok(MessageOnly { message: Some(message) }) = serde_json::from_slice::<MessageOnly>(&response.body) {
        if !message.trim().is_empty() {
            return message;
        }
    }
    let text = String::from_utf8_lossy(&response.body);
    let text = text.trim();
    if text.is_empty() {
        return reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("unknown status")
            .to_owned();
    }
    text.chars().take(MAX_MESSAGE_CHARS).collect()
}

/// Decides whether a transport failure's description looks like a network
/// error (including cross-origin-blocked responses that hide a 401).
pub trait NetworkErrorPredicate: Send + Sync {
    fn is_network_error(&self, message: &str) -> bool;
}

/// Case-insensitive substring match against a list of patterns.
#[derive(Debug, Clone)]
pub struct PatternPredicate {
    patterns: Vec<String>,
}

impl PatternPredicate {
    pub const DEFAULT_PATTERNS: [&'static str; 2] = ["Network Error", "ERR_FAILED"];

    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { patterns: patterns.into_iter().map(|p| p.as_ref().to_ascii_lowercase()).collect() }
    }
}

impl Default for PatternPredicate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERNS)
    }
}

impl NetworkErrorPredicate for PatternPredicate {
    fn is_network_error(&self, message: &str) -> bool {
        let message = message.to_ascii_lowercase();
        self.patterns.iter().any(|p| message.contains(p.as_str()))
    }
}

// =============================================================================
// VERDICTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the raw failure to the caller.
    PassThrough,
    /// The session is gone; the caller must start an expiry episode.
    Expire,
    Network,
    Forbidden,
    NotFound,
    Server,
    /// No rule matched; propagate unchanged.
    Propagate,
}

impl Verdict {
    /// Build the error the caller sees for this verdict.
    #[must_use]
    pub fn into_error(self, failure: Failure) -> ApiError {
        match (self, failure) {
            (Self::Expire, _) => ApiError::ExpiredSession,
            (Self::Forbidden, _) => ApiError::Forbidden,
            (Self::NotFound, _) => ApiError::NotFound,
            (Self::Server, Failure::Status { status, .. }) => ApiError::Server { status },
            (Self::Network, Failure::Transport { message } | Failure::Status { message, .. }) => {
                ApiError::Network(message)
            }
            (_, Failure::Status { status, message }) => ApiError::Rejected { status, message },
            (_, Failure::Transport { message }) => ApiError::Transport(message),
        }
    }
}

// =============================================================================
// RULES
// =============================================================================

/// Inputs every rule sees.
pub struct FailureContext<'a> {
    pub request: &'a RequestContext,
    /// Cached session flag at the time of the failure.
    pub session_authenticated: bool,
    pub network: &'a dyn NetworkErrorPredicate,
}

pub type Rule = fn(&Failure, &FailureContext<'_>) -> Option<Verdict>;

/// Rules in priority order.
pub const RULES: [(&str, Rule); 4] = [
    ("login_passthrough", login_passthrough),
    ("session_expired", session_expired),
    ("network_anomaly", network_anomaly),
    ("http_status", http_status),
];

/// Run the rules in order; the first answer wins.
#[must_use]
pub fn classify(failure: &Failure, cx: &FailureContext<'_>) -> Verdict {
    for (name, rule) in RULES {
        if let Some(verdict) = rule(failure, cx) {
            tracing::debug!(rule = name, ?verdict, "failure classified");
            return verdict;
        }
    }
    Verdict::Propagate
}

fn login_passthrough(failure: &Failure, cx: &FailureContext<'_>) -> Option<Verdict> {
    let exempt = cx.request.login || cx.request.skip_auth_handler;
    (exempt && failure.status() == Some(UNAUTHORIZED)).then_some(Verdict::PassThrough)
}

fn session_expired(failure: &Failure, _cx: &FailureContext<'_>) -> Option<Verdict> {
    (failure.status() == Some(UNAUTHORIZED)).then_some(Verdict::Expire)
}

fn network_anomaly(failure: &Failure, cx: &FailureContext<'_>) -> Option<Verdict> {
    let Failure::Transport { message } = failure else {
        return None;
    };
    if !cx.network.is_network_error(message) {
        return None;
    }
    // A blocked cross-origin 401 surfaces as a bare network error; only a
    // session believed valid can have expired.
    let expired = cx.session_authenticated && !cx.request.login && !cx.request.skip_auth_handler;
    Some(if expired { Verdict::Expire } else { Verdict::Network })
}

fn http_status(failure: &Failure, _cx: &FailureContext<'_>) -> Option<Verdict> {
    match failure.status()? {
        FORBIDDEN => Some(Verdict::Forbidden),
        NOT_FOUND => Some(Verdict::NotFound),
        status if status >= SERVER_ERROR_MIN => Some(Verdict::Server),
        _ => None,
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
