//! Error taxonomy surfaced by the HTTP client core.
//!
//! ERROR HANDLING
//! ==============
//! Every failed call resolves to one `ApiError` carrying a human-readable
//! message. Nothing is retried automatically; only `ExpiredSession` is
//! accompanied by a side effect (the expiry redirect), which has already
//! happened by the time the caller sees the error.

pub const FALLBACK_BUSINESS_MESSAGE: &str = "request failed";

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    /// Envelope `code` was not 200.
    #[error("{message}")]
    Business { code: i64, message: String },

    /// A 401 outside the login request, or a network failure while the
    /// session was believed valid.
    #[error("not signed in or session expired")]
    ExpiredSession,

    /// Transport failure with no prior authenticated session.
    #[error("network error: {0}")]
    Network(String),

    #[error("permission denied")]
    Forbidden,

    #[error("resource not found")]
    NotFound,

    #[error("server error (HTTP {status})")]
    Server { status: u16 },

    /// Raw HTTP failure handed back to the caller unchanged, including the
    /// login request's own 401.
    #[error("request rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    /// Transport failure that did not look like a network error (timeouts).
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("response decode failed: {0}")]
    Decode(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("session storage failed: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status associated with the error, when there is one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ExpiredSession => Some(401),
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::Server { status } | Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short grepable code, used in log fields.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Business { .. } => "E_BUSINESS",
            Self::ExpiredSession => "E_EXPIRED_SESSION",
            Self::Network(_) => "E_NETWORK",
            Self::Forbidden => "E_FORBIDDEN",
            Self::NotFound => "E_NOT_FOUND",
            Self::Server { .. } => "E_SERVER",
            Self::Rejected { .. } => "E_REJECTED",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidUrl(_) => "E_INVALID_URL",
            Self::Storage(_) => "E_STORAGE",
        }
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
