//! Transport seam between the client core and the wire.
//!
//! A transport reports every HTTP status as `Ok`; only failures to obtain a
//! response at all (connect errors, timeouts) are `Err`. Classifying statuses
//! is the client's job.

use reqwest::Method;

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormField>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { file_name: String, content_type: Option<String>, bytes: Vec<u8> },
}

impl FormField {
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: FormValue::Text(value.into()) }
    }

    #[must_use]
    pub fn file(name: impl Into<String>, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::File { file_name: file_name.into(), content_type: None, bytes },
        }
    }

    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        if let FormValue::File { content_type: slot, .. } = &mut self.value {
            *slot = Some(content_type.into());
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Header names are lowercase.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// No response was obtained. `message` is the transport's own description,
/// which the network-error predicate inspects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportFailure {
    pub message: String,
}

impl TransportFailure {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportFailure`] when no HTTP response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure>;
}
