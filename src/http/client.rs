//! Verb-based API client with response and failure interception.

use std::sync::Arc;

use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::pipeline::{self, Failure, FailureContext, NetworkErrorPredicate, PatternPredicate, RequestContext, Verdict};
use super::transport::{HttpRequest, HttpResponse, RequestBody, Transport};
use crate::envelope;
use crate::error::ApiError;
use crate::session::{AuthExpiryHandler, SessionTracker};

// =============================================================================
// REQUEST OPTIONS
// =============================================================================

/// Per-request configuration: query, header overrides and context flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub context: RequestContext,
}

impl RequestOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn login(mut self) -> Self {
        self.context.login = true;
        self
    }

    #[must_use]
    pub fn skip_auth_handler(mut self) -> Self {
        self.context.skip_auth_handler = true;
        self
    }

    #[must_use]
    pub fn silent(mut self) -> Self {
        self.context.silent = true;
        self
    }

    #[must_use]
    pub fn binary(mut self) -> Self {
        self.context.binary = true;
        self
    }
}

// =============================================================================
// RESPONSES
// =============================================================================

/// A file returned by a binary endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub bytes: Vec<u8>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
}

impl Download {
    fn from_response(response: HttpResponse) -> Self {
        let file_name = response.header("content-disposition").and_then(disposition_file_name);
        let content_type = response.header("content-type").map(ToOwned::to_owned);
        Self { bytes: response.body, file_name, content_type }
    }
}

/// An intercepted successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// The envelope's `data` after a successful code check.
    Envelope(serde_json::Value),
    /// Raw file body; the envelope check was skipped.
    Binary(Download),
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    session: SessionTracker,
    expiry: Arc<AuthExpiryHandler>,
    network: Arc<dyn NetworkErrorPredicate>,
}

impl ApiClient {
    /// `base_url` must be absolute; relative bases are resolved by the caller.
    #[must_use]
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        session: SessionTracker,
        expiry: Arc<AuthExpiryHandler>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            transport,
            session,
            expiry,
            network: Arc::new(PatternPredicate::default()),
        }
    }

    /// Replace the network-error heuristic.
    #[must_use]
    pub fn with_network_predicate(mut self, predicate: Arc<dyn NetworkErrorPredicate>) -> Self {
        self.network = predicate;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &SessionTracker {
        &self.session
    }

    #[must_use]
    pub fn expiry(&self) -> &Arc<AuthExpiryHandler> {
        &self.expiry
    }

    /// `GET` an envelope and decode its payload.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] produced by interception.
    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request(Method::GET, path, RequestBody::Empty, options).await
    }

    /// `POST` and decode the envelope payload.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] produced by interception.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, body, options).await
    }

    /// `PUT` and decode the envelope payload.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] produced by interception.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        self.request(Method::PUT, path, body, options).await
    }

    /// `DELETE` and decode the envelope payload.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] produced by interception.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ApiError> {
        self.request(Method::DELETE, path, RequestBody::Empty, options).await
    }

    /// `GET` a file, bypassing the envelope check.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`] produced by interception.
    pub async fn download(&self, path: &str, options: RequestOptions) -> Result<Download, ApiError> {
        match self.send(Method::GET, path, RequestBody::Empty, options.binary()).await? {
            Response::Binary(download) => Ok(download),
            Response::Envelope(_) => Err(ApiError::Decode("expected a binary response".to_owned())),
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        match self.send(method, path, body, options).await? {
            Response::Envelope(data) => serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string())),
            Response::Binary(_) => Err(ApiError::Decode("expected an envelope response".to_owned())),
        }
    }

    /// Send one request and intercept the outcome.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] chosen by the failure pipeline, or a
    /// business/decode error from the envelope check.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let RequestOptions { query, headers, context } = options;
        let request = HttpRequest { method, url: format!("{}{path}", self.base_url), query, headers, body };
        debug!(method = %request.method, url = %request.url, "api request");

        let failure = match self.transport.send(request).await {
            Ok(response) if response.is_success() => {
                return intercept_response(response, &context).inspect_err(|e| report(e, &context));
            }
            Ok(response) => Failure::from_response(&response),
            Err(e) => Failure::Transport { message: e.message },
        };
        Err(self.intercept_failure(failure, &context))
    }

    fn intercept_failure(&self, failure: Failure, context: &RequestContext) -> ApiError {
        let cx = FailureContext {
            request: context,
            session_authenticated: self.session.is_authenticated(),
            network: self.network.as_ref(),
        };
        let verdict = pipeline::classify(&failure, &cx);
        if verdict == Verdict::Expire {
            self.expiry.notify_expired();
        }
        let error = verdict.into_error(failure);
        report(&error, context);
        error
    }
}

fn intercept_response(response: HttpResponse, context: &RequestContext) -> Result<Response, ApiError> {
    if context.binary {
        return Ok(Response::Binary(Download::from_response(response)));
    }
    envelope::decode::<serde_json::Value>(&response.body).map(Response::Envelope)
}

fn report(error: &ApiError, context: &RequestContext) {
    if context.silent {
        debug!(code = error.error_code(), error = %error, "api request failed");
    } else {
        warn!(code = error.error_code(), error = %error, "api request failed");
    }
}

// =============================================================================
// HELPERS
// =============================================================================

const SEGMENT_BASE: &str = "http://segment.invalid/";

/// Percent-encode one path segment. `/`, `%` and the dot segments are escaped
/// too, so an id can never change the path's shape.
#[must_use]
pub fn segment(raw: &str) -> String {
    // The URL serializer drops dot segments instead of encoding them.
    match raw {
        "." => return "%2E".to_owned(),
        ".." => return "%2E%2E".to_owned(),
        _ => {}
    }
    let Ok(mut url) = Url::parse(SEGMENT_BASE) else {
        return raw.to_owned();
    };
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(raw);
    }
    url.path().trim_start_matches('/').to_owned()
}

/// Extract the file name from a `Content-Disposition` header, preferring the
/// RFC 5987 `filename*` form.
fn disposition_file_name(header: &str) -> Option<String> {
    let params = header.split(';').map(str::trim);
    let mut plain = None;
    for param in params {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim();
                let encoded = value.split_once("''").map_or(value, |(_, rest)| rest);
                return percent_decode(encoded).filter(|name| !name.is_empty());
            }
            "filename" => plain = Some(value.trim().trim_matches('"').to_owned()),
            _ => {}
        }
    }
    plain.filter(|name| !name.is_empty())
}

fn percent_decode(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = raw.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
