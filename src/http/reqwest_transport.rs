//! `reqwest`-backed transport with a persisted cookie session.
//!
//! DESIGN
//! ======
//! The backend authenticates with a session cookie. Cookies live in a
//! `reqwest` jar for the life of the process; after every response the jar's
//! `Cookie` header for the API URL is mirrored into session storage so the
//! next process can restore it.
//!
//! Failure descriptions are shaped for the network-error predicate: connect
//! and request failures read `Network Error: …`, timeouts read
//! `timeout of {ms}ms exceeded`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use super::transport::{FormField, FormValue, HttpRequest, HttpResponse, RequestBody, Transport, TransportFailure};
use crate::error::ApiError;
use crate::session::SessionStorage;

/// Storage key holding the mirrored `Cookie` header.
pub const COOKIE_STORAGE_KEY: &str = "sessionCookie";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

struct CookieMirror {
    url: Url,
    storage: Arc<dyn SessionStorage>,
}

pub struct ReqwestTransport {
    http: reqwest::Client,
    jar: Arc<Jar>,
    timeout: Duration,
    mirror: Option<CookieMirror>,
}

impl ReqwestTransport {
    /// Build a transport with an in-memory cookie jar only.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(timeout))
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ApiError::Transport(format!("HTTP client build failed: {e}")))?;
        Ok(Self { http, jar, timeout, mirror: None })
    }

    /// Build a transport whose cookies for `api_url` are restored from and
    /// saved to `storage`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] for a malformed `api_url`, or
    /// [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn with_cookie_storage(
        timeout: Duration,
        api_url: &str,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, ApiError> {
        let mut transport = Self::new(timeout)?;
        let url = cookie_url(api_url)?;

        match storage.get(COOKIE_STORAGE_KEY) {
            Ok(Some(header)) => {
                for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                    transport.jar.add_cookie_str(&format!("{pair}; Path=/"), &url);
                }
                debug!(url = %url, "restored session cookie");
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "session cookie unreadable; starting without one"),
        }

        transport.mirror = Some(CookieMirror { url, storage });
        Ok(transport)
    }

    fn persist_cookies(&self) {
        let Some(mirror) = &self.mirror else {
            return;
        };
        let header = self.jar.cookies(&mirror.url);
        let result = match header.as_ref().and_then(|h| h.to_str().ok()) {
            Some(value) => mirror.storage.set(COOKIE_STORAGE_KEY, value),
            None => mirror.storage.remove(COOKIE_STORAGE_KEY),
        };
        if let Err(e) = result {
            warn!(error = %e, "failed to persist session cookie");
        }
    }

    fn describe(&self, error: &reqwest::Error) -> TransportFailure {
        if error.is_timeout() {
            return TransportFailure::new(format!("timeout of {}ms exceeded", self.timeout.as_millis()));
        }
        if error.is_connect() || error.is_request() {
            return TransportFailure::new(format!("Network Error: {error}"));
        }
        TransportFailure::new(error.to_string())
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let HttpRequest { method, url, query, headers, body } = request;
        let is_multipart = matches!(body, RequestBody::Multipart(_));

        let mut builder = self.http.request(method, &url);
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            // The multipart boundary must come from the form itself.
            if is_multipart && name.eq_ignore_ascii_case("content-type") {
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Multipart(fields) => builder.multipart(build_form(fields)?),
        };

        let response = builder.send().await.map_err(|e| self.describe(&e))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_owned(), v.to_owned())))
            .collect();
        let body = response.bytes().await.map_err(|e| self.describe(&e))?.to_vec();
        self.persist_cookies();

        Ok(HttpResponse { status, headers, body })
    }
}

fn build_form(fields: Vec<FormField>) -> Result<Form, TransportFailure> {
    let mut form = Form::new();
    for field in fields {
        form = match field.value {
            FormValue::Text(text) => form.text(field.name, text),
            FormValue::File { file_name, content_type, bytes } => {
                let mut part = Part::bytes(bytes).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| TransportFailure::new(format!("invalid content type {content_type}: {e}")))?;
                }
                form.part(field.name, part)
            }
        };
    }
    Ok(form)
}

/// The URL cookies are looked up for: the API base with a trailing slash.
fn cookie_url(api_url: &str) -> Result<Url, ApiError> {
    let with_slash = format!("{}/", api_url.trim_end_matches('/'));
    Url::parse(&with_slash).map_err(|e| ApiError::InvalidUrl(format!("{api_url}: {e}")))
}

#[cfg(test)]
#[path = "reqwest_transport_test.rs"]
mod tests;
