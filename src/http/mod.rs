//! HTTP client core.
//!
//! ARCHITECTURE
//! ============
//! `ApiClient` builds requests against the resolved API base, hands them to a
//! [`Transport`], and intercepts the outcome:
//!
//! ```text
//! ApiClient::send ──► Transport::send ──► 2xx ──► envelope check / binary bypass
//!                                    └──► failure ──► pipeline::classify ──► ApiError
//!                                                            └── Expire ──► AuthExpiryHandler
//! ```
//!
//! The failure pipeline is pure; the client applies its verdict.

pub mod client;
pub mod pipeline;
pub mod reqwest_transport;
pub mod transport;

pub use client::{ApiClient, Download, RequestOptions, Response, segment};
pub use pipeline::{Failure, NetworkErrorPredicate, PatternPredicate, RequestContext, Verdict};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{FormField, FormValue, HttpRequest, HttpResponse, RequestBody, Transport, TransportFailure};
