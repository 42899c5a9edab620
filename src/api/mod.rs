//! Typed wrappers for the platform endpoints.
//!
//! Paths are relative to the API base; every call goes through
//! [`ApiClient`](crate::http::ApiClient) and so through its interception.
//! Mutating endpoints whose payload the console never reads decode it as
//! `IgnoredAny`.

pub mod auth;
pub mod plugins;
pub mod tags;
pub mod types;

pub use types::{AuthStatus, FrontendPack, LoginRequest, PackFile, Plugin, PluginStatus};
