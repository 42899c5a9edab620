//! # plugin-console
//!
//! Administrative console for a plugin-based backend platform. Lists,
//! enables, disables, reloads, installs, tags and packages plugins through the
//! platform's HTTP API, with a cookie session gating the admin view.
//!
//! ARCHITECTURE
//! ============
//! - `http`: base-URL policy, request/response interception and the ordered
//!   failure pipeline that turns transport results into [`ApiError`]s.
//! - `session`: the persisted "last known authenticated" flag and the
//!   expiry handler that reacts to lost sessions exactly once per process.
//! - `router`: the route table and the guard consulted before every
//!   navigation.
//! - `api`: typed wrappers for the platform endpoints.
//! - `files`: bundle walks and download naming for the CLI.
//! - `console`: wires the pieces above together from [`ConsoleConfig`].

pub mod api;
pub mod config;
pub mod console;
pub mod envelope;
pub mod error;
pub mod files;
pub mod http;
pub mod router;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ConsoleConfig, DeploymentMode};
pub use console::Console;
pub use error::ApiError;
