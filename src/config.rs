//! Console configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `ConsoleConfig::from_env` reads the process environment; parsing itself
//! lives in `from_lookup` so tests can feed a map instead of mutating global
//! env state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

pub const API_ROOT: &str = "/api";
pub const DEFAULT_PAGE_ORIGIN: &str = "http://127.0.0.1:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REDIRECT_DELAY_MS: u64 = 2000;

const STATE_DIR_NAME: &str = ".plugin-console";
const STATE_FILE_NAME: &str = "state.json";

pub const ENV_DEPLOYMENT_MODE: &str = "PLUGIN_CONSOLE_DEPLOYMENT_MODE";
pub const ENV_API_BASE_URL: &str = "PLUGIN_CONSOLE_API_BASE_URL";
pub const ENV_PAGE_ORIGIN: &str = "PLUGIN_CONSOLE_PAGE_ORIGIN";
pub const ENV_TIMEOUT_SECS: &str = "PLUGIN_CONSOLE_TIMEOUT_SECS";
pub const ENV_REDIRECT_DELAY_MS: &str = "PLUGIN_CONSOLE_REDIRECT_DELAY_MS";
pub const ENV_STATE_FILE: &str = "PLUGIN_CONSOLE_STATE_FILE";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown PLUGIN_CONSOLE_DEPLOYMENT_MODE: {0} (expected 'standalone' or 'embedded')")]
    UnknownMode(String),
    #[error("invalid {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
    #[error("cannot locate a home directory for the state file; set PLUGIN_CONSOLE_STATE_FILE")]
    NoStateDir,
}

/// Where the console is served from relative to the platform API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeploymentMode {
    /// Console runs apart from the backend and talks to a configured origin.
    #[default]
    Standalone,
    /// Console is served by the backend itself; the API is same-origin.
    Embedded,
}

impl std::str::FromStr for DeploymentMode {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "standalone" => Ok(Self::Standalone),
            "embedded" => Ok(Self::Embedded),
            other => Err(ConfigError::UnknownMode(other.to_owned())),
        }
    }
}

/// Resolve the API base path for a deployment mode.
///
/// Embedded consoles always use the relative root; standalone consoles prefix
/// it with the configured origin when there is one.
#[must_use]
pub fn resolve_base_url(mode: DeploymentMode, origin: Option<&str>) -> String {
    match mode {
        DeploymentMode::Embedded => API_ROOT.to_owned(),
        DeploymentMode::Standalone => match normalize_origin(origin) {
            Some(origin) => format!("{origin}{API_ROOT}"),
            None => API_ROOT.to_owned(),
        },
    }
}

/// Resolve the backend origin (no `/api`) used for plugin static assets.
/// Empty means same-origin.
#[must_use]
pub fn backend_base_url(mode: DeploymentMode, origin: Option<&str>) -> String {
    match mode {
        DeploymentMode::Embedded => String::new(),
        DeploymentMode::Standalone => normalize_origin(origin).unwrap_or_default().to_owned(),
    }
}

fn normalize_origin(origin: Option<&str>) -> Option<&str> {
    origin
        .map(|o| o.trim().trim_end_matches('/'))
        .filter(|o| !o.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub mode: DeploymentMode,
    pub api_origin: Option<String>,
    /// Origin that relative API bases resolve against.
    pub page_origin: String,
    pub request_timeout: Duration,
    pub redirect_delay: Duration,
    pub state_file: PathBuf,
}

impl ConsoleConfig {
    /// Build typed console config from environment variables.
    ///
    /// Optional:
    /// - `PLUGIN_CONSOLE_DEPLOYMENT_MODE`: `embedded`, anything else is standalone
    /// - `PLUGIN_CONSOLE_API_BASE_URL`: backend origin for standalone mode
    /// - `PLUGIN_CONSOLE_PAGE_ORIGIN`: default `http://127.0.0.1:8080`
    /// - `PLUGIN_CONSOLE_TIMEOUT_SECS`: default 30
    /// - `PLUGIN_CONSOLE_REDIRECT_DELAY_MS`: default 2000
    /// - `PLUGIN_CONSOLE_STATE_FILE`: default `~/.plugin-console/state.json`
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for a malformed number or when no state file
    /// location can be determined. An unknown mode falls back to standalone.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// See [`ConsoleConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = match lookup(ENV_DEPLOYMENT_MODE) {
            None => DeploymentMode::default(),
            // Anything but `embedded` is a standalone deployment.
            Some(raw) => raw.parse::<DeploymentMode>().unwrap_or_else(|e| {
                warn!(error = %e, "falling back to standalone mode");
                DeploymentMode::Standalone
            }),
        };
        let api_origin = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty());
        let page_origin = lookup(ENV_PAGE_ORIGIN)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAGE_ORIGIN.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let timeout_secs = parse_u64(&lookup, ENV_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let redirect_ms = parse_u64(&lookup, ENV_REDIRECT_DELAY_MS, DEFAULT_REDIRECT_DELAY_MS)?;
        let state_file = match lookup(ENV_STATE_FILE).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => default_state_file().ok_or(ConfigError::NoStateDir)?,
        };

        Ok(Self {
            mode,
            api_origin,
            page_origin,
            request_timeout: Duration::from_secs(timeout_secs),
            redirect_delay: Duration::from_millis(redirect_ms),
            state_file,
        })
    }

    /// Apply explicit overrides on top of the environment. An explicit mode
    /// must be valid; an empty origin clears the configured one.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownMode`] for an unrecognized `mode`.
    pub fn apply_overrides(
        &mut self,
        mode: Option<&str>,
        api_origin: Option<&str>,
        state_file: Option<&Path>,
    ) -> Result<(), ConfigError> {
        if let Some(mode) = mode {
            self.mode = mode.parse()?;
        }
        if let Some(origin) = api_origin {
            self.api_origin = Some(origin.trim().to_owned()).filter(|o| !o.is_empty());
        }
        if let Some(path) = state_file {
            self.state_file = path.to_path_buf();
        }
        Ok(())
    }

    /// The API base for this config (`/api` or `{origin}/api`).
    #[must_use]
    pub fn base_url(&self) -> String {
        resolve_base_url(self.mode, self.api_origin.as_deref())
    }

    /// The backend origin for plugin static assets.
    #[must_use]
    pub fn backend_base_url(&self) -> String {
        backend_base_url(self.mode, self.api_origin.as_deref())
    }

    /// Join a possibly relative URL against the page origin.
    #[must_use]
    pub fn absolute(&self, url: &str) -> String {
        if url.starts_with('/') || url.is_empty() {
            format!("{}{url}", self.page_origin)
        } else {
            url.to_owned()
        }
    }
}

fn parse_u64<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value: raw }),
    }
}

fn default_state_file() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(STATE_DIR_NAME).join(STATE_FILE_NAME))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
