//! One console "page load": storage, session, client and router wired
//! together from [`ConsoleConfig`].
//!
//! DESIGN
//! ======
//! A process is one page load. Session flags and the expiry handler's
//! redirect-in-progress state live in the `Console` value and die with it;
//! only the storage-backed session flag and cookie survive into the next run.

use std::sync::Arc;

use tracing::info;

use crate::config::ConsoleConfig;
use crate::error::ApiError;
use crate::http::{ApiClient, ReqwestTransport, Transport};
use crate::router::{Location, Route, RouteGuard, Router, RouterError, routes};
use crate::session::{
    AuthExpiryHandler, FileStorage, Navigator, Notice, Notifier, SessionStorage, SessionTracker,
};

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Router(#[from] RouterError),
    /// The guard sent the navigation somewhere other than where it was aimed.
    #[error("access to {requested} denied; landed on {landed}")]
    Denied { requested: &'static str, landed: &'static str },
}

// =============================================================================
// TERMINAL SURFACES
// =============================================================================

/// Prints notices to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notice: &Notice) {
        eprintln!("[{}] {}", notice.level, notice.message);
    }
}

/// Reports full navigations on stderr. The terminal has no page to replace,
/// so the redirect ends the command's session view.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl Navigator for TerminalNavigator {
    fn redirect(&self, path: &str) {
        info!(path, "redirect");
        eprintln!("redirected to {path}");
    }
}

/// Records full navigations in the router's [`Location`] before handing them
/// to the surface that performs them.
struct LocationNavigator {
    location: Location,
    inner: Arc<dyn Navigator>,
}

impl Navigator for LocationNavigator {
    fn redirect(&self, path: &str) {
        // A full navigation replaces the page without running the guard.
        self.location.set(routes::resolve(path));
        self.inner.redirect(path);
    }
}

// =============================================================================
// CONSOLE
// =============================================================================

pub struct Console {
    client: ApiClient,
    router: Router,
    backend_base_url: String,
}

impl Console {
    /// Build the production console: file-backed storage, a reqwest transport
    /// that mirrors its session cookie into that storage, and the terminal
    /// notifier and navigator.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if the API base is not a valid URL or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::new(config.state_file.clone()));
        let base_url = config.absolute(&config.base_url());
        let transport = ReqwestTransport::with_cookie_storage(config.request_timeout, &base_url, storage.clone())?;
        info!(base_url = %base_url, mode = ?config.mode, "console configured");
        Ok(Self::with_parts(
            base_url,
            config.backend_base_url(),
            Arc::new(transport),
            storage,
            Arc::new(TerminalNotifier),
            Arc::new(TerminalNavigator),
            config.redirect_delay,
        ))
    }

    /// Assemble a console from explicit parts.
    #[must_use]
    pub fn with_parts(
        base_url: impl Into<String>,
        backend_base_url: impl Into<String>,
        transport: Arc<dyn Transport>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        redirect_delay: std::time::Duration,
    ) -> Self {
        let location = Location::default();
        let navigator = Arc::new(LocationNavigator { location: location.clone(), inner: navigator });
        let session = SessionTracker::new(storage);
        let expiry = Arc::new(AuthExpiryHandler::new(session.clone(), notifier, navigator, redirect_delay));
        let client = ApiClient::new(base_url, transport, session, expiry);
        let router = Router::with_location(RouteGuard::new(Arc::new(client.clone())), location);
        Self { client, router, backend_base_url: backend_base_url.into() }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn session(&self) -> &SessionTracker {
        self.client.session()
    }

    /// Origin for plugin static assets; empty means same-origin.
    #[must_use]
    pub fn backend_base_url(&self) -> &str {
        &self.backend_base_url
    }

    /// Navigate to `path` through the guard, returning where it landed.
    ///
    /// # Errors
    ///
    /// See [`Router::navigate`].
    pub async fn open(&self, path: &str) -> Result<Route, ConsoleError> {
        Ok(self.router.navigate(path).await?)
    }

    /// Navigate to `route` and fail unless the guard let it through.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Denied`] when the guard redirected elsewhere.
    pub async fn enter(&self, route: Route) -> Result<(), ConsoleError> {
        let landed = self.router.navigate(route.path).await?;
        if landed == route {
            Ok(())
        } else {
            Err(ConsoleError::Denied { requested: route.path, landed: landed.path })
        }
    }

    /// Wait for a scheduled expiry redirect, if any, so it is not lost when
    /// the process exits.
    pub async fn finish(&self) {
        self.client.expiry().wait_for_redirect().await;
    }
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
