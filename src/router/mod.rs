//! Route table, navigation guard and the router that applies it.

pub mod guard;
pub mod routes;

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info};

pub use guard::{AuthStatusCheck, Navigation, RouteGuard};
pub use routes::{ADMIN, HOME, LOGIN, ROUTES, Route};

/// Redirect hops allowed for one navigation before giving up.
pub const MAX_REDIRECTS: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RouterError {
    #[error("no route for path: {0}")]
    RouteNotFound(String),
    #[error("too many redirects navigating to {0}")]
    RedirectLoop(String),
}

/// The route currently shown. Shared between the router and whatever performs
/// full navigations outside it.
#[derive(Debug, Clone, Default)]
pub struct Location(Arc<Mutex<Option<Route>>>);

impl Location {
    #[must_use]
    pub fn get(&self) -> Option<Route> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set(&self, route: Option<Route>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = route;
    }
}

pub struct Router {
    guard: RouteGuard,
    location: Location,
}

impl Router {
    #[must_use]
    pub fn new(guard: RouteGuard) -> Self {
        Self::with_location(guard, Location::default())
    }

    #[must_use]
    pub fn with_location(guard: RouteGuard, location: Location) -> Self {
        Self { guard, location }
    }

    #[must_use]
    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Navigate to `path`, following guard redirects. Returns the route that
    /// was finally entered.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RouteNotFound`] for unknown paths and
    /// [`RouterError::RedirectLoop`] if redirects do not settle.
    pub async fn navigate(&self, path: &str) -> Result<Route, RouterError> {
        let mut target = routes::resolve(path).ok_or_else(|| RouterError::RouteNotFound(path.to_owned()))?;
        for _ in 0..=MAX_REDIRECTS {
            match self.guard.before_each(&target).await {
                Navigation::Allow => {
                    self.location.set(Some(target));
                    info!(route = target.name, path = target.path, "navigated");
                    return Ok(target);
                }
                Navigation::Redirect(next) => {
                    debug!(from = target.name, to = next.name, "guard redirect");
                    target = next;
                }
            }
        }
        Err(RouterError::RedirectLoop(path.to_owned()))
    }

    /// The route most recently entered, if any.
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.location.get()
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
