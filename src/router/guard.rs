//! Navigation guard.
//!
//! DESIGN
//! ======
//! The guard never trusts the cached session flag for access decisions: any
//! navigation to a protected view (or to the login form) asks the server
//! first, at the cost of one round trip. Public views skip the check.
//!
//! A signed-out visitor to a protected view is sent home, not to the login
//! form. This mirrors the deployed behavior and may not be the intent.

use std::sync::Arc;

use tracing::debug;

use super::routes::{HOME, Route};
use crate::error::ApiError;

/// Remote "am I authenticated" check.
#[async_trait::async_trait]
pub trait AuthStatusCheck: Send + Sync {
    /// Ask the server whether the current session is valid.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; the guard treats every error as signed out.
    async fn check_auth_status(&self) -> Result<bool, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Allow,
    Redirect(Route),
}

#[derive(Clone)]
pub struct RouteGuard {
    status: Arc<dyn AuthStatusCheck>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(status: Arc<dyn AuthStatusCheck>) -> Self {
        Self { status }
    }

    /// Run before every navigation to `target`.
    pub async fn before_each(&self, target: &Route) -> Navigation {
        if !needs_status_check(target) {
            return Navigation::Allow;
        }
        let authenticated = match self.status.check_auth_status().await {
            Ok(authenticated) => authenticated,
            Err(e) => {
                debug!(route = target.name, error = %e, "auth status check failed; treating as signed out");
                false
            }
        };
        let decision = decide(target, authenticated);
        debug!(route = target.name, authenticated, ?decision, "route guard");
        decision
    }
}

/// Whether navigating to `target` requires asking the server.
#[must_use]
pub fn needs_status_check(target: &Route) -> bool {
    target.requires_auth || target.is_login()
}

/// Pure access decision for a target and a known auth state.
#[must_use]
pub fn decide(target: &Route, authenticated: bool) -> Navigation {
    if target.requires_auth && !authenticated {
        return Navigation::Redirect(HOME);
    }
    if target.is_login() && authenticated {
        return Navigation::Redirect(HOME);
    }
    Navigation::Allow
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
