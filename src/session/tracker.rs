//! The persisted "last known authenticated" hint.

use std::sync::Arc;

use tracing::{debug, warn};

use super::storage::{SessionStorage, StorageError};

/// Storage key holding the literal `"true"` while the user is believed signed in.
pub const AUTH_FLAG_KEY: &str = "isAuthenticated";

const AUTH_FLAG_TRUE: &str = "true";

/// Cache of the last server-confirmed auth state. Not authoritative: the
/// route guard always re-checks with the server before protected views.
#[derive(Clone)]
pub struct SessionTracker {
    storage: Arc<dyn SessionStorage>,
}

impl SessionTracker {
    #[must_use]
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Persist the flag. `false` removes the key rather than storing `"false"`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the storage write fails.
    pub fn set_authenticated(&self, authenticated: bool) -> Result<(), StorageError> {
        debug!(authenticated, "session flag updated");
        if authenticated {
            self.storage.set(AUTH_FLAG_KEY, AUTH_FLAG_TRUE)
        } else {
            self.storage.remove(AUTH_FLAG_KEY)
        }
    }

    /// Read the flag. Anything other than the literal `"true"`, including a
    /// storage failure, reads as signed out.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        match self.storage.get(AUTH_FLAG_KEY) {
            Ok(value) => value.as_deref() == Some(AUTH_FLAG_TRUE),
            Err(e) => {
                warn!(error = %e, "session flag unreadable; treating as signed out");
                false
            }
        }
    }

    #[must_use]
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
