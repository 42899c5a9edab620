//! Reaction to a lost session.
//!
//! DESIGN
//! ======
//! Several in-flight requests can fail with 401 at once. The first one to
//! reach [`AuthExpiryHandler::notify_expired`] flips the redirect-in-progress
//! flag with a single atomic swap and performs the side effects; every later
//! call in the same process returns immediately. The flag is never re-armed:
//! the redirect replaces the page, and the next process starts fresh.
//!
//! The redirect is delayed so the notice stays visible for a moment. Once
//! scheduled it cannot be cancelled.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::tracker::SessionTracker;

pub const EXPIRED_NOTICE: &str = "Session expired, redirecting to the home page...";
pub const EXPIRY_REDIRECT_PATH: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A transient user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Warning, message: message.into() }
    }
}

/// Shows transient notices to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Performs a full navigation, dropping in-page state.
pub trait Navigator: Send + Sync {
    fn redirect(&self, path: &str);
}

pub struct AuthExpiryHandler {
    redirecting: AtomicBool,
    session: SessionTracker,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl AuthExpiryHandler {
    #[must_use]
    pub fn new(
        session: SessionTracker,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        delay: Duration,
    ) -> Self {
        Self {
            redirecting: AtomicBool::new(false),
            session,
            notifier,
            navigator,
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Start an expiry episode. Returns `true` for the call that started it,
    /// `false` for every call after that.
    pub fn notify_expired(&self) -> bool {
        if self.redirecting.swap(true, Ordering::AcqRel) {
            debug!("expiry redirect already in progress");
            return false;
        }

        if let Err(e) = self.session.set_authenticated(false) {
            warn!(error = %e, "failed to clear session flag on expiry");
        }
        self.notifier.notify(&Notice::warning(EXPIRED_NOTICE));
        info!(delay_ms = self.delay.as_millis(), path = EXPIRY_REDIRECT_PATH, "session expired; redirect scheduled");
        self.schedule_redirect();
        true
    }

    /// Whether an expiry episode has started in this process.
    #[must_use]
    pub fn is_redirecting(&self) -> bool {
        self.redirecting.load(Ordering::Acquire)
    }

    /// Wait for the scheduled redirect, if any, to fire.
    pub async fn wait_for_redirect(&self) {
        let task = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                warn!(error = %e, "expiry redirect task failed");
            }
        }
    }

    fn schedule_redirect(&self) {
        let navigator = Arc::clone(&self.navigator);
        let delay = self.delay;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let task = handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    navigator.redirect(EXPIRY_REDIRECT_PATH);
                });
                *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(task);
            }
            Err(_) => {
                warn!("no async runtime for delayed redirect; redirecting now");
                navigator.redirect(EXPIRY_REDIRECT_PATH);
            }
        }
    }
}

#[cfg(test)]
#[path = "expiry_test.rs"]
mod tests;
