//! Session state: the persisted auth hint and the expiry handler.
//!
//! DESIGN
//! ======
//! Both process-wide flags live in explicit values created once per process
//! (one CLI invocation plays the role of one page load). The auth hint sits
//! behind an injected [`SessionStorage`] so it can be tested in isolation;
//! the redirect-in-progress flag is owned by [`AuthExpiryHandler`] and never
//! persisted.

pub mod expiry;
pub mod storage;
pub mod tracker;

pub use expiry::{AuthExpiryHandler, Navigator, Notice, NoticeLevel, Notifier};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use tracker::SessionTracker;
