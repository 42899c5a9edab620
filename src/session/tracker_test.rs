use super::*;
use crate::session::storage::MemoryStorage;

struct BrokenStorage;

impl SessionStorage for BrokenStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::other("disk gone")))
    }
}

fn tracker() -> (SessionTracker, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    (SessionTracker::new(storage.clone()), storage)
}

#[test]
fn defaults_to_signed_out() {
    let (tracker, _) = tracker();
    assert!(!tracker.is_authenticated());
}

#[test]
fn set_true_persists_literal() {
    let (tracker, storage) = tracker();
    tracker.set_authenticated(true).unwrap();
    assert!(tracker.is_authenticated());
    assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap().as_deref(), Some("true"));
}

#[test]
fn set_false_removes_key() {
    let (tracker, storage) = tracker();
    tracker.set_authenticated(true).unwrap();
    tracker.set_authenticated(false).unwrap();
    assert!(!tracker.is_authenticated());
    assert_eq!(storage.get(AUTH_FLAG_KEY).unwrap(), None);
}

#[test]
fn non_literal_values_read_as_false() {
    let (tracker, storage) = tracker();
    for value in ["TRUE", "1", "yes", "true ", ""] {
        storage.set(AUTH_FLAG_KEY, value).unwrap();
        assert!(!tracker.is_authenticated(), "expected false for {value:?}");
    }
}

#[test]
fn storage_failure_reads_as_false() {
    let tracker = SessionTracker::new(Arc::new(BrokenStorage));
    assert!(!tracker.is_authenticated());
    assert!(tracker.set_authenticated(true).is_err());
}
