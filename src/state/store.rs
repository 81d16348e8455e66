//! Shared state store.
//!
//! The single source of truth for arbitrary key-value settings shared across
//! the UI tabs. Every mutating operation persists the entire resulting
//! mapping to a JSON file and then notifies every subscriber with the full
//! mapping, before the mutation is considered complete.
//!
//! On persistence failure the in-memory mapping is still updated and
//! subscribers are still notified; the error is returned to the caller. This
//! keeps the UI responsive while durable storage is degraded, at the cost of
//! memory and disk diverging for the rest of the session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The full key-value mapping held by the store.
pub type StateMap = BTreeMap<String, String>;

/// Error type for store persistence.
#[derive(Debug)]
pub enum StoreError {
    /// File I/O error while writing or reading the state file.
    Io(std::io::Error),
    /// JSON serialization/deserialization error.
    Serialization(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "state persistence failed: {}", e),
            Self::Serialization(e) => write!(f, "state serialization failed: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Serialization(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err)
    }
}

/// Handle identifying a subscriber, for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Key-value store with persist-and-notify mutation semantics.
///
/// Owned by the UI thread; subscribers run synchronously inside the mutating
/// call, on that same thread.
pub struct SharedStore {
    data: StateMap,
    path: PathBuf,
    subscribers: Vec<(SubscriptionId, Box<dyn FnMut(&StateMap)>)>,
    next_id: u64,
}

impl SharedStore {
    /// Open the store backed by the given file.
    ///
    /// A missing file yields an empty mapping, not an error; a present but
    /// unreadable or malformed file is an error the caller decides on.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StateMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            data,
            path,
            subscribers: Vec::new(),
            next_id: 0,
        })
    }

    /// Create an empty store against the given path without touching disk.
    /// Used when the persisted state could not be read; later mutations still
    /// attempt to persist.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            data: StateMap::new(),
            path: path.into(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Path of the backing state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// The full current mapping.
    pub fn data(&self) -> &StateMap {
        &self.data
    }

    /// Insert or replace a value, then persist and notify.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<(), StoreError> {
        self.data.insert(key.into(), value.into());
        self.persist_and_notify()
    }

    /// Remove a key, then persist and notify.
    ///
    /// Deleting an absent key is a no-op on the mapping but still runs the
    /// full persist+notify cycle. Wasteful for absent keys, but kept so
    /// subscribers observe every mutation attempt.
    pub fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.data.remove(key);
        self.persist_and_notify()
    }

    /// Replace the whole mapping, then persist and notify.
    pub fn replace_all(&mut self, data: StateMap) -> Result<(), StoreError> {
        self.data = data;
        self.persist_and_notify()
    }

    /// Register a subscriber called with the full mapping after every
    /// mutation. Returns a handle for unsubscribing.
    pub fn subscribe(&mut self, observer: impl FnMut(&StateMap) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(observer)));
        id
    }

    /// Remove a subscriber. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Persist the mapping, then notify all subscribers. The persistence
    /// result is returned after notification so a write failure never
    /// silences the change broadcast.
    fn persist_and_notify(&mut self) -> Result<(), StoreError> {
        let result = self.persist();
        let data = self.data.clone();
        for (_, observer) in &mut self.subscribers {
            observer(&data);
        }
        result
    }

    /// Write the full mapping to the backing file as pretty JSON.
    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Unique temp path per test so parallel tests don't collide.
    fn temp_state_path(tag: &str) -> PathBuf {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!(
            "oralia_store_{}_{}_{}.json",
            tag,
            std::process::id(),
            n
        ))
    }

    #[test]
    fn test_open_missing_file_is_empty() {
        let path = temp_state_path("missing");
        let store = SharedStore::open(&path).unwrap();
        assert!(store.data().is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let path = temp_state_path("set_get");
        let mut store = SharedStore::open(&path).unwrap();
        store.set("tempo", "120").unwrap();
        assert_eq!(store.get("tempo"), Some("120"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_persist_survives_restart() {
        let path = temp_state_path("restart");
        {
            let mut store = SharedStore::open(&path).unwrap();
            store.set("tempo", "120").unwrap();
        }

        // Simulated restart: a fresh store reads the same file.
        let store = SharedStore::open(&path).unwrap();
        assert_eq!(store.get("tempo"), Some("120"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_set_notifies_with_full_mapping() {
        let path = temp_state_path("notify");
        let mut store = SharedStore::open(&path).unwrap();

        let seen = Rc::new(RefCell::new(Vec::<StateMap>::new()));
        {
            let seen = Rc::clone(&seen);
            store.subscribe(move |data| seen.borrow_mut().push(data.clone()));
        }

        store.set("key", "base_c").unwrap();
        store.set("mode", "scales").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].len(), 1);
        assert_eq!(seen[1].len(), 2);
        assert_eq!(seen[1].get("key").map(String::as_str), Some("base_c"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_delete_absent_key_still_notifies() {
        let path = temp_state_path("delete_absent");
        let mut store = SharedStore::open(&path).unwrap();
        store.set("tempo", "120").unwrap();

        let notified = Rc::new(RefCell::new(0usize));
        {
            let notified = Rc::clone(&notified);
            store.subscribe(move |_| *notified.borrow_mut() += 1);
        }

        store.delete("no_such_key").unwrap();

        // Mapping unchanged, but the cycle ran anyway.
        assert_eq!(store.get("tempo"), Some("120"));
        assert_eq!(store.data().len(), 1);
        assert_eq!(*notified.borrow(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_delete_present_key() {
        let path = temp_state_path("delete");
        let mut store = SharedStore::open(&path).unwrap();
        store.set("tempo", "120").unwrap();
        store.delete("tempo").unwrap();
        assert_eq!(store.get("tempo"), None);

        // The deletion also reached the file.
        let reloaded = SharedStore::open(&path).unwrap();
        assert!(reloaded.data().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_replace_all() {
        let path = temp_state_path("replace");
        let mut store = SharedStore::open(&path).unwrap();
        store.set("old", "1").unwrap();

        let mut fresh = StateMap::new();
        fresh.insert("new".to_string(), "2".to_string());
        store.replace_all(fresh).unwrap();

        assert_eq!(store.get("old"), None);
        assert_eq!(store.get("new"), Some("2"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let path = temp_state_path("unsub");
        let mut store = SharedStore::open(&path).unwrap();

        let count = Rc::new(RefCell::new(0usize));
        let id = {
            let count = Rc::clone(&count);
            store.subscribe(move |_| *count.borrow_mut() += 1)
        };

        store.set("a", "1").unwrap();
        store.unsubscribe(id);
        store.set("b", "2").unwrap();

        assert_eq!(*count.borrow(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_persistence_failure_still_updates_and_notifies() {
        // A directory path cannot be written as a file.
        let dir = std::env::temp_dir().join(format!("oralia_store_dir_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        // Reading a directory errors at open, so build the store against the
        // unwritable path directly.
        let mut store = SharedStore::empty(&dir);

        let notified = Rc::new(RefCell::new(0usize));
        {
            let notified = Rc::clone(&notified);
            store.subscribe(move |_| *notified.borrow_mut() += 1);
        }

        let result = store.set("tempo", "120");
        assert!(result.is_err());
        // In-memory state is authoritative for the session.
        assert_eq!(store.get("tempo"), Some("120"));
        assert_eq!(*notified.borrow(), 1);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = temp_state_path("malformed");
        std::fs::write(&path, "not json at all").unwrap();
        let result = SharedStore::open(&path);
        assert!(matches!(result, Err(StoreError::Serialization(_))));
        let _ = std::fs::remove_file(&path);
    }
}
