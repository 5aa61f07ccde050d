//! Time-boxed lookup cache.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default time-to-live for cached registry responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires: Instant,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires
    }
}

/// A string-keyed cache whose entries expire after a fixed TTL.
///
/// Expired entries are evicted lazily, on the next lookup of the same key.
/// There is no background sweep. Access is serialized by an internal lock so
/// the cache can be shared across tasks.
#[derive(Debug)]
pub struct TtlCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, Entry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a clone of the live value for `key`, evicting it if expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store `value`, replacing any previous entry and restarting its TTL.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        let entry = Entry {
            value,
            expires: Instant::now() + self.ttl,
        };
        self.entries.lock().insert(key.into(), entry);
    }

    /// Whether a live entry exists for `key`, evicting it if expired.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn remove(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of stored entries, including expired ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
