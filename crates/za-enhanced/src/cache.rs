//! Caches for SQL export results.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default time-to-live of cached exports.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// A key/value cache for exported CSV text.
///
/// Implementations decide how expiry works; the TTL is passed through
/// unchanged from the client configuration.
pub trait ExportCache: Send + Sync + std::fmt::Debug {
    /// Get a live entry.
    fn get(&self, key: &str) -> Option<String>;

    /// Store an entry for `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration);
}

/// In-process cache with per-entry expiry.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries. Expired entries linger until the next
    /// `set` or a `get` of their key.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl ExportCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        let live = entries.get(key).map(|(_, expires)| *expires > Instant::now())?;
        if live {
            entries.get(key).map(|(value, _)| value.clone())
        } else {
            entries.remove(key);
            None
        }
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            entries.retain(|_, (_, expires)| *expires > now);
            entries.insert(key.to_string(), (value, now + ttl));
        }
    }
}
