//! TTL cache for documentation lookups
//!
//! Memoizes lookup results per (operation, context) key for a fixed window.
//! Entries are evicted lazily when a lookup finds them stale; there is no
//! background sweep. Fetch failures are absorbed and never cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Default entry lifetime
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// A cached documentation payload with its expiry
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// Cache observability snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Documentation cache
pub struct DocCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    enabled: AtomicBool,
}

impl DocCache {
    /// Create a cache with the default 30-minute TTL
    pub fn new(enabled: bool) -> Self {
        Self::with_ttl(DEFAULT_TTL, enabled)
    }

    /// Create a cache with a custom TTL
    pub fn with_ttl(ttl: Duration, enabled: bool) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            enabled: AtomicBool::new(enabled),
        }
    }

    /// Cache key for an operation and optional context
    pub fn cache_key(operation: &str, context: Option<&str>) -> String {
        format!("{}-{}", operation, context.unwrap_or("default"))
    }

    /// Return the cached value for the key, or invoke `fetch` and cache the
    /// result. Returns `None` when the cache is disabled (fetch is not
    /// invoked) or when the fetch fails (nothing is cached).
    ///
    /// The lock is not held across the fetch await; concurrent lookups of the
    /// same key may fetch once more, which is accepted.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        operation: &str,
        context: Option<&str>,
        fetch: F,
    ) -> Option<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        if !self.is_enabled() {
            return None;
        }

        let key = Self::cache_key(operation, context);

        {
            let mut entries = self.entries.lock().ok()?;
            let stale = match entries.get(&key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    tracing::debug!("documentation cache hit for {key}");
                    return Some(entry.value.clone());
                }
                Some(_) => true,
                None => false,
            };
            if stale {
                // Lazy eviction; fall through to fetch.
                entries.remove(&key);
            }
        }

        match fetch().await {
            Ok(value) => {
                if let Ok(mut entries) = self.entries.lock() {
                    entries.insert(
                        key,
                        CacheEntry {
                            value: value.clone(),
                            expires_at: Instant::now() + self.ttl,
                        },
                    );
                }
                Some(value)
            }
            Err(e) => {
                tracing::debug!("documentation fetch failed for {key}: {e}");
                None
            }
        }
    }

    /// Wipe all entries
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    /// Current entry count and live keys
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        match self.entries.lock() {
            Ok(entries) => {
                let mut keys: Vec<String> = entries
                    .iter()
                    .filter(|(_, e)| e.expires_at > now)
                    .map(|(k, _)| k.clone())
                    .collect();
                keys.sort();
                CacheStats {
                    size: keys.len(),
                    keys,
                }
            }
            Err(_) => CacheStats {
                size: 0,
                keys: Vec::new(),
            },
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}
