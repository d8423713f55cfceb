//! Context7 documentation lookup
//!
//! Advisory documentation attached to API operations. Lookups are memoized by
//! the TTL cache and every failure path degrades to "no documentation"; a
//! lookup can never fail the caller's primary operation.

pub mod cache;
pub mod fetch;

use std::sync::Arc;

pub use cache::{CacheStats, DocCache};
pub use fetch::{DocFetcher, MockDocFetcher};

/// Documentation lookup service
pub struct Context7Service {
    cache: DocCache,
    fetcher: Arc<dyn DocFetcher>,
}

impl Context7Service {
    /// Create a service with the canned fetcher
    pub fn new(enabled: bool) -> Self {
        Self::with_fetcher(DocCache::new(enabled), Arc::new(MockDocFetcher))
    }

    /// Create a service with a custom cache and fetcher
    pub fn with_fetcher(cache: DocCache, fetcher: Arc<dyn DocFetcher>) -> Self {
        Self { cache, fetcher }
    }

    /// Look up documentation for an operation. Always advisory; returns
    /// `None` when disabled or when the fetch fails.
    pub async fn lookup(&self, operation: &str, context: Option<&str>) -> Option<String> {
        let query = match context {
            Some(ctx) => format!("{operation} {ctx}"),
            None => operation.to_string(),
        };

        let fetcher = self.fetcher.clone();
        self.cache
            .get_or_fetch(operation, context, || async move {
                fetcher.fetch(&query).await
            })
            .await
    }

    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn clear(&self) {
        self.cache.clear()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.cache.set_enabled(enabled)
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingFetcher(AtomicUsize);

    #[async_trait::async_trait]
    impl DocFetcher for CountingFetcher {
        async fn fetch(&self, _query: &str) -> Result<String> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok("docs".to_string())
        }
    }

    #[tokio::test]
    async fn lookup_memoizes_per_operation() {
        let service = Context7Service::with_fetcher(
            DocCache::new(true),
            Arc::new(CountingFetcher(AtomicUsize::new(0))),
        );

        assert!(service.lookup("messages.list", None).await.is_some());
        assert!(service.lookup("messages.list", None).await.is_some());
        assert_eq!(service.stats().size, 1);
    }

    #[tokio::test]
    async fn lookup_with_canned_fetcher_absorbs_misses() {
        let service = Context7Service::new(true);
        assert!(service.lookup("unknown.operation", None).await.is_none());
        assert_eq!(service.stats().size, 0);
    }

    #[tokio::test]
    async fn disabled_service_returns_none() {
        let service = Context7Service::new(false);
        assert!(!service.is_enabled());
        assert!(service.lookup("messages.send", None).await.is_none());
    }
}
