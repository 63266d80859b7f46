//! No-op cache implementation.

use async_trait::async_trait;
use findata_core::{CacheKey, DataCache, Record, Result};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always returns an empty vector and `set` always returns `Ok(())`.
/// Useful for disabling caching so every query goes to the provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataCache for NoopCache {
    async fn get(&self, _key: &CacheKey) -> Result<Vec<Record>> {
        trace!("NoopCache: get called, returning nothing");
        Ok(Vec::new())
    }

    async fn set(&self, _key: &CacheKey, _records: Vec<Record>) -> Result<()> {
        trace!("NoopCache: set called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use findata_core::{EntityKind, Price, Symbol, SymbolSet, TypedRecord};

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let key = CacheKey::new(SymbolSet::parse("AAPL"), EntityKind::Price);
        let price = Price::new(
            Symbol::new("AAPL"),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            150.0,
            152.0,
            149.0,
            151.0,
            1_000_000.0,
        );

        cache.set(&key, vec![price.into_record()]).await.unwrap();
        assert!(cache.get(&key).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_noop_cache_is_empty_for_every_kind() {
        let cache: std::sync::Arc<dyn DataCache> = std::sync::Arc::new(NoopCache::new());
        for kind in EntityKind::ALL {
            let key = CacheKey::new(SymbolSet::parse("AAPL,MSFT"), kind);
            cache.set(&key, Vec::new()).await.unwrap();
            assert!(cache.get(&key).await.unwrap().is_empty());
        }
    }
}
