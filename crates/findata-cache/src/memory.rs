//! In-memory cache implementation.

use async_trait::async_trait;
use findata_core::{CacheKey, DataCache, Record, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::merge::merge;

/// One cache entry behind its own lock.
type Slot = Arc<RwLock<Vec<Record>>>;

/// Process-lifetime in-memory cache.
///
/// The map of entries sits behind one `RwLock` that is only held to look up or
/// insert a slot. Each slot has its own `RwLock`, held exclusively for the whole
/// merge, so a reader sees an entry either before or after a write and writes
/// to the same key serialize. Different keys never contend on a slot lock.
///
/// Records are cloned on `get`.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<CacheKey, Slot>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of entries.
    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns true if an entry exists for `key`.
    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    async fn slot(&self, key: &CacheKey) -> Option<Slot> {
        self.entries.read().await.get(key).cloned()
    }
}

#[async_trait]
impl DataCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &CacheKey) -> Result<Vec<Record>> {
        match self.slot(key).await {
            Some(slot) => {
                let records = slot.read().await.clone();
                debug!(count = records.len(), "Cache hit");
                Ok(records)
            }
            None => {
                debug!("Cache miss");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self, records), fields(key = %key, count = records.len()))]
    async fn set(&self, key: &CacheKey, records: Vec<Record>) -> Result<()> {
        let records: Vec<Record> = records
            .into_iter()
            .filter(|r| {
                let matches = r.kind() == key.kind();
                if !matches {
                    warn!(kind = %r.kind(), "Dropping record of the wrong kind");
                }
                matches
            })
            .collect();

        if records.is_empty() {
            debug!("Empty write, nothing cached");
            return Ok(());
        }

        let slot = match self.slot(key).await {
            Some(slot) => slot,
            None => {
                let mut entries = self.entries.write().await;
                match entries.get(key) {
                    Some(slot) => Arc::clone(slot),
                    None => {
                        // A new slot is inserted fully merged, so no reader sees it half built.
                        let merged = merge(Vec::new(), records);
                        debug!(stored = merged.len(), "Created cache entry");
                        entries.insert(key.clone(), Arc::new(RwLock::new(merged)));
                        return Ok(());
                    }
                }
            }
        };

        let mut stored = slot.write().await;
        let before = stored.len();
        *stored = merge(std::mem::take(&mut *stored), records);
        debug!(
            added = stored.len() - before,
            stored = stored.len(),
            "Merged into cache entry"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use findata_core::{
        CompanyNews, EntityKind, FinancialMetrics, Price, Symbol, SymbolSet, TypedRecord,
    };

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn price(d: u32, close: f64) -> Record {
        Price::new(Symbol::new("AAPL"), day(d), close, close, close, close, 1000.0).into_record()
    }

    fn price_key() -> CacheKey {
        CacheKey::new(SymbolSet::parse("AAPL"), EntityKind::Price)
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = InMemoryCache::new();
        let key = price_key();

        assert!(cache.get(&key).await.unwrap().is_empty());

        let records = vec![price(2, 10.0), price(3, 11.0)];
        cache.set(&key, records.clone()).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_set_merges_instead_of_replacing() {
        let cache = InMemoryCache::new();
        let key = price_key();

        cache
            .set(&key, vec![price(1, 10.0), price(2, 20.0)])
            .await
            .unwrap();
        cache
            .set(&key, vec![price(2, 21.0), price(3, 30.0)])
            .await
            .unwrap();

        assert_eq!(
            cache.get(&key).await.unwrap(),
            vec![price(1, 10.0), price(2, 21.0), price(3, 30.0)]
        );
    }

    #[tokio::test]
    async fn test_empty_write_is_noop() {
        let cache = InMemoryCache::new();
        let key = price_key();

        cache.set(&key, Vec::new()).await.unwrap();
        assert!(!cache.contains(&key).await);
        assert_eq!(cache.entry_count().await, 0);

        let records = vec![price(1, 10.0)];
        cache.set(&key, records.clone()).await.unwrap();
        cache.set(&key, Vec::new()).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_equivalent_symbol_sets_share_an_entry() {
        let cache = InMemoryCache::new();
        let a = CacheKey::new(SymbolSet::parse("MSFT,aapl"), EntityKind::Price);
        let b = CacheKey::new(SymbolSet::new(["AAPL", "MSFT", "MSFT"]), EntityKind::Price);

        cache.set(&a, vec![price(1, 10.0)]).await.unwrap();
        assert_eq!(cache.get(&b).await.unwrap().len(), 1);
        assert_eq!(cache.entry_count().await, 1);
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let cache = InMemoryCache::new();
        let symbols = SymbolSet::parse("AAPL");
        let prices = CacheKey::new(symbols.clone(), EntityKind::Price);
        let metrics = CacheKey::new(symbols, EntityKind::FinancialMetric);

        cache.set(&prices, vec![price(1, 10.0)]).await.unwrap();
        assert!(cache.get(&metrics).await.unwrap().is_empty());

        let m = FinancialMetrics::new(Symbol::new("AAPL"), day(31)).into_record();
        cache.set(&metrics, vec![m.clone()]).await.unwrap();
        assert_eq!(cache.get(&metrics).await.unwrap(), vec![m]);
        assert_eq!(cache.get(&prices).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_kind_records_are_dropped() {
        let cache = InMemoryCache::new();
        let key = price_key();
        let news =
            CompanyNews::new(Symbol::new("AAPL"), day(1), "Title", "https://x/1").into_record();

        cache.set(&key, vec![news.clone()]).await.unwrap();
        assert!(!cache.contains(&key).await);

        cache.set(&key, vec![news, price(1, 10.0)]).await.unwrap();
        assert_eq!(cache.get(&key).await.unwrap(), vec![price(1, 10.0)]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writes_are_not_lost() {
        let cache = Arc::new(InMemoryCache::new());
        let key = price_key();
        let writers = 16u32;
        let batch = 10u32;

        let mut handles = Vec::new();
        for w in 0..writers {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            handles.push(tokio::spawn(async move {
                let records = (0..batch)
                    .map(|i| {
                        let date = day(1) + chrono::Days::new(u64::from(w * batch + i));
                        Price::new(Symbol::new("AAPL"), date, 1.0, 1.0, 1.0, 1.0, 1.0)
                            .into_record()
                    })
                    .collect();
                cache.set(&key, records).await.unwrap();
            }));
        }

        let reader = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move {
                for _ in 0..200 {
                    let len = cache.get(&key).await.unwrap().len();
                    assert_eq!(len % batch as usize, 0, "observed a partial merge");
                    tokio::task::yield_now().await;
                }
            })
        };

        for handle in handles {
            handle.await.unwrap();
        }
        reader.await.unwrap();

        assert_eq!(
            cache.get(&key).await.unwrap().len(),
            (writers * batch) as usize
        );
    }
}
