//! Read-through market data service over one cache and a list of providers.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use findata_cache::InMemoryCache;
use findata_core::{
    CacheKey, CompanyNews, DataCache, DataError, DataProviderClient, DateRange, FetchRequest,
    FinancialMetrics, InsiderTrade, LineItem, Price, RangeQuery, RawRecord, Result, SymbolSet,
    TypedRecord, select,
};

/// Cached access to market data with provider fallback.
///
/// Every query follows the same contract:
///
/// 1. The symbols are normalized into a [`CacheKey`].
/// 2. The cache entry is filtered to the requested range; a non-empty result is
///    returned sorted and truncated.
/// 3. Otherwise providers are tried in order for the full range. The first
///    success is converted, merged into the cache, and the merged entry is
///    filtered again and returned.
///
/// Provider failures are logged and degrade to an empty result so downstream
/// analytics keep running on partial data.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use findata::{InMemoryCache, MarketData};
/// use chrono::NaiveDate;
///
/// let data = MarketData::new(Arc::new(InMemoryCache::new()))
///     .with_openbb("http://localhost:8000");
///
/// let prices = data.get_prices(
///     "600519",
///     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
/// ).await?;
/// ```
pub struct MarketData {
    providers: Vec<Arc<dyn DataProviderClient>>,
    cache: Arc<dyn DataCache>,
}

impl std::fmt::Debug for MarketData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketData")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("cache", &"configured")
            .finish()
    }
}

impl Default for MarketData {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryCache::new()))
    }
}

impl MarketData {
    /// Create a service over `cache` with no providers.
    #[must_use]
    pub fn new(cache: Arc<dyn DataCache>) -> Self {
        Self {
            providers: Vec::new(),
            cache,
        }
    }

    /// Returns the cache this service reads and writes.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn DataCache> {
        &self.cache
    }

    /// Register a provider; providers are tried in registration order.
    pub fn register_provider(&mut self, provider: Arc<dyn DataProviderClient>) {
        debug!(provider = provider.name(), "Registering provider");
        self.providers.push(provider);
    }

    /// Register a provider, builder style.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn DataProviderClient>) -> Self {
        self.register_provider(provider);
        self
    }

    /// Add the OpenBB REST provider for the server at `base_url`.
    #[cfg(feature = "openbb")]
    #[must_use]
    pub fn with_openbb(self, base_url: &str) -> Self {
        self.with_provider(Arc::new(findata_openbb::OpenBbProvider::new(base_url)))
    }

    /// Fetch daily prices in `[start, end]`, oldest first.
    pub async fn get_prices(
        &self,
        symbols: impl Into<SymbolSet>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Price>> {
        let query = RangeQuery::new(DateRange::between(start, end));
        self.load(symbols.into(), query, Map::new()).await
    }

    /// Fetch financial metrics reported on or before `end`, most recent first.
    ///
    /// `period` is passed to the provider (`"ttm"`, `"annual"`, ...).
    pub async fn get_financial_metrics(
        &self,
        symbols: impl Into<SymbolSet>,
        end: NaiveDate,
        period: &str,
        limit: usize,
    ) -> Result<Vec<FinancialMetrics>> {
        let query = RangeQuery::new(DateRange::until(end)).with_limit(limit);
        self.load(symbols.into(), query, fundamental_params(period, limit))
            .await
    }

    /// Fetch statement line items reported on or before `end`, most recent first.
    ///
    /// Each record keeps only the requested `line_items`; an empty list keeps all.
    pub async fn search_line_items<S: AsRef<str>>(
        &self,
        symbols: impl Into<SymbolSet>,
        line_items: &[S],
        end: NaiveDate,
        period: &str,
        limit: usize,
    ) -> Result<Vec<LineItem>> {
        let query = RangeQuery::new(DateRange::until(end)).with_limit(limit);
        let mut extra = fundamental_params(period, limit);
        extra.insert(
            "line_items".to_string(),
            line_items.iter().map(|s| s.as_ref()).collect::<Vec<_>>().into(),
        );

        let mut items: Vec<LineItem> = self.load(symbols.into(), query, extra).await?;
        for item in &mut items {
            item.retain_items(line_items);
        }
        Ok(items)
    }

    /// Fetch insider trades dated in `[start, end]`, most recent first.
    ///
    /// A trade is dated by its transaction date, falling back to its filing date.
    pub async fn get_insider_trades(
        &self,
        symbols: impl Into<SymbolSet>,
        end: NaiveDate,
        start: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<InsiderTrade>> {
        let range = DateRange {
            start,
            end: Some(end),
        };
        let query = RangeQuery::new(range).with_limit(limit);
        self.load(symbols.into(), query, limit_param(limit)).await
    }

    /// Fetch company news dated in `[start, end]`, most recent first.
    pub async fn get_company_news(
        &self,
        symbols: impl Into<SymbolSet>,
        end: NaiveDate,
        start: Option<NaiveDate>,
        limit: usize,
    ) -> Result<Vec<CompanyNews>> {
        let range = DateRange {
            start,
            end: Some(end),
        };
        let query = RangeQuery::new(range).with_limit(limit);
        self.load(symbols.into(), query, limit_param(limit)).await
    }

    /// Market capitalization from the most recent trailing metrics on or before `end`.
    ///
    /// Returns `None` when no metrics exist or the provider left it empty or zero.
    pub async fn get_market_cap(
        &self,
        symbols: impl Into<SymbolSet>,
        end: NaiveDate,
    ) -> Result<Option<f64>> {
        let metrics = self.get_financial_metrics(symbols, end, "ttm", 10).await?;
        Ok(metrics
            .first()
            .and_then(|m| m.market_cap)
            .filter(|cap| *cap != 0.0))
    }

    /// Cache-then-provider lookup shared by every kind.
    async fn load<R: TypedRecord>(
        &self,
        symbols: SymbolSet,
        query: RangeQuery,
        extra: Map<String, Value>,
    ) -> Result<Vec<R>> {
        if symbols.is_empty() {
            return Err(DataError::InvalidParameter(
                "At least one symbol is required".to_string(),
            ));
        }
        query.range.validate()?;
        if self.providers.is_empty() {
            return Err(DataError::ProviderNotConfigured(
                "No providers registered".to_string(),
            ));
        }

        let key = CacheKey::new(symbols.clone(), R::KIND);

        // Hit or miss is decided on the filtered entry; the limit only shapes the result.
        let unlimited = RangeQuery::new(query.range);
        match self.cache.get(&key).await {
            Ok(cached) => {
                let hit: Vec<R> = select(cached, &unlimited);
                if !hit.is_empty() {
                    debug!(key = %key, count = hit.len(), "Serving from cache");
                    return Ok(truncate(hit, query.limit));
                }
            }
            Err(e) => warn!(key = %key, error = %e, "Cache read failed, fetching"),
        }

        let mut request = FetchRequest::new(R::KIND, symbols).with_range(query.range);
        request.extra = extra;

        let Some(rows) = self.fetch(&request).await? else {
            return Ok(Vec::new());
        };

        let fetched: Vec<_> = convert::<R>(rows)
            .into_iter()
            .map(TypedRecord::into_record)
            .collect();

        if let Err(e) = self.cache.set(&key, fetched.clone()).await {
            warn!(key = %key, error = %e, "Failed to cache fetched records");
            return Ok(select(fetched, &query));
        }

        // Re-read so the result reflects everything the entry now holds; a cache
        // that stores nothing falls back to the fetched batch.
        let view = match self.cache.get(&key).await {
            Ok(records) if !records.is_empty() => records,
            _ => fetched,
        };
        Ok(select(view, &query))
    }

    /// Try providers in order until one succeeds.
    ///
    /// Returns `Ok(None)` when every provider failed with a provider failure.
    async fn fetch(&self, request: &FetchRequest) -> Result<Option<Vec<RawRecord>>> {
        for provider in &self.providers {
            debug!(
                provider = provider.name(),
                kind = %request.kind,
                symbols = %request.symbols,
                "Fetching from provider"
            );

            match provider.fetch(request).await {
                Ok(rows) => return Ok(Some(rows)),
                Err(e) if e.is_provider_failure() => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            kind = %request.kind,
            symbols = %request.symbols,
            "All providers failed, returning empty result"
        );
        Ok(None)
    }
}

/// Convert raw rows, dropping the ones that do not map to a valid record.
fn convert<R: TypedRecord>(rows: Vec<RawRecord>) -> Vec<R> {
    let total = rows.len();
    let records: Vec<R> = rows
        .into_iter()
        .filter_map(|row| match R::from_raw(row) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!(kind = %R::KIND, error = %e, "Dropping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(
            kind = %R::KIND,
            dropped = total - records.len(),
            kept = records.len(),
            "Dropped malformed records"
        );
    }
    records
}

fn truncate<R>(mut records: Vec<R>, limit: Option<usize>) -> Vec<R> {
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}

fn limit_param(limit: usize) -> Map<String, Value> {
    let mut extra = Map::new();
    extra.insert("limit".to_string(), Value::from(limit));
    extra
}

fn fundamental_params(period: &str, limit: usize) -> Map<String, Value> {
    let mut extra = limit_param(limit);
    extra.insert("period".to_string(), Value::from(period));
    extra
}
