#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! OpenBB-style REST data provider.
//!
//! This crate implements [`DataProviderClient`] for servers that expose the
//! [OpenBB Platform](https://openbb.co/) REST layout.
//!
//! # Usage
//!
//! ```rust,ignore
//! use findata_openbb::OpenBbProvider;
//! use findata_core::{DataProviderClient, EntityKind, FetchRequest, SymbolSet, DateRange};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OpenBbProvider::new("http://localhost:8000");
//!
//!     let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!     let request = FetchRequest::new(EntityKind::Price, SymbolSet::parse("600519"))
//!         .with_range(DateRange::between(start, end));
//!
//!     let rows = provider.fetch(&request).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use findata_core::{
    DataError, DataProviderClient, EntityKind, FetchRequest, RawRecord, Result, Symbol, SymbolSet,
};
use futures::future::try_join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

/// Data source used for prices, the symbol index and native fundamentals.
const DEFAULT_SOURCE: &str = "xiaoyuan";

/// Data source used for fundamentals that support trailing-twelve-month periods.
const DEFAULT_FUNDAMENTAL_SOURCE: &str = "fmp";

/// Default number of periods requested for fundamentals.
const DEFAULT_FUNDAMENTAL_LIMIT: u64 = 10;

/// Default number of insider trades requested.
const DEFAULT_TRADE_LIMIT: u64 = 1000;

/// How query parameters are built for a fundamentals endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParamStyle {
    /// `period=quarter|annual` plus `with_ttm`, served by the fundamental source.
    Ttm,
    /// `period=ytd` for trailing requests, served by the default source.
    Native,
}

/// A fundamentals endpoint path and its parameter style.
#[derive(Clone, Copy, Debug)]
struct Endpoint {
    path: &'static str,
    style: ParamStyle,
}

const fn endpoint(path: &'static str, style: ParamStyle) -> Endpoint {
    Endpoint { path, style }
}

/// Endpoints merged into one financial metrics row, in precedence order.
const METRIC_ENDPOINTS: &[Endpoint] = &[
    endpoint("equity/fundamental/ratios", ParamStyle::Ttm),
    endpoint("equity/fundamental/metrics", ParamStyle::Ttm),
    endpoint("equity/fundamental/cash_growth", ParamStyle::Ttm),
    endpoint("equity/fundamental/income_growth", ParamStyle::Ttm),
    endpoint("equity/fundamental/income_growth", ParamStyle::Native),
    endpoint("equity/fundamental/metrics", ParamStyle::Native),
    endpoint("equity/fundamental/balance", ParamStyle::Ttm),
];

/// Endpoints merged into one line item row, in precedence order.
const LINE_ITEM_ENDPOINTS: &[Endpoint] = &[
    endpoint("equity/fundamental/balance", ParamStyle::Native),
    endpoint("equity/fundamental/income", ParamStyle::Native),
    endpoint("equity/fundamental/metrics", ParamStyle::Ttm),
    endpoint("equity/fundamental/ratios", ParamStyle::Ttm),
    endpoint("equity/fundamental/cash", ParamStyle::Ttm),
    endpoint("equity/fundamental/balance", ParamStyle::Ttm),
    endpoint("equity/fundamental/metrics", ParamStyle::Native),
];

/// OpenBB-style REST data provider.
///
/// Provides access to:
/// - Historical daily prices
/// - Financial metrics and statement line items
/// - Major holder transactions
/// - Company news
///
/// Every kind is served from the same base URL.
#[derive(Debug)]
pub struct OpenBbProvider {
    client: Client,
    base_url: String,
    source: String,
    fundamental_source: String,
    symbol_index: OnceCell<Vec<Symbol>>,
}

impl OpenBbProvider {
    /// Create a new provider for the server at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a new provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            source: DEFAULT_SOURCE.to_string(),
            fundamental_source: DEFAULT_FUNDAMENTAL_SOURCE.to_string(),
            symbol_index: OnceCell::new(),
        }
    }

    /// Set the data source for prices, symbol search and native fundamentals.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the data source for trailing-twelve-month fundamentals.
    #[must_use]
    pub fn with_fundamental_source(mut self, source: impl Into<String>) -> Self {
        self.fundamental_source = source.into();
        self
    }

    /// Build the URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1/{path}", self.base_url)
    }

    /// Make a GET request and return the `results` rows.
    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<RawRecord>> {
        let url = self.url(path);
        debug!(path, "OpenBB request");

        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(DataError::Network(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| DataError::Network(e.to_string()))?;

        let envelope: Envelope =
            serde_json::from_str(&text).map_err(|e| DataError::Parse(format!("{e}: {text}")))?;
        Ok(envelope.results)
    }

    /// Fetch the server's symbol index once and reuse it.
    async fn symbol_index(&self) -> Result<&[Symbol]> {
        let index = self
            .symbol_index
            .get_or_try_init(|| async {
                let params = [("provider", self.source.clone())];
                let rows = self.get("equity/search", &params).await?;
                let symbols: Vec<Symbol> = rows
                    .iter()
                    .filter_map(|row| row.get("symbol").and_then(Value::as_str))
                    .map(Symbol::new)
                    .collect();
                debug!(count = symbols.len(), "Loaded symbol index");
                Ok::<_, DataError>(symbols)
            })
            .await?;
        Ok(index.as_slice())
    }

    /// Resolve requested symbols to the server's exchange-qualified symbols.
    async fn resolve(&self, symbols: &SymbolSet) -> Result<SymbolSet> {
        let index = self.symbol_index().await?;
        Ok(resolve_against(index, symbols))
    }

    async fn fetch_prices(
        &self,
        request: &FetchRequest,
        symbols: &SymbolSet,
    ) -> Result<Vec<RawRecord>> {
        let mut params = vec![
            ("provider", self.source.clone()),
            ("symbol", symbols.joined()),
        ];
        push_dates(&mut params, request);
        self.get("equity/price/historical", &params).await
    }

    async fn fetch_fundamentals(
        &self,
        endpoints: &[Endpoint],
        request: &FetchRequest,
        symbols: &SymbolSet,
    ) -> Result<Vec<RawRecord>> {
        let period = request.param_str("period").unwrap_or("ttm");
        let limit = request
            .param_u64("limit")
            .unwrap_or(DEFAULT_FUNDAMENTAL_LIMIT);

        let tables = try_join_all(endpoints.iter().map(|e| {
            let params = self.fundamental_params(e.style, symbols, period, limit);
            async move {
                let mut rows = self.get(e.path, &params).await?;
                if e.path.ends_with("/balance") {
                    derive_book_value_growth(&mut rows);
                }
                Ok::<_, DataError>(rows)
            }
        }))
        .await?;

        Ok(merge_columns(tables))
    }

    fn fundamental_params(
        &self,
        style: ParamStyle,
        symbols: &SymbolSet,
        period: &str,
        limit: u64,
    ) -> Vec<(&'static str, String)> {
        let trailing = period == "ttm";
        match style {
            ParamStyle::Ttm => vec![
                ("provider", self.fundamental_source.clone()),
                ("symbol", symbols.joined()),
                ("limit", limit.to_string()),
                (
                    "period",
                    if trailing { "quarter" } else { "annual" }.to_string(),
                ),
                ("with_ttm", trailing.to_string()),
            ],
            ParamStyle::Native => vec![
                ("provider", self.source.clone()),
                ("symbol", symbols.joined()),
                ("limit", limit.to_string()),
                (
                    "period",
                    if trailing { "ytd" } else { period }.to_string(),
                ),
            ],
        }
    }

    async fn fetch_insider_trades(
        &self,
        request: &FetchRequest,
        symbols: &SymbolSet,
    ) -> Result<Vec<RawRecord>> {
        let limit = request.param_u64("limit").unwrap_or(DEFAULT_TRADE_LIMIT);
        let mut params = vec![("symbol", symbols.joined()), ("limit", limit.to_string())];
        push_dates(&mut params, request);
        self.get("equity/ownership/major_holders", &params).await
    }

    async fn fetch_news(
        &self,
        request: &FetchRequest,
        symbols: &SymbolSet,
    ) -> Result<Vec<RawRecord>> {
        let mut params = vec![("symbol", symbols.joined())];
        push_dates(&mut params, request);
        self.get("news/company", &params).await
    }
}

#[async_trait]
impl DataProviderClient for OpenBbProvider {
    fn name(&self) -> &str {
        "OpenBB"
    }

    fn description(&self) -> &str {
        "OpenBB Platform REST API - prices, fundamentals, holders and news"
    }

    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>> {
        let symbols = self.resolve(&request.symbols).await?;
        if symbols.is_empty() {
            debug!(requested = %request.symbols, "No symbols resolved");
            return Ok(Vec::new());
        }

        let mut rows = match request.kind {
            EntityKind::Price => self.fetch_prices(request, &symbols).await?,
            EntityKind::FinancialMetric => {
                self.fetch_fundamentals(METRIC_ENDPOINTS, request, &symbols)
                    .await?
            }
            EntityKind::LineItem => {
                self.fetch_fundamentals(LINE_ITEM_ENDPOINTS, request, &symbols)
                    .await?
            }
            EntityKind::InsiderTrade => self.fetch_insider_trades(request, &symbols).await?,
            EntityKind::CompanyNews => self.fetch_news(request, &symbols).await?,
        };

        fill_symbol(&mut rows, &symbols);
        debug!(kind = %request.kind, count = rows.len(), "Fetched rows");
        Ok(rows)
    }
}

/// Appends `start_date` / `end_date` for the bounds the request has.
fn push_dates(params: &mut Vec<(&'static str, String)>, request: &FetchRequest) {
    if let Some(start) = request.start {
        params.push(("start_date", start.to_string()));
    }
    if let Some(end) = request.end {
        params.push(("end_date", end.to_string()));
    }
}

/// Matches requested symbols against the index by code.
///
/// `600519` and `600519.SH` both resolve to the index entry `600519.SH`.
fn resolve_against(index: &[Symbol], requested: &SymbolSet) -> SymbolSet {
    index
        .iter()
        .filter(|s| requested.iter().any(|r| r.code() == s.code()))
        .cloned()
        .collect()
}

/// Merges tables column-wise by row position.
///
/// The first non-null value for a column wins.
fn merge_columns(tables: Vec<Vec<RawRecord>>) -> Vec<RawRecord> {
    let height = tables.iter().map(Vec::len).max().unwrap_or(0);
    let mut merged = vec![RawRecord::new(); height];

    for table in tables {
        for (row, target) in table.into_iter().zip(merged.iter_mut()) {
            for (column, value) in row {
                let missing = target.get(&column).is_none_or(Value::is_null);
                if missing {
                    target.insert(column, value);
                }
            }
        }
    }

    merged
}

/// Adds `book_value_growth` to balance sheet rows.
///
/// Book value is total assets minus total liabilities; growth compares each
/// row with the row before it, so the first row gets `null`.
fn derive_book_value_growth(rows: &mut [RawRecord]) {
    let book_values: Vec<Option<f64>> = rows
        .iter()
        .map(|row| {
            let assets = row.get("total_assets").and_then(Value::as_f64)?;
            let liabilities = row.get("total_liabilities").and_then(Value::as_f64)?;
            Some(assets - liabilities)
        })
        .collect();

    for (i, row) in rows.iter_mut().enumerate() {
        let growth = i
            .checked_sub(1)
            .and_then(|prev| match (book_values[i], book_values[prev]) {
                (Some(current), Some(previous)) if previous != 0.0 => {
                    Some(current / previous - 1.0)
                }
                _ => None,
            });
        row.insert(
            "book_value_growth".to_string(),
            growth.map_or(Value::Null, Value::from),
        );
    }
}

/// Sets `symbol` on rows that carry none when a single symbol was requested.
fn fill_symbol(rows: &mut [RawRecord], symbols: &SymbolSet) {
    let [symbol] = symbols.as_slice() else {
        return;
    };
    for row in rows {
        let has_symbol = ["symbol", "ticker"]
            .iter()
            .any(|k| row.get(*k).is_some_and(|v| !v.is_null()));
        if !has_symbol {
            row.insert("symbol".to_string(), Value::from(symbol.as_str()));
        }
    }
}

// ============================================================================
// OpenBB API Response Types
// ============================================================================

/// Response envelope; a missing `results` field means no rows.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    results: Vec<RawRecord>,
}
