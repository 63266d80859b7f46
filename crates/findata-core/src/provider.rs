//! Provider trait for fetching raw market data.
//!
//! This module defines:
//!
//! - [`FetchRequest`] - What to fetch: kind, symbols, date bounds and extra parameters
//! - [`DataProviderClient`] - The client that turns a request into raw provider rows

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::{
    error::Result, kind::EntityKind, mapping::RawRecord, query::DateRange, symbol::SymbolSet,
};

/// A request for raw records of one kind.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    /// Kind of records requested.
    pub kind: EntityKind,
    /// Symbols requested.
    pub symbols: SymbolSet,
    /// First day requested, if bounded.
    pub start: Option<NaiveDate>,
    /// Last day requested, if bounded.
    pub end: Option<NaiveDate>,
    /// Kind-specific parameters such as `period` or `limit`.
    pub extra: Map<String, Value>,
}

impl FetchRequest {
    /// Creates an unbounded request.
    #[must_use]
    pub fn new(kind: EntityKind, symbols: SymbolSet) -> Self {
        Self {
            kind,
            symbols,
            start: None,
            end: None,
            extra: Map::new(),
        }
    }

    /// Sets both date bounds from a range.
    #[must_use]
    pub fn with_range(mut self, range: DateRange) -> Self {
        self.start = range.start;
        self.end = range.end;
        self
    }

    /// Adds an extra parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Returns a string parameter.
    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }

    /// Returns an unsigned integer parameter.
    #[must_use]
    pub fn param_u64(&self, name: &str) -> Option<u64> {
        self.extra.get(name).and_then(Value::as_u64)
    }
}

/// Client for a remote market data provider.
///
/// Implementations return rows in the provider's own schema; conversion to
/// canonical records happens in the caller through the kind's
/// [`FieldMap`](crate::FieldMap).
#[async_trait]
pub trait DataProviderClient: Send + Sync + Debug {
    /// Returns the name of this provider.
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Fetches raw rows for a request.
    ///
    /// # Errors
    /// Returns a provider failure ([`DataError::is_provider_failure`](crate::DataError::is_provider_failure))
    /// on network, HTTP status or payload errors.
    async fn fetch(&self, request: &FetchRequest) -> Result<Vec<RawRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 30).unwrap();
        let request = FetchRequest::new(EntityKind::FinancialMetric, SymbolSet::parse("AAPL"))
            .with_range(DateRange::between(start, end))
            .with_param("period", "ttm")
            .with_param("limit", 10);

        assert_eq!(request.start, Some(start));
        assert_eq!(request.end, Some(end));
        assert_eq!(request.param_str("period"), Some("ttm"));
        assert_eq!(request.param_u64("limit"), Some(10));
        assert_eq!(request.param_str("missing"), None);
    }
}
