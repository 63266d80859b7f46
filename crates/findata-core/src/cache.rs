//! Cache trait for storing fetched financial data.
//!
//! This module defines the [`DataCache`] trait that provides a unified interface
//! for caching records of every [`EntityKind`], and the [`CacheKey`] entries are
//! addressed by.

use async_trait::async_trait;
use std::fmt;

use crate::{error::Result, kind::EntityKind, record::Record, symbol::SymbolSet};

/// Address of one cache entry: a normalized symbol set and an entity kind.
///
/// Keys built from the same symbols in any order or casing are equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
    symbols: SymbolSet,
    kind: EntityKind,
}

impl CacheKey {
    /// Creates a key for `kind` records of `symbols`.
    #[must_use]
    pub const fn new(symbols: SymbolSet, kind: EntityKind) -> Self {
        Self { symbols, kind }
    }

    /// Returns the normalized symbol set.
    #[must_use]
    pub const fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.symbols)
    }
}

/// Trait for caching fetched financial data.
///
/// An entry accumulates records across writes: `set` merges by each record's
/// [`RecordIdentity`](crate::RecordIdentity), replacing matches and appending
/// the rest. Entries are never removed.
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Returns every record stored under `key`.
    ///
    /// An unknown key yields an empty vector, not an error.
    async fn get(&self, key: &CacheKey) -> Result<Vec<Record>>;

    /// Merges `records` into the entry for `key`, creating it if needed.
    ///
    /// Writing an empty batch is a no-op and does not create an entry.
    async fn set(&self, key: &CacheKey, records: Vec<Record>) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_normalizes_symbols() {
        let a = CacheKey::new(SymbolSet::parse("msft,AAPL"), EntityKind::Price);
        let b = CacheKey::new(SymbolSet::new(["AAPL", "MSFT", "aapl"]), EntityKind::Price);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "price:AAPL,MSFT");
    }

    #[test]
    fn test_key_separates_kinds() {
        let symbols = SymbolSet::parse("AAPL");
        let prices = CacheKey::new(symbols.clone(), EntityKind::Price);
        let news = CacheKey::new(symbols, EntityKind::CompanyNews);
        assert_ne!(prices, news);
    }
}
