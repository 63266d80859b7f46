#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for findata.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`DataCache`](cache::DataCache) - Merge-on-write cache keyed by symbol set and kind
//! - [`DataProviderClient`](provider::DataProviderClient) - Source of raw provider rows
//! - [`Record`](record::Record) - Tagged canonical record with a dedup identity
//! - [`FieldMap`](mapping::FieldMap) - Provider-to-canonical field translation
//! - [`select`](query::select) - Date-range filter, sort and limit over records

/// Cache trait and cache keys.
pub mod cache;
/// Lenient date parsing for provider payloads.
pub mod dates;
/// Error types for data operations.
pub mod error;
/// Entity kinds and sort order.
pub mod kind;
/// Field maps from provider rows to canonical records.
pub mod mapping;
/// Provider trait and fetch requests.
pub mod provider;
/// Date-range queries over records.
pub mod query;
/// Tagged records and dedup identities.
pub mod record;
/// Symbols and symbol sets.
pub mod symbol;
/// Canonical record types (Price, FinancialMetrics, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CacheKey, DataCache};
pub use error::{DataError, Result};
pub use kind::{EntityKind, SortOrder};
pub use mapping::{FieldMap, RawRecord};
pub use provider::{DataProviderClient, FetchRequest};
pub use query::{DateRange, RangeQuery, select};
pub use record::{Record, RecordIdentity, TypedRecord};
pub use symbol::{Symbol, SymbolSet};
pub use types::{CompanyNews, FinancialMetrics, InsiderTrade, LineItem, Price};
