#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cached access to financial market data.
//!
//! This crate re-exports the core types and cache implementations, and provides
//! [`MarketData`], which answers queries from the cache first and falls back to
//! the registered providers in order.
//!
//! # Features
//!
//! - `openbb` - OpenBB REST provider (enabled by default)
//!
//! # Example
//!
//! ```rust,ignore
//! use findata::MarketData;
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> findata::Result<()> {
//!     let data = MarketData::default().with_openbb("http://127.0.0.1:6900");
//!
//!     let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!     let metrics = data.get_financial_metrics("600519", end, "ttm", 4).await?;
//!     println!("{metrics:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use findata_core::*;

// Cache implementations
pub use findata_cache::{InMemoryCache, NoopCache, merge};

// Providers
#[cfg(feature = "openbb")]
pub use findata_openbb::OpenBbProvider;

mod service;

pub use service::MarketData;
