#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for findata.
//!
//! This crate provides implementations of the [`DataCache`] trait from `findata-core`:
//!
//! - [`InMemoryCache`] - Process-lifetime cache with merge-on-write entries
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// Record merge used on every write.
pub mod merge;
/// No-op cache implementation.
pub mod noop;

// Re-export the trait for convenience
pub use findata_core::DataCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use merge::merge;
pub use noop::NoopCache;
