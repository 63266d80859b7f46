//! Entity kind and sort order definitions.
//!
//! This module defines [`EntityKind`], the tag that separates cache entries for
//! different record types, and [`SortOrder`], the per-kind read convention.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of record a query or cache entry holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// Daily price bars.
    Price,
    /// Financial metrics and ratios per reporting period.
    FinancialMetric,
    /// Financial statement line items per reporting period.
    LineItem,
    /// Insider and major holder transactions.
    InsiderTrade,
    /// Company news articles.
    CompanyNews,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Price,
        Self::FinancialMetric,
        Self::LineItem,
        Self::InsiderTrade,
        Self::CompanyNews,
    ];

    /// Returns the order in which query results of this kind are returned.
    ///
    /// Prices read oldest first; everything else reads most recent first.
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        match self {
            Self::Price => SortOrder::Ascending,
            Self::FinancialMetric | Self::LineItem | Self::InsiderTrade | Self::CompanyNews => {
                SortOrder::Descending
            }
        }
    }

    /// Returns a short snake_case name, used in logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::FinancialMetric => "financial_metric",
            Self::LineItem => "line_item",
            Self::InsiderTrade => "insider_trade",
            Self::CompanyNews => "company_news",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort direction by a record's date field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortOrder {
    /// Oldest first.
    #[default]
    Ascending,
    /// Most recent first.
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_convention() {
        assert_eq!(EntityKind::Price.sort_order(), SortOrder::Ascending);
        for kind in &EntityKind::ALL[1..] {
            assert_eq!(kind.sort_order(), SortOrder::Descending, "{kind}");
        }
    }
}
