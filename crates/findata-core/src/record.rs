//! Tagged records and their dedup identities.
//!
//! A cache entry stores [`Record`]s. Each record carries a [`RecordIdentity`]
//! that decides whether a newly written record replaces a stored one, and an
//! optional date used for range filtering and sorting.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    kind::EntityKind,
    mapping::RawRecord,
    symbol::Symbol,
    types::{CompanyNews, FinancialMetrics, InsiderTrade, LineItem, Price},
};

/// A record of any entity kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Record {
    /// Daily price bar.
    Price(Price),
    /// Financial metrics for a period.
    FinancialMetric(FinancialMetrics),
    /// Line items for a period.
    LineItem(LineItem),
    /// Insider trade.
    InsiderTrade(InsiderTrade),
    /// News article.
    CompanyNews(CompanyNews),
}

impl Record {
    /// Returns the entity kind of this record.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Price(_) => EntityKind::Price,
            Self::FinancialMetric(_) => EntityKind::FinancialMetric,
            Self::LineItem(_) => EntityKind::LineItem,
            Self::InsiderTrade(_) => EntityKind::InsiderTrade,
            Self::CompanyNews(_) => EntityKind::CompanyNews,
        }
    }

    /// Returns the dedup identity of this record.
    #[must_use]
    pub fn identity(&self) -> RecordIdentity {
        match self {
            Self::Price(r) => r.identity(),
            Self::FinancialMetric(r) => r.identity(),
            Self::LineItem(r) => r.identity(),
            Self::InsiderTrade(r) => r.identity(),
            Self::CompanyNews(r) => r.identity(),
        }
    }

    /// Returns the date this record is filtered and sorted by.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Price(r) => r.date(),
            Self::FinancialMetric(r) => r.date(),
            Self::LineItem(r) => r.date(),
            Self::InsiderTrade(r) => r.date(),
            Self::CompanyNews(r) => r.date(),
        }
    }
}

/// The natural key two records of the same kind are deduplicated on.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RecordIdentity {
    /// One record per symbol and day (prices, metrics, line items).
    SymbolDate {
        /// Stock symbol.
        symbol: Symbol,
        /// Identifying date.
        date: NaiveDate,
    },
    /// One record per symbol, day and distinguishing text (news url or title).
    SymbolDateText {
        /// Stock symbol.
        symbol: Symbol,
        /// Identifying date.
        date: NaiveDate,
        /// Distinguishing text.
        text: String,
    },
    /// Whole-record equality, for kinds without a reliable natural key.
    Content(String),
}

/// A typed record that can be stored in and read back from the cache.
pub trait TypedRecord: Clone + Send + Sync + Sized + 'static {
    /// The entity kind of this record type.
    const KIND: EntityKind;

    /// Returns the dedup identity.
    fn identity(&self) -> RecordIdentity;

    /// Returns the date used for range filtering and sorting.
    fn date(&self) -> Option<NaiveDate>;

    /// Wraps this record in the tagged [`Record`] enum.
    fn into_record(self) -> Record;

    /// Unwraps a [`Record`] of this kind; other kinds yield `None`.
    fn from_record(record: Record) -> Option<Self>;

    /// Converts a raw provider row through this kind's field map.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`](crate::DataError::Parse) if the mapped row is
    /// missing a required field or has a field of the wrong type.
    fn from_raw(raw: RawRecord) -> Result<Self>;
}

macro_rules! typed_record {
    ($variant:ident) => {
        fn into_record(self) -> Record {
            Record::$variant(self)
        }

        fn from_record(record: Record) -> Option<Self> {
            match record {
                Record::$variant(r) => Some(r),
                _ => None,
            }
        }

        fn from_raw(raw: RawRecord) -> Result<Self> {
            Self::KIND.field_map().convert(raw)
        }
    };
}

impl TypedRecord for Price {
    const KIND: EntityKind = EntityKind::Price;

    fn identity(&self) -> RecordIdentity {
        RecordIdentity::SymbolDate {
            symbol: self.symbol.clone(),
            date: self.time,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.time)
    }

    typed_record!(Price);
}

impl TypedRecord for FinancialMetrics {
    const KIND: EntityKind = EntityKind::FinancialMetric;

    fn identity(&self) -> RecordIdentity {
        RecordIdentity::SymbolDate {
            symbol: self.symbol.clone(),
            date: self.report_period,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.report_period)
    }

    typed_record!(FinancialMetric);
}

impl TypedRecord for LineItem {
    const KIND: EntityKind = EntityKind::LineItem;

    fn identity(&self) -> RecordIdentity {
        RecordIdentity::SymbolDate {
            symbol: self.symbol.clone(),
            date: self.report_period,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.report_period)
    }

    typed_record!(LineItem);
}

impl TypedRecord for InsiderTrade {
    const KIND: EntityKind = EntityKind::InsiderTrade;

    // Holder filings have no reliable natural key, so every field counts.
    fn identity(&self) -> RecordIdentity {
        RecordIdentity::Content(format!("{self:?}"))
    }

    fn date(&self) -> Option<NaiveDate> {
        self.effective_date()
    }

    typed_record!(InsiderTrade);
}

impl TypedRecord for CompanyNews {
    const KIND: EntityKind = EntityKind::CompanyNews;

    fn identity(&self) -> RecordIdentity {
        let text = if self.url.is_empty() {
            self.title.clone()
        } else {
            self.url.clone()
        };
        RecordIdentity::SymbolDateText {
            symbol: self.symbol.clone(),
            date: self.date,
            text,
        }
    }

    fn date(&self) -> Option<NaiveDate> {
        Some(self.date)
    }

    typed_record!(CompanyNews);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_price_identity_ignores_values() {
        let a = Price::new(Symbol::new("AAPL"), day(2), 1.0, 2.0, 0.5, 1.5, 100.0);
        let b = Price::new(Symbol::new("AAPL"), day(2), 9.0, 9.0, 9.0, 9.0, 900.0);
        let c = Price::new(Symbol::new("MSFT"), day(2), 1.0, 2.0, 0.5, 1.5, 100.0);
        assert_eq!(a.identity(), b.identity());
        assert_ne!(a.identity(), c.identity());
    }

    #[test]
    fn test_news_identity_prefers_url() {
        let a = CompanyNews::new(Symbol::new("AAPL"), day(3), "One", "https://x/1");
        let b = CompanyNews::new(Symbol::new("AAPL"), day(3), "Other", "https://x/1");
        let c = CompanyNews::new(Symbol::new("AAPL"), day(3), "One", "");
        let d = CompanyNews::new(Symbol::new("AAPL"), day(3), "Two", "");
        assert_eq!(a.identity(), b.identity());
        assert_ne!(c.identity(), d.identity());
    }

    #[test]
    fn test_insider_identity_is_whole_record() {
        let a = InsiderTrade {
            symbol: Symbol::new("AAPL"),
            filing_date: Some(day(5)),
            transaction_shares: Some(100.0),
            ..Default::default()
        };
        let mut b = a.clone();
        assert_eq!(a.identity(), b.identity());
        b.transaction_shares = Some(200.0);
        assert_ne!(a.identity(), b.identity());
    }

    #[test]
    fn test_record_round_trip_through_enum() {
        let price = Price::new(Symbol::new("AAPL"), day(2), 1.0, 2.0, 0.5, 1.5, 100.0);
        let record = price.clone().into_record();
        assert_eq!(record.kind(), EntityKind::Price);
        assert_eq!(record.date(), Some(day(2)));
        assert_eq!(Price::from_record(record.clone()), Some(price));
        assert_eq!(CompanyNews::from_record(record), None);
    }
}
