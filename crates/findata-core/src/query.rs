//! Date-range queries over cached records.
//!
//! Cache entries are stored unsorted. [`select`] turns an entry into a query
//! result: keep records of the wanted kind dated inside the range, sort them by
//! the kind's [`SortOrder`](crate::SortOrder), then truncate to the limit.

use chrono::NaiveDate;

use crate::{
    error::{DataError, Result},
    kind::SortOrder,
    record::{Record, TypedRecord},
};

/// An inclusive date range; a missing bound is open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// First day included, or unbounded.
    pub start: Option<NaiveDate>,
    /// Last day included, or unbounded.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// A range bounded on both ends.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// A range with no lower bound.
    #[must_use]
    pub const fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    /// Returns true if `date` lies inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }

    /// Checks that the start does not come after the end.
    ///
    /// # Errors
    /// Returns [`DataError::InvalidParameter`] for an inverted range.
    pub fn validate(&self) -> Result<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(DataError::InvalidParameter(format!(
                "start date {start} is after end date {end}"
            ))),
            _ => Ok(()),
        }
    }
}

/// A date range plus an optional result limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeQuery {
    /// Dates to keep.
    pub range: DateRange,
    /// Maximum number of records returned after sorting.
    pub limit: Option<usize>,
}

impl RangeQuery {
    /// Creates a query over `range` with no limit.
    #[must_use]
    pub const fn new(range: DateRange) -> Self {
        Self { range, limit: None }
    }

    /// Sets the result limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filters, sorts and truncates records of kind `R`.
///
/// Records of other kinds and records without a date are skipped. The sort is
/// stable, so records sharing a date keep their insertion order.
pub fn select<R, I>(records: I, query: &RangeQuery) -> Vec<R>
where
    R: TypedRecord,
    I: IntoIterator<Item = Record>,
{
    let mut selected: Vec<(NaiveDate, R)> = records
        .into_iter()
        .filter_map(R::from_record)
        .filter_map(|r| r.date().map(|d| (d, r)))
        .filter(|(d, _)| query.range.contains(*d))
        .collect();

    match R::KIND.sort_order() {
        SortOrder::Ascending => selected.sort_by(|a, b| a.0.cmp(&b.0)),
        SortOrder::Descending => selected.sort_by(|a, b| b.0.cmp(&a.0)),
    }

    if let Some(limit) = query.limit {
        selected.truncate(limit);
    }

    selected.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use crate::types::{FinancialMetrics, InsiderTrade, Price};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn price(d: u32) -> Record {
        Price::new(Symbol::new("AAPL"), day(d), 1.0, 1.0, 1.0, f64::from(d), 10.0).into_record()
    }

    fn metrics(d: u32) -> Record {
        FinancialMetrics::new(Symbol::new("AAPL"), day(d)).into_record()
    }

    #[test]
    fn test_range_is_inclusive() {
        let range = DateRange::between(day(5), day(10));
        assert!(range.contains(day(5)));
        assert!(range.contains(day(10)));
        assert!(!range.contains(day(4)));
        assert!(!range.contains(day(11)));
        assert!(DateRange::default().contains(day(1)));
        assert!(DateRange::until(day(3)).contains(day(1)));
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        assert!(DateRange::between(day(9), day(1)).validate().is_err());
        assert!(DateRange::between(day(1), day(1)).validate().is_ok());
    }

    #[test]
    fn test_select_filters_exactly_the_window() {
        let records: Vec<Record> = [12, 1, 7, 5, 10, 3].into_iter().map(price).collect();
        let query = RangeQuery::new(DateRange::between(day(3), day(10)));

        let selected: Vec<Price> = select(records, &query);
        let days: Vec<NaiveDate> = selected.iter().map(|p| p.time).collect();
        assert_eq!(days, vec![day(3), day(5), day(7), day(10)]);
    }

    #[test]
    fn test_limit_keeps_most_recent() {
        let records: Vec<Record> = [4, 9, 1, 7, 2].into_iter().map(metrics).collect();
        let query = RangeQuery::new(DateRange::until(day(31))).with_limit(3);

        let selected: Vec<FinancialMetrics> = select(records, &query);
        let days: Vec<NaiveDate> = selected.iter().map(|m| m.report_period).collect();
        assert_eq!(days, vec![day(9), day(7), day(4)]);
    }

    #[test]
    fn test_select_skips_other_kinds_and_undated() {
        let undated = InsiderTrade {
            symbol: Symbol::new("AAPL"),
            ..Default::default()
        };
        let dated = InsiderTrade {
            symbol: Symbol::new("AAPL"),
            filing_date: Some(day(2)),
            ..Default::default()
        };
        let records = vec![price(2), undated.into_record(), dated.clone().into_record()];

        let selected: Vec<InsiderTrade> = select(records, &RangeQuery::default());
        assert_eq!(selected, vec![dated]);
    }
}
