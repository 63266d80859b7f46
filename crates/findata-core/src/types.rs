//! Canonical record types for financial market data.
//!
//! This module defines the record structures the cache stores:
//!
//! - [`Price`] - Daily OHLCV price bar
//! - [`FinancialMetrics`] - Valuation, profitability and growth ratios for a period
//! - [`LineItem`] - Financial statement line items for a period
//! - [`InsiderTrade`] - Insider or major holder transaction
//! - [`CompanyNews`] - Company news article
//!
//! Numeric fields the provider may omit are `Option<f64>`; a missing value is
//! `None`, never a zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::dates;
use crate::symbol::Symbol;

/// Daily OHLCV price bar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Price {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Trading day of the bar.
    #[serde(with = "dates::lenient")]
    pub time: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price during the day.
    pub high: f64,
    /// Lowest price during the day.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Trading volume.
    pub volume: f64,
}

impl Price {
    /// Creates a new price bar.
    #[must_use]
    pub const fn new(
        symbol: Symbol,
        time: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            symbol,
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// Financial metrics and ratios for one reporting period.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    /// Stock symbol.
    pub symbol: Symbol,
    /// End date of the reporting period.
    #[serde(with = "dates::lenient")]
    pub report_period: NaiveDate,
    /// Period label as reported by the provider (e.g. "Q1", "FY", "ttm").
    #[serde(default)]
    pub period: Option<String>,
    /// Reporting currency.
    #[serde(default)]
    pub currency: String,

    // Valuation
    /// Market capitalization.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Enterprise value.
    #[serde(default)]
    pub enterprise_value: Option<f64>,
    /// Price-to-earnings ratio.
    #[serde(default)]
    pub price_to_earnings_ratio: Option<f64>,
    /// Price-to-book ratio.
    #[serde(default)]
    pub price_to_book_ratio: Option<f64>,
    /// Price-to-sales ratio.
    #[serde(default)]
    pub price_to_sales_ratio: Option<f64>,
    /// EV/EBITDA ratio.
    #[serde(default)]
    pub enterprise_value_to_ebitda_ratio: Option<f64>,
    /// EV/revenue ratio.
    #[serde(default)]
    pub enterprise_value_to_revenue_ratio: Option<f64>,
    /// Free cash flow yield.
    #[serde(default)]
    pub free_cash_flow_yield: Option<f64>,
    /// Price/earnings-to-growth ratio.
    #[serde(default)]
    pub peg_ratio: Option<f64>,

    // Profitability
    /// Gross profit margin.
    #[serde(default)]
    pub gross_margin: Option<f64>,
    /// Operating profit margin.
    #[serde(default)]
    pub operating_margin: Option<f64>,
    /// Net profit margin.
    #[serde(default)]
    pub net_margin: Option<f64>,
    /// Return on equity.
    #[serde(default)]
    pub return_on_equity: Option<f64>,
    /// Return on assets.
    #[serde(default)]
    pub return_on_assets: Option<f64>,
    /// Return on invested capital.
    #[serde(default)]
    pub return_on_invested_capital: Option<f64>,

    // Efficiency
    /// Asset turnover.
    #[serde(default)]
    pub asset_turnover: Option<f64>,
    /// Inventory turnover.
    #[serde(default)]
    pub inventory_turnover: Option<f64>,
    /// Receivables turnover.
    #[serde(default)]
    pub receivables_turnover: Option<f64>,
    /// Days sales outstanding.
    #[serde(default)]
    pub days_sales_outstanding: Option<f64>,
    /// Operating cycle in days.
    #[serde(default)]
    pub operating_cycle: Option<f64>,
    /// Working capital turnover.
    #[serde(default)]
    pub working_capital_turnover: Option<f64>,

    // Liquidity & Solvency
    /// Current ratio.
    #[serde(default)]
    pub current_ratio: Option<f64>,
    /// Quick ratio.
    #[serde(default)]
    pub quick_ratio: Option<f64>,
    /// Cash ratio.
    #[serde(default)]
    pub cash_ratio: Option<f64>,
    /// Operating cash flow ratio.
    #[serde(default)]
    pub operating_cash_flow_ratio: Option<f64>,
    /// Debt-to-equity ratio.
    #[serde(default)]
    pub debt_to_equity: Option<f64>,
    /// Debt-to-assets ratio.
    #[serde(default)]
    pub debt_to_assets: Option<f64>,
    /// Interest coverage ratio.
    #[serde(default)]
    pub interest_coverage: Option<f64>,

    // Growth
    /// Revenue growth.
    #[serde(default)]
    pub revenue_growth: Option<f64>,
    /// Earnings growth.
    #[serde(default)]
    pub earnings_growth: Option<f64>,
    /// Book value growth.
    #[serde(default)]
    pub book_value_growth: Option<f64>,
    /// Earnings-per-share growth.
    #[serde(default)]
    pub earnings_per_share_growth: Option<f64>,
    /// Free cash flow growth.
    #[serde(default)]
    pub free_cash_flow_growth: Option<f64>,
    /// Operating income growth.
    #[serde(default)]
    pub operating_income_growth: Option<f64>,
    /// EBITDA growth.
    #[serde(default)]
    pub ebitda_growth: Option<f64>,

    // Per share
    /// Dividend payout ratio.
    #[serde(default)]
    pub payout_ratio: Option<f64>,
    /// Earnings per share.
    #[serde(default)]
    pub earnings_per_share: Option<f64>,
    /// Book value per share.
    #[serde(default)]
    pub book_value_per_share: Option<f64>,
    /// Free cash flow per share.
    #[serde(default)]
    pub free_cash_flow_per_share: Option<f64>,
}

impl FinancialMetrics {
    /// Creates new metrics with required fields.
    #[must_use]
    pub fn new(symbol: Symbol, report_period: NaiveDate) -> Self {
        Self {
            symbol,
            report_period,
            ..Default::default()
        }
    }
}

/// Financial statement line items for one reporting period.
///
/// The set of line items is open: whatever the provider returned beyond the
/// identifying fields lands in [`values`](Self::values).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Stock symbol.
    pub symbol: Symbol,
    /// End date of the reporting period.
    #[serde(with = "dates::lenient")]
    pub report_period: NaiveDate,
    /// Period label as reported by the provider.
    #[serde(default)]
    pub period: Option<String>,
    /// Reporting currency.
    #[serde(default)]
    pub currency: String,
    /// Line item values keyed by canonical name.
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

impl LineItem {
    /// Creates an empty line item record.
    #[must_use]
    pub fn new(symbol: Symbol, report_period: NaiveDate) -> Self {
        Self {
            symbol,
            report_period,
            ..Default::default()
        }
    }

    /// Sets a numeric line item.
    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), Value::from(value));
        self
    }

    /// Returns a line item as a number, if present and numeric.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    /// Keeps only the named line items.
    ///
    /// An empty list keeps everything.
    pub fn retain_items<S: AsRef<str>>(&mut self, names: &[S]) {
        if names.is_empty() {
            return;
        }
        self.values
            .retain(|key, _| names.iter().any(|n| n.as_ref() == key));
    }
}

/// Insider or major holder transaction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InsiderTrade {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Issuer name.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Insider name.
    #[serde(default)]
    pub name: Option<String>,
    /// Insider title.
    #[serde(default)]
    pub title: Option<String>,
    /// Whether the insider sits on the board.
    #[serde(default)]
    pub is_board_director: Option<bool>,
    /// Date of the transaction.
    #[serde(default, with = "dates::lenient_option")]
    pub transaction_date: Option<NaiveDate>,
    /// Number of shares transacted.
    #[serde(default)]
    pub transaction_shares: Option<f64>,
    /// Price per share.
    #[serde(default)]
    pub transaction_price_per_share: Option<f64>,
    /// Total transaction value.
    #[serde(default)]
    pub transaction_value: Option<f64>,
    /// Shares held before the transaction.
    #[serde(default)]
    pub shares_owned_before_transaction: Option<f64>,
    /// Shares held after the transaction.
    #[serde(default)]
    pub shares_owned_after_transaction: Option<f64>,
    /// Security title.
    #[serde(default)]
    pub security_title: Option<String>,
    /// Date the transaction was filed.
    #[serde(default, with = "dates::lenient_option")]
    pub filing_date: Option<NaiveDate>,
}

impl InsiderTrade {
    /// Returns the date the trade is filtered and sorted by.
    ///
    /// This is the transaction date, falling back to the filing date.
    #[must_use]
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.transaction_date.or(self.filing_date)
    }
}

/// Company news article.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyNews {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Headline.
    pub title: String,
    /// Author.
    #[serde(default)]
    pub author: Option<String>,
    /// Publishing source.
    #[serde(default)]
    pub source: Option<String>,
    /// Publication date.
    #[serde(with = "dates::lenient")]
    pub date: NaiveDate,
    /// Article URL.
    #[serde(default)]
    pub url: String,
    /// Sentiment label.
    #[serde(default)]
    pub sentiment: Option<String>,
}

impl CompanyNews {
    /// Creates a news record with required fields.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        date: NaiveDate,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            date,
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_from_provider_row() {
        let price: Price = serde_json::from_value(json!({
            "symbol": "600519.sh",
            "time": "2024-01-02T00:00:00",
            "open": 1700.0,
            "high": 1720.5,
            "low": 1690.0,
            "close": 1710.0,
            "volume": 12000,
        }))
        .unwrap();
        assert_eq!(price.symbol.as_str(), "600519.SH");
        assert_eq!(price.time, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(price.volume, 12000.0);
    }

    #[test]
    fn test_metrics_missing_fields_are_none() {
        let metrics: FinancialMetrics = serde_json::from_value(json!({
            "symbol": "AAPL",
            "report_period": "2024-03-31",
            "market_cap": 2.8e12,
            "earnings_growth": null,
        }))
        .unwrap();
        assert_eq!(metrics.market_cap, Some(2.8e12));
        assert_eq!(metrics.earnings_growth, None);
        assert_eq!(metrics.return_on_equity, None);
    }

    #[test]
    fn test_line_item_collects_unknown_fields() {
        let item: LineItem = serde_json::from_value(json!({
            "symbol": "AAPL",
            "report_period": "2024-03-31",
            "period": "Q1",
            "revenue": 90.75e9,
            "net_income": 23.6e9,
        }))
        .unwrap();
        assert_eq!(item.get("revenue"), Some(90.75e9));
        assert_eq!(item.values.len(), 2);

        let mut item = item;
        item.retain_items(&["net_income"]);
        assert_eq!(item.get("revenue"), None);
        assert_eq!(item.get("net_income"), Some(23.6e9));
    }

    #[test]
    fn test_insider_trade_effective_date() {
        let filed = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let traded = NaiveDate::from_ymd_opt(2024, 1, 29).unwrap();

        let mut trade = InsiderTrade {
            filing_date: Some(filed),
            ..Default::default()
        };
        assert_eq!(trade.effective_date(), Some(filed));

        trade.transaction_date = Some(traded);
        assert_eq!(trade.effective_date(), Some(traded));
    }

    #[test]
    fn test_dates_serialize_as_plain_days() {
        let news = CompanyNews::new(
            Symbol::new("AAPL"),
            NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            "Headline",
            "https://example.com/a",
        );
        let value = serde_json::to_value(&news).unwrap();
        assert_eq!(value["date"], "2024-05-06");
    }
}
