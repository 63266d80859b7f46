//! Declarative field maps from provider rows to canonical records.
//!
//! Every entity kind has a [`FieldMap`]: an ordered rename table, constant
//! defaults, and the list of canonical fields the provider never supplies.
//! The maps are plain data so they can be reviewed and tested on their own.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{error::Result, kind::EntityKind};

/// A raw provider row: a JSON object keyed by provider field name.
pub type RawRecord = Map<String, Value>;

/// Renames applied to every kind before the kind-specific table.
const COMMON_RENAMES: &[(&str, &str)] = &[("ticker", "symbol")];

/// Field translation table for one entity kind.
#[derive(Clone, Copy, Debug)]
pub struct FieldMap {
    /// Provider field name to canonical field name, applied in order.
    pub renames: &'static [(&'static str, &'static str)],
    /// Constant values for canonical fields the provider leaves empty.
    pub defaults: &'static [(&'static str, &'static str)],
    /// Canonical fields the provider never supplies; they stay `None`.
    pub unsupplied: &'static [&'static str],
}

/// Price bars.
pub const PRICE_FIELDS: FieldMap = FieldMap {
    renames: &[("date", "time"), ("timestamp", "time")],
    defaults: &[],
    unsupplied: &[],
};

/// Financial metrics.
pub const FINANCIAL_METRIC_FIELDS: FieldMap = FieldMap {
    renames: &[
        ("period_ending", "report_period"),
        ("fiscal_period", "period"),
        ("pe_ratio", "price_to_earnings_ratio"),
        ("price_to_book", "price_to_book_ratio"),
        ("price_to_sales", "price_to_sales_ratio"),
        ("ev_to_ebitda", "enterprise_value_to_ebitda_ratio"),
        ("enterprise_value_multiple", "enterprise_value_to_revenue_ratio"),
        ("price_earnings_to_growth_ratio", "peg_ratio"),
        ("gross_profit_margin", "gross_margin"),
        ("operating_profit_margin", "operating_margin"),
        ("net_profit_margin", "net_margin"),
        ("growth_operating_cash_flow", "operating_cash_flow_ratio"),
        ("growth_basic_earings_per_share", "earnings_per_share_growth"),
        ("growth_operating_income", "operating_income_growth"),
        ("growth_ebitda", "ebitda_growth"),
        ("growth_revenue", "revenue_growth"),
        ("eps_ttm", "earnings_per_share"),
    ],
    defaults: &[("currency", "CNY")],
    unsupplied: &["earnings_growth"],
};

/// Financial statement line items.
pub const LINE_ITEM_FIELDS: FieldMap = FieldMap {
    renames: &[
        ("period_ending", "report_period"),
        ("fiscal_period", "period"),
        ("timestamp", "time"),
        ("basic_earnings_per_share", "earnings_per_share"),
        ("pe_ratio", "price_to_earnings_ratio"),
        ("price_to_book", "price_to_book_ratio"),
        ("total_current_assets", "current_assets"),
        ("total_current_liabilities", "current_liabilities"),
        ("dividend_payout_ratio", "dividends_and_other_cash_distributions"),
        ("total_operating_income", "revenue"),
        ("operating_profit_margin", "operating_margin"),
        ("research_and_development_expense", "research_and_development"),
        ("gross_profit_margin", "gross_margin"),
        ("total_shareholders_equity", "shareholders_equity"),
    ],
    defaults: &[("currency", "CNY")],
    unsupplied: &["outstanding_shares", "free_cash_flow", "cash_and_equivalents"],
};

/// Insider and major holder trades.
pub const INSIDER_TRADE_FIELDS: FieldMap = FieldMap {
    renames: &[],
    defaults: &[],
    unsupplied: &[],
};

/// Company news.
pub const COMPANY_NEWS_FIELDS: FieldMap = FieldMap {
    renames: &[("published", "date")],
    defaults: &[("sentiment", "neutral")],
    unsupplied: &[],
};

impl EntityKind {
    /// Returns the field map for this kind.
    #[must_use]
    pub const fn field_map(&self) -> &'static FieldMap {
        match self {
            Self::Price => &PRICE_FIELDS,
            Self::FinancialMetric => &FINANCIAL_METRIC_FIELDS,
            Self::LineItem => &LINE_ITEM_FIELDS,
            Self::InsiderTrade => &INSIDER_TRADE_FIELDS,
            Self::CompanyNews => &COMPANY_NEWS_FIELDS,
        }
    }
}

impl FieldMap {
    /// Renames provider fields and fills defaults.
    ///
    /// When a row already carries the canonical field with a non-null value,
    /// that value wins and the provider alias is dropped.
    #[must_use]
    pub fn apply(&self, mut raw: RawRecord) -> RawRecord {
        for (from, to) in COMMON_RENAMES.iter().chain(self.renames) {
            let Some(value) = raw.remove(*from) else {
                continue;
            };
            if is_missing(raw.get(*to)) {
                raw.insert((*to).to_string(), value);
            }
        }

        for (field, value) in self.defaults {
            if is_missing(raw.get(*field)) {
                raw.insert((*field).to_string(), Value::from(*value));
            }
        }

        raw
    }

    /// Applies the map and deserializes the row into a canonical record.
    ///
    /// # Errors
    /// Returns [`DataError::Parse`](crate::DataError::Parse) if the mapped row
    /// does not deserialize into `T`.
    pub fn convert<T: DeserializeOwned>(&self, raw: RawRecord) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.apply(raw)))?)
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}
