//! Report categories and cache addressing keys.
//!
//! Each symbol is covered by four independent reports. A report fetch is
//! addressed by a [`ReportKey`], which also yields the deterministic content
//! hash used as the on-disk cache file name.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Symbol;

/// The four financial report categories fetched independently per symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportType {
    /// Company overview: identity plus scalar valuation metrics.
    Overview,
    /// Quarterly income statements.
    IncomeStatement,
    /// Quarterly balance sheets.
    BalanceSheet,
    /// Daily adjusted price series.
    DailyPrices,
}

impl ReportType {
    /// All report types required to build one symbol record.
    pub const ALL: [Self; 4] = [
        Self::Overview,
        Self::IncomeStatement,
        Self::BalanceSheet,
        Self::DailyPrices,
    ];

    /// The `function` query parameter value understood by the remote API.
    #[must_use]
    pub const fn query_function(self) -> &'static str {
        match self {
            Self::Overview => "OVERVIEW",
            Self::IncomeStatement => "INCOME_STATEMENT",
            Self::BalanceSheet => "BALANCE_SHEET",
            Self::DailyPrices => "TIME_SERIES_DAILY_ADJUSTED",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_function())
    }
}

/// Addressing key for one report of one symbol.
///
/// Entries are cached independently per key; refreshing one report type for a
/// symbol never touches the symbol's other reports.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReportKey {
    /// Report category.
    pub report_type: ReportType,
    /// Symbol the report belongs to.
    pub symbol: Symbol,
}

impl ReportKey {
    /// Creates a key for one report of one symbol.
    #[must_use]
    pub fn new(report_type: ReportType, symbol: impl Into<Symbol>) -> Self {
        Self {
            report_type,
            symbol: symbol.into(),
        }
    }

    /// Deterministic content hash of the key, used as the cache file stem.
    #[must_use]
    pub fn cache_id(&self) -> String {
        let material = format!("{}_{}", self.report_type.query_function(), self.symbol);
        blake3::hash(material.as_bytes()).to_hex().to_string()
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.report_type, self.symbol)
    }
}
