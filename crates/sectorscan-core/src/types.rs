//! Core data types for the sector fundamentals engine.
//!
//! This module defines:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`IncomeQuarter`] / [`BalanceQuarter`] - One quarter of statement line items
//! - [`SymbolRecord`] - Flat per-symbol output row
//! - [`SymbolUniverseResult`] - Partition of a run's input symbols
//! - [`SectorUniverse`] - Engine input: sector name to ordered symbol list

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A trading symbol/ticker.
///
/// Symbols are uppercased on creation so cache keys and result partitions
/// never split on letter case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// One quarter of income-statement line items.
///
/// Absent line items stay `None`; they are never defaulted to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IncomeQuarter {
    /// End date of the fiscal quarter, as reported by the source.
    pub fiscal_date_ending: Option<String>,
    /// Total revenue.
    pub revenue: Option<f64>,
    /// Gross profit.
    pub gross_profit: Option<f64>,
    /// Net income.
    pub net_income: Option<f64>,
}

/// One quarter of balance-sheet line items.
///
/// Absent line items stay `None`; they are never defaulted to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceQuarter {
    /// End date of the fiscal quarter, as reported by the source.
    pub fiscal_date_ending: Option<String>,
    /// Total assets.
    pub total_assets: Option<f64>,
    /// Total liabilities.
    pub total_liabilities: Option<f64>,
    /// Total shareholder equity.
    pub total_equity: Option<f64>,
    /// Cash and cash equivalents at carrying value.
    pub cash: Option<f64>,
}

/// Flat per-symbol record merging the four reports.
///
/// Built fresh on every run and never mutated after being returned. Quarter
/// vectors hold exactly as many elements as quarterly reports were returned
/// (at most four, newest first); the price vector holds at most seven
/// adjusted closes, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Company name.
    pub name: Option<String>,
    /// Business sector.
    pub sector: Option<String>,
    /// Industry within the sector.
    pub industry: Option<String>,
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// Price-to-earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Price/earnings-to-growth ratio.
    pub peg_ratio: Option<f64>,
    /// Net profit margin.
    pub profit_margin: Option<f64>,
    /// Operating margin, trailing twelve months.
    pub operating_margin: Option<f64>,
    /// EBITDA.
    pub ebitda: Option<f64>,
    /// Gross profit, trailing twelve months.
    pub gross_profit_ttm: Option<f64>,
    /// Book value per share.
    pub book_value: Option<f64>,
    /// Price-to-book ratio.
    pub price_to_book: Option<f64>,
    /// Up to seven most recent daily adjusted closes, newest first.
    pub prices: Vec<f64>,
    /// Up to four most recent income quarters, newest first.
    pub income_quarters: Vec<IncomeQuarter>,
    /// Up to four most recent balance quarters, newest first.
    pub balance_quarters: Vec<BalanceQuarter>,
    /// Total liabilities over shareholder equity for the latest quarter.
    pub debt_to_equity: Option<f64>,
    /// True iff both income and balance reports were retrieved non-empty.
    pub is_complete: bool,
    /// When the underlying overview data was retrieved.
    pub last_updated: DateTime<Utc>,
}

impl SymbolRecord {
    /// Creates an empty record for a symbol, stamped now.
    #[must_use]
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            name: None,
            sector: None,
            industry: None,
            market_cap: None,
            pe_ratio: None,
            eps: None,
            peg_ratio: None,
            profit_margin: None,
            operating_margin: None,
            ebitda: None,
            gross_profit_ttm: None,
            book_value: None,
            price_to_book: None,
            prices: Vec::new(),
            income_quarters: Vec::new(),
            balance_quarters: Vec::new(),
            debt_to_equity: None,
            is_complete: false,
            last_updated: Utc::now(),
        }
    }
}

/// Result of running the engine across a symbol universe.
///
/// Every input symbol lands in exactly one of `records` or `failed`, never
/// both and never neither.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolUniverseResult {
    /// Successfully built records, sorted by symbol.
    pub records: Vec<SymbolRecord>,
    /// Symbols for which no record could be built.
    pub failed: BTreeSet<Symbol>,
}

impl SymbolUniverseResult {
    /// Number of input symbols accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.records.len() + self.failed.len()
    }

    /// True when not a single record could be produced.
    #[must_use]
    pub fn is_total_failure(&self) -> bool {
        self.records.is_empty() && !self.failed.is_empty()
    }
}

/// Engine input: a mapping from sector name to an ordered list of symbols.
///
/// How the mapping is produced (spreadsheets, config files) is the loader's
/// concern; the engine only consumes it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorUniverse {
    sectors: BTreeMap<String, Vec<Symbol>>,
}

impl SectorUniverse {
    /// Creates an empty universe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sector with its symbols, extending the sector if it exists.
    pub fn insert(&mut self, sector: impl Into<String>, symbols: Vec<Symbol>) {
        self.sectors.entry(sector.into()).or_default().extend(symbols);
    }

    /// Sector names in sorted order.
    pub fn sectors(&self) -> impl Iterator<Item = &str> {
        self.sectors.keys().map(String::as_str)
    }

    /// Symbols of one sector, in insertion order.
    #[must_use]
    pub fn sector_symbols(&self, sector: &str) -> Option<&[Symbol]> {
        self.sectors.get(sector).map(Vec::as_slice)
    }

    /// All symbols across sectors, order-preserving and deduplicated.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        let mut seen = BTreeSet::new();
        self.sectors
            .values()
            .flatten()
            .filter(|s| seen.insert((*s).clone()))
            .cloned()
            .collect()
    }

    /// Number of sectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    /// True when no sectors are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl FromIterator<(String, Vec<Symbol>)> for SectorUniverse {
    fn from_iter<I: IntoIterator<Item = (String, Vec<Symbol>)>>(iter: I) -> Self {
        let mut universe = Self::new();
        for (sector, symbols) in iter {
            universe.insert(sector, symbols);
        }
        universe
    }
}
