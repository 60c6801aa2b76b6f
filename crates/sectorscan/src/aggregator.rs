//! Per-symbol aggregation: merges the four reports into one flat record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sectorscan_core::{
    BalanceQuarter, EngineError, IncomeQuarter, ReportKey, ReportType, Result, Symbol,
    SymbolRecord,
    coerce::{parse_numeric, parse_text, round2},
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::resolver::ReportResolver;

/// Maximum quarterly reports extracted per statement.
const MAX_QUARTERS: usize = 4;

/// Maximum daily closes extracted from the price series.
const MAX_PRICES: usize = 7;

/// Payload key holding the quarterly report array in statement payloads.
const QUARTERLY_REPORTS: &str = "quarterlyReports";

/// Payload key holding the dated entries in the price payload.
const DAILY_SERIES: &str = "Time Series (Daily)";

/// Payload key of the adjusted close inside one dated price entry.
const ADJUSTED_CLOSE: &str = "5. adjusted close";

/// Builds one [`SymbolRecord`] from the four per-symbol reports.
///
/// The four fetches are logically independent: a gap in income, balance or
/// prices degrades the record, while a missing overview fails the symbol
/// outright since there is no identity to attach anything to.
pub struct SymbolAggregator {
    resolver: Arc<ReportResolver>,
}

impl std::fmt::Debug for SymbolAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolAggregator").finish_non_exhaustive()
    }
}

impl SymbolAggregator {
    /// Creates an aggregator resolving reports through `resolver`.
    #[must_use]
    pub fn new(resolver: Arc<ReportResolver>) -> Self {
        Self { resolver }
    }

    /// Fetches the four reports for `symbol` and merges them into one record.
    ///
    /// # Errors
    /// Returns [`EngineError::SymbolUnresolved`] when no usable overview
    /// payload can be obtained from either the remote source or the cache.
    pub async fn build(&self, symbol: &Symbol, force_refresh: bool) -> Result<SymbolRecord> {
        let overview_key = ReportKey::new(ReportType::Overview, symbol.clone());
        let overview = self
            .resolver
            .resolve(&overview_key, force_refresh)
            .await
            .into_payload()
            .filter(|payload| !is_blank_payload(payload));
        let Some(overview) = overview else {
            warn!(symbol = %symbol, "no usable overview, symbol unresolved");
            return Err(EngineError::SymbolUnresolved(symbol.clone()));
        };

        let income = self.report(ReportType::IncomeStatement, symbol, force_refresh).await;
        let balance = self.report(ReportType::BalanceSheet, symbol, force_refresh).await;
        let prices = self.report(ReportType::DailyPrices, symbol, force_refresh).await;

        if income.is_none() {
            debug!(symbol = %symbol, "income statement missing");
        }
        if balance.is_none() {
            debug!(symbol = %symbol, "balance sheet missing");
        }

        let mut record = SymbolRecord::new(symbol.clone());
        apply_overview(&mut record, &overview);
        record.prices = prices.as_ref().map(extract_prices).unwrap_or_default();
        record.income_quarters = income
            .as_ref()
            .map(extract_income_quarters)
            .unwrap_or_default();
        record.balance_quarters = balance
            .as_ref()
            .map(extract_balance_quarters)
            .unwrap_or_default();
        record.debt_to_equity = derive_debt_to_equity(&record.balance_quarters);
        record.is_complete = income.is_some() && balance.is_some();
        record.last_updated = self.entry_timestamp(&overview_key).await;

        Ok(record)
    }

    /// Resolves one non-overview report, mapping blank payloads to `None`.
    async fn report(
        &self,
        report_type: ReportType,
        symbol: &Symbol,
        force_refresh: bool,
    ) -> Option<Value> {
        let key = ReportKey::new(report_type, symbol.clone());
        self.resolver
            .resolve(&key, force_refresh)
            .await
            .into_payload()
            .filter(|payload| !is_blank_payload(payload))
    }

    /// Storage time of the overview entry; wall clock when the cache has none.
    async fn entry_timestamp(&self, key: &ReportKey) -> DateTime<Utc> {
        match self.resolver.cache().get(key).await {
            Ok(Some(entry)) => entry.stored_at,
            _ => Utc::now(),
        }
    }
}

/// True for payloads that carry no report data: null or empty containers, or
/// advisory-only bodies that were cached before classification learned about
/// their message field.
fn is_blank_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => {
            map.is_empty()
                || map
                    .keys()
                    .all(|k| matches!(k.as_str(), "Information" | "Note" | "Error Message"))
        }
        _ => false,
    }
}

/// Copies identity and scalar metrics out of the overview payload.
fn apply_overview(record: &mut SymbolRecord, overview: &Value) {
    record.name = parse_text(overview.get("Name"));
    record.sector = parse_text(overview.get("Sector"));
    record.industry = parse_text(overview.get("Industry"));
    record.market_cap = parse_numeric(overview.get("MarketCapitalization"));
    record.pe_ratio = parse_numeric(overview.get("PERatio"));
    record.eps = parse_numeric(overview.get("EPS"));
    record.peg_ratio = parse_numeric(overview.get("PEGRatio"));
    record.profit_margin = parse_numeric(overview.get("ProfitMargin"));
    record.operating_margin = parse_numeric(overview.get("OperatingMarginTTM"));
    record.ebitda = parse_numeric(overview.get("EBITDA"));
    record.gross_profit_ttm = parse_numeric(overview.get("GrossProfitTTM"));
    record.book_value = parse_numeric(overview.get("BookValue"));
    record.price_to_book = parse_numeric(overview.get("PriceToBookRatio"));
}

/// The quarterly report array of a statement payload, in source order.
fn quarterly_reports(payload: &Value) -> &[Value] {
    payload
        .get(QUARTERLY_REPORTS)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

/// Up to four most recent income quarters, in source order.
fn extract_income_quarters(payload: &Value) -> Vec<IncomeQuarter> {
    quarterly_reports(payload)
        .iter()
        .take(MAX_QUARTERS)
        .map(|report| IncomeQuarter {
            fiscal_date_ending: parse_text(report.get("fiscalDateEnding")),
            revenue: parse_numeric(report.get("totalRevenue")),
            gross_profit: parse_numeric(report.get("grossProfit")),
            net_income: parse_numeric(report.get("netIncome")),
        })
        .collect()
}

/// Up to four most recent balance quarters, in source order.
fn extract_balance_quarters(payload: &Value) -> Vec<BalanceQuarter> {
    quarterly_reports(payload)
        .iter()
        .take(MAX_QUARTERS)
        .map(|report| BalanceQuarter {
            fiscal_date_ending: parse_text(report.get("fiscalDateEnding")),
            total_assets: parse_numeric(report.get("totalAssets")),
            total_liabilities: parse_numeric(report.get("totalLiabilities")),
            total_equity: parse_numeric(report.get("totalShareholderEquity")),
            cash: parse_numeric(report.get("cashAndCashEquivalentsAtCarryingValue")),
        })
        .collect()
}

/// Total liabilities over shareholder equity for the latest quarter, rounded
/// to two decimals; `None` on a missing operand or zero equity.
fn derive_debt_to_equity(balance_quarters: &[BalanceQuarter]) -> Option<f64> {
    let latest = balance_quarters.first()?;
    let liabilities = latest.total_liabilities?;
    let equity = latest.total_equity?;
    if equity == 0.0 {
        return None;
    }
    Some(round2(liabilities / equity))
}

/// Adjusted closes for the seven most recent dates, newest first.
///
/// The seven most recent dated entries are selected first; entries among them
/// lacking a parsable adjusted close are then skipped, so the result can hold
/// fewer than seven values.
fn extract_prices(payload: &Value) -> Vec<f64> {
    let Some(series) = payload.get(DAILY_SERIES).and_then(Value::as_object) else {
        return Vec::new();
    };

    let mut dates: Vec<&String> = series.keys().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    dates
        .into_iter()
        .take(MAX_PRICES)
        .filter_map(|date| parse_numeric(series.get(date)?.get(ADJUSTED_CLOSE)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sectorscan_cache::InMemoryCache;
    use sectorscan_core::{FetchOutcome, ReportFetcher};
    use serde_json::json;

    /// Fetcher answering each report type with a fixed outcome.
    struct ReportTable {
        overview: FetchOutcome,
        income: FetchOutcome,
        balance: FetchOutcome,
        prices: FetchOutcome,
    }

    impl ReportTable {
        fn status_quo() -> Self {
            Self {
                overview: FetchOutcome::Success(overview_fixture()),
                income: FetchOutcome::Success(income_fixture(2)),
                balance: FetchOutcome::Success(balance_fixture()),
                prices: FetchOutcome::Success(prices_fixture(3, true)),
            }
        }
    }

    #[async_trait]
    impl ReportFetcher for ReportTable {
        fn name(&self) -> &str {
            "table"
        }

        async fn fetch(&self, key: &ReportKey) -> FetchOutcome {
            match key.report_type {
                ReportType::Overview => self.overview.clone(),
                ReportType::IncomeStatement => self.income.clone(),
                ReportType::BalanceSheet => self.balance.clone(),
                ReportType::DailyPrices => self.prices.clone(),
            }
        }
    }

    fn overview_fixture() -> Value {
        json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "Sector": "Technology",
            "Industry": "Consumer Electronics",
            "MarketCapitalization": "2500000000000",
            "PERatio": "28.5",
            "EPS": "6.42",
            "PEGRatio": "2.1",
            "ProfitMargin": "0.25",
            "OperatingMarginTTM": "0.30",
            "EBITDA": "125000000000",
            "GrossProfitTTM": "170000000000",
            "BookValue": "3.85",
            "PriceToBookRatio": "44.6",
            "SomeUnexpectedField": {"nested": true}
        })
    }

    /// Income payload with `quarters` quarterly reports, newest first.
    fn income_fixture(quarters: usize) -> Value {
        let reports: Vec<Value> = (0..quarters)
            .map(|i| {
                json!({
                    "fiscalDateEnding": format!("{}-12-30", 2024 - i),
                    "totalRevenue": format!("{}", 90_000 - 1_000 * i),
                    "grossProfit": format!("{}", 40_000 - 500 * i),
                    "netIncome": format!("{}", 20_000 - 250 * i),
                })
            })
            .collect();
        json!({"symbol": "AAPL", "quarterlyReports": reports})
    }

    fn balance_fixture() -> Value {
        json!({
            "symbol": "AAPL",
            "quarterlyReports": [{
                "fiscalDateEnding": "2024-12-30",
                "totalAssets": "350000",
                "totalLiabilities": "150000",
                "totalShareholderEquity": "75000",
                "cashAndCashEquivalentsAtCarryingValue": "60000"
            }]
        })
    }

    /// Price payload with `days` dated entries; when `drop_one` is set the
    /// second-newest entry has no adjusted close.
    fn prices_fixture(days: usize, drop_one: bool) -> Value {
        let mut series = serde_json::Map::new();
        for i in 0..days {
            let date = format!("2025-01-{:02}", 20 - i);
            let mut entry = serde_json::Map::new();
            entry.insert("1. open".to_string(), json!("100.0"));
            entry.insert("4. close".to_string(), json!("101.0"));
            if !(drop_one && i == 1) {
                entry.insert(
                    ADJUSTED_CLOSE.to_string(),
                    json!(format!("{}", 200.0 - i as f64)),
                );
            }
            series.insert(date, Value::Object(entry));
        }
        json!({"Meta Data": {}, (DAILY_SERIES): Value::Object(series)})
    }

    fn aggregator(fetcher: ReportTable) -> SymbolAggregator {
        let cache = Arc::new(InMemoryCache::new());
        let resolver = Arc::new(ReportResolver::new(Arc::new(fetcher), cache));
        SymbolAggregator::new(resolver)
    }

    #[tokio::test]
    async fn builds_a_full_record() {
        let aggregator = aggregator(ReportTable::status_quo());
        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();

        assert_eq!(record.symbol, Symbol::new("AAPL"));
        assert_eq!(record.name.as_deref(), Some("Apple Inc"));
        assert_eq!(record.sector.as_deref(), Some("Technology"));
        assert_eq!(record.market_cap, Some(2_500_000_000_000.0));
        assert_eq!(record.pe_ratio, Some(28.5));
        assert_eq!(record.eps, Some(6.42));
        assert_eq!(record.operating_margin, Some(0.30));
        assert_eq!(record.income_quarters.len(), 2);
        assert_eq!(record.income_quarters[0].revenue, Some(90_000.0));
        assert_eq!(record.balance_quarters.len(), 1);
        // 150000 / 75000
        assert_eq!(record.debt_to_equity, Some(2.0));
        // Three dated entries, one of them without an adjusted close.
        assert_eq!(record.prices, vec![200.0, 198.0]);
        assert!(record.is_complete);
    }

    #[tokio::test]
    async fn empty_overview_fails_the_symbol() {
        let mut table = ReportTable::status_quo();
        table.overview = FetchOutcome::Empty;
        let aggregator = aggregator(table);

        let err = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap_err();
        assert!(matches!(err, EngineError::SymbolUnresolved(_)));
    }

    #[tokio::test]
    async fn blank_overview_payload_fails_the_symbol() {
        let mut table = ReportTable::status_quo();
        table.overview = FetchOutcome::Success(json!({}));
        let aggregator = aggregator(table);

        let err = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap_err();
        assert!(matches!(err, EngineError::SymbolUnresolved(_)));
    }

    #[tokio::test]
    async fn missing_income_degrades_the_record() {
        let mut table = ReportTable::status_quo();
        table.income = FetchOutcome::Empty;
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert!(record.income_quarters.is_empty());
        assert!(!record.is_complete);
        // Balance-derived fields are unaffected.
        assert_eq!(record.debt_to_equity, Some(2.0));
    }

    #[tokio::test]
    async fn missing_balance_leaves_ratio_unknown() {
        let mut table = ReportTable::status_quo();
        table.balance = FetchOutcome::Empty;
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert!(record.balance_quarters.is_empty());
        assert_eq!(record.debt_to_equity, None);
        assert!(!record.is_complete);
    }

    #[tokio::test]
    async fn six_quarters_trim_to_four_newest_first() {
        let mut table = ReportTable::status_quo();
        table.income = FetchOutcome::Success(income_fixture(6));
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert_eq!(record.income_quarters.len(), 4);
        assert_eq!(record.income_quarters[0].revenue, Some(90_000.0));
        assert_eq!(record.income_quarters[3].revenue, Some(87_000.0));
    }

    #[tokio::test]
    async fn ten_price_days_trim_to_seven_newest_first() {
        let mut table = ReportTable::status_quo();
        table.prices = FetchOutcome::Success(prices_fixture(10, false));
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert_eq!(record.prices.len(), 7);
        assert_eq!(record.prices[0], 200.0);
        assert_eq!(record.prices[6], 194.0);
    }

    #[tokio::test]
    async fn zero_equity_leaves_ratio_unknown() {
        let mut table = ReportTable::status_quo();
        table.balance = FetchOutcome::Success(json!({
            "quarterlyReports": [{
                "totalLiabilities": "150000",
                "totalShareholderEquity": "0"
            }]
        }));
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert_eq!(record.debt_to_equity, None);
    }

    #[tokio::test]
    async fn unknown_equity_marker_leaves_ratio_unknown() {
        let mut table = ReportTable::status_quo();
        table.balance = FetchOutcome::Success(json!({
            "quarterlyReports": [{
                "totalLiabilities": "150000",
                "totalShareholderEquity": "None"
            }]
        }));
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert_eq!(record.debt_to_equity, None);
        // The quarter itself is still recorded with the known line items.
        assert_eq!(record.balance_quarters.len(), 1);
        assert_eq!(record.balance_quarters[0].total_liabilities, Some(150_000.0));
        assert_eq!(record.balance_quarters[0].total_equity, None);
    }

    #[tokio::test]
    async fn unknown_overview_markers_stay_unknown() {
        let mut table = ReportTable::status_quo();
        table.overview = FetchOutcome::Success(json!({
            "Symbol": "AAPL",
            "Name": "Apple Inc",
            "PERatio": "None",
            "EPS": "-",
            "MarketCapitalization": "not-a-number"
        }));
        let aggregator = aggregator(table);

        let record = aggregator.build(&Symbol::new("AAPL"), false).await.unwrap();
        assert_eq!(record.pe_ratio, None);
        assert_eq!(record.eps, None);
        assert_eq!(record.market_cap, None);
        assert_eq!(record.name.as_deref(), Some("Apple Inc"));
    }

    #[test]
    fn blank_payload_detection() {
        assert!(is_blank_payload(&Value::Null));
        assert!(is_blank_payload(&json!({})));
        assert!(is_blank_payload(&json!([])));
        assert!(is_blank_payload(&json!({"Information": "anything"})));
        assert!(!is_blank_payload(&json!({"Symbol": "AAPL"})));
    }

    #[test]
    fn price_series_dates_sort_lexicographically_descending() {
        let payload = json!({
            (DAILY_SERIES): {
                "2025-01-03": {(ADJUSTED_CLOSE): "101.5"},
                "2025-01-10": {(ADJUSTED_CLOSE): "104.0"},
                "2024-12-31": {(ADJUSTED_CLOSE): "99.0"},
            }
        });
        assert_eq!(extract_prices(&payload), vec![104.0, 101.5, 99.0]);
    }

    #[test]
    fn missing_series_yields_no_prices() {
        assert!(extract_prices(&json!({"Meta Data": {}})).is_empty());
    }
}
