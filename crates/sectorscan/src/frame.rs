//! Flat DataFrame view of the record table.
//!
//! Downstream collaborators (table rendering, CSV/Excel export, filtering)
//! consume the universe result as one wide frame: prices become
//! `price_1..price_7` (newest first) and quarterly line items become
//! `*_q1..*_q4` columns. Cells without data are null, never zero.

use polars::prelude::*;
use sectorscan_core::{EngineError, Result, SymbolRecord};

/// Number of price columns in the flat table.
const PRICE_COLS: usize = 7;

/// Number of quarter columns per statement line item.
const QUARTER_COLS: usize = 4;

/// Converts records into one flat, wide DataFrame.
///
/// # Errors
/// Returns an error if the frame cannot be assembled.
pub fn to_dataframe(records: &[SymbolRecord]) -> Result<DataFrame> {
    let mut columns = vec![
        Column::new(
            "symbol".into(),
            records.iter().map(|r| r.symbol.to_string()).collect::<Vec<_>>(),
        ),
        text_col("name", records, |r| r.name.clone()),
        text_col("sector", records, |r| r.sector.clone()),
        text_col("industry", records, |r| r.industry.clone()),
        scalar_col("market_cap", records, |r| r.market_cap),
        scalar_col("pe_ratio", records, |r| r.pe_ratio),
        scalar_col("eps", records, |r| r.eps),
        scalar_col("peg_ratio", records, |r| r.peg_ratio),
        scalar_col("profit_margin", records, |r| r.profit_margin),
        scalar_col("operating_margin", records, |r| r.operating_margin),
        scalar_col("ebitda", records, |r| r.ebitda),
        scalar_col("gross_profit_ttm", records, |r| r.gross_profit_ttm),
        scalar_col("book_value", records, |r| r.book_value),
        scalar_col("price_to_book", records, |r| r.price_to_book),
        scalar_col("debt_to_equity", records, |r| r.debt_to_equity),
        Column::new(
            "is_complete".into(),
            records.iter().map(|r| r.is_complete).collect::<Vec<bool>>(),
        ),
        Column::new(
            "last_updated".into(),
            records
                .iter()
                .map(|r| r.last_updated.to_rfc3339())
                .collect::<Vec<_>>(),
        ),
    ];

    for i in 0..PRICE_COLS {
        columns.push(scalar_col(&format!("price_{}", i + 1), records, |r| {
            r.prices.get(i).copied()
        }));
    }

    for i in 0..QUARTER_COLS {
        let q = i + 1;
        columns.push(scalar_col(&format!("income_revenue_q{q}"), records, |r| {
            r.income_quarters.get(i).and_then(|quarter| quarter.revenue)
        }));
        columns.push(scalar_col(&format!("income_gross_profit_q{q}"), records, |r| {
            r.income_quarters.get(i).and_then(|quarter| quarter.gross_profit)
        }));
        columns.push(scalar_col(&format!("income_net_income_q{q}"), records, |r| {
            r.income_quarters.get(i).and_then(|quarter| quarter.net_income)
        }));
        columns.push(scalar_col(&format!("balance_total_assets_q{q}"), records, |r| {
            r.balance_quarters.get(i).and_then(|quarter| quarter.total_assets)
        }));
        columns.push(scalar_col(
            &format!("balance_total_liabilities_q{q}"),
            records,
            |r| {
                r.balance_quarters
                    .get(i)
                    .and_then(|quarter| quarter.total_liabilities)
            },
        ));
        columns.push(scalar_col(&format!("balance_total_equity_q{q}"), records, |r| {
            r.balance_quarters.get(i).and_then(|quarter| quarter.total_equity)
        }));
        columns.push(scalar_col(&format!("balance_cash_q{q}"), records, |r| {
            r.balance_quarters.get(i).and_then(|quarter| quarter.cash)
        }));
    }

    DataFrame::new(columns).map_err(|e| EngineError::Other(e.to_string()))
}

/// Nullable float column from one record field.
fn scalar_col(
    name: &str,
    records: &[SymbolRecord],
    field: impl Fn(&SymbolRecord) -> Option<f64>,
) -> Column {
    Column::new(
        name.into(),
        records.iter().map(field).collect::<Vec<Option<f64>>>(),
    )
}

/// Nullable string column from one record field.
fn text_col(
    name: &str,
    records: &[SymbolRecord],
    field: impl Fn(&SymbolRecord) -> Option<String>,
) -> Column {
    Column::new(
        name.into(),
        records.iter().map(field).collect::<Vec<Option<String>>>(),
    )
}
