use crate::domain::model::{RawTable, ReturnSeries};
use crate::utils::error::{EtlError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::{BTreeMap, HashMap};

pub const DATE_COLUMN: &str = "date";
pub const SYMBOL_COLUMN: &str = "symbol";
pub const PRICE_COLUMN: &str = "adjclose";

/// Cumulative percentage return per symbol from a long `date,symbol,adjclose` table.
///
/// Prices are pivoted to one row per date, forward-filled, then chained as
/// `prod(p_t / p_{t-1}) * 100 - 100`. A symbol's value is null up to and
/// including the date of its first price.
pub fn cumulative_returns(raw: &RawTable) -> Result<ReturnSeries> {
    let date_idx = raw.require_column(DATE_COLUMN)?;
    let symbol_idx = raw.require_column(SYMBOL_COLUMN)?;
    let price_idx = raw.require_column(PRICE_COLUMN)?;

    let mut symbols: Vec<String> = Vec::new();
    let mut symbol_pos: HashMap<String, usize> = HashMap::new();
    let mut prices: BTreeMap<NaiveDate, HashMap<usize, f64>> = BTreeMap::new();

    for row in 0..raw.len() {
        let date_text = raw.cell(row, date_idx).unwrap_or("").trim();
        let date = parse_date(date_text).ok_or_else(|| EtlError::ValueCoercionError {
            column: DATE_COLUMN.to_string(),
            row,
            value: date_text.to_string(),
        })?;

        let symbol = raw.cell(row, symbol_idx).unwrap_or("").trim();
        if symbol.is_empty() {
            return Err(EtlError::schema(format!("row {} has an empty symbol", row)));
        }
        let col = *symbol_pos.entry(symbol.to_string()).or_insert_with(|| {
            symbols.push(symbol.to_string());
            symbols.len() - 1
        });

        let by_symbol = prices.entry(date).or_default();
        let Some(price) = parse_price(raw.cell(row, price_idx).unwrap_or(""), row)? else {
            continue;
        };
        if by_symbol.insert(col, price).is_some() {
            return Err(EtlError::schema(format!(
                "duplicate price for {} on {}",
                symbol, date
            )));
        }
    }

    let dates: Vec<NaiveDate> = prices.keys().copied().collect();
    let mut values = vec![vec![None; symbols.len()]; dates.len()];

    for col in 0..symbols.len() {
        let mut last_price: Option<f64> = None;
        let mut growth = 1.0;

        for (row, date) in dates.iter().enumerate() {
            let current = prices[date].get(&col).copied().or(last_price);
            if let (Some(prev), Some(cur)) = (last_price, current) {
                growth *= cur / prev;
                values[row][col] = Some(growth * 100.0 - 100.0);
            }
            last_price = current;
        }
    }

    tracing::debug!(
        "Computed returns for {} symbols over {} dates",
        symbols.len(),
        dates.len()
    );

    Ok(ReturnSeries {
        symbols,
        dates,
        values,
    })
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

/// Empty and NaN cells are missing prices; anything else must be a positive number.
fn parse_price(text: &str, row: usize) -> Result<Option<f64>> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(v) if v > 0.0 && v.is_finite() => Ok(Some(v)),
        _ => Err(EtlError::ValueCoercionError {
            column: PRICE_COLUMN.to_string(),
            row,
            value: text.to_string(),
        }),
    }
}
