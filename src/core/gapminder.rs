use crate::domain::model::{GapminderRecord, RawTable};
use crate::utils::error::{EtlError, Result};
use std::str::FromStr;

/// Typed rows of the country-statistics table, in source order.
pub fn normalize_gapminder(raw: &RawTable) -> Result<Vec<GapminderRecord>> {
    let idx: Vec<usize> = GapminderRecord::COLUMNS
        .iter()
        .map(|c| raw.require_column(c))
        .collect::<Result<_>>()?;

    (0..raw.len())
        .map(|row| {
            let text = |i: usize| raw.cell(row, idx[i]).unwrap_or("").trim().to_string();
            Ok(GapminderRecord {
                country: text(0),
                continent: text(1),
                year: parse_cell(raw, row, idx[2])?,
                life_exp: parse_cell(raw, row, idx[3])?,
                pop: parse_cell(raw, row, idx[4])?,
                gdp_pc: parse_cell(raw, row, idx[5])?,
            })
        })
        .collect()
}

fn parse_cell<T: FromStr>(raw: &RawTable, row: usize, column: usize) -> Result<T> {
    let value = raw.cell(row, column).unwrap_or("").trim();
    value.parse().map_err(|_| EtlError::ValueCoercionError {
        column: raw.headers[column].clone(),
        row,
        value: value.to_string(),
    })
}
