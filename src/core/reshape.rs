//! Normalization of the ranking datasets.
//!
//! The history reshape runs as a chain of small named steps:
//! drop column → pivot longer → sort → coerce ranks → exclude languages.
//! Each step is public so it can be tested and reused on its own.

use crate::domain::model::{
    format_number, HistoricalRankingSeries, HistoryRow, RankingSnapshot, RawTable,
};
use crate::domain::settings::ReshapeOptions;
use crate::utils::error::{EtlError, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Rename the column whose header contains the marker to the canonical rank name.
///
/// Snapshots advertise both the current and the previous period (`Sept 2024`,
/// `Sept 2023`); the leftmost match is the current one and the others pass through.
pub fn normalize_top_n(raw: RawTable, options: &ReshapeOptions) -> Result<RankingSnapshot> {
    let marker = options.rank_column_marker.as_str();
    let Some(idx) = raw.headers.iter().position(|h| h.contains(marker)) else {
        return Err(EtlError::schema(format!(
            "no column header contains '{}' (headers: {})",
            marker,
            raw.headers.join(", ")
        )));
    };

    let target = options.rank_column_name.clone();
    if let Some(existing) = raw.column_index(&target) {
        if existing != idx {
            return Err(EtlError::schema(format!(
                "cannot rename '{}' to '{}': a column with that name already exists",
                raw.headers[idx], target
            )));
        }
    }

    let mut table = raw;
    tracing::debug!("Renaming snapshot column '{}' to '{}'", table.headers[idx], target);
    table.headers[idx] = target.clone();

    Ok(RankingSnapshot {
        table,
        rank_column: target,
    })
}

/// A long-format cell before rank coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongCell {
    pub year: String,
    pub language: String,
    pub value: String,
}

/// Wide history table → long, sorted, typed and filtered series.
pub fn normalize_history(
    raw: RawTable,
    options: &ReshapeOptions,
) -> Result<HistoricalRankingSeries> {
    let table = drop_column(raw, &options.dropped_column)?;
    let cells = pivot_longer(&table, &options.language_column)?;
    let cells = sort_by_year_then_rank(cells, options);
    let rows = coerce_ranks(cells, options)?;
    let rows = exclude_languages(rows, options);

    Ok(HistoricalRankingSeries { rows })
}

pub fn drop_column(mut table: RawTable, column: &str) -> Result<RawTable> {
    let idx = table.require_column(column)?;
    table.headers.remove(idx);
    for row in &mut table.rows {
        if idx < row.len() {
            row.remove(idx);
        }
    }
    Ok(table)
}

/// One output cell per (year, language); every header other than `key_column` is a year.
pub fn pivot_longer(table: &RawTable, key_column: &str) -> Result<Vec<LongCell>> {
    let key_idx = table.require_column(key_column)?;

    let year_columns: Vec<(usize, &String)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != key_idx)
        .collect();

    if let Some((_, header)) = year_columns.iter().find(|(_, h)| parse_year(h).is_none()) {
        return Err(EtlError::schema(format!(
            "column '{}' is not a year",
            header
        )));
    }

    let mut seen = HashSet::new();
    let mut cells = Vec::with_capacity(table.len() * year_columns.len());

    for (row_idx, row) in table.rows.iter().enumerate() {
        let language = row.get(key_idx).map(String::as_str).unwrap_or("");
        if language.trim().is_empty() {
            return Err(EtlError::schema(format!(
                "row {} has an empty '{}'",
                row_idx, key_column
            )));
        }
        if !seen.insert(language) {
            return Err(EtlError::schema(format!(
                "language '{}' appears in more than one row",
                language
            )));
        }

        for (col_idx, year) in &year_columns {
            cells.push(LongCell {
                year: (*year).clone(),
                language: language.to_string(),
                value: row.get(*col_idx).cloned().unwrap_or_default(),
            });
        }
    }

    Ok(cells)
}

/// Stable sort by year, then rank; placeholders and other non-numeric ranks sort last.
pub fn sort_by_year_then_rank(
    mut cells: Vec<LongCell>,
    options: &ReshapeOptions,
) -> Vec<LongCell> {
    cells.sort_by(|a, b| {
        compare_years(&a.year, &b.year).then_with(|| {
            rank_sort_key(&a.value, options).total_cmp(&rank_sort_key(&b.value, options))
        })
    });
    cells
}

fn rank_sort_key(value: &str, options: &ReshapeOptions) -> f64 {
    if options.is_placeholder(value) {
        return f64::INFINITY;
    }
    match value.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => f64::INFINITY,
    }
}

/// Years are integer headers; `pivot_longer` rejects anything else.
pub fn compare_years(a: &str, b: &str) -> Ordering {
    match (parse_year(a), parse_year(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

fn parse_year(header: &str) -> Option<i64> {
    header.trim().parse::<i64>().ok()
}

/// Placeholders become `None`; any other non-numeric or non-positive value is an error.
pub fn coerce_ranks(cells: Vec<LongCell>, options: &ReshapeOptions) -> Result<Vec<HistoryRow>> {
    cells
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            let rank = if options.is_placeholder(&cell.value) {
                None
            } else {
                match cell.value.trim().parse::<f64>() {
                    Ok(v) if v.is_nan() => None,
                    Ok(v) if v > 0.0 && v.is_finite() => Some(v),
                    _ => {
                        return Err(EtlError::ValueCoercionError {
                            column: "rank".to_string(),
                            row,
                            value: cell.value,
                        })
                    }
                }
            };

            Ok(HistoryRow {
                year: cell.year,
                language: cell.language,
                rank,
            })
        })
        .collect()
}

pub fn exclude_languages(rows: Vec<HistoryRow>, options: &ReshapeOptions) -> Vec<HistoryRow> {
    let before = rows.len();
    let kept: Vec<HistoryRow> = rows
        .into_iter()
        .filter(|r| !options.is_excluded(&r.language))
        .collect();

    if kept.len() != before {
        tracing::debug!("Excluded {} history rows", before - kept.len());
    }
    kept
}

/// Inverse of the pivot: back to one row per language, one column per year,
/// with the extraneous column restored empty. Missing pairs and null ranks
/// are written as the first null placeholder.
pub fn widen_history(series: &HistoricalRankingSeries, options: &ReshapeOptions) -> RawTable {
    let placeholder = options
        .null_placeholders
        .first()
        .cloned()
        .unwrap_or_default();

    let mut years = series.years();
    years.sort_by(|a, b| compare_years(a, b));

    let languages = series.languages();

    let lookup: HashMap<(&str, &str), Option<f64>> = series
        .rows
        .iter()
        .map(|r| ((r.language.as_str(), r.year.as_str()), r.rank))
        .collect();

    let mut headers = vec![options.language_column.clone(), options.dropped_column.clone()];
    headers.extend(years.iter().map(|y| y.to_string()));

    let rows = languages
        .iter()
        .map(|language| {
            let mut row = vec![language.to_string(), String::new()];
            row.extend(years.iter().map(|year| {
                match lookup.get(&(*language, *year)) {
                    Some(Some(rank)) => format_number(*rank),
                    _ => placeholder.clone(),
                }
            }));
            row
        })
        .collect();

    RawTable::new(headers, rows)
}
