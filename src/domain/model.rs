use crate::utils::error::{ErrorCategory, EtlError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A delimited table exactly as read: header row plus string cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| {
            EtlError::schema(format!(
                "column '{}' not found (available: {})",
                name,
                self.headers.join(", ")
            ))
        })
    }

    /// Cell lookup that tolerates ragged rows.
    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    pub language: String,
    pub rank: u32,
}

/// Single-period ranking table whose rank column carries a fixed name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSnapshot {
    pub table: RawTable,
    pub rank_column: String,
}

impl RankingSnapshot {
    /// Typed view of the snapshot. Languages must be non-empty and unique,
    /// ranks positive integers.
    pub fn ranking(&self, language_column: &str) -> Result<Vec<RankingEntry>> {
        let lang_idx = self.table.require_column(language_column)?;
        let rank_idx = self.table.require_column(&self.rank_column)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(self.table.len());

        for row in 0..self.table.len() {
            let language = self.table.cell(row, lang_idx).unwrap_or("").trim();
            if language.is_empty() {
                return Err(EtlError::schema(format!("row {} has an empty language", row)));
            }
            if !seen.insert(language.to_string()) {
                return Err(EtlError::schema(format!(
                    "language '{}' appears more than once",
                    language
                )));
            }

            let raw_rank = self.table.cell(row, rank_idx).unwrap_or("").trim();
            let rank = match raw_rank.parse::<u32>() {
                Ok(rank) if rank > 0 => rank,
                _ => {
                    return Err(EtlError::ValueCoercionError {
                        column: self.rank_column.clone(),
                        row,
                        value: raw_rank.to_string(),
                    })
                }
            };

            entries.push(RankingEntry {
                language: language.to_string(),
                rank,
            });
        }

        Ok(entries)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRow {
    pub year: String,
    pub language: String,
    /// `None` means unranked that year.
    pub rank: Option<f64>,
}

/// Long-format (year, language, rank) triples.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoricalRankingSeries {
    pub rows: Vec<HistoryRow>,
}

impl HistoricalRankingSeries {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct languages in first-seen order.
    pub fn languages(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.language.as_str())
            .filter(|l| seen.insert(*l))
            .collect()
    }

    /// Distinct years in first-seen order.
    pub fn years(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|r| r.year.as_str())
            .filter(|y| seen.insert(*y))
            .collect()
    }

    pub fn to_table(&self) -> RawTable {
        RawTable::new(
            vec!["year".to_string(), "language".to_string(), "rank".to_string()],
            self.rows
                .iter()
                .map(|r| {
                    vec![
                        r.year.clone(),
                        r.language.clone(),
                        r.rank.map(format_number).unwrap_or_default(),
                    ]
                })
                .collect(),
        )
    }
}

/// One row of the country-statistics dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapminderRecord {
    pub country: String,
    pub continent: String,
    pub year: i32,
    pub life_exp: f64,
    pub pop: f64,
    pub gdp_pc: f64,
}

impl GapminderRecord {
    pub const COLUMNS: [&'static str; 6] =
        ["country", "continent", "year", "life_exp", "pop", "gdp_pc"];

    pub fn to_table(records: &[GapminderRecord]) -> RawTable {
        RawTable::new(
            Self::COLUMNS.iter().map(|c| c.to_string()).collect(),
            records
                .iter()
                .map(|r| {
                    vec![
                        r.country.clone(),
                        r.continent.clone(),
                        r.year.to_string(),
                        format_number(r.life_exp),
                        format_number(r.pop),
                        format_number(r.gdp_pc),
                    ]
                })
                .collect(),
        )
    }
}

/// Cumulative percentage returns, one row per date and one column per symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub symbols: Vec<String>,
    pub dates: Vec<NaiveDate>,
    /// `values[date][symbol]`
    pub values: Vec<Vec<Option<f64>>>,
}

impl ReturnSeries {
    pub fn get(&self, date: NaiveDate, symbol: &str) -> Option<f64> {
        let row = self.dates.iter().position(|d| *d == date)?;
        let col = self.symbols.iter().position(|s| s == symbol)?;
        self.values[row][col]
    }

    pub fn to_table(&self) -> RawTable {
        let mut headers = vec!["date".to_string()];
        headers.extend(self.symbols.iter().cloned());

        let rows = self
            .dates
            .iter()
            .zip(&self.values)
            .map(|(date, values)| {
                let mut row = vec![date.format("%Y-%m-%d").to_string()];
                row.extend(values.iter().map(|v| v.map(format_number).unwrap_or_default()));
                row
            })
            .collect();

        RawTable::new(headers, rows)
    }
}

/// Per-dataset outcome; one failing section never aborts the others.
pub type Section<T> = std::result::Result<T, EtlError>;

/// Everything `extract` fetched. Optional datasets are `None` when not configured.
#[derive(Debug)]
pub struct RawDatasets {
    pub top_n: Section<RawTable>,
    pub history: Section<RawTable>,
    pub gapminder: Option<Section<RawTable>>,
    pub prices: Option<Section<RawTable>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionFailure {
    pub section: String,
    pub category: ErrorCategory,
    pub message: String,
}

impl SectionFailure {
    pub fn new(section: &str, error: &EtlError) -> Self {
        Self {
            section: section.to_string(),
            category: error.category(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub top_n: Option<RankingSnapshot>,
    pub history: Option<HistoricalRankingSeries>,
    pub gapminder: Option<Vec<GapminderRecord>>,
    pub returns: Option<ReturnSeries>,
    pub failures: Vec<SectionFailure>,
}

impl TransformResult {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Integral floats print without a fraction so ranks stay readable in CSV.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
