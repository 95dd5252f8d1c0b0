use serde::{Deserialize, Serialize};

pub const DEFAULT_TOP_N_URL: &str =
    "https://raw.githubusercontent.com/mwiemers/python_presessional_app/main/tiobe_top20.csv";
pub const DEFAULT_HISTORY_URL: &str =
    "https://raw.githubusercontent.com/mwiemers/python_presessional_app/main/tiobe_history.csv";
pub const DEFAULT_GAPMINDER_URL: &str =
    "https://raw.githubusercontent.com/mwiemers/python_presessional_app/main/gapminder.csv";

/// Where each dataset is fetched from. Every entry is a URL or a local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSet {
    pub top_n: String,
    pub history: String,
    pub gapminder: Option<String>,
    pub prices: Option<String>,
}

impl Default for SourceSet {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N_URL.to_string(),
            history: DEFAULT_HISTORY_URL.to_string(),
            gapminder: Some(DEFAULT_GAPMINDER_URL.to_string()),
            prices: None,
        }
    }
}

/// Options consumed by the reshaping functions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReshapeOptions {
    /// Substring identifying the period-specific rank column of the snapshot.
    pub rank_column_marker: String,
    /// Name the located rank column is renamed to.
    pub rank_column_name: String,
    /// Row key of the wide history table.
    pub language_column: String,
    /// Extraneous column of the wide history table.
    pub dropped_column: String,
    pub exclusion_list: Vec<String>,
    /// Cell values meaning "unranked".
    pub null_placeholders: Vec<String>,
}

impl Default for ReshapeOptions {
    fn default() -> Self {
        Self {
            rank_column_marker: "Sept".to_string(),
            rank_column_name: "Rank".to_string(),
            language_column: "Programming Language".to_string(),
            dropped_column: "-".to_string(),
            exclusion_list: ["Pascal", "Visual Basic", "(Visual) Basic", "Prolog"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            null_placeholders: vec!["-".to_string(), String::new()],
        }
    }
}

impl ReshapeOptions {
    pub fn is_excluded(&self, language: &str) -> bool {
        self.exclusion_list.iter().any(|l| l == language)
    }

    pub fn is_placeholder(&self, cell: &str) -> bool {
        let cell = cell.trim();
        self.null_placeholders.iter().any(|p| p.trim() == cell)
    }
}
