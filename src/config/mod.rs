pub mod cli;
pub mod toml_config;

use crate::core::ConfigProvider;
use crate::domain::settings::{ReshapeOptions, SourceSet};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_source, Validate,
};
#[cfg(feature = "cli")]
use crate::domain::settings::{DEFAULT_GAPMINDER_URL, DEFAULT_HISTORY_URL, DEFAULT_TOP_N_URL};
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

/// Resolved configuration handed to the pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub sources: SourceSet,
    pub reshape: ReshapeOptions,
    pub output_path: String,
}

impl ConfigProvider for PipelineSettings {
    fn sources(&self) -> &SourceSet {
        &self.sources
    }

    fn reshape(&self) -> &ReshapeOptions {
        &self.reshape
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for PipelineSettings {
    fn validate(&self) -> Result<()> {
        validate_settings(&self.sources, &self.reshape, &self.output_path)
    }
}

pub(crate) fn validate_settings(
    sources: &SourceSet,
    reshape: &ReshapeOptions,
    output_path: &str,
) -> Result<()> {
    validate_source("sources.top_n", &sources.top_n)?;
    validate_source("sources.history", &sources.history)?;
    if let Some(gapminder) = &sources.gapminder {
        validate_source("sources.gapminder", gapminder)?;
    }
    if let Some(prices) = &sources.prices {
        validate_source("sources.prices", prices)?;
    }

    validate_non_empty_string("reshape.rank_column_marker", &reshape.rank_column_marker)?;
    validate_non_empty_string("reshape.rank_column_name", &reshape.rank_column_name)?;
    validate_non_empty_string("reshape.language_column", &reshape.language_column)?;
    validate_non_empty_string("reshape.dropped_column", &reshape.dropped_column)?;

    validate_path("load.output_path", output_path)
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "langrank-etl")]
#[command(about = "Fetch and normalize the Python workshop datasets")]
pub struct CliConfig {
    #[arg(long, default_value = DEFAULT_TOP_N_URL)]
    pub top_n_source: String,

    #[arg(long, default_value = DEFAULT_HISTORY_URL)]
    pub history_source: String,

    #[arg(long, default_value = DEFAULT_GAPMINDER_URL)]
    pub gapminder_source: String,

    #[arg(long, help = "Do not fetch the country-statistics dataset")]
    pub skip_gapminder: bool,

    #[arg(long, help = "Long price table (date,symbol,adjclose) for the returns chart")]
    pub prices_source: Option<String>,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', help = "Replace the language exclusion list")]
    pub exclude: Option<Vec<String>>,

    #[arg(long, default_value = "Sept")]
    pub rank_marker: String,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn to_settings(&self) -> PipelineSettings {
        let mut reshape = ReshapeOptions {
            rank_column_marker: self.rank_marker.clone(),
            ..ReshapeOptions::default()
        };
        if let Some(exclude) = &self.exclude {
            reshape.exclusion_list = exclude.clone();
        }

        PipelineSettings {
            sources: SourceSet {
                top_n: self.top_n_source.clone(),
                history: self.history_source.clone(),
                gapminder: (!self.skip_gapminder).then(|| self.gapminder_source.clone()),
                prices: self.prices_source.clone(),
            },
            reshape,
            output_path: self.output_path.clone(),
        }
    }
}
