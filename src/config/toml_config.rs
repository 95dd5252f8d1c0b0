use crate::config::{validate_settings, PipelineSettings};
use crate::core::ConfigProvider;
use crate::domain::settings::{ReshapeOptions, SourceSet};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub pipeline: Option<PipelineInfo>,
    #[serde(default)]
    pub sources: SourceSet,
    #[serde(default)]
    pub reshape: ReshapeOptions,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineInfo {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: String,
    pub bundle_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub verbose: Option<bool>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(EtlError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| EtlError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_HOST})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| EtlError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring(&self) -> MonitoringConfig {
        self.monitoring.clone().unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.pipeline
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("langrank-etl")
    }

    pub fn into_settings(self) -> PipelineSettings {
        PipelineSettings {
            sources: self.sources,
            reshape: self.reshape,
            output_path: self.load.output_path,
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn sources(&self) -> &SourceSet {
        &self.sources
    }

    fn reshape(&self) -> &ReshapeOptions {
        &self.reshape
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn bundle_name(&self) -> &str {
        self.load.bundle_name.as_deref().unwrap_or("workshop_data.zip")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_settings(&self.sources, &self.reshape, &self.load.output_path)?;

        if let Some(bundle) = &self.load.bundle_name {
            if !bundle.ends_with(".zip") {
                return Err(EtlError::InvalidConfigValueError {
                    field: "load.bundle_name".to_string(),
                    value: bundle.clone(),
                    reason: "bundle name must end with .zip".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let toml_content = r#"
[load]
output_path = "./test-output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.sources, SourceSet::default());
        assert_eq!(config.reshape, ReshapeOptions::default());
        assert_eq!(config.bundle_name(), "workshop_data.zip");
        assert_eq!(config.name(), "langrank-etl");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[pipeline]
name = "workshop-data"

[sources]
top_n = "data/tiobe_top20.csv"
history = "data/tiobe_history.csv"
prices = "data/prices.csv"

[reshape]
rank_column_marker = "Rank"
exclusion_list = ["Prolog"]

[load]
output_path = "./out"
bundle_name = "charts.zip"

[monitoring]
json_logs = true
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.name(), "workshop-data");
        assert_eq!(config.sources.top_n, "data/tiobe_top20.csv");
        assert!(config.sources.gapminder.is_some());
        assert_eq!(config.reshape.rank_column_marker, "Rank");
        assert_eq!(config.reshape.exclusion_list, vec!["Prolog"]);
        assert_eq!(config.reshape.language_column, "Programming Language");
        assert_eq!(config.bundle_name(), "charts.zip");
        assert_eq!(config.monitoring().json_logs, Some(true));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("LANGRANK_TEST_HOST", "https://data.example.com");

        let toml_content = r#"
[sources]
top_n = "${LANGRANK_TEST_HOST}/top.csv"
history = "${LANGRANK_TEST_HOST}/history.csv"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.sources.top_n, "https://data.example.com/top.csv");

        std::env::remove_var("LANGRANK_TEST_HOST");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[sources]
history = "ftp://example.com/history.csv"

[load]
output_path = "./output"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let bad_bundle = r#"
[load]
output_path = "./output"
bundle_name = "charts.tar"
"#;
        let config = TomlConfig::from_toml_str(bad_bundle).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[pipeline]
name = "file-test"

[load]
output_path = "./output"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.name(), "file-test");
        assert_eq!(config.into_settings().output_path, "./output");
    }
}
