use crate::core::gapminder::normalize_gapminder;
use crate::core::loader::{load_raw, write_table};
use crate::core::reshape::{normalize_history, normalize_top_n};
use crate::core::returns::cumulative_returns;
use crate::domain::model::{
    GapminderRecord, RawDatasets, RawTable, Section, SectionFailure, TransformResult,
};
use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
use crate::utils::error::Result;
use reqwest::Client;
use serde::Serialize;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const TOP_N_SECTION: &str = "tiobe_top20";
pub const HISTORY_SECTION: &str = "tiobe_history";
pub const GAPMINDER_SECTION: &str = "gapminder";
pub const RETURNS_SECTION: &str = "stock_returns";

/// Fetches the workshop datasets, normalizes each one independently and
/// bundles the results into a single ZIP archive.
pub struct WorkshopPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
}

impl<S: Storage, C: ConfigProvider> WorkshopPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
        }
    }

    async fn fetch(&self, section: &str, source: &str) -> Section<RawTable> {
        tracing::info!("Loading {} from {}", section, source);
        load_raw(&self.client, source).await
    }
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    section: &'static str,
    file: String,
    rows: usize,
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    generated_at: String,
    sections: Vec<ManifestEntry>,
    failures: &'a [SectionFailure],
}

/// Log a failed section and keep going.
fn settle<T>(section: &str, outcome: Section<T>, failures: &mut Vec<SectionFailure>) -> Option<T> {
    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(
                "❌ Section {} failed: {} (Category: {:?})",
                section,
                e,
                e.category()
            );
            failures.push(SectionFailure::new(section, &e));
            None
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for WorkshopPipeline<S, C> {
    async fn extract(&self) -> Result<RawDatasets> {
        let sources = self.config.sources();

        // 依序抓取，不做快取
        let top_n = self.fetch(TOP_N_SECTION, &sources.top_n).await;
        let history = self.fetch(HISTORY_SECTION, &sources.history).await;

        let gapminder = match &sources.gapminder {
            Some(source) => Some(self.fetch(GAPMINDER_SECTION, source).await),
            None => None,
        };
        let prices = match &sources.prices {
            Some(source) => Some(self.fetch(RETURNS_SECTION, source).await),
            None => None,
        };

        Ok(RawDatasets {
            top_n,
            history,
            gapminder,
            prices,
        })
    }

    async fn transform(&self, data: RawDatasets) -> Result<TransformResult> {
        let options = self.config.reshape();

        // 快照需通過型別檢查才算成功
        let top_n = data.top_n.and_then(|raw| {
            let snapshot = normalize_top_n(raw, options)?;
            let ranking = snapshot.ranking(&options.language_column)?;
            if let Some(first) = ranking.iter().min_by_key(|e| e.rank) {
                tracing::info!(
                    "Most popular language: {} (rank {})",
                    first.language,
                    first.rank
                );
            }
            Ok(snapshot)
        });
        let history = data.history.and_then(|raw| normalize_history(raw, options));

        let mut result = TransformResult::default();
        result.top_n = settle(TOP_N_SECTION, top_n, &mut result.failures);
        result.history = settle(HISTORY_SECTION, history, &mut result.failures);

        if result.top_n.is_none() && result.history.is_none() {
            tracing::warn!("⚠️ Neither ranking dataset could be normalized");
        }
        if let Some(series) = &result.history {
            tracing::info!(
                "History normalized: {} rows, {} languages, {} years",
                series.len(),
                series.languages().len(),
                series.years().len()
            );
        }

        if let Some(raw) = data.gapminder {
            let outcome = raw.and_then(|raw| normalize_gapminder(&raw));
            result.gapminder = settle(GAPMINDER_SECTION, outcome, &mut result.failures);
        }
        if let Some(raw) = data.prices {
            let outcome = raw.and_then(|raw| cumulative_returns(&raw));
            result.returns = settle(RETURNS_SECTION, outcome, &mut result.failures);
        }

        Ok(result)
    }

    async fn load(&self, result: TransformResult) -> Result<String> {
        let mut files: Vec<(&'static str, RawTable)> = Vec::new();
        if let Some(snapshot) = result.top_n {
            files.push((TOP_N_SECTION, snapshot.table));
        }
        if let Some(series) = &result.history {
            files.push((HISTORY_SECTION, series.to_table()));
        }
        if let Some(records) = &result.gapminder {
            files.push((GAPMINDER_SECTION, GapminderRecord::to_table(records)));
        }
        if let Some(returns) = &result.returns {
            files.push((RETURNS_SECTION, returns.to_table()));
        }

        tracing::debug!("Creating ZIP bundle with {} tables", files.len());

        let mut manifest = Manifest {
            generated_at: chrono::Utc::now().to_rfc3339(),
            sections: Vec::with_capacity(files.len()),
            failures: &result.failures,
        };

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            for (section, table) in &files {
                let file = format!("{}.csv", section);
                zip.start_file(file.as_str(), SimpleFileOptions::default())?;
                zip.write_all(write_table(table)?.as_bytes())?;
                manifest.sections.push(ManifestEntry {
                    section: *section,
                    file,
                    rows: table.len(),
                });
            }

            zip.start_file("manifest.json", SimpleFileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

            zip.finish()?.into_inner()
        };

        let bundle = self.config.bundle_name();
        tracing::debug!("Writing ZIP bundle ({} bytes) to storage", zip_data.len());
        self.storage.write_file(bundle, &zip_data).await?;

        Ok(format!("{}/{}", self.config.output_path(), bundle))
    }
}
