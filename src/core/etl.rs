use crate::core::Pipeline;
use crate::domain::model::SectionFailure;
use crate::utils::error::Result;
use std::time::Instant;

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub output_path: String,
    pub failures: Vec<SectionFailure>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started = Instant::now();
        tracing::info!("Starting ETL process...");

        // Extract
        let raw_data = self.pipeline.extract().await?;
        tracing::info!("Extracted datasets in {:?}", started.elapsed());

        // Transform
        let transformed = self.pipeline.transform(raw_data).await?;
        let failures = transformed.failures.clone();
        if failures.is_empty() {
            tracing::info!("Transformed all sections");
        } else {
            tracing::warn!("⚠️ {} section(s) failed and were skipped", failures.len());
        }

        // Load
        let output_path = self.pipeline.load(transformed).await?;
        tracing::info!("Output saved to: {} ({:?})", output_path, started.elapsed());

        Ok(RunSummary {
            output_path,
            failures,
        })
    }
}
