use crate::domain::model::{RawDatasets, TransformResult};
use crate::domain::settings::{ReshapeOptions, SourceSet};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn sources(&self) -> &SourceSet;
    fn reshape(&self) -> &ReshapeOptions;
    fn output_path(&self) -> &str;

    fn bundle_name(&self) -> &str {
        "workshop_data.zip"
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<RawDatasets>;
    async fn transform(&self, data: RawDatasets) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
