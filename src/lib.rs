pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, toml_config::TomlConfig, PipelineSettings};

pub use core::{
    etl::{EtlEngine, RunSummary},
    pipeline::WorkshopPipeline,
};
pub use domain::settings::{ReshapeOptions, SourceSet};
pub use utils::error::{EtlError, Result};
