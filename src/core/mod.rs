pub mod etl;
pub mod gapminder;
pub mod loader;
pub mod pipeline;
pub mod reshape;
pub mod returns;

pub use crate::domain::model::{RawDatasets, RawTable, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
