pub mod export;
pub mod pipeline;
pub mod report;
pub mod runner;

pub use crate::domain::model::{Product, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
