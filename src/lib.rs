pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliArgs;

pub use adapters::{ClientOptions, LocalStorage, ShopeeClient};
pub use config::{settings::Settings, toml_config::TomlConfig, RunConfig};
pub use crate::core::{pipeline::BestSellerPipeline, runner::Runner};
pub use domain::model::{Product, RunReport, SearchMode, SearchRequest};
pub use utils::error::{Result, ScraperError};
pub use utils::stop::StopSignal;
