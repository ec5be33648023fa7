#[cfg(feature = "cli")]
pub mod cli;
pub mod settings;
pub mod toml_config;

use crate::adapters::http::ClientOptions;
use crate::core::export::ExportFormat;
use crate::core::ConfigProvider;
use crate::domain::model::SearchRequest;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use settings::Settings;

/// 合併完成、驗證過的單次執行設定
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub settings: Settings,
    pub client: ClientOptions,
    pub output_path: String,
    requests: Vec<SearchRequest>,
}

impl RunConfig {
    pub fn new(settings: Settings, client: ClientOptions, output_path: String) -> Result<Self> {
        settings.validate()?;
        validation::validate_path("output", &output_path)?;
        ExportFormat::from_path(&output_path)?;
        if let Some(base_url) = &client.base_url {
            validation::validate_url("base_url", base_url)?;
        }

        let requests = settings.search_requests()?;
        Ok(Self {
            settings,
            client,
            output_path,
            requests,
        })
    }
}

impl ConfigProvider for RunConfig {
    fn requests(&self) -> &[SearchRequest] {
        &self.requests
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keyword_settings() -> Settings {
        Settings {
            keyword: "lamp".to_string(),
            ..Settings::default()
        }
    }

    #[test]
    fn test_run_config_resolves_requests() {
        let config = RunConfig::new(
            keyword_settings(),
            ClientOptions::default(),
            "out.xlsx".to_string(),
        )
        .unwrap();

        assert_eq!(config.requests().len(), 1);
        assert_eq!(config.requests()[0].max_pages, 3);
        assert_eq!(config.output_path(), "out.xlsx");
    }

    #[test]
    fn test_run_config_rejects_bad_output_and_base_url() {
        assert!(RunConfig::new(
            keyword_settings(),
            ClientOptions::default(),
            "out.txt".to_string()
        )
        .is_err());

        let client = ClientOptions {
            base_url: Some("ftp://mirror".to_string()),
            ..ClientOptions::default()
        };
        assert!(RunConfig::new(keyword_settings(), client, "out.csv".to_string()).is_err());
    }
}
