use crate::adapters::http::ClientOptions;
use crate::config::settings::Settings;
use crate::domain::model::SearchMode;
use crate::utils::error::{Result, ScraperError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

static ENV_VAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").unwrap());

/// 執行設定檔（TOML），所有欄位皆可省略
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub client: ClientSection,
    pub search: SearchSection,
    pub export: ExportSection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSection {
    pub domain: Option<String>,
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub request_delay_ms: Option<u64>,
    pub shop_lookup_delay_ms: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub mode: Option<SearchMode>,
    pub keyword: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub shop: Option<String>,
    pub pages: Option<u32>,
    pub min_sold: Option<i64>,
    pub fetch_shop_names: Option<bool>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSection {
    pub output: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ScraperError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);

        toml::from_str(&processed).map_err(|e| ScraperError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SHOPEE_KEYWORD})；未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    /// Overlays every field present in the file onto `settings`.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(domain) = &self.client.domain {
            settings.domain = domain.clone();
        }

        let search = &self.search;
        if let Some(mode) = search.mode {
            settings.mode = mode;
        }
        if let Some(keyword) = &search.keyword {
            settings.keyword = keyword.clone();
        }
        if let Some(keywords) = &search.keywords {
            settings.batch = !keywords.is_empty();
            settings.batch_text = keywords.join("\n");
        }
        if let Some(shop) = &search.shop {
            settings.shop_input = shop.clone();
        }
        if let Some(pages) = search.pages {
            settings.pages = pages;
        }
        if let Some(min_sold) = search.min_sold {
            settings.min_sold = min_sold;
        }
        if let Some(fetch) = search.fetch_shop_names {
            settings.fetch_shop = fetch;
        }
        if let Some(price_min) = search.price_min {
            settings.price_min = price_min.to_string();
        }
        if let Some(price_max) = search.price_max {
            settings.price_max = price_max.to_string();
        }
        if let Some(category) = &search.category {
            settings.category = category.clone();
        }
    }

    pub fn client_options(&self, domain: &str) -> ClientOptions {
        let defaults = ClientOptions::default();
        let client = &self.client;
        ClientOptions {
            domain: domain.to_string(),
            base_url: client.base_url.clone(),
            user_agent: client.user_agent.clone(),
            timeout: client
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            request_delay: client
                .request_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            shop_lookup_delay: client
                .shop_lookup_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.shop_lookup_delay),
            max_attempts: client.max_attempts.unwrap_or(defaults.max_attempts),
        }
    }

    pub fn output(&self) -> Option<&str> {
        self.export.output.as_deref()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.client.base_url {
            validation::validate_url("client.base_url", base_url)?;
        }
        if let Some(user_agent) = &self.client.user_agent {
            validation::validate_non_empty_string("client.user_agent", user_agent)?;
        }
        if let Some(timeout) = self.client.timeout_seconds {
            validation::validate_range("client.timeout_seconds", timeout, 1, 300)?;
        }
        if let Some(attempts) = self.client.max_attempts {
            validation::validate_range("client.max_attempts", attempts, 1, 20)?;
        }
        if let Some(output) = self.output() {
            validation::validate_path("export.output", output)?;
        }
        Ok(())
    }
}
