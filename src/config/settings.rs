use crate::adapters::http::DEFAULT_DOMAIN;
use crate::domain::ids::{parse_batch, parse_category_id, parse_price, parse_shopid};
use crate::domain::model::{SearchMode, SearchRequest};
use crate::utils::error::{Result, ScraperError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE_NAME: &str = ".shopee_bestseller_settings.json";
pub const MAX_PAGES: u32 = 50;
pub const MAX_MIN_SOLD: i64 = 1_000_000;

/// 使用者上次的輸入，存在家目錄的 JSON 檔
///
/// Free-text inputs (prices, category, shop) are kept as typed by the user
/// and parsed when a run is planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub domain: String,
    pub mode: SearchMode,
    pub keyword: String,
    pub pages: u32,
    pub min_sold: i64,
    pub fetch_shop: bool,
    pub price_min: String,
    pub price_max: String,
    pub category: String,
    pub batch: bool,
    pub shop_input: String,
    pub batch_text: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            mode: SearchMode::Keyword,
            keyword: String::new(),
            pages: 3,
            min_sold: 0,
            fetch_shop: true,
            price_min: String::new(),
            price_max: String::new(),
            category: String::new(),
            batch: false,
            shop_input: String::new(),
            batch_text: String::new(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(SETTINGS_FILE_NAME))
    }

    /// Missing or unreadable files fall back to defaults.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!("Could not read settings {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!("Ignoring corrupt settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        // batch_text 只在批次模式下保存
        let mut stored = self.clone();
        if !stored.batch {
            stored.batch_text.clear();
        }
        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn batch_keywords(&self) -> Vec<String> {
        if self.batch {
            parse_batch(&self.batch_text)
        } else {
            Vec::new()
        }
    }

    /// 把設定展開成實際要執行的搜尋
    pub fn search_requests(&self) -> Result<Vec<SearchRequest>> {
        let base = SearchRequest {
            keyword: None,
            shopid: None,
            max_pages: self.pages,
            min_sold: self.min_sold,
            fetch_shop_names: self.fetch_shop,
            price_min: parse_price(&self.price_min),
            price_max: parse_price(&self.price_max),
            category_id: parse_category_id(&self.category),
            label: None,
        };

        match self.mode {
            SearchMode::Shop => {
                let shopid = parse_shopid(&self.shop_input)
                    .filter(|id| *id > 0)
                    .ok_or_else(|| ScraperError::InvalidConfigValueError {
                        field: "shop".to_string(),
                        value: self.shop_input.clone(),
                        reason: "A valid Shop ID or shop URL is required".to_string(),
                    })?;
                Ok(vec![SearchRequest {
                    shopid: Some(shopid),
                    label: Some(format!("shop:{}", shopid)),
                    ..base
                }])
            }
            SearchMode::Keyword => {
                let batch = self.batch_keywords();
                if !batch.is_empty() {
                    return Ok(batch
                        .into_iter()
                        .map(|keyword| SearchRequest {
                            label: Some(keyword.clone()),
                            keyword: Some(keyword),
                            ..base.clone()
                        })
                        .collect());
                }

                let keyword = self.keyword.trim();
                if keyword.is_empty() {
                    return Err(ScraperError::MissingConfigError {
                        field: "keyword (or batch keywords)".to_string(),
                    });
                }
                Ok(vec![SearchRequest {
                    keyword: Some(keyword.to_string()),
                    label: Some(keyword.to_string()),
                    ..base
                }])
            }
        }
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_domain("domain", &self.domain)?;
        validation::validate_range("pages", self.pages, 1, MAX_PAGES)?;
        validation::validate_range("min_sold", self.min_sold, 0, MAX_MIN_SOLD)?;
        self.search_requests().map(|_| ())
    }
}
