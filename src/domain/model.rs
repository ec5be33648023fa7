use serde::{Deserialize, Serialize};

/// 一筆商品資料，欄位順序即匯出欄位順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub title: String,
    pub itemid: i64,
    pub shopid: i64,
    pub shop_name: Option<String>,
    pub price: f64,
    pub price_min: f64,
    pub price_max: f64,
    pub currency: String,
    pub historical_sold: i64,
    pub sold_recent: Option<i64>,
    pub rating: f64,
    pub rating_count: i64,
    pub stock: i64,
    pub url: String,
    /// Label of the search that produced this row.
    pub query: Option<String>,
}

impl Product {
    pub fn key(&self) -> (i64, i64) {
        (self.shopid, self.itemid)
    }
}

pub const PRODUCT_COLUMNS: &[&str] = &[
    "title",
    "itemid",
    "shopid",
    "shop_name",
    "price",
    "price_min",
    "price_max",
    "currency",
    "historical_sold",
    "sold_recent",
    "rating",
    "rating_count",
    "stock",
    "url",
    "query",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum SearchMode {
    #[default]
    Keyword,
    Shop,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Keyword => write!(f, "keyword"),
            SearchMode::Shop => write!(f, "shop"),
        }
    }
}

/// One search of a run: either a keyword search or a shop listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub keyword: Option<String>,
    pub shopid: Option<i64>,
    pub max_pages: u32,
    pub min_sold: i64,
    pub fetch_shop_names: bool,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    pub category_id: Option<i64>,
    pub label: Option<String>,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            keyword: None,
            shopid: None,
            max_pages: 3,
            min_sold: 0,
            fetch_shop_names: true,
            price_min: None,
            price_max: None,
            category_id: None,
            label: None,
        }
    }
}

/// 去重之後的結果
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub products: Vec<Product>,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub products: Vec<Product>,
    pub output_path: Option<String>,
    pub stopped: bool,
}
