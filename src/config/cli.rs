use crate::config::settings::Settings;
use crate::domain::model::SearchMode;
use clap::Parser;

const AFTER_HELP: &str = "\
Batch mode: put one keyword per line in a file and pass --keywords-file; every
row of the result then carries the keyword that produced it.
Category accepts a number or a category URL (containing 'cat.12345' or 'category=12345').
Shop accepts a shop id or a shop URL (containing '/shop/12345' or 'shopid=12345').
Press Ctrl-C to stop; results fetched so far are still exported.
Settings are remembered in ~/.shopee_bestseller_settings.json between runs.";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "shopee-bestseller")]
#[command(about = "Unofficial Shopee best-seller checker", after_help = AFTER_HELP)]
pub struct CliArgs {
    /// Marketplace domain, e.g. shopee.co.th or shopee.sg
    #[arg(long)]
    pub domain: Option<String>,

    /// Search by keyword or list a single shop
    #[arg(long, value_enum)]
    pub mode: Option<SearchMode>,

    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Turn batch keyword mode on or off
    #[arg(long)]
    pub batch: Option<bool>,

    /// File with one keyword per line; implies --batch true
    #[arg(long)]
    pub keywords_file: Option<String>,

    /// Shop id or shop URL (shop mode)
    #[arg(long)]
    pub shop: Option<String>,

    /// Maximum result pages per search (1-50)
    #[arg(short, long)]
    pub pages: Option<u32>,

    /// Drop products with fewer cumulative sales
    #[arg(long)]
    pub min_sold: Option<i64>,

    /// Look up shop names for the results
    #[arg(long)]
    pub fetch_shop: Option<bool>,

    #[arg(long)]
    pub price_min: Option<String>,

    #[arg(long)]
    pub price_max: Option<String>,

    /// Category id or category URL
    #[arg(long)]
    pub category: Option<String>,

    /// Export file (.xlsx, .csv or .json)
    #[arg(short, long)]
    pub output: Option<String>,

    /// TOML run profile
    #[arg(short, long)]
    pub config: Option<String>,

    /// Where settings are remembered between runs
    #[arg(long)]
    pub settings_file: Option<String>,

    /// Do not remember this run's settings
    #[arg(long)]
    pub no_save: bool,

    #[arg(long, hide = true)]
    pub base_url: Option<String>,

    /// Log CPU and memory usage after each phase
    #[arg(long)]
    pub monitor: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Do not print the result table
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// 命令列參數優先於已保存的設定
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(domain) = &self.domain {
            settings.domain = domain.trim().to_string();
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        if let Some(keyword) = &self.keyword {
            settings.keyword = keyword.clone();
        }
        if let Some(batch) = self.batch {
            settings.batch = batch;
        }
        if let Some(shop) = &self.shop {
            settings.shop_input = shop.clone();
        }
        if let Some(pages) = self.pages {
            settings.pages = pages;
        }
        if let Some(min_sold) = self.min_sold {
            settings.min_sold = min_sold;
        }
        if let Some(fetch) = self.fetch_shop {
            settings.fetch_shop = fetch;
        }
        if let Some(price_min) = &self.price_min {
            settings.price_min = price_min.clone();
        }
        if let Some(price_max) = &self.price_max {
            settings.price_max = price_max.clone();
        }
        if let Some(category) = &self.category {
            settings.category = category.clone();
        }
    }
}
