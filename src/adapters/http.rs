use crate::domain::model::{Product, SearchRequest};
use crate::utils::error::{Result, ScraperError};
use crate::utils::stop::StopSignal;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

pub const DEFAULT_DOMAIN: &str = "shopee.co.th";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";
pub const PAGE_SIZE: u32 = 60;

const SEARCH_PATH: &str = "/api/v4/search/search_items";
const SHOP_DETAIL_PATH: &str = "/api/v4/shop/get_shop_detail";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub domain: String,
    /// Overrides `https://{domain}`; used for mirrors and mock servers.
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub request_delay: Duration,
    pub shop_lookup_delay: Duration,
    pub max_attempts: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            base_url: None,
            user_agent: None,
            timeout: Duration::from_secs(20),
            request_delay: Duration::from_millis(800),
            shop_lookup_delay: Duration::from_millis(200),
            max_attempts: 6,
        }
    }
}

/// 搜尋結果中單一商品的原始欄位（Shopee 可能省略或給 null）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub itemid: Option<i64>,
    pub shopid: Option<i64>,
    pub name: Option<String>,
    pub price: Option<i64>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub currency: Option<String>,
    pub historical_sold: Option<i64>,
    pub sold: Option<i64>,
    pub item_rating: Option<RawRating>,
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawRating {
    pub rating_star: Option<f64>,
    pub rating_count: Option<Vec<i64>>,
}

enum Attempt {
    Data(Value),
    RateLimited,
}

pub struct ShopeeClient {
    base: String,
    client: Client,
    options: ClientOptions,
    stop: StopSignal,
}

impl ShopeeClient {
    pub fn new(options: ClientOptions, stop: StopSignal) -> Result<Self> {
        let base = options
            .base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}", options.domain))
            .trim_end_matches('/')
            .to_string();

        let user_agent = options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("client.user_agent", user_agent)?);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(REFERER, header_value("client.base_url", &format!("{}/", base))?);
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("th-TH,th;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            base,
            client,
            options,
            stop,
        })
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// GET with retries. `Ok(None)` means no data: the run was stopped or
    /// the server kept answering 429 until attempts ran out.
    async fn get_json(&self, path: &str, params: &[(&str, String)]) -> Result<Option<Value>> {
        let url = format!("{}{}", self.base, path);
        let attempts = self.options.max_attempts.max(1);

        for attempt in 0..attempts {
            if self.stop.is_stopped() {
                return Ok(None);
            }

            match self.try_get(&url, params).await {
                Ok(Attempt::Data(value)) => return Ok(Some(value)),
                Ok(Attempt::RateLimited) => {
                    let backoff = self.options.request_delay * (attempt + 1) * 2;
                    tracing::warn!(
                        "⏳ Rate limited on {} (attempt {}/{}), backing off {:?}",
                        path,
                        attempt + 1,
                        attempts,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => {
                    if attempt + 1 >= attempts {
                        return Err(e);
                    }
                    let backoff = self.options.request_delay * (attempt + 1);
                    tracing::warn!(
                        "🔁 Request to {} failed (attempt {}/{}): {}",
                        path,
                        attempt + 1,
                        attempts,
                        e
                    );
                    tokio::time::sleep(backoff).await;
                }
            }
        }

        tracing::warn!("⚠️ Giving up on {} after {} rate-limited attempts", path, attempts);
        Ok(None)
    }

    async fn try_get(&self, url: &str, params: &[(&str, String)]) -> Result<Attempt> {
        tracing::debug!("Making API request to: {} {:?}", url, params);
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited);
        }
        if !status.is_success() {
            return Err(ScraperError::HttpStatusError {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(Attempt::Data(response.json::<Value>().await?))
    }

    pub async fn search(&self, request: &SearchRequest, page: u32) -> Result<Option<Value>> {
        let mut params: Vec<(&str, String)> = vec![
            ("by", "sales".to_string()),
            ("keyword", request.keyword.clone().unwrap_or_default()),
            ("limit", PAGE_SIZE.to_string()),
            ("newest", (page * PAGE_SIZE).to_string()),
            ("order", "desc".to_string()),
            ("page_type", "search".to_string()),
            ("scenario", "PAGE_GLOBAL_SEARCH".to_string()),
            ("version", "2".to_string()),
        ];
        if let Some(min) = request.price_min {
            params.push(("price_min", min.to_string()));
        }
        if let Some(max) = request.price_max {
            params.push(("price_max", max.to_string()));
        }
        if let Some(category) = request.category_id {
            params.push(("match_id", category.to_string()));
        }
        self.get_json(SEARCH_PATH, &params).await
    }

    pub async fn shop_search(&self, shopid: i64, page: u32) -> Result<Option<Value>> {
        let params: Vec<(&str, String)> = vec![
            ("by", "sales".to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("newest", (page * PAGE_SIZE).to_string()),
            ("order", "desc".to_string()),
            ("page_type", "shop".to_string()),
            ("shopid", shopid.to_string()),
            ("version", "2".to_string()),
        ];
        self.get_json(SEARCH_PATH, &params).await
    }

    /// 查詢商店名稱；任何錯誤都當作查不到
    pub async fn shop_name(&self, shopid: i64) -> Option<String> {
        match self
            .get_json(SHOP_DETAIL_PATH, &[("shopid", shopid.to_string())])
            .await
        {
            Ok(Some(data)) => data
                .get("data")
                .and_then(|d| d.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!("Shop lookup for {} failed: {}", shopid, e);
                None
            }
        }
    }

    pub fn to_product(&self, raw: &RawItem, query: Option<&str>) -> Product {
        let itemid = raw.itemid.unwrap_or(0);
        let shopid = raw.shopid.unwrap_or(0);

        let price_raw = raw.price.unwrap_or(0);
        let price_min_raw = raw.price_min.filter(|v| *v != 0).unwrap_or(price_raw);
        let price_max_raw = raw.price_max.filter(|v| *v != 0).unwrap_or(price_raw);
        let divisor = price_divisor(price_raw.max(price_min_raw).max(price_max_raw));
        let scale = |v: i64| if v == 0 { 0.0 } else { v as f64 / divisor };

        let (rating, rating_count) = match &raw.item_rating {
            Some(r) => (
                r.rating_star.unwrap_or(0.0),
                r.rating_count.as_deref().unwrap_or(&[]).iter().sum::<i64>(),
            ),
            None => (0.0, 0),
        };

        Product {
            title: raw.name.clone().unwrap_or_default(),
            itemid,
            shopid,
            shop_name: None,
            price: scale(price_raw),
            price_min: scale(price_min_raw),
            price_max: scale(price_max_raw),
            currency: raw.currency.clone().unwrap_or_default(),
            historical_sold: raw.historical_sold.unwrap_or(0),
            sold_recent: raw.sold,
            rating,
            rating_count,
            stock: raw.stock.unwrap_or(0),
            url: format!("{}/product/{}/{}", self.base, shopid, itemid),
            query: query.map(str::to_string),
        }
    }

    /// 逐頁抓取並依銷量排序，必要時補上商店名稱
    pub async fn fetch_best_sellers(&self, request: &SearchRequest) -> Result<Vec<Product>> {
        let mut products = Vec::new();

        for page in 0..request.max_pages {
            if self.stop.is_stopped() {
                break;
            }

            let data = match request.shopid {
                Some(shopid) => self.shop_search(shopid, page).await?,
                None => self.search(request, page).await?,
            };

            let items = data
                .as_ref()
                .and_then(|v| v.get("items"))
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            if items.is_empty() {
                tracing::debug!("No items on page {}, stopping pagination", page + 1);
                break;
            }

            let before = products.len();
            for item in &items {
                let raw = item.get("item_basic").unwrap_or(item);
                if !raw.is_object() {
                    continue;
                }
                match serde_json::from_value::<RawItem>(raw.clone()) {
                    Ok(raw_item) => {
                        let product = self.to_product(&raw_item, request.label.as_deref());
                        if product.historical_sold >= request.min_sold {
                            products.push(product);
                        }
                    }
                    Err(e) => tracing::warn!("Skipping malformed item: {}", e),
                }
            }
            tracing::debug!(
                "Page {}: {} items, {} kept",
                page + 1,
                items.len(),
                products.len() - before
            );

            tokio::time::sleep(self.options.request_delay).await;
        }

        if request.fetch_shop_names && !products.is_empty() && !self.stop.is_stopped() {
            self.fill_shop_names(&mut products).await;
        }

        sort_by_sales(&mut products);
        Ok(products)
    }

    async fn fill_shop_names(&self, products: &mut [Product]) {
        let shopids: BTreeSet<i64> = products.iter().map(|p| p.shopid).collect();
        tracing::debug!("Looking up {} shop names", shopids.len());

        let mut names: HashMap<i64, String> = HashMap::new();
        for shopid in shopids {
            if self.stop.is_stopped() {
                break;
            }
            names.insert(shopid, self.shop_name(shopid).await.unwrap_or_default());
            tokio::time::sleep(self.options.shop_lookup_delay).await;
        }

        for product in products.iter_mut() {
            product.shop_name = names
                .get(&product.shopid)
                .filter(|name| !name.is_empty())
                .cloned();
        }
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| ScraperError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Shopee 價格以整數儲存：大於 100000 時單位為 1/100000，否則為 1/100
pub fn price_divisor(max_raw_price: i64) -> f64 {
    if max_raw_price > 100_000 {
        100_000.0
    } else {
        100.0
    }
}

/// Highest cumulative sales first, recent sales as tie-breaker. Stable.
pub fn sort_by_sales(products: &mut [Product]) {
    products.sort_by(|a, b| {
        (b.historical_sold, b.sold_recent.unwrap_or(0))
            .cmp(&(a.historical_sold, a.sold_recent.unwrap_or(0)))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn test_options(base_url: String) -> ClientOptions {
        ClientOptions {
            base_url: Some(base_url),
            request_delay: Duration::ZERO,
            shop_lookup_delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
            ..ClientOptions::default()
        }
    }

    fn client_for(server: &MockServer) -> ShopeeClient {
        ShopeeClient::new(test_options(server.base_url()), StopSignal::new()).unwrap()
    }

    fn raw(value: Value) -> RawItem {
        serde_json::from_value(value).unwrap()
    }

    fn keyword_request(keyword: &str) -> SearchRequest {
        SearchRequest {
            keyword: Some(keyword.to_string()),
            max_pages: 3,
            fetch_shop_names: false,
            label: Some(keyword.to_string()),
            ..SearchRequest::default()
        }
    }

    #[test]
    fn test_price_divisor_threshold() {
        assert_eq!(price_divisor(100_000), 100.0);
        assert_eq!(price_divisor(100_001), 100_000.0);
        assert_eq!(price_divisor(0), 100.0);
    }

    #[test]
    fn test_to_product_scales_large_prices() {
        let client = ShopeeClient::new(ClientOptions::default(), StopSignal::new()).unwrap();
        let product = client.to_product(
            &raw(json!({
                "itemid": 11, "shopid": 22, "name": "Power bank",
                "price": 29_900_000, "price_min": 0, "price_max": 39_900_000,
                "currency": "THB", "historical_sold": 1500, "sold": 40,
                "item_rating": {"rating_star": 4.8, "rating_count": [100, 1, 2, 3, 4, 90]},
                "stock": 7
            })),
            Some("power bank"),
        );

        assert_eq!(product.price, 299.0);
        assert_eq!(product.price_min, 299.0);
        assert_eq!(product.price_max, 399.0);
        assert_eq!(product.rating_count, 200);
        assert_eq!(product.rating, 4.8);
        assert_eq!(product.sold_recent, Some(40));
        assert_eq!(product.url, "https://shopee.co.th/product/22/11");
        assert_eq!(product.query.as_deref(), Some("power bank"));
    }

    #[test]
    fn test_to_product_with_missing_fields() {
        let client = ShopeeClient::new(ClientOptions::default(), StopSignal::new()).unwrap();
        let product = client.to_product(&raw(json!({"price": 5000, "item_rating": null})), None);

        assert_eq!(product.title, "");
        assert_eq!(product.price, 50.0);
        assert_eq!(product.price_min, 50.0);
        assert_eq!(product.price_max, 50.0);
        assert_eq!(product.rating, 0.0);
        assert_eq!(product.rating_count, 0);
        assert_eq!(product.sold_recent, None);
        assert_eq!(product.url, "https://shopee.co.th/product/0/0");
    }

    #[test]
    fn test_sort_by_sales_is_stable() {
        let client = ShopeeClient::new(ClientOptions::default(), StopSignal::new()).unwrap();
        let make = |id: i64, sold: i64, recent: Option<i64>| {
            let mut p = client.to_product(&RawItem::default(), None);
            p.itemid = id;
            p.historical_sold = sold;
            p.sold_recent = recent;
            p
        };
        let mut products = vec![
            make(1, 10, None),
            make(2, 50, Some(1)),
            make(3, 50, Some(9)),
            make(4, 10, Some(0)),
        ];
        sort_by_sales(&mut products);
        let ids: Vec<i64> = products.iter().map(|p| p.itemid).collect();
        assert_eq!(ids, vec![3, 2, 1, 4]);
    }

    #[tokio::test]
    async fn test_fetch_paginates_until_empty_page() {
        let server = MockServer::start_async().await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(SEARCH_PATH)
                    .query_param("keyword", "case")
                    .query_param("newest", "0")
                    .query_param("by", "sales")
                    .query_param("page_type", "search");
                then.status(200).json_body(json!({
                    "items": [
                        {"item_basic": {"itemid": 1, "shopid": 9, "historical_sold": 5, "price": 1000}},
                        {"item_basic": {"itemid": 2, "shopid": 9, "historical_sold": 80, "price": 1000}},
                        "not-an-object"
                    ]
                }));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH).query_param("newest", "60");
                then.status(200).json_body(json!({"items": []}));
            })
            .await;

        let client = client_for(&server);
        let products = client.fetch_best_sellers(&keyword_request("case")).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].itemid, 2);
        assert_eq!(products[1].itemid, 1);
    }

    #[tokio::test]
    async fn test_min_sold_filter_and_search_filters() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(SEARCH_PATH)
                    .query_param("price_min", "100")
                    .query_param("price_max", "500")
                    .query_param("match_id", "42");
                then.status(200).json_body(json!({
                    "items": [
                        {"itemid": 1, "shopid": 1, "historical_sold": 10},
                        {"itemid": 2, "shopid": 1, "historical_sold": 1000}
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let request = SearchRequest {
            max_pages: 1,
            min_sold: 100,
            price_min: Some(100),
            price_max: Some(500),
            category_id: Some(42),
            ..keyword_request("lamp")
        };
        let products = client.fetch_best_sellers(&request).await.unwrap();

        search.assert_async().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].itemid, 2);
    }

    #[tokio::test]
    async fn test_shop_mode_and_shop_names() {
        let server = MockServer::start_async().await;
        let listing = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(SEARCH_PATH)
                    .query_param("page_type", "shop")
                    .query_param("shopid", "77");
                then.status(200).json_body(json!({
                    "items": [{"item_basic": {"itemid": 5, "shopid": 77, "historical_sold": 3}}]
                }));
            })
            .await;
        let detail = server
            .mock_async(|when, then| {
                when.method(GET).path(SHOP_DETAIL_PATH).query_param("shopid", "77");
                then.status(200).json_body(json!({"data": {"name": "Gadget House"}}));
            })
            .await;

        let client = client_for(&server);
        let request = SearchRequest {
            shopid: Some(77),
            max_pages: 1,
            fetch_shop_names: true,
            label: Some("shop:77".to_string()),
            ..SearchRequest::default()
        };
        let products = client.fetch_best_sellers(&request).await.unwrap();

        listing.assert_async().await;
        detail.assert_async().await;
        assert_eq!(products[0].shop_name.as_deref(), Some("Gadget House"));
        assert_eq!(products[0].query.as_deref(), Some("shop:77"));
    }

    #[tokio::test]
    async fn test_failed_shop_lookup_leaves_name_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH);
                then.status(200).json_body(json!({
                    "items": [{"itemid": 5, "shopid": 8, "historical_sold": 3}]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SHOP_DETAIL_PATH);
                then.status(404);
            })
            .await;

        let mut options = test_options(server.base_url());
        options.max_attempts = 2;
        let client = ShopeeClient::new(options, StopSignal::new()).unwrap();
        let request = SearchRequest {
            max_pages: 1,
            fetch_shop_names: true,
            ..keyword_request("x")
        };
        let products = client.fetch_best_sellers(&request).await.unwrap();

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].shop_name, None);
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_yields_no_data() {
        let server = MockServer::start_async().await;
        let limited = server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH);
                then.status(429);
            })
            .await;

        let client = client_for(&server);
        let products = client.fetch_best_sellers(&keyword_request("busy")).await.unwrap();

        limited.assert_hits_async(6).await;
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        let server = MockServer::start_async().await;
        let limited = server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH);
                then.status(429);
            })
            .await;

        // 429 後的退避時間內換成正常回應
        let mut options = test_options(server.base_url());
        options.request_delay = Duration::from_millis(500);
        let client = ShopeeClient::new(options, StopSignal::new()).unwrap();
        let request = SearchRequest {
            max_pages: 1,
            ..keyword_request("retry")
        };

        let swap_mocks = async {
            while limited.hits_async().await == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            limited.delete_async().await;
            server
                .mock_async(|when, then| {
                    when.method(GET).path(SEARCH_PATH);
                    then.status(200).json_body(json!({
                        "items": [{"itemid": 1, "shopid": 2, "name": "Fan", "historical_sold": 40}]
                    }));
                })
                .await
        };
        let (products, recovered) = tokio::join!(client.fetch_best_sellers(&request), swap_mocks);
        let products = products.unwrap();

        recovered.assert_hits_async(1).await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].title, "Fan");
        assert_eq!(products[0].historical_sold, 40);
    }

    #[tokio::test]
    async fn test_server_error_is_returned_after_last_attempt() {
        let server = MockServer::start_async().await;
        let failing = server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH);
                then.status(500);
            })
            .await;

        let mut options = test_options(server.base_url());
        options.max_attempts = 3;
        let client = ShopeeClient::new(options, StopSignal::new()).unwrap();
        let result = client.fetch_best_sellers(&keyword_request("x")).await;

        failing.assert_hits_async(3).await;
        assert!(matches!(
            result,
            Err(ScraperError::HttpStatusError { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_stopped_client_sends_nothing() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET).path(SEARCH_PATH);
                then.status(200).json_body(json!({"items": []}));
            })
            .await;

        let stop = StopSignal::new();
        stop.stop();
        let client = ShopeeClient::new(test_options(server.base_url()), stop).unwrap();
        let products = client.fetch_best_sellers(&keyword_request("x")).await.unwrap();

        search.assert_hits_async(0).await;
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn test_default_headers_are_sent() {
        let server = MockServer::start_async().await;
        let search = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(SEARCH_PATH)
                    .header("accept", "application/json, text/plain, */*")
                    .header("user-agent", DEFAULT_USER_AGENT)
                    .header_exists("referer")
                    .header_exists("accept-language");
                then.status(200).json_body(json!({"items": []}));
            })
            .await;

        let client = client_for(&server);
        client.fetch_best_sellers(&keyword_request("x")).await.unwrap();

        search.assert_async().await;
    }
}
