use crate::adapters::http::ShopeeClient;
use crate::core::export::{self, ExportFormat};
use crate::core::{ConfigProvider, Pipeline, Product, Storage, TransformResult};
use crate::utils::error::Result;
use std::collections::HashSet;

/// 依設定逐一執行搜尋、去重後匯出
pub struct BestSellerPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: ShopeeClient,
}

impl<S: Storage, C: ConfigProvider> BestSellerPipeline<S, C> {
    pub fn new(storage: S, config: C, client: ShopeeClient) -> Self {
        Self {
            storage,
            config,
            client,
        }
    }
}

/// Keeps the first occurrence of each (shopid, itemid), preserving order.
pub fn dedupe(products: Vec<Product>) -> TransformResult {
    let total = products.len();
    let mut seen = HashSet::new();
    let products: Vec<Product> = products
        .into_iter()
        .filter(|p| seen.insert(p.key()))
        .collect();

    TransformResult {
        duplicates_removed: total - products.len(),
        products,
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for BestSellerPipeline<S, C> {
    async fn extract(&self) -> Result<Vec<Product>> {
        let requests = self.config.requests();
        let total = requests.len();
        let mut products = Vec::new();

        for (index, request) in requests.iter().enumerate() {
            if self.client.stop_signal().is_stopped() {
                tracing::warn!("🛑 Stopped before query {}/{}", index + 1, total);
                break;
            }

            let label = request.label.as_deref().unwrap_or("");
            if total > 1 {
                tracing::info!("🔎 Fetching ({}/{}) : {}", index + 1, total, label);
            } else {
                tracing::info!("🔎 Fetching: {}", label);
            }

            let found = self.client.fetch_best_sellers(request).await?;
            tracing::info!("📦 {}: {} products", label, found.len());
            products.extend(found);

            if total > 1 {
                tracing::info!(
                    "Progress: {:.0}%",
                    (index + 1) as f64 / total as f64 * 100.0
                );
            }
        }

        Ok(products)
    }

    async fn transform(&self, data: Vec<Product>) -> Result<TransformResult> {
        let result = dedupe(data);
        if result.duplicates_removed > 0 {
            tracing::debug!("Removed {} duplicate products", result.duplicates_removed);
        }
        Ok(result)
    }

    async fn load(&self, result: &TransformResult) -> Result<String> {
        let output_path = self.config.output_path();
        let format = ExportFormat::from_path(output_path)?;

        let data = export::render(&result.products, format)?;
        tracing::debug!("Writing {:?} export ({} bytes) to {}", format, data.len(), output_path);
        self.storage.write_file(output_path, &data).await?;

        Ok(output_path.to_string())
    }

    fn was_stopped(&self) -> bool {
        self.client.stop_signal().is_stopped()
    }
}
