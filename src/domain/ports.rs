use crate::domain::model::{Product, SearchRequest, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn requests(&self) -> &[SearchRequest];
    fn output_path(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Product>>;
    async fn transform(&self, data: Vec<Product>) -> Result<TransformResult>;
    async fn load(&self, result: &TransformResult) -> Result<String>;
    fn was_stopped(&self) -> bool {
        false
    }
}
