use crate::core::Pipeline;
use crate::domain::model::RunReport;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct Runner<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> Runner<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Fetching best sellers...");
        let raw = self.pipeline.extract().await?;
        tracing::info!("Fetched {} products", raw.len());
        self.monitor.log_phase("Extract");

        let result = self.pipeline.transform(raw).await?;
        tracing::info!("{} unique products", result.products.len());
        self.monitor.log_phase("Transform");

        let stopped = self.pipeline.was_stopped();
        if stopped {
            tracing::warn!("🛑 Run was stopped; keeping partial results");
        }

        // 沒有資料就不匯出
        if result.products.is_empty() {
            tracing::warn!("⚠️ No products found, nothing to export");
            self.monitor.log_summary();
            return Ok(RunReport {
                products: result.products,
                output_path: None,
                stopped,
            });
        }

        let output_path = self.pipeline.load(&result).await?;
        tracing::info!("📁 Output saved to: {}", output_path);
        self.monitor.log_phase("Export");
        self.monitor.log_summary();

        Ok(RunReport {
            products: result.products,
            output_path: Some(output_path),
            stopped,
        })
    }
}
