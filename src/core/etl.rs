use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting reconciliation...");
        self.monitor.log_stats("start");

        // Extract
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} rows ({} columns)",
            dataset.records.len(),
            dataset.headers.len()
        );
        self.monitor.log_stats("extract");

        // Transform
        let result = self.pipeline.transform(dataset).await?;
        let summary = &result.summary;
        tracing::info!(
            total = summary.total_rows,
            updated = summary.updated,
            unchanged = summary.unchanged,
            unresolved = summary.unresolved,
            discrepancies = summary.discrepancies,
            "Reconciled {} rows: {} updated, {} unchanged, {} unresolved",
            summary.total_rows,
            summary.updated,
            summary.unchanged,
            summary.unresolved
        );
        self.monitor.log_stats("transform");

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
