use crate::domain::model::{CatalogueSource, ColumnMapping, Dataset, TransformResult};
use crate::reconcile::ReconcilePolicy;
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
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn delimiter(&self) -> u8;
    /// Field delimiter of a CSV province catalogue file.
    fn catalogue_delimiter(&self) -> u8;
    fn columns(&self) -> &ColumnMapping;
    fn catalogue_source(&self) -> Option<CatalogueSource<'_>>;
    fn policy(&self) -> ReconcilePolicy;
    fn dry_run(&self) -> bool;
    /// ZIP file name when outputs are bundled, `None` for loose files.
    fn archive_name(&self) -> Option<&str>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Dataset>;
    async fn transform(&self, data: Dataset) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<String>;
}
