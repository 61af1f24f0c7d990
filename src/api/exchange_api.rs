// ==========================================
// 小微企业 ERP - 表格交换 API（导入 / 导出）
// ==========================================
// 文件读写在阻塞线程执行，API 本身是 async
// ==========================================

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::types::ReportPeriod;
use crate::importer::{DataExporter, ExportSummary, InventoryImportSummary, InventoryImporter};

pub struct ExchangeApi {
    importer: Arc<dyn InventoryImporter>,
    exporter: Arc<dyn DataExporter>,
    config: Arc<ConfigManager>,
}

impl ExchangeApi {
    pub fn new(
        importer: Arc<dyn InventoryImporter>,
        exporter: Arc<dyn DataExporter>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            importer,
            exporter,
            config,
        }
    }

    fn resolve_dir(&self, dir: Option<String>) -> ApiResult<PathBuf> {
        match dir.map(|d| d.trim().to_string()).filter(|d| !d.is_empty()) {
            Some(dir) => Ok(PathBuf::from(dir)),
            None => Ok(self.config.export_dir()?),
        }
    }

    /// 全量导出；dir 为空时取配置 export_dir（再缺省为用户文档目录）
    pub async fn export_bundle(&self, dir: Option<String>) -> ApiResult<ExportSummary> {
        let dir = self.resolve_dir(dir)?;
        Ok(self.exporter.export_bundle(dir).await?)
    }

    /// 周期销售报表；path 为空时写到导出目录下 sales_report_{period}.csv
    pub async fn export_sales_report(
        &self,
        period: &str,
        path: Option<String>,
    ) -> ApiResult<ExportSummary> {
        let period = ReportPeriod::parse(period).ok_or_else(|| {
            ApiError::ValidationError(format!("未知报表周期: {}（day/week/month/year）", period))
        })?;
        let path = match path.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => self
                .config
                .export_dir()?
                .join(format!("sales_report_{}.csv", period.as_str())),
        };
        Ok(self.exporter.export_sales_report(period, path).await?)
    }

    /// 整体替换导入（失败时库内不变）
    pub async fn import_inventory(
        &self,
        products_file: String,
        bom_file: Option<String>,
    ) -> ApiResult<InventoryImportSummary> {
        let products_file = PathBuf::from(products_file.trim());
        if !products_file.exists() {
            return Err(ApiError::NotFound(format!(
                "文件不存在: {}",
                products_file.display()
            )));
        }
        let bom_file = bom_file
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .map(PathBuf::from);

        let summary = self.importer.import_inventory(products_file, bom_file).await?;
        info!(
            replaced = summary.products_replaced,
            imported = summary.products_imported,
            "库存导入已提交"
        );
        Ok(summary)
    }
}
