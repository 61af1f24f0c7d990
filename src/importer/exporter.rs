// ==========================================
// 小微企业 ERP - 数据导出（CSV）
// ==========================================
// 全量导出: inventory / bom / sales / revenue / costs 五个 CSV
// 销售报表: 单个周期的销售明细 + 合计行
// 写文件在阻塞线程执行（spawn_blocking）
// ==========================================

use crate::db::{DATE_FORMAT, LEDGER_DATETIME_FORMAT};
use crate::domain::types::ReportPeriod;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::{
    BomRepository, CostRepository, ProductRepository, RevenueRepository, SaleRepository,
};
use async_trait::async_trait;
use csv::Writer;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const INVENTORY_FILE: &str = "inventory.csv";
pub const BOM_FILE: &str = "bom.csv";
pub const SALES_FILE: &str = "sales.csv";
pub const REVENUE_FILE: &str = "revenue.csv";
pub const COSTS_FILE: &str = "costs.csv";

/// 导出结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

// ==========================================
// DataExporter Trait
// ==========================================
#[async_trait]
pub trait DataExporter: Send + Sync {
    /// 全量导出到目录（不存在则创建）
    async fn export_bundle(&self, dir: PathBuf) -> ImportResult<ExportSummary>;

    /// 导出周期销售报表
    async fn export_sales_report(
        &self,
        period: ReportPeriod,
        path: PathBuf,
    ) -> ImportResult<ExportSummary>;
}

fn write_error(path: &Path, err: impl std::fmt::Display) -> ImportError {
    ImportError::FileWriteError(format!("{}: {}", path.display(), err))
}

fn open_writer(path: &Path) -> ImportResult<Writer<fs::File>> {
    Writer::from_path(path).map_err(|e| write_error(path, e))
}

fn fmt_date(date: Option<chrono::NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

// ==========================================
// CsvExporter
// ==========================================
pub struct CsvExporter {
    product_repo: ProductRepository,
    bom_repo: BomRepository,
    sale_repo: SaleRepository,
    revenue_repo: RevenueRepository,
    cost_repo: CostRepository,
}

impl CsvExporter {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            product_repo: ProductRepository::from_connection(conn.clone()),
            bom_repo: BomRepository::from_connection(conn.clone()),
            sale_repo: SaleRepository::from_connection(conn.clone()),
            revenue_repo: RevenueRepository::from_connection(conn.clone()),
            cost_repo: CostRepository::from_connection(conn),
        }
    }

    fn write_inventory(&self, path: &Path) -> ImportResult<usize> {
        let products = self.product_repo.list_all()?;
        let mut writer = open_writer(path)?;
        writer
            .write_record([
                "ID", "SKU", "Name", "Type", "Stock", "Min Stock", "Unit Cost",
                "Additional Cost", "Measurement", "Unit Weight", "Supplier",
                "Purchase Date", "Exit Date", "Total Value",
            ])
            .map_err(|e| write_error(path, e))?;
        for p in &products {
            writer
                .write_record([
                    p.id.to_string(),
                    p.sku.clone().unwrap_or_default(),
                    p.name.clone(),
                    p.kind.to_string(),
                    p.stock.to_string(),
                    p.min_stock.to_string(),
                    p.unit_cost.to_string(),
                    p.additional_cost.to_string(),
                    p.measurement.to_string(),
                    p.unit_weight.to_string(),
                    p.supplier.clone().unwrap_or_default(),
                    fmt_date(p.purchase_date),
                    fmt_date(p.exit_date),
                    (p.stock * p.unit_cost).to_string(),
                ])
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
        Ok(products.len())
    }

    fn write_bom(&self, path: &Path) -> ImportResult<usize> {
        let names: HashMap<i64, String> = self
            .product_repo
            .list_all()?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        let edges = self.bom_repo.list_all()?;

        let mut writer = open_writer(path)?;
        writer
            .write_record(["Parent Product", "Child Component", "Quantity"])
            .map_err(|e| write_error(path, e))?;
        for edge in &edges {
            let parent = names.get(&edge.parent_product_id).cloned().unwrap_or_default();
            let child = names.get(&edge.child_product_id).cloned().unwrap_or_default();
            writer
                .write_record([parent, child, edge.quantity.to_string()])
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
        Ok(edges.len())
    }

    fn write_sales(&self, path: &Path) -> ImportResult<usize> {
        let sales = self.sale_repo.list_all()?;
        let mut writer = open_writer(path)?;
        writer
            .write_record(["ID", "Product", "Quantity", "Unit Price", "Total", "Date"])
            .map_err(|e| write_error(path, e))?;
        for s in &sales {
            writer
                .write_record([
                    s.id.to_string(),
                    s.product_name.clone(),
                    s.quantity.to_string(),
                    s.unit_price.to_string(),
                    s.total_amount.to_string(),
                    s.date.format(LEDGER_DATETIME_FORMAT).to_string(),
                ])
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
        Ok(sales.len())
    }

    fn write_revenue(&self, path: &Path) -> ImportResult<usize> {
        let revenue = self.revenue_repo.list(None)?;
        let mut writer = open_writer(path)?;
        writer
            .write_record(["ID", "Description", "Amount", "Date"])
            .map_err(|e| write_error(path, e))?;
        for r in &revenue {
            writer
                .write_record([
                    r.id.to_string(),
                    r.description.clone().unwrap_or_default(),
                    r.amount.to_string(),
                    r.date.format(LEDGER_DATETIME_FORMAT).to_string(),
                ])
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
        Ok(revenue.len())
    }

    fn write_costs(&self, path: &Path) -> ImportResult<usize> {
        let costs = self.cost_repo.list(None)?;
        let mut writer = open_writer(path)?;
        writer
            .write_record(["ID", "Description", "Amount", "Category", "Date"])
            .map_err(|e| write_error(path, e))?;
        for c in &costs {
            writer
                .write_record([
                    c.id.to_string(),
                    c.description.clone().unwrap_or_default(),
                    c.amount.to_string(),
                    c.category.clone(),
                    c.date.format(LEDGER_DATETIME_FORMAT).to_string(),
                ])
                .map_err(|e| write_error(path, e))?;
        }
        writer.flush().map_err(|e| write_error(path, e))?;
        Ok(costs.len())
    }

    /// 全量导出（同步）
    pub fn export_bundle_blocking(&self, dir: &Path) -> ImportResult<ExportSummary> {
        fs::create_dir_all(dir).map_err(|e| write_error(dir, e))?;

        let mut files = Vec::with_capacity(5);
        let mut rows = 0;

        let inventory = dir.join(INVENTORY_FILE);
        rows += self.write_inventory(&inventory)?;
        files.push(inventory);

        let bom = dir.join(BOM_FILE);
        rows += self.write_bom(&bom)?;
        files.push(bom);

        let sales = dir.join(SALES_FILE);
        rows += self.write_sales(&sales)?;
        files.push(sales);

        let revenue = dir.join(REVENUE_FILE);
        rows += self.write_revenue(&revenue)?;
        files.push(revenue);

        let costs = dir.join(COSTS_FILE);
        rows += self.write_costs(&costs)?;
        files.push(costs);

        Ok(ExportSummary { files, rows })
    }

    /// 周期销售报表（同步）
    pub fn export_sales_report_blocking(
        &self,
        period: ReportPeriod,
        path: &Path,
    ) -> ImportResult<ExportSummary> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }

        let sales = self.sale_repo.list_by_period(Some(period))?;
        let mut writer = open_writer(path)?;
        writer
            .write_record(["ID", "Date", "Product", "Quantity", "Unit Price", "Total"])
            .map_err(|e| write_error(path, e))?;

        let mut total = 0.0;
        for s in &sales {
            total += s.total_amount;
            writer
                .write_record([
                    s.id.to_string(),
                    s.date.format(LEDGER_DATETIME_FORMAT).to_string(),
                    s.product_name.clone(),
                    s.quantity.to_string(),
                    s.unit_price.to_string(),
                    s.total_amount.to_string(),
                ])
                .map_err(|e| write_error(path, e))?;
        }
        let total_text = total.to_string();
        writer
            .write_record(["", "", "TOTAL", "", "", total_text.as_str()])
            .map_err(|e| write_error(path, e))?;
        writer.flush().map_err(|e| write_error(path, e))?;

        Ok(ExportSummary {
            files: vec![path.to_path_buf()],
            rows: sales.len(),
        })
    }
}

// ==========================================
// 异步包装（共享连接，在阻塞线程执行）
// ==========================================
pub struct CsvExporterHandle {
    exporter: Arc<CsvExporter>,
}

impl CsvExporterHandle {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            exporter: Arc::new(CsvExporter::new(conn)),
        }
    }
}

#[async_trait]
impl DataExporter for CsvExporterHandle {
    async fn export_bundle(&self, dir: PathBuf) -> ImportResult<ExportSummary> {
        let exporter = self.exporter.clone();
        let summary = tokio::task::spawn_blocking(move || exporter.export_bundle_blocking(&dir))
            .await
            .map_err(|e| ImportError::TaskJoinError(e.to_string()))??;
        tracing::info!(files = summary.files.len(), rows = summary.rows, "全量导出完成");
        Ok(summary)
    }

    async fn export_sales_report(
        &self,
        period: ReportPeriod,
        path: PathBuf,
    ) -> ImportResult<ExportSummary> {
        let exporter = self.exporter.clone();
        let summary = tokio::task::spawn_blocking(move || {
            exporter.export_sales_report_blocking(period, &path)
        })
        .await
        .map_err(|e| ImportError::TaskJoinError(e.to_string()))??;
        tracing::info!(rows = summary.rows, ?period, "销售报表导出完成");
        Ok(summary)
    }
}
