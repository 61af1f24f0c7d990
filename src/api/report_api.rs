// ==========================================
// 小微企业 ERP - 报表 API
// ==========================================
// 职责: 只读汇总（财务分桶、库存 KPI、BI 看板）
// 看板的 Top N / 滞销天数取自配置
// ==========================================

use std::sync::Arc;

use tracing::debug;

use crate::api::error::ApiResult;
use crate::config::ConfigManager;
use crate::domain::report::{
    round2, BiDashboard, CostCategoryTotal, FinancialMetrics, FinancialSummary, InventoryKpis,
    InventoryValuation, KpiData, StaleProduct, TopProductByProfit, TopProductBySales,
};
use crate::domain::types::ReportPeriod;
use crate::repository::product_repo::ProductRepository;
use crate::repository::report_repo::ReportRepository;

pub struct ReportApi {
    report_repo: Arc<ReportRepository>,
    product_repo: Arc<ProductRepository>,
    config: Arc<ConfigManager>,
}

impl ReportApi {
    pub fn new(
        report_repo: Arc<ReportRepository>,
        product_repo: Arc<ProductRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            report_repo,
            product_repo,
            config,
        }
    }

    /// 财务分桶汇总；period 无法识别时按 month
    pub fn financial_summary(&self, period: &str) -> ApiResult<FinancialSummary> {
        Ok(self
            .report_repo
            .financial_summary(ReportPeriod::parse_lenient(period))?)
    }

    /// 库存 KPI: 库存总量 / 低库存数量 / 库存总值（保留两位）
    pub fn inventory_kpis(&self) -> ApiResult<InventoryKpis> {
        let products = self.product_repo.list_all()?;
        let total_stock_items = products.iter().map(|p| p.stock).sum();
        let stock_alerts_count = products.iter().filter(|p| p.is_below_min_stock()).count();
        let total_value: f64 = products.iter().map(|p| p.stock * p.unit_cost).sum();

        Ok(InventoryKpis {
            total_stock_items,
            stock_alerts_count,
            total_inventory_value: round2(total_value),
        })
    }

    pub fn kpi_data(&self, period: &str) -> ApiResult<KpiData> {
        Ok(KpiData {
            financial_summary: self.financial_summary(period)?,
            inventory_kpis: self.inventory_kpis()?,
        })
    }

    pub fn top_products_by_sales(&self, limit: usize) -> ApiResult<Vec<TopProductBySales>> {
        Ok(self.report_repo.top_products_by_sales(limit)?)
    }

    pub fn top_products_by_profitability(
        &self,
        limit: usize,
    ) -> ApiResult<Vec<TopProductByProfit>> {
        Ok(self.report_repo.top_products_by_profitability(limit)?)
    }

    pub fn cost_breakdown_by_category(&self) -> ApiResult<Vec<CostCategoryTotal>> {
        Ok(self.report_repo.cost_breakdown_by_category()?)
    }

    pub fn products_without_movement(&self, days: u32) -> ApiResult<Vec<StaleProduct>> {
        Ok(self.report_repo.products_without_movement(days)?)
    }

    pub fn inventory_valuation_by_kind(&self) -> ApiResult<Vec<InventoryValuation>> {
        Ok(self.report_repo.inventory_valuation_by_kind()?)
    }

    pub fn financial_metrics_current_month(&self) -> ApiResult<FinancialMetrics> {
        Ok(self.report_repo.financial_metrics_current_month()?)
    }

    /// BI 看板（一次取全）
    pub fn bi_dashboard(&self) -> ApiResult<BiDashboard> {
        let limit = self.config.top_products_limit()?;
        let days = self.config.stale_product_days()?;
        debug!(limit, days, "生成 BI 看板");

        Ok(BiDashboard {
            top_sales: self.top_products_by_sales(limit)?,
            top_profitability: self.top_products_by_profitability(limit)?,
            cost_breakdown: self.cost_breakdown_by_category()?,
            products_no_movement: self.products_without_movement(days)?,
            inventory_valuation: self.inventory_valuation_by_kind()?,
            financial_metrics: self.financial_metrics_current_month()?,
        })
    }
}
