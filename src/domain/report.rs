// ==========================================
// 小微企业 ERP - 报表读模型
// ==========================================
// 纯读侧聚合结果，不参与任何库存不变量
// ==========================================

use crate::domain::types::ProductKind;
use serde::{Deserialize, Serialize};

/// 按周期分桶的收入/成本/利润
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub labels: Vec<String>,
    pub revenue: Vec<f64>,
    pub costs: Vec<f64>,
    pub profit: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryKpis {
    pub total_stock_items: f64,
    pub stock_alerts_count: usize,
    pub total_inventory_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiData {
    pub financial_summary: FinancialSummary,
    pub inventory_kpis: InventoryKpis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProductBySales {
    pub product_name: String,
    pub total_quantity: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProductByProfit {
    pub product_name: String,
    pub product_id: Option<i64>,
    pub total_quantity: f64,
    pub total_revenue: f64,
    pub unit_cost: Option<f64>,
    pub total_profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostCategoryTotal {
    pub category: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaleProduct {
    pub id: i64,
    pub name: String,
    pub kind: ProductKind,
    pub stock: f64,
    pub unit_cost: f64,
    pub total_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryValuation {
    pub kind: ProductKind,
    pub product_count: i64,
    pub total_value: f64,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub sales_count: i64,
    pub total_sales: f64,
    pub avg_ticket: f64,
    pub total_revenue: f64,
    pub total_costs: f64,
    pub profit: f64,
    /// 利润率（%，两位小数）
    pub profit_margin: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiDashboard {
    pub top_sales: Vec<TopProductBySales>,
    pub top_profitability: Vec<TopProductByProfit>,
    pub cost_breakdown: Vec<CostCategoryTotal>,
    pub products_no_movement: Vec<StaleProduct>,
    pub inventory_valuation: Vec<InventoryValuation>,
    pub financial_metrics: FinancialMetrics,
}

/// 两位小数舍入
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
