// ==========================================
// 小微企业 ERP - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod bom;
pub mod ledger;
pub mod product;
pub mod report;
pub mod types;

// 重导出核心类型
pub use bom::{
    BomComponent, BomEdge, BomEdgeView, CapacityReport, ComponentCapacity, ComponentCost,
    ConsumedComponent, CostBreakdown, ProductionResult,
};
pub use ledger::{BatchSaleResult, Cost, EntryDraft, Revenue, Sale, SaleDraft};
pub use product::{Product, ProductDraft, ProductView};
pub use report::{
    BiDashboard, CostCategoryTotal, FinancialMetrics, FinancialSummary, InventoryKpis,
    InventoryValuation, KpiData, StaleProduct, TopProductByProfit, TopProductBySales,
};
pub use types::{Measurement, ProductKind, ReportPeriod};
