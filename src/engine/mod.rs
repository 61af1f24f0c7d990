// ==========================================
// 小微企业 ERP - 引擎层
// ==========================================
// 职责: 实现业务规则引擎,不拼 SQL
// 红线: Engine 不拼 SQL, 所有规则失败必须输出原因
// 多步写入在单事务内完成
// ==========================================

pub mod bom_graph;
pub mod capacity;
pub mod cost_rollup;
pub mod error;
pub mod production;
pub mod sales_ledger;

// 重导出核心引擎
pub use bom_graph::BomGraph;
pub use capacity::{CapacityCalculator, CAPACITY_EPSILON};
pub use cost_rollup::CostCalculator;
pub use error::{EngineError, EngineResult};
pub use production::ProductionEngine;
pub use sales_ledger::SalesLedger;
