// ==========================================
// 小微企业 ERP - API 层
// ==========================================
// 职责: 提供业务 API 接口，供 Tauri 命令调用
// 所有结果经 ApiResponse 信封返回，错误不越过边界
// ==========================================

pub mod bom_api;
pub mod config_api;
pub mod error;
pub mod exchange_api;
pub mod finance_api;
pub mod input;
pub mod inventory_api;
pub mod production_api;
pub mod report_api;
pub mod response;
pub mod sales_api;

// 重导出核心类型
pub use bom_api::BomApi;
pub use config_api::ConfigApi;
pub use error::{ApiError, ApiResult};
pub use exchange_api::ExchangeApi;
pub use finance_api::{CostInput, EntryInput, FinanceApi, FinanceEntries};
pub use inventory_api::{InventoryApi, ProductInput};
pub use production_api::ProductionApi;
pub use report_api::ReportApi;
pub use response::ApiResponse;
pub use sales_api::{SaleInput, SalesApi};
