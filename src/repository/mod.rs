// ==========================================
// 小微企业 ERP - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// 多步写入由 engine 层持有事务，调用各仓储的 *_tx 函数
// ==========================================

pub mod bom_repo;
pub mod error;
pub mod finance_repo;
pub mod product_repo;
pub mod report_repo;
pub mod sale_repo;

// 重导出核心仓储
pub use bom_repo::BomRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use finance_repo::{CostRepository, RevenueRepository};
pub use product_repo::ProductRepository;
pub use report_repo::ReportRepository;
pub use sale_repo::SaleRepository;
