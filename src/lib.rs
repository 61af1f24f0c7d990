// ==========================================
// 小微企业 ERP - 核心库
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// 范围: 库存台账 / BOM / 生产 / 销售与财务台账 / 报表 / 表格交换
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 表格交换层 - 导入 / 导出
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化 / 建库迁移）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - Tauri 集成
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

pub use domain::types::{Measurement, ProductKind, ReportPeriod};

pub use domain::{
    BomEdge, CapacityReport, Cost, CostBreakdown, Product, ProductDraft, ProductView,
    ProductionResult, Revenue, Sale, SaleDraft,
};

pub use engine::{BomGraph, ProductionEngine, SalesLedger};

pub use api::{ApiError, ApiResponse, ApiResult};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "小微企业 ERP";
