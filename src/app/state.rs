// ==========================================
// 小微企业 ERP - 应用状态
// ==========================================
// 职责: 打开共享连接、建库，并组装所有 Repository / Engine / API
// 所有组件共享同一个 Arc<Mutex<Connection>>
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    BomApi, ConfigApi, ExchangeApi, FinanceApi, InventoryApi, ProductionApi, ReportApi, SalesApi,
};
use crate::config::ConfigManager;
use crate::db::{ensure_schema, open_in_memory, open_sqlite_connection};
use crate::engine::{BomGraph, ProductionEngine, SalesLedger};
use crate::importer::{CsvExporterHandle, InventoryImporterImpl};
use crate::repository::{
    CostRepository, ProductRepository, ReportRepository, RevenueRepository,
};

/// 应用状态
///
/// 在 Tauri 应用中作为全局状态管理
pub struct AppState {
    /// 数据库路径（内存库为 ":memory:"）
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    pub inventory_api: Arc<InventoryApi>,
    pub bom_api: Arc<BomApi>,
    pub production_api: Arc<ProductionApi>,
    pub sales_api: Arc<SalesApi>,
    pub finance_api: Arc<FinanceApi>,
    pub report_api: Arc<ReportApi>,
    pub exchange_api: Arc<ExchangeApi>,
    pub config_api: Arc<ConfigApi>,
}

impl AppState {
    /// 打开（必要时创建）数据库文件并初始化
    ///
    /// # 说明
    /// 1. 打开连接并应用统一 PRAGMA
    /// 2. 建表 + 幂等迁移
    /// 3. 组装各层实例
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        Self::from_connection(db_path, conn)
    }

    /// 内存数据库（测试 / 演示）
    pub fn in_memory() -> Result<Self, String> {
        let conn = open_in_memory().map_err(|e| format!("无法打开内存数据库: {}", e))?;
        Self::from_connection(":memory:".to_string(), conn)
    }

    fn from_connection(db_path: String, conn: Connection) -> Result<Self, String> {
        ensure_schema(&conn).map_err(|e| format!("数据库初始化失败: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // Repository 层
        // ==========================================
        let product_repo = Arc::new(ProductRepository::from_connection(conn.clone()));
        let revenue_repo = Arc::new(RevenueRepository::from_connection(conn.clone()));
        let cost_repo = Arc::new(CostRepository::from_connection(conn.clone()));
        let report_repo = Arc::new(ReportRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(ConfigManager::from_connection(conn.clone()));

        // ==========================================
        // Engine 层
        // ==========================================
        let bom_graph = Arc::new(BomGraph::new(conn.clone()));
        let production_engine = Arc::new(ProductionEngine::new(conn.clone()));
        let sales_ledger = Arc::new(SalesLedger::new(conn.clone()));
        let importer = Arc::new(InventoryImporterImpl::new(conn.clone()));
        let exporter = Arc::new(CsvExporterHandle::new(conn.clone()));

        // ==========================================
        // API 层
        // ==========================================
        let inventory_api = Arc::new(InventoryApi::new(product_repo.clone()));
        let bom_api = Arc::new(BomApi::new(bom_graph));
        let production_api = Arc::new(ProductionApi::new(production_engine));
        let sales_api = Arc::new(SalesApi::new(
            sales_ledger,
            product_repo.clone(),
            config_manager.clone(),
        ));
        let finance_api = Arc::new(FinanceApi::new(
            revenue_repo,
            cost_repo,
            config_manager.clone(),
        ));
        let report_api = Arc::new(ReportApi::new(
            report_repo,
            product_repo,
            config_manager.clone(),
        ));
        let exchange_api = Arc::new(ExchangeApi::new(
            importer,
            exporter,
            config_manager.clone(),
        ));
        let config_api = Arc::new(ConfigApi::new(config_manager));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            inventory_api,
            bom_api,
            production_api,
            sales_api,
            finance_api,
            report_api,
            exchange_api,
            config_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: PYME_ERP_DB_PATH 环境变量 → 用户数据目录 → ./erp_data.db
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var("PYME_ERP_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./erp_data.db");

    if let Some(data_dir) = dirs::data_dir() {
        // 开发环境使用独立目录，避免污染生产数据
        #[cfg(debug_assertions)]
        let dir = data_dir.join("pyme-erp-dev");

        #[cfg(not(debug_assertions))]
        let dir = data_dir.join("pyme-erp");

        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("erp_data.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_in_memory_state_is_usable() {
        let state = AppState::in_memory().unwrap();
        assert_eq!(state.db_path, ":memory:");
        assert!(state.inventory_api.list_products().unwrap().is_empty());
    }
}
