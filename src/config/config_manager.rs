// ==========================================
// 小微企业 ERP - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value)
// ==========================================

use crate::domain::ledger::DEFAULT_COST_CATEGORY;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    // 台账
    pub const DEFAULT_COST_CATEGORY: &str = "default_cost_category";
    pub const RECENT_ENTRIES_LIMIT: &str = "recent_entries_limit";

    // 报表
    pub const TOP_PRODUCTS_LIMIT: &str = "top_products_limit";
    pub const STALE_PRODUCT_DAYS: &str = "stale_product_days";

    // 导出
    pub const EXPORT_DIR: &str = "export_dir";
}

/// 配置项（设置页展示用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub updated_at: String,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        Ok(conn
            .query_row(
                "SELECT value FROM config_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?)
    }

    fn get_or_default(&self, key: &str, default: &str) -> RepositoryResult<String> {
        Ok(self
            .get_value(key)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string()))
    }

    fn get_usize_or(&self, key: &str, default: usize) -> RepositoryResult<usize> {
        let value = self.get_or_default(key, &default.to_string())?;
        Ok(value.parse::<usize>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %value, "配置值无法解析，使用默认值");
            default
        }))
    }

    /// 写入配置（存在则覆盖）
    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(RepositoryError::ValidationError("配置键不能为空".to_string()));
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        tracing::info!(key, "配置已更新");
        Ok(())
    }

    /// 全部配置（按键排序）
    pub fn list_all(&self) -> RepositoryResult<Vec<ConfigEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key, value, updated_at FROM config_kv ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok(ConfigEntry {
                key: row.get(0)?,
                value: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    // ==========================================
    // 类型化读取
    // ==========================================

    pub fn default_cost_category(&self) -> RepositoryResult<String> {
        self.get_or_default(config_keys::DEFAULT_COST_CATEGORY, DEFAULT_COST_CATEGORY)
    }

    pub fn recent_entries_limit(&self) -> RepositoryResult<usize> {
        self.get_usize_or(config_keys::RECENT_ENTRIES_LIMIT, 10)
    }

    pub fn top_products_limit(&self) -> RepositoryResult<usize> {
        self.get_usize_or(config_keys::TOP_PRODUCTS_LIMIT, 5)
    }

    pub fn stale_product_days(&self) -> RepositoryResult<u32> {
        Ok(self.get_usize_or(config_keys::STALE_PRODUCT_DAYS, 30)? as u32)
    }

    /// 导出目录：未配置时取用户文档目录，再退回当前目录
    pub fn export_dir(&self) -> RepositoryResult<PathBuf> {
        if let Some(dir) = self
            .get_value(config_keys::EXPORT_DIR)?
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
        {
            return Ok(PathBuf::from(dir));
        }
        Ok(dirs::document_dir().unwrap_or_else(|| PathBuf::from(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ensure_schema, open_in_memory};

    fn manager() -> ConfigManager {
        let conn = open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn)))
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = manager();
        assert_eq!(config.default_cost_category().unwrap(), "Other");
        assert_eq!(config.recent_entries_limit().unwrap(), 10);
        assert_eq!(config.top_products_limit().unwrap(), 5);
        assert_eq!(config.stale_product_days().unwrap(), 30);
    }

    #[test]
    fn test_set_value_upserts() {
        let config = manager();
        config.set_value(config_keys::TOP_PRODUCTS_LIMIT, "3").unwrap();
        config.set_value(config_keys::TOP_PRODUCTS_LIMIT, "8").unwrap();
        assert_eq!(config.top_products_limit().unwrap(), 8);
        assert_eq!(config.list_all().unwrap().len(), 1);
    }

    #[test]
    fn test_unparsable_number_falls_back() {
        let config = manager();
        config.set_value(config_keys::RECENT_ENTRIES_LIMIT, "lots").unwrap();
        assert_eq!(config.recent_entries_limit().unwrap(), 10);
    }

    #[test]
    fn test_export_dir_from_config() {
        let config = manager();
        config.set_value(config_keys::EXPORT_DIR, "/tmp/erp-out").unwrap();
        assert_eq!(config.export_dir().unwrap(), PathBuf::from("/tmp/erp-out"));
    }
}
