// ==========================================
// 小微企业 ERP - 配置管理 API
// ==========================================
// 职责: 设置页的配置查询与更新
// ==========================================

use std::sync::Arc;

use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigEntry, ConfigManager};

/// 允许从设置页修改的配置键
const EDITABLE_KEYS: [&str; 5] = [
    config_keys::DEFAULT_COST_CATEGORY,
    config_keys::RECENT_ENTRIES_LIMIT,
    config_keys::TOP_PRODUCTS_LIMIT,
    config_keys::STALE_PRODUCT_DAYS,
    config_keys::EXPORT_DIR,
];

pub struct ConfigApi {
    config_manager: Arc<ConfigManager>,
}

impl ConfigApi {
    pub fn new(config_manager: Arc<ConfigManager>) -> Self {
        Self { config_manager }
    }

    /// 查询所有已保存的配置
    pub fn list_configs(&self) -> ApiResult<Vec<ConfigEntry>> {
        Ok(self.config_manager.list_all()?)
    }

    pub fn get_config(&self, key: &str) -> ApiResult<Option<String>> {
        Ok(self.config_manager.get_value(key)?)
    }

    /// 更新配置（未知键 / 数值键填入非数字 → ValidationError）
    pub fn set_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        if !EDITABLE_KEYS.contains(&key) {
            return Err(ApiError::ValidationError(format!("未知配置项: {}", key)));
        }

        let numeric = matches!(
            key,
            config_keys::RECENT_ENTRIES_LIMIT
                | config_keys::TOP_PRODUCTS_LIMIT
                | config_keys::STALE_PRODUCT_DAYS
        );
        if numeric && value.trim().parse::<u32>().is_err() {
            return Err(ApiError::ValidationError(format!(
                "配置项 {} 需要非负整数: {}",
                key, value
            )));
        }

        self.config_manager.set_value(key, value.trim())?;
        info!(key, value, "配置已更新");
        Ok(())
    }
}
