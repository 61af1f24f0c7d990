// ==========================================
// 小微企业 ERP - 引擎层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 规则失败必须带出原因（数量 / 可用量 / 条目序号）
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("库存不足: 产品 {product_id} 请求 {requested}，最多可生产 {available}")]
    InsufficientStock {
        product_id: i64,
        requested: f64,
        available: f64,
    },

    #[error("产品 {product_id} 没有物料清单，无法生产")]
    NoBillOfMaterials { product_id: i64 },

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("BOM 成环: {parent_id} 已经可以经由子件到达 {child_id}")]
    CycleDetected { parent_id: i64, child_id: i64 },

    #[error("批量操作在第 {index} 条失败并已整体回滚: {reason}")]
    BatchAborted { index: usize, reason: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        EngineError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(err: rusqlite::Error) -> Self {
        EngineError::Repository(err.into())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
