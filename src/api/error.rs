// ==========================================
// 小微企业 ERP - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把仓储/引擎/导入错误转换为用户可读的错误
// 每个错误都有稳定的 code，供前端分支处理
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("约束冲突: {0}")]
    ConstraintViolation(String),

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

    #[error("存储失败: {0}")]
    StoreFailure(String),

    #[error("文件导入/导出失败: {0}")]
    ImportError(String),
}

impl ApiError {
    /// 稳定错误代码
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            ApiError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            ApiError::NoBillOfMaterials { .. } => "NO_BILL_OF_MATERIALS",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::StoreFailure(_) => "STORE_FAILURE",
            ApiError::ImportError(_) => "IMPORT_ERROR",
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            // 外键失败 = 引用了不存在的产品/销售
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::NotFound(format!("引用的记录不存在: {}", msg))
            }
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::ConstraintViolation(format!("名称或 SKU 已存在: {}", msg))
            }
            RepositoryError::CheckConstraintViolation(msg) => ApiError::ValidationError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::DatabaseConnectionError(msg)
            | RepositoryError::LockError(msg)
            | RepositoryError::DatabaseTransactionError(msg)
            | RepositoryError::DatabaseQueryError(msg)
            | RepositoryError::InternalError(msg) => ApiError::StoreFailure(msg),
            RepositoryError::Other(err) => ApiError::StoreFailure(err.to_string()),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            EngineError::InsufficientStock {
                product_id,
                requested,
                available,
            } => ApiError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            EngineError::NoBillOfMaterials { product_id } => {
                ApiError::NoBillOfMaterials { product_id }
            }
            EngineError::ValidationError(msg) => ApiError::ValidationError(msg),
            cycle @ EngineError::CycleDetected { .. } => {
                ApiError::ConstraintViolation(cycle.to_string())
            }
            batch @ EngineError::BatchAborted { .. } => ApiError::StoreFailure(batch.to_string()),
            EngineError::Repository(err) => err.into(),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(err) => err.into(),
            ImportError::Engine(err) => err.into(),
            ImportError::FileNotFound(path) => ApiError::NotFound(format!("文件不存在: {}", path)),
            dup @ ImportError::DuplicateProduct { .. } => {
                ApiError::ConstraintViolation(dup.to_string())
            }
            invalid @ (ImportError::FieldMappingError { .. }
            | ImportError::DateFormatError { .. }
            | ImportError::UnsupportedFormat(_)) => ApiError::ValidationError(invalid.to_string()),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_mapping() {
        let err: ApiError = RepositoryError::UniqueConstraintViolation("UNIQUE".into()).into();
        assert_eq!(err.code(), "CONSTRAINT_VIOLATION");

        let err: ApiError = RepositoryError::ForeignKeyViolation("FOREIGN KEY".into()).into();
        assert_eq!(err.code(), "NOT_FOUND");

        let err: ApiError = RepositoryError::LockError("poisoned".into()).into();
        assert_eq!(err.code(), "STORE_FAILURE");
    }

    #[test]
    fn test_engine_mapping() {
        let err: ApiError = EngineError::InsufficientStock {
            product_id: 1,
            requested: 6.0,
            available: 5.0,
        }
        .into();
        assert!(matches!(err, ApiError::InsufficientStock { available, .. } if available == 5.0));

        let err: ApiError = EngineError::BatchAborted {
            index: 2,
            reason: "Product(id=99)不存在".into(),
        }
        .into();
        assert_eq!(err.code(), "STORE_FAILURE");
        assert!(err.to_string().contains("第 2 条"));

        let err: ApiError = EngineError::Repository(RepositoryError::not_found("Sale", 7)).into();
        assert_eq!(err.code(), "NOT_FOUND");
    }
}
