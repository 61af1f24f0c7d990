// ==========================================
// 小微企业 ERP - 统一响应信封
// ==========================================
// { success, data?, message?, code? }
// 所有 API 结果都转换为信封，失败不越过边界
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "has_no_payload")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// 无数据或数据为零大小类型（如 `()`）时不输出 data 字段
fn has_no_payload<T>(data: &Option<T>) -> bool {
    data.is_none() || std::mem::size_of::<T>() == 0
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            code: None,
        }
    }

    pub fn error(err: &ApiError) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(err.to_string()),
            code: Some(err.code().to_string()),
        }
    }

    pub fn from_result(result: ApiResult<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => {
                tracing::debug!(code = err.code(), error = %err, "API 调用失败");
                Self::error(&err)
            }
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    /// 序列化为 JSON（序列化本身失败时退化为失败信封）
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "success": false,
                "message": format!("序列化失败: {}", e),
                "code": "STORE_FAILURE",
            })
            .to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_empty_fields() {
        let json = ApiResponse::ok(5).to_json();
        assert_eq!(json, r#"{"success":true,"data":5}"#);
    }

    #[test]
    fn test_unit_result_has_no_data_field() {
        let json = ApiResponse::from_result(Ok(())).to_json();
        assert_eq!(json, r#"{"success":true}"#);
    }

    #[test]
    fn test_failure_envelope_carries_code_and_message() {
        let result: ApiResult<i32> = Err(ApiError::NoBillOfMaterials { product_id: 3 });
        let response = ApiResponse::from_result(result);
        assert!(!response.success);
        assert_eq!(response.data, None);
        assert_eq!(response.code.as_deref(), Some("NO_BILL_OF_MATERIALS"));
        assert!(response.message.unwrap().contains('3'));
    }
}
