use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use serde::Serialize;

// ==========================================
// 公共工具：阻塞执行 + 信封序列化
// ==========================================

/// 在阻塞线程执行同步 API，并把结果（含任务失败）转换为信封 JSON
pub(super) async fn run_blocking<T, F>(command: &'static str, f: F) -> String
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> ApiResult<T> + Send + 'static,
{
    let result = tauri::async_runtime::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::StoreFailure(format!("任务执行失败: {}", e)))
        .and_then(|r| r);
    envelope(command, result)
}

/// 结果 → 信封 JSON
pub(super) fn envelope<T: Serialize>(command: &'static str, result: ApiResult<T>) -> String {
    if let Err(e) = &result {
        tracing::warn!(command, code = e.code(), error = %e, "命令执行失败");
    }
    ApiResponse::from_result(result).to_json()
}
