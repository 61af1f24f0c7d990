use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 生产相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn max_producible(state: tauri::State<'_, AppState>, parent_id: i64) -> Result<String, String> {
    let api = state.production_api.clone();
    Ok(run_blocking("max_producible", move || api.max_producible(parent_id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn produce(
    state: tauri::State<'_, AppState>,
    parent_id: i64,
    quantity: f64,
) -> Result<String, String> {
    let api = state.production_api.clone();
    Ok(run_blocking("produce", move || api.produce(parent_id, quantity)).await)
}
