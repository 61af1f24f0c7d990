use crate::api::finance_api::{CostInput, EntryInput};
use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 收入相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn add_revenue(state: tauri::State<'_, AppState>, entry: EntryInput) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("add_revenue", move || api.add_revenue(entry)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_revenue(
    state: tauri::State<'_, AppState>,
    id: i64,
    entry: EntryInput,
) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("update_revenue", move || api.update_revenue(id, entry)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_revenue(state: tauri::State<'_, AppState>, id: i64) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("delete_revenue", move || api.delete_revenue(id)).await)
}

// ==========================================
// 成本相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn add_cost(state: tauri::State<'_, AppState>, entry: CostInput) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("add_cost", move || api.add_cost(entry)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_cost(
    state: tauri::State<'_, AppState>,
    id: i64,
    entry: CostInput,
) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("update_cost", move || api.update_cost(id, entry)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_cost(state: tauri::State<'_, AppState>, id: i64) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("delete_cost", move || api.delete_cost(id)).await)
}

// ==========================================
// 组合查询
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_recent_finances(
    state: tauri::State<'_, AppState>,
    limit: Option<usize>,
) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("get_recent_finances", move || api.recent_finances(limit)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_all_finances(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.finance_api.clone();
    Ok(run_blocking("get_all_finances", move || api.all_finances()).await)
}
