use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// BOM 相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn add_bom_edge(
    state: tauri::State<'_, AppState>,
    parent_id: i64,
    child_id: i64,
    quantity: f64,
) -> Result<String, String> {
    let api = state.bom_api.clone();
    Ok(run_blocking("add_bom_edge", move || api.add_edge(parent_id, child_id, quantity)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn remove_bom_edge(state: tauri::State<'_, AppState>, edge_id: i64) -> Result<String, String> {
    let api = state.bom_api.clone();
    Ok(run_blocking("remove_bom_edge", move || api.remove_edge(edge_id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_bom_edges(state: tauri::State<'_, AppState>, parent_id: i64) -> Result<String, String> {
    let api = state.bom_api.clone();
    Ok(run_blocking("list_bom_edges", move || api.list_edges_for_parent(parent_id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn calculate_product_cost(
    state: tauri::State<'_, AppState>,
    parent_id: i64,
) -> Result<String, String> {
    let api = state.bom_api.clone();
    Ok(run_blocking("calculate_product_cost", move || api.calculate_cost(parent_id)).await)
}
