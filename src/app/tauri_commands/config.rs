use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 配置管理命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn list_configs(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.config_api.clone();
    Ok(run_blocking("list_configs", move || api.list_configs()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_config(state: tauri::State<'_, AppState>, key: String) -> Result<String, String> {
    let api = state.config_api.clone();
    Ok(run_blocking("get_config", move || api.get_config(&key)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_config(
    state: tauri::State<'_, AppState>,
    key: String,
    value: String,
) -> Result<String, String> {
    let api = state.config_api.clone();
    Ok(run_blocking("update_config", move || api.set_config(&key, &value)).await)
}
