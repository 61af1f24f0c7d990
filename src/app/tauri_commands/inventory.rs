use crate::api::inventory_api::ProductInput;
use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 库存相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn create_product(state: tauri::State<'_, AppState>, product: ProductInput) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("create_product", move || api.create_product(product)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_product(state: tauri::State<'_, AppState>, id: i64) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("get_product", move || api.get_product(id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_products(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("list_products", move || api.list_products()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_products_by_kind(state: tauri::State<'_, AppState>, kind: String) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("list_products_by_kind", move || api.list_products_by_kind(&kind)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_below_min_stock(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("list_below_min_stock", move || api.list_below_min_stock()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_product(
    state: tauri::State<'_, AppState>,
    id: i64,
    product: ProductInput,
) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("update_product", move || api.update_product(id, product)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_product(state: tauri::State<'_, AppState>, id: i64) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("delete_product", move || api.delete_product(id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn adjust_stock(state: tauri::State<'_, AppState>, id: i64, delta: f64) -> Result<String, String> {
    let api = state.inventory_api.clone();
    Ok(run_blocking("adjust_stock", move || api.adjust_stock(id, delta)).await)
}
