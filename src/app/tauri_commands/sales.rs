use crate::api::sales_api::SaleInput;
use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 销售相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn add_sale(state: tauri::State<'_, AppState>, sale: SaleInput) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("add_sale", move || api.add_sale(sale)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn add_multiple_sales(
    state: tauri::State<'_, AppState>,
    sales: Vec<SaleInput>,
) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("add_multiple_sales", move || api.add_multiple_sales(sales)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn update_sale(
    state: tauri::State<'_, AppState>,
    sale_id: i64,
    sale: SaleInput,
) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("update_sale", move || api.update_sale(sale_id, sale)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn delete_sale(state: tauri::State<'_, AppState>, sale_id: i64) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("delete_sale", move || api.delete_sale(sale_id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_sale(state: tauri::State<'_, AppState>, sale_id: i64) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("get_sale", move || api.get_sale(sale_id)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_sales(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("list_sales", move || api.list_sales()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_recent_sales(
    state: tauri::State<'_, AppState>,
    limit: Option<usize>,
) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("list_recent_sales", move || api.list_recent_sales(limit)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn list_sales_by_period(
    state: tauri::State<'_, AppState>,
    period: String,
) -> Result<String, String> {
    let api = state.sales_api.clone();
    Ok(run_blocking("list_sales_by_period", move || api.list_sales_by_period(&period)).await)
}
