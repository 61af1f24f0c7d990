use crate::app::state::AppState;

use super::common::run_blocking;

// ==========================================
// 报表相关命令
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn get_financial_summary(
    state: tauri::State<'_, AppState>,
    period: String,
) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_financial_summary", move || api.financial_summary(&period)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_kpi_data(state: tauri::State<'_, AppState>, period: String) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_kpi_data", move || api.kpi_data(&period)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_top_products_by_sales(
    state: tauri::State<'_, AppState>,
    limit: usize,
) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_top_products_by_sales", move || api.top_products_by_sales(limit)).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_top_products_by_profitability(
    state: tauri::State<'_, AppState>,
    limit: usize,
) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_top_products_by_profitability", move || {
        api.top_products_by_profitability(limit)
    })
    .await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_cost_breakdown(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_cost_breakdown", move || api.cost_breakdown_by_category()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_products_without_movement(
    state: tauri::State<'_, AppState>,
    days: u32,
) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_products_without_movement", move || {
        api.products_without_movement(days)
    })
    .await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_inventory_valuation(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_inventory_valuation", move || api.inventory_valuation_by_kind()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_financial_metrics(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_financial_metrics", move || api.financial_metrics_current_month()).await)
}

#[tauri::command(rename_all = "snake_case")]
pub async fn get_bi_dashboard(state: tauri::State<'_, AppState>) -> Result<String, String> {
    let api = state.report_api.clone();
    Ok(run_blocking("get_bi_dashboard", move || api.bi_dashboard()).await)
}
