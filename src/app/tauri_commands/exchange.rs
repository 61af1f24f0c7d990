use crate::app::state::AppState;

use super::common::envelope;

// ==========================================
// 表格导入/导出命令（API 内部已在阻塞线程执行）
// ==========================================

#[tauri::command(rename_all = "snake_case")]
pub async fn export_bundle(
    state: tauri::State<'_, AppState>,
    dir: Option<String>,
) -> Result<String, String> {
    let api = state.exchange_api.clone();
    Ok(envelope("export_bundle", api.export_bundle(dir).await))
}

#[tauri::command(rename_all = "snake_case")]
pub async fn export_sales_report(
    state: tauri::State<'_, AppState>,
    period: String,
    path: Option<String>,
) -> Result<String, String> {
    let api = state.exchange_api.clone();
    Ok(envelope(
        "export_sales_report",
        api.export_sales_report(&period, path).await,
    ))
}

#[tauri::command(rename_all = "snake_case")]
pub async fn import_inventory(
    state: tauri::State<'_, AppState>,
    products_file: String,
    bom_file: Option<String>,
) -> Result<String, String> {
    let api = state.exchange_api.clone();
    Ok(envelope(
        "import_inventory",
        api.import_inventory(products_file, bom_file).await,
    ))
}
