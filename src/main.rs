// ==========================================
// 小微企业 ERP - Tauri 主入口
// ==========================================
// 技术栈: Tauri + Rust + SQLite
// ==========================================

// 禁止控制台窗口 (Windows)
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use pyme_erp::app::{get_default_db_path, AppState};

#[cfg(feature = "tauri-app")]
fn main() {
    use pyme_erp::app::tauri_commands::*;

    pyme_erp::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", pyme_erp::APP_NAME, pyme_erp::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("无法初始化AppState: {}", e);
            std::process::exit(1);
        }
    };

    let result = tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // ==========================================
            // 库存 (8个)
            // ==========================================
            create_product,
            get_product,
            list_products,
            list_products_by_kind,
            list_below_min_stock,
            update_product,
            delete_product,
            adjust_stock,

            // ==========================================
            // BOM (4个)
            // ==========================================
            add_bom_edge,
            remove_bom_edge,
            list_bom_edges,
            calculate_product_cost,

            // ==========================================
            // 生产 (2个)
            // ==========================================
            max_producible,
            produce,

            // ==========================================
            // 销售 (8个)
            // ==========================================
            add_sale,
            add_multiple_sales,
            update_sale,
            delete_sale,
            get_sale,
            list_sales,
            list_recent_sales,
            list_sales_by_period,

            // ==========================================
            // 收入 / 成本 (8个)
            // ==========================================
            add_revenue,
            update_revenue,
            delete_revenue,
            add_cost,
            update_cost,
            delete_cost,
            get_recent_finances,
            get_all_finances,

            // ==========================================
            // 报表 (9个)
            // ==========================================
            get_financial_summary,
            get_kpi_data,
            get_top_products_by_sales,
            get_top_products_by_profitability,
            get_cost_breakdown,
            get_products_without_movement,
            get_inventory_valuation,
            get_financial_metrics,
            get_bi_dashboard,

            // ==========================================
            // 导入 / 导出 (3个)
            // ==========================================
            export_bundle,
            export_sales_report,
            import_inventory,

            // ==========================================
            // 配置 (3个)
            // ==========================================
            list_configs,
            get_config,
            update_config,
        ])
        .run(tauri::generate_context!());

    if let Err(e) = result {
        tracing::error!("Tauri应用异常退出: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Tauri应用已退出");
}

#[cfg(not(feature = "tauri-app"))]
fn main() {
    pyme_erp::logging::init();

    println!("==================================================");
    println!("{} v{}", pyme_erp::APP_NAME, pyme_erp::VERSION);
    println!("==================================================");
    println!();
    println!("此可执行文件需要启用 tauri-app 特性");
    println!("使用: cargo run --features tauri-app");
    println!();

    // 无界面模式：只做建库检查，便于确认数据库路径与迁移状态
    let db_path = get_default_db_path();
    match AppState::new(db_path.clone()) {
        Ok(state) => match state.inventory_api.list_products() {
            Ok(products) => println!("数据库就绪: {}（产品 {} 个）", db_path, products.len()),
            Err(e) => eprintln!("数据库读取失败: {}", e),
        },
        Err(e) => {
            eprintln!("数据库初始化失败: {}", e);
            std::process::exit(1);
        }
    }
}
