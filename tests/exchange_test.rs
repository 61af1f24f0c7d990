// ==========================================
// 表格交换集成测试（导出 → 导入）
// ==========================================
// 导入/导出在阻塞线程执行，测试使用 tokio 运行时
// ==========================================

mod test_helpers;

use pyme_erp::api::ProductInput;
use pyme_erp::importer::exporter::{BOM_FILE, INVENTORY_FILE, SALES_FILE};
use std::fs;
use test_helpers::*;

fn seed_workshop(state: &pyme_erp::app::AppState) -> (i64, i64, i64) {
    let table = create_product(
        state,
        ProductInput {
            sku: Some("T-1".into()),
            unit_cost: 40.0,
            additional_cost: 5.0,
            ..product_input("Table", "final", 2.0)
        },
    );
    let plank = create_product(
        state,
        ProductInput {
            unit_cost: 3.5,
            supplier: Some("Sawmill".into()),
            purchase_date: Some("2024-01-08".into()),
            ..product_input("Plank", "component", 40.0)
        },
    );
    let glue = create_product(
        state,
        ProductInput {
            measurement: Some("mass".into()),
            unit_cost: 0.02,
            ..product_input("Glue", "component", 900.0)
        },
    );
    state.bom_api.add_edge(table, plank, 6.0).unwrap();
    state.bom_api.add_edge(table, glue, 75.0).unwrap();
    (table, plank, glue)
}

#[tokio::test]
async fn test_export_then_import_round_trip() {
    let (_src_tmp, source) = create_test_state();
    seed_workshop(&source);
    let table_id = source.inventory_api.list_products_by_kind("final").unwrap()[0]
        .product
        .id;
    source
        .sales_api
        .add_sale(sale_input(table_id, 1.0, 120.0))
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let summary = source
        .exchange_api
        .export_bundle(Some(dir.path().to_string_lossy().to_string()))
        .await
        .unwrap();
    assert_eq!(summary.files.len(), 5);
    for file in &summary.files {
        assert!(file.exists(), "{} 未生成", file.display());
    }

    let inventory_csv = fs::read_to_string(dir.path().join(INVENTORY_FILE)).unwrap();
    assert!(inventory_csv.starts_with("ID,SKU,Name,Type,Stock"));
    let sales_csv = fs::read_to_string(dir.path().join(SALES_FILE)).unwrap();
    assert_eq!(sales_csv.lines().count(), 2);

    let (_dst_tmp, target) = create_test_state();
    let imported = target
        .exchange_api
        .import_inventory(
            dir.path().join(INVENTORY_FILE).to_string_lossy().to_string(),
            Some(dir.path().join(BOM_FILE).to_string_lossy().to_string()),
        )
        .await
        .unwrap();
    assert_eq!(imported.products_replaced, 0);
    assert_eq!(imported.products_imported, 3);
    assert_eq!(imported.bom_imported, 2);
    assert_eq!(imported.bom_skipped, 0);

    let products = target.inventory_api.list_products().unwrap();
    let names: Vec<&str> = products.iter().map(|p| p.product.name.as_str()).collect();
    assert_eq!(names, vec!["Glue", "Plank", "Table"]);

    let plank = &products[1].product;
    assert_eq!(plank.supplier.as_deref(), Some("Sawmill"));
    assert_eq!(plank.purchase_date.unwrap().to_string(), "2024-01-08");

    let table = &products[2].product;
    assert_eq!(table.sku.as_deref(), Some("T-1"));
    assert_close(table.stock, 1.0);

    let report = target.production_api.max_producible(table.id).unwrap();
    // Plank 40 / 6 = 6.67, Glue 900 / 75 = 12 → 6
    assert_close(report.can_produce, 6.0);
    let cost = target.bom_api.calculate_cost(table.id).unwrap();
    // 6 × 3.5 + 75 × 0.02 + 5
    assert_close(cost.calculated_cost, 27.5);
}

#[tokio::test]
async fn test_import_replaces_products_but_keeps_sales() {
    let (_tmp, state) = create_test_state();
    let (table, _, _) = seed_workshop(&state);
    let sale = state.sales_api.add_sale(sale_input(table, 1.0, 99.0)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let products_file = dir.path().join("products.csv");
    fs::write(
        &products_file,
        "Name,Type,Stock,Measurement\nStool,final,3,units\nSeat,hijo,12,\n",
    )
    .unwrap();
    let bom_file = dir.path().join("bom.csv");
    fs::write(
        &bom_file,
        "Parent Product,Child Component,Quantity\nStool,Seat,1\nStool,Unknown,2\nStool,Seat,0\n",
    )
    .unwrap();

    let summary = state
        .exchange_api
        .import_inventory(
            products_file.to_string_lossy().to_string(),
            Some(bom_file.to_string_lossy().to_string()),
        )
        .await
        .unwrap();
    assert_eq!(summary.products_replaced, 3);
    assert_eq!(summary.products_imported, 2);
    assert_eq!(summary.bom_imported, 1);
    assert_eq!(summary.bom_skipped, 2);

    let names: Vec<String> = state
        .inventory_api
        .list_products()
        .unwrap()
        .into_iter()
        .map(|p| p.product.name)
        .collect();
    assert_eq!(names, vec!["Seat", "Stool"]);

    let orphan = state.sales_api.get_sale(sale.id).unwrap();
    assert_eq!(orphan.product_id, None);
    assert_eq!(orphan.product_name, "Table");
    assert_eq!(state.finance_api.list_all_revenue().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bad_product_row_aborts_import() {
    let (_tmp, state) = create_test_state();
    seed_workshop(&state);
    let before = state.inventory_api.list_products().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let products_file = dir.path().join("products.csv");
    fs::write(
        &products_file,
        "Name,Type,Stock\nStool,final,3\nSeat,component,lots\n",
    )
    .unwrap();

    let err = state
        .exchange_api
        .import_inventory(products_file.to_string_lossy().to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert_eq!(state.inventory_api.list_products().unwrap(), before);

    let err = state
        .exchange_api
        .import_inventory(
            dir.path().join("missing.csv").to_string_lossy().to_string(),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let unsupported = dir.path().join("products.txt");
    fs::write(&unsupported, "Name,Type\nX,final\n").unwrap();
    let err = state
        .exchange_api
        .import_inventory(unsupported.to_string_lossy().to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_duplicate_names_in_file_abort_import() {
    let (_tmp, state) = create_test_state();
    seed_workshop(&state);
    let before = state.inventory_api.list_products().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let products_file = dir.path().join("products.csv");
    fs::write(&products_file, "Name,Type\nStool,final\nStool,final\n").unwrap();

    let err = state
        .exchange_api
        .import_inventory(products_file.to_string_lossy().to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
    assert_eq!(state.inventory_api.list_products().unwrap(), before);
}

#[tokio::test]
async fn test_sales_report_has_total_row() {
    let (_tmp, state) = create_test_state();
    let (table, _, _) = seed_workshop(&state);
    state.sales_api.add_sale(sale_input(table, 1.0, 100.0)).unwrap();
    state.sales_api.add_sale(sale_input(table, 1.0, 80.5)).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reports").join("month.csv");
    let summary = state
        .exchange_api
        .export_sales_report("month", Some(path.to_string_lossy().to_string()))
        .await
        .unwrap();
    assert_eq!(summary.rows, 2);

    let content = fs::read_to_string(&path).unwrap();
    let last = content.lines().last().unwrap();
    assert_eq!(last, ",,TOTAL,,,180.5");

    let err = state
        .exchange_api
        .export_sales_report("fortnight", Some(path.to_string_lossy().to_string()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_repeated_bom_rows_are_skipped() {
    let (_tmp, state) = create_test_state();

    let dir = tempfile::tempdir().unwrap();
    let products_file = dir.path().join("products.csv");
    fs::write(
        &products_file,
        "Name,Type,Stock\nKit,final,0\nBolt,component,10\n",
    )
    .unwrap();
    let bom_file = dir.path().join("bom.csv");
    fs::write(&bom_file, "Parent,Child,Qty\nKit,Bolt,4\nKit,Bolt,4\n").unwrap();

    let summary = state
        .exchange_api
        .import_inventory(
            products_file.to_string_lossy().to_string(),
            Some(bom_file.to_string_lossy().to_string()),
        )
        .await
        .unwrap();
    assert_eq!(summary.bom_imported, 1);
    assert_eq!(summary.bom_skipped, 1);

    let kit = state.inventory_api.list_products_by_kind("final").unwrap()[0]
        .product
        .id;
    let report = state.production_api.max_producible(kit).unwrap();
    assert_close(report.can_produce, 2.0);
}
