// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库 + AppState 初始化、常用测试数据
// ==========================================

#![allow(dead_code)]

use pyme_erp::api::{ProductInput, SaleInput};
use pyme_erp::app::AppState;
use tempfile::NamedTempFile;

/// 创建基于临时文件的 AppState
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - AppState: 已建库的应用状态
pub fn create_test_state() -> (NamedTempFile, AppState) {
    pyme_erp::logging::init_test();
    let temp_file = NamedTempFile::new().expect("创建临时文件失败");
    let db_path = temp_file
        .path()
        .to_str()
        .expect("临时路径不是 UTF-8")
        .to_string();
    let state = AppState::new(db_path).expect("初始化 AppState 失败");
    (temp_file, state)
}

/// 构造产品录入
pub fn product_input(name: &str, kind: &str, stock: f64) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        kind: kind.to_string(),
        stock,
        ..Default::default()
    }
}

/// 新增产品并返回 id
pub fn create_product(state: &AppState, input: ProductInput) -> i64 {
    state
        .inventory_api
        .create_product(input)
        .expect("创建产品失败")
}

/// 读取产品当前库存
pub fn stock_of(state: &AppState, id: i64) -> f64 {
    state
        .inventory_api
        .get_product(id)
        .expect("读取产品失败")
        .product
        .stock
}

/// 构造销售录入
pub fn sale_input(product_id: i64, quantity: f64, unit_price: f64) -> SaleInput {
    SaleInput {
        product_id,
        product_name: None,
        quantity,
        unit_price,
        date: None,
    }
}

/// 浮点比较
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
