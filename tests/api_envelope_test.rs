// ==========================================
// 响应信封集成测试
// ==========================================
// 前端只看到 { success, data?, message?, code? }
// ==========================================

mod test_helpers;

use pyme_erp::api::ApiResponse;
use serde_json::Value;
use test_helpers::*;

fn parse(json: &str) -> Value {
    serde_json::from_str(json).unwrap()
}

#[test]
fn test_failure_envelope_carries_code() {
    let (_tmp, state) = create_test_state();
    let id = create_product(&state, product_input("Loose Item", "final", 4.0));

    let json = ApiResponse::from_result(state.production_api.produce(id, 1.0)).to_json();
    let value = parse(&json);
    assert_eq!(value["success"], Value::Bool(false));
    assert_eq!(value["code"], "NO_BILL_OF_MATERIALS");
    assert!(value.get("data").is_none());
    assert!(value["message"].as_str().unwrap().contains(&id.to_string()));

    let json = ApiResponse::from_result(state.inventory_api.get_product(999)).to_json();
    assert_eq!(parse(&json)["code"], "NOT_FOUND");
}

#[test]
fn test_success_envelope_carries_data() {
    let (_tmp, state) = create_test_state();
    let parent = create_product(&state, product_input("Kit", "final", 0.0));
    let child = create_product(&state, product_input("Part", "component", 9.0));
    state.bom_api.add_edge(parent, child, 3.0).unwrap();

    let json = ApiResponse::from_result(state.production_api.max_producible(parent)).to_json();
    let value = parse(&json);
    assert_eq!(value["success"], Value::Bool(true));
    assert!(value.get("code").is_none());
    assert_eq!(value["data"]["can_produce"].as_f64(), Some(3.0));
}

#[test]
fn test_insufficient_stock_envelope() {
    let (_tmp, state) = create_test_state();
    let parent = create_product(&state, product_input("Kit", "final", 0.0));
    let child = create_product(&state, product_input("Part", "component", 2.0));
    state.bom_api.add_edge(parent, child, 3.0).unwrap();

    let json = ApiResponse::from_result(state.production_api.produce(parent, 1.0)).to_json();
    let value = parse(&json);
    assert_eq!(value["success"], Value::Bool(false));
    assert_eq!(value["code"], "INSUFFICIENT_STOCK");
}

#[test]
fn test_unit_result_envelope_has_no_data() {
    let (_tmp, state) = create_test_state();
    let id = create_product(&state, product_input("Temp", "final", 1.0));

    let json = ApiResponse::from_result(state.inventory_api.delete_product(id)).to_json();
    assert_eq!(json, r#"{"success":true}"#);
}
