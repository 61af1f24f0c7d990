// ==========================================
// 库存台账集成测试
// ==========================================
// 场景: 派生克重、级联删除、唯一约束、相对调整库存
// ==========================================

mod test_helpers;

use pyme_erp::api::{ApiError, ProductInput};
use pyme_erp::domain::types::{Measurement, ProductKind};
use test_helpers::*;

#[test]
fn test_total_weight_is_derived_on_read() {
    let (_tmp, state) = create_test_state();

    let flour = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            unit_weight: 25.0,
            ..product_input("Flour", "component", 500.0)
        },
    );
    let bolt = create_product(
        &state,
        ProductInput {
            measurement: Some("discrete".into()),
            unit_weight: 12.5,
            ..product_input("Bolt", "component", 4.0)
        },
    );

    let flour_view = state.inventory_api.get_product(flour).unwrap();
    assert_eq!(flour_view.product.measurement, Measurement::Mass);
    assert_close(flour_view.total_weight, 500.0);

    let all = state.inventory_api.list_products().unwrap();
    // 按名称升序
    assert_eq!(all[0].product.name, "Bolt");
    assert_eq!(all[0].product.id, bolt);
    assert_close(all[0].total_weight, 50.0);
    assert_close(all[1].total_weight, 500.0);
}

#[test]
fn test_invalid_measurement_defaults_to_discrete() {
    let (_tmp, state) = create_test_state();

    let id = create_product(
        &state,
        ProductInput {
            measurement: Some("litres".into()),
            ..product_input("Oil", "component", 3.0)
        },
    );
    let view = state.inventory_api.get_product(id).unwrap();
    assert_eq!(view.product.measurement, Measurement::Discrete);
}

#[test]
fn test_kind_aliases_and_unknown_kind() {
    let (_tmp, state) = create_test_state();

    let id = create_product(&state, product_input("Screw", "hijo", 10.0));
    let view = state.inventory_api.get_product(id).unwrap();
    assert_eq!(view.product.kind, ProductKind::Component);

    let err = state
        .inventory_api
        .create_product(product_input("Gizmo", "gadget", 1.0))
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[test]
fn test_duplicate_name_and_sku_are_constraint_violations() {
    let (_tmp, state) = create_test_state();

    create_product(
        &state,
        ProductInput {
            sku: Some("SKU-1".into()),
            ..product_input("Table", "final", 1.0)
        },
    );

    let dup_name = state
        .inventory_api
        .create_product(product_input("Table", "final", 2.0))
        .unwrap_err();
    assert!(matches!(dup_name, ApiError::ConstraintViolation(_)));

    let dup_sku = state
        .inventory_api
        .create_product(ProductInput {
            sku: Some("SKU-1".into()),
            ..product_input("Chair", "final", 2.0)
        })
        .unwrap_err();
    assert!(matches!(dup_sku, ApiError::ConstraintViolation(_)));

    // 空 SKU 归一为 NULL，可以重复
    for name in ["Lamp", "Desk"] {
        create_product(
            &state,
            ProductInput {
                sku: Some("   ".into()),
                ..product_input(name, "final", 1.0)
            },
        );
    }
}

#[test]
fn test_missing_product_is_not_found() {
    let (_tmp, state) = create_test_state();

    assert_eq!(state.inventory_api.get_product(42).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(
        state
            .inventory_api
            .update_product(42, product_input("X", "final", 0.0))
            .unwrap_err()
            .code(),
        "NOT_FOUND"
    );
    assert_eq!(state.inventory_api.delete_product(42).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(state.inventory_api.adjust_stock(42, 1.0).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn test_adjust_stock_allows_negative_result() {
    let (_tmp, state) = create_test_state();

    let id = create_product(&state, product_input("Cup", "final", 2.0));
    let view = state.inventory_api.adjust_stock(id, -5.0).unwrap();
    assert_close(view.product.stock, -3.0);

    let view = state.inventory_api.adjust_stock(id, 4.5).unwrap();
    assert_close(view.product.stock, 1.5);
}

#[test]
fn test_update_overwrites_all_fields() {
    let (_tmp, state) = create_test_state();

    let id = create_product(&state, product_input("Soap", "final", 2.0));
    state
        .inventory_api
        .update_product(
            id,
            ProductInput {
                min_stock: 5.0,
                unit_cost: 1.25,
                supplier: Some("ACME".into()),
                purchase_date: Some("2024-02-10".into()),
                ..product_input("Soap Bar", "intermediate", 8.0)
            },
        )
        .unwrap();

    let p = state.inventory_api.get_product(id).unwrap().product;
    assert_eq!(p.name, "Soap Bar");
    assert_eq!(p.kind, ProductKind::Intermediate);
    assert_close(p.stock, 8.0);
    assert_close(p.unit_cost, 1.25);
    assert_eq!(p.supplier.as_deref(), Some("ACME"));
    assert_eq!(p.purchase_date.unwrap().to_string(), "2024-02-10");
}

#[test]
fn test_list_by_kind_and_below_min_stock() {
    let (_tmp, state) = create_test_state();

    create_product(
        &state,
        ProductInput {
            min_stock: 10.0,
            ..product_input("Nails", "component", 3.0)
        },
    );
    create_product(
        &state,
        ProductInput {
            min_stock: 1.0,
            ..product_input("Shelf", "final", 3.0)
        },
    );

    let components = state.inventory_api.list_products_by_kind("component").unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].product.name, "Nails");

    let alerts = state.inventory_api.list_below_min_stock().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].product.name, "Nails");
}

#[test]
fn test_delete_product_cascades_bom_edges() {
    let (_tmp, state) = create_test_state();

    let parent = create_product(&state, product_input("Bike", "final", 0.0));
    let wheel = create_product(&state, product_input("Wheel", "component", 10.0));
    let frame = create_product(&state, product_input("Frame", "intermediate", 5.0));
    let tube = create_product(&state, product_input("Tube", "component", 5.0));

    state.bom_api.add_edge(parent, wheel, 2.0).unwrap();
    state.bom_api.add_edge(parent, frame, 1.0).unwrap();
    state.bom_api.add_edge(frame, tube, 3.0).unwrap();

    // 作为子件被删除
    state.inventory_api.delete_product(wheel).unwrap();
    let edges = state.bom_api.list_edges_for_parent(parent).unwrap();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].child_product_id, frame);

    // 作为父件被删除
    state.inventory_api.delete_product(frame).unwrap();
    assert!(state.bom_api.list_edges_for_parent(parent).unwrap().is_empty());
    assert!(state.bom_api.list_edges_for_parent(frame).unwrap().is_empty());
}
