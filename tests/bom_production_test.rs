// ==========================================
// BOM 与生产引擎集成测试
// ==========================================
// 场景: 成本卷积、产能计算、原子化生产、成环拒绝
// ==========================================

mod test_helpers;

use pyme_erp::api::{ApiError, ProductInput};
use test_helpers::*;

#[test]
fn test_cost_without_bom_is_additional_cost_only() {
    let (_tmp, state) = create_test_state();

    let id = create_product(
        &state,
        ProductInput {
            unit_cost: 9.0,
            additional_cost: 2.5,
            ..product_input("Gift Box", "final", 3.0)
        },
    );

    let cost = state.bom_api.calculate_cost(id).unwrap();
    assert_close(cost.calculated_cost, 2.5);
    assert_close(cost.materials_cost, 0.0);
    assert!(cost.components.is_empty());
    assert_close(cost.current_cost, 9.0);
}

#[test]
fn test_cost_rollup_converts_mass_components() {
    let (_tmp, state) = create_test_state();

    let cake = create_product(
        &state,
        ProductInput {
            additional_cost: 1.0,
            ..product_input("Cake", "final", 0.0)
        },
    );
    // 1000 g 一袋，一袋 4.0 → 0.004 / g
    let flour = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            unit_cost: 4.0,
            unit_weight: 1000.0,
            ..product_input("Flour", "component", 5000.0)
        },
    );
    // 无克重时 unit_cost 视为每克成本
    let sugar = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            unit_cost: 0.01,
            ..product_input("Sugar", "component", 2000.0)
        },
    );
    let egg = create_product(
        &state,
        ProductInput {
            unit_cost: 0.25,
            ..product_input("Egg", "component", 30.0)
        },
    );

    state.bom_api.add_edge(cake, flour, 250.0).unwrap();
    state.bom_api.add_edge(cake, sugar, 100.0).unwrap();
    state.bom_api.add_edge(cake, egg, 3.0).unwrap();

    let cost = state.bom_api.calculate_cost(cake).unwrap();
    assert_eq!(cost.components.len(), 3);
    // 250 × 0.004 + 100 × 0.01 + 3 × 0.25 = 1.0 + 1.0 + 0.75
    assert_close(cost.materials_cost, 2.75);
    assert_close(cost.calculated_cost, 3.75);

    // 只计算，不回写
    let stored = state.inventory_api.get_product(cake).unwrap().product;
    assert_close(stored.unit_cost, 0.0);
}

#[test]
fn test_cost_of_missing_product_is_not_found() {
    let (_tmp, state) = create_test_state();
    assert_eq!(state.bom_api.calculate_cost(7).unwrap_err().code(), "NOT_FOUND");
    assert_eq!(state.production_api.max_producible(7).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn test_capacity_without_bom_is_current_stock() {
    let (_tmp, state) = create_test_state();

    let discrete = create_product(&state, product_input("Stool", "final", 7.8));
    let mass = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            ..product_input("Dough", "intermediate", 7.8)
        },
    );

    let report = state.production_api.max_producible(discrete).unwrap();
    assert_close(report.can_produce, 7.0);
    assert!(report.limiting_component.is_none());

    let report = state.production_api.max_producible(mass).unwrap();
    assert_close(report.can_produce, 7.8);
}

#[test]
fn test_scenario_a_b_produce_until_exhausted() {
    let (_tmp, state) = create_test_state();

    let a = create_product(
        &state,
        ProductInput {
            min_stock: 2.0,
            unit_cost: 5.0,
            ..product_input("A", "final", 10.0)
        },
    );
    let b = create_product(&state, product_input("B", "component", 20.0));
    state.bom_api.add_edge(a, b, 4.0).unwrap();

    let report = state.production_api.max_producible(a).unwrap();
    assert_close(report.can_produce, 5.0);
    assert_eq!(report.limiting_component.unwrap().child_id, b);

    let result = state.production_api.produce(a, 5.0).unwrap();
    assert_eq!(result.consumed.len(), 1);
    assert_close(result.consumed[0].quantity, 20.0);
    assert_close(stock_of(&state, b), 0.0);
    assert_close(stock_of(&state, a), 15.0);

    let err = state.production_api.produce(a, 1.0).unwrap_err();
    assert!(matches!(
        err,
        ApiError::InsufficientStock { requested, available, .. }
            if requested == 1.0 && available == 0.0
    ));
    assert_close(stock_of(&state, a), 15.0);
    assert_close(stock_of(&state, b), 0.0);
}

#[test]
fn test_scenario_c_d_mass_component() {
    let (_tmp, state) = create_test_state();

    let d = create_product(&state, product_input("D", "final", 0.0));
    let c = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            ..product_input("C", "component", 500.0)
        },
    );
    state.bom_api.add_edge(d, c, 50.0).unwrap();

    let report = state.production_api.max_producible(d).unwrap();
    assert_close(report.can_produce, 10.0);
    let row = &report.components[0];
    assert_close(row.available_in_grams, 500.0);
    assert_close(row.required_in_grams, 50.0);

    // 非整数比值按父件 discrete 截断
    state.inventory_api.adjust_stock(c, 30.0).unwrap();
    let report = state.production_api.max_producible(d).unwrap();
    assert_close(report.can_produce, 10.0);
}

#[test]
fn test_limiting_component_is_minimum_over_edges() {
    let (_tmp, state) = create_test_state();

    let chair = create_product(&state, product_input("Chair", "final", 0.0));
    let leg = create_product(&state, product_input("Leg", "component", 18.0));
    let seat = create_product(&state, product_input("Seat", "component", 3.0));
    state.bom_api.add_edge(chair, leg, 4.0).unwrap();
    state.bom_api.add_edge(chair, seat, 1.0).unwrap();

    let report = state.production_api.max_producible(chair).unwrap();
    assert_close(report.can_produce, 3.0);
    assert_eq!(report.limiting_component.unwrap().child_id, seat);
    assert_eq!(report.components.len(), 2);
}

#[test]
fn test_produce_over_capacity_changes_nothing() {
    let (_tmp, state) = create_test_state();

    let chair = create_product(&state, product_input("Chair", "final", 1.0));
    let leg = create_product(&state, product_input("Leg", "component", 18.0));
    let seat = create_product(&state, product_input("Seat", "component", 3.0));
    state.bom_api.add_edge(chair, leg, 4.0).unwrap();
    state.bom_api.add_edge(chair, seat, 1.0).unwrap();

    let err = state.production_api.produce(chair, 4.0).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert_close(stock_of(&state, chair), 1.0);
    assert_close(stock_of(&state, leg), 18.0);
    assert_close(stock_of(&state, seat), 3.0);

    state.production_api.produce(chair, 2.0).unwrap();
    assert_close(stock_of(&state, chair), 3.0);
    assert_close(stock_of(&state, leg), 10.0);
    assert_close(stock_of(&state, seat), 1.0);
}

#[test]
fn test_produce_without_bom_is_refused() {
    let (_tmp, state) = create_test_state();

    let id = create_product(&state, product_input("Loose Item", "final", 4.0));
    let err = state.production_api.produce(id, 1.0).unwrap_err();
    assert!(matches!(err, ApiError::NoBillOfMaterials { product_id } if product_id == id));
    assert_close(stock_of(&state, id), 4.0);
}

#[test]
fn test_produce_rejects_non_positive_quantity() {
    let (_tmp, state) = create_test_state();

    let a = create_product(&state, product_input("A", "final", 0.0));
    let b = create_product(&state, product_input("B", "component", 10.0));
    state.bom_api.add_edge(a, b, 1.0).unwrap();

    for qty in [0.0, -1.0, f64::NAN] {
        let err = state.production_api.produce(a, qty).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }
    assert_close(stock_of(&state, b), 10.0);
}

#[test]
fn test_add_edge_rejects_cycles_and_bad_input() {
    let (_tmp, state) = create_test_state();

    let a = create_product(&state, product_input("A", "final", 0.0));
    let b = create_product(&state, product_input("B", "intermediate", 0.0));
    let c = create_product(&state, product_input("C", "component", 0.0));

    state.bom_api.add_edge(a, b, 1.0).unwrap();
    state.bom_api.add_edge(b, c, 2.0).unwrap();

    // 自引用
    let err = state.bom_api.add_edge(a, a, 1.0).unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");

    // c → a 会形成 a → b → c → a
    let err = state.bom_api.add_edge(c, a, 1.0).unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");

    let err = state.bom_api.add_edge(a, c, 0.0).unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = state.bom_api.add_edge(a, 999, 1.0).unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    // 同层的重复路径不是环
    state.bom_api.add_edge(a, c, 1.0).unwrap();
    assert_eq!(state.bom_api.list_edges_for_parent(a).unwrap().len(), 2);
}

#[test]
fn test_remove_edge() {
    let (_tmp, state) = create_test_state();

    let a = create_product(&state, product_input("A", "final", 0.0));
    let b = create_product(&state, product_input("B", "component", 0.0));
    let edge = state.bom_api.add_edge(a, b, 1.0).unwrap();

    let edges = state.bom_api.list_edges_for_parent(a).unwrap();
    assert_eq!(edges[0].bom_id, edge);
    assert_eq!(edges[0].child_product_name, "B");

    state.bom_api.remove_edge(edge).unwrap();
    assert!(state.bom_api.list_edges_for_parent(a).unwrap().is_empty());
    assert_eq!(state.bom_api.remove_edge(edge).unwrap_err().code(), "NOT_FOUND");
}

#[test]
fn test_repeated_child_edge_is_rejected() {
    let (_tmp, state) = create_test_state();

    let kit = create_product(&state, product_input("Kit", "final", 0.0));
    let bolt = create_product(&state, product_input("Bolt", "component", 10.0));
    state.bom_api.add_edge(kit, bolt, 4.0).unwrap();

    // 同一子件只能有一条边，否则产能会按每条边重复计算同一份库存
    let err = state.bom_api.add_edge(kit, bolt, 4.0).unwrap_err();
    assert_eq!(err.code(), "CONSTRAINT_VIOLATION");
    assert_eq!(state.bom_api.list_edges_for_parent(kit).unwrap().len(), 1);

    let report = state.production_api.max_producible(kit).unwrap();
    assert_close(report.can_produce, 2.0);

    let err = state.production_api.produce(kit, 3.0).unwrap_err();
    assert_eq!(err.code(), "INSUFFICIENT_STOCK");
    assert_close(stock_of(&state, bolt), 10.0);

    state.production_api.produce(kit, 2.0).unwrap();
    assert_close(stock_of(&state, bolt), 2.0);
    assert_close(stock_of(&state, kit), 2.0);
}

#[test]
fn test_produce_debits_every_child() {
    let (_tmp, state) = create_test_state();

    let bread = create_product(&state, product_input("Bread", "final", 1.0));
    let flour = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            ..product_input("Flour", "component", 2000.0)
        },
    );
    let yeast = create_product(
        &state,
        ProductInput {
            measurement: Some("mass".into()),
            ..product_input("Yeast", "component", 100.0)
        },
    );
    let bag = create_product(&state, product_input("Bag", "component", 12.0));
    state.bom_api.add_edge(bread, flour, 500.0).unwrap();
    state.bom_api.add_edge(bread, yeast, 7.5).unwrap();
    state.bom_api.add_edge(bread, bag, 1.0).unwrap();

    // Flour 2000/500 = 4, Yeast 100/7.5 = 13.3, Bag 12/1 = 12
    let report = state.production_api.max_producible(bread).unwrap();
    assert_close(report.can_produce, 4.0);
    assert_eq!(report.limiting_component.unwrap().child_id, flour);

    let result = state.production_api.produce(bread, 3.0).unwrap();
    assert_eq!(result.consumed.len(), 3);
    assert_close(stock_of(&state, bread), 4.0);
    assert_close(stock_of(&state, flour), 500.0);
    assert_close(stock_of(&state, yeast), 77.5);
    assert_close(stock_of(&state, bag), 9.0);
}

#[test]
fn test_missing_bom_wins_over_insufficient_stock() {
    let (_tmp, state) = create_test_state();

    let id = create_product(&state, product_input("Loose Item", "final", 2.0));
    let err = state.production_api.produce(id, 50.0).unwrap_err();
    assert_eq!(err.code(), "NO_BILL_OF_MATERIALS");
    assert_close(stock_of(&state, id), 2.0);
}
