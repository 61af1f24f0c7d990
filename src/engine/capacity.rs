// ==========================================
// 小微企业 ERP - 产能计算引擎 (MRP-lite)
// ==========================================
// 职责: 由单层 BOM + 当前库存计算最大可生产数量
// 规则:
// 1) 无 BOM → 产能 = 父件当前库存
// 2) 每条边 possible = 子件库存 / 用量（用量 ≤ 0 时为 0），同一子件单位内计算
// 3) 取最小值作为瓶颈组件，结果不低于 0
// 4) 父件为 discrete 时向下取整；mass 保留小数
// ==========================================

use crate::domain::bom::{BomComponent, CapacityReport, ComponentCapacity};
use crate::domain::product::Product;
use crate::domain::types::Measurement;

/// 取整前的浮点容差（避免 0.3 / 0.1 = 2.9999… 被截成 2）
pub const CAPACITY_EPSILON: f64 = 1e-9;

// ==========================================
// CapacityCalculator - 产能计算（无状态）
// ==========================================
pub struct CapacityCalculator;

impl CapacityCalculator {
    /// 按父件计量方式取整
    pub fn round_for(measurement: Measurement, value: f64) -> f64 {
        match measurement {
            Measurement::Mass => value,
            Measurement::Discrete if value >= 0.0 => (value + CAPACITY_EPSILON).floor(),
            Measurement::Discrete => value.trunc(),
        }
    }

    /// 单条边可支撑的父件数量（子件自身单位）
    pub fn possible_for(component: &BomComponent) -> f64 {
        let quantity = component.edge.quantity;
        if quantity <= 0.0 {
            return 0.0;
        }
        component.child.stock / quantity
    }

    fn component_capacity(component: &BomComponent) -> ComponentCapacity {
        let child = &component.child;
        let required = component.edge.quantity;
        let required_in_grams = match child.measurement {
            Measurement::Mass => required,
            Measurement::Discrete => required * child.unit_weight,
        };

        ComponentCapacity {
            bom_id: component.edge.id,
            child_id: child.id,
            child_name: child.name.clone(),
            child_sku: child.sku.clone(),
            child_stock: child.stock,
            measurement: child.measurement,
            required_quantity: required,
            possible: Self::possible_for(component),
            available_in_grams: child.total_weight(),
            required_in_grams,
        }
    }

    /// 计算产能报告
    pub fn calculate(parent: &Product, components: &[BomComponent]) -> CapacityReport {
        let unit = parent.measurement.unit_label();

        if components.is_empty() {
            let can_produce = Self::round_for(parent.measurement, parent.stock);
            return CapacityReport {
                product_id: parent.id,
                product_name: parent.name.clone(),
                measurement: parent.measurement,
                current_stock: parent.stock,
                can_produce,
                components: Vec::new(),
                limiting_component: None,
                message: format!(
                    "{} 没有物料清单，可用数量即当前库存 {} {}",
                    parent.name, can_produce, unit
                ),
            };
        }

        let rows: Vec<ComponentCapacity> =
            components.iter().map(Self::component_capacity).collect();

        // 首个最小值为瓶颈（并列时取 BOM 顺序靠前者）
        let limiting = rows
            .iter()
            .fold(None::<&ComponentCapacity>, |best, row| match best {
                Some(b) if b.possible <= row.possible => Some(b),
                _ => Some(row),
            })
            .cloned();

        let raw = limiting.as_ref().map(|c| c.possible).unwrap_or(0.0).max(0.0);
        let can_produce = Self::round_for(parent.measurement, raw);

        let message = match &limiting {
            Some(c) => format!(
                "可生产 {} {} {}（瓶颈: {}）",
                can_produce, unit, parent.name, c.child_name
            ),
            None => format!("可生产 {} {} {}", can_produce, unit, parent.name),
        };

        CapacityReport {
            product_id: parent.id,
            product_name: parent.name.clone(),
            measurement: parent.measurement,
            current_stock: parent.stock,
            can_produce,
            components: rows,
            limiting_component: limiting,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bom::BomEdge;
    use crate::domain::types::ProductKind;

    fn product(id: i64, measurement: Measurement, stock: f64) -> Product {
        Product {
            id,
            sku: None,
            name: format!("P{}", id),
            kind: ProductKind::Component,
            stock,
            min_stock: 0.0,
            measurement,
            unit_weight: 0.0,
            unit_cost: 0.0,
            additional_cost: 0.0,
            supplier: None,
            purchase_date: None,
            exit_date: None,
        }
    }

    fn component(child: Product, quantity: f64) -> BomComponent {
        BomComponent {
            edge: BomEdge {
                id: child.id,
                parent_product_id: 1,
                child_product_id: child.id,
                quantity,
            },
            child,
        }
    }

    #[test]
    fn test_no_bom_uses_stock_truncated_for_discrete() {
        let parent = product(1, Measurement::Discrete, 7.8);
        assert_eq!(CapacityCalculator::calculate(&parent, &[]).can_produce, 7.0);

        let parent = product(1, Measurement::Mass, 7.8);
        assert_eq!(CapacityCalculator::calculate(&parent, &[]).can_produce, 7.8);
    }

    #[test]
    fn test_limiting_component_wins() {
        let parent = product(1, Measurement::Discrete, 10.0);
        let components = vec![
            component(product(2, Measurement::Discrete, 20.0), 4.0),
            component(product(3, Measurement::Mass, 500.0), 50.0),
        ];
        let report = CapacityCalculator::calculate(&parent, &components);
        assert_eq!(report.can_produce, 5.0);
        assert_eq!(report.limiting_component.unwrap().child_id, 2);
        assert_eq!(report.components[1].possible, 10.0);
    }

    #[test]
    fn test_parent_measurement_drives_rounding() {
        let components = vec![component(product(2, Measurement::Discrete, 7.0), 2.0)];
        let discrete = CapacityCalculator::calculate(&product(1, Measurement::Discrete, 0.0), &components);
        assert_eq!(discrete.can_produce, 3.0);
        let mass = CapacityCalculator::calculate(&product(1, Measurement::Mass, 0.0), &components);
        assert_eq!(mass.can_produce, 3.5);
    }

    #[test]
    fn test_epsilon_keeps_exact_ratios() {
        let components = vec![component(product(2, Measurement::Mass, 0.3), 0.1)];
        let report = CapacityCalculator::calculate(&product(1, Measurement::Discrete, 0.0), &components);
        assert_eq!(report.can_produce, 3.0);
    }

    #[test]
    fn test_zero_quantity_and_negative_stock_clamp_to_zero() {
        let zero_qty = vec![component(product(2, Measurement::Discrete, 50.0), 0.0)];
        let report = CapacityCalculator::calculate(&product(1, Measurement::Discrete, 0.0), &zero_qty);
        assert_eq!(report.can_produce, 0.0);

        let negative = vec![component(product(2, Measurement::Discrete, -4.0), 1.0)];
        let report = CapacityCalculator::calculate(&product(1, Measurement::Discrete, 0.0), &negative);
        assert_eq!(report.can_produce, 0.0);
    }
}
