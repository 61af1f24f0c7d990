// ==========================================
// 小微企业 ERP - 成本卷积引擎
// ==========================================
// 职责: 由单层 BOM 计算父件单位成本
// 输入: 父件主数据 + BOM 组件（子件主数据）
// 输出: CostBreakdown（不回写 unit_cost，由调用方决定是否保存）
// 红线: Engine 不拼 SQL
// ==========================================

use crate::domain::bom::{BomComponent, ComponentCost, CostBreakdown};
use crate::domain::product::Product;
use crate::domain::types::Measurement;

// ==========================================
// CostCalculator - 成本卷积（无状态）
// ==========================================
pub struct CostCalculator;

impl CostCalculator {
    /// 单个组件成本
    ///
    /// - discrete: unit_cost × 用量
    /// - mass 且 unit_weight > 0: (unit_cost / unit_weight) × 用量（克）
    /// - mass 且 unit_weight 未设置: unit_cost 视为每克成本
    pub fn component_cost(component: &BomComponent) -> f64 {
        let child = &component.child;
        let quantity = component.edge.quantity;
        match child.measurement {
            Measurement::Discrete => child.unit_cost * quantity,
            Measurement::Mass if child.unit_weight > 0.0 => {
                child.unit_cost / child.unit_weight * quantity
            }
            Measurement::Mass => child.unit_cost * quantity,
        }
    }

    /// 计算父件成本明细
    pub fn calculate(parent: &Product, components: &[BomComponent]) -> CostBreakdown {
        let additional_cost = parent.additional_cost;

        if components.is_empty() {
            return CostBreakdown {
                product_id: parent.id,
                product_name: parent.name.clone(),
                calculated_cost: additional_cost,
                materials_cost: 0.0,
                additional_cost,
                components: Vec::new(),
                current_cost: parent.unit_cost,
                message: format!(
                    "{} 没有物料清单，成本仅包含附加成本 {:.2}",
                    parent.name, additional_cost
                ),
            };
        }

        let breakdown: Vec<ComponentCost> = components
            .iter()
            .map(|c| ComponentCost {
                component_id: c.child.id,
                component_name: c.child.name.clone(),
                required_quantity: c.edge.quantity,
                measurement: c.child.measurement,
                unit_cost: c.child.unit_cost,
                total_cost: Self::component_cost(c),
            })
            .collect();

        let materials_cost: f64 = breakdown.iter().map(|c| c.total_cost).sum();
        let calculated_cost = materials_cost + additional_cost;

        CostBreakdown {
            product_id: parent.id,
            product_name: parent.name.clone(),
            calculated_cost,
            materials_cost,
            additional_cost,
            components: breakdown,
            current_cost: parent.unit_cost,
            message: format!(
                "计算成本 {:.2}（物料 {:.2} + 附加 {:.2}）",
                calculated_cost, materials_cost, additional_cost
            ),
        }
    }
}
