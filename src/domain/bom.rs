// ==========================================
// 小微企业 ERP - BOM 领域模型
// ==========================================
// 单层 BOM: parent → child 加权边
// quantity = 生产 1 单位父件所需的子件数量（子件自身单位）
// ==========================================

use crate::domain::product::Product;
use crate::domain::types::Measurement;
use serde::{Deserialize, Serialize};

// ==========================================
// BomEdge - BOM 边
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEdge {
    pub id: i64,
    pub parent_product_id: i64,
    pub child_product_id: i64,
    pub quantity: f64,
}

/// 列表展示用（带子件名称）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEdgeView {
    pub bom_id: i64,
    pub child_product_id: i64,
    pub child_product_name: String,
    pub quantity: f64,
}

/// 引擎输入：BOM 边 + 子件当前主数据
#[derive(Debug, Clone, PartialEq)]
pub struct BomComponent {
    pub edge: BomEdge,
    pub child: Product,
}

// ==========================================
// 成本卷积结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCost {
    pub component_id: i64,
    pub component_name: String,
    pub required_quantity: f64,
    pub measurement: Measurement,
    pub unit_cost: f64,
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub product_id: i64,
    pub product_name: String,
    pub calculated_cost: f64,
    pub materials_cost: f64,
    pub additional_cost: f64,
    pub components: Vec<ComponentCost>,
    /// 当前已保存的单位成本（仅供对比，不回写）
    pub current_cost: f64,
    pub message: String,
}

// ==========================================
// 产能查询结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentCapacity {
    pub bom_id: i64,
    pub child_id: i64,
    pub child_name: String,
    pub child_sku: Option<String>,
    pub child_stock: f64,
    pub measurement: Measurement,
    pub required_quantity: f64,
    /// 该子件可支撑的父件数量
    pub possible: f64,
    pub available_in_grams: f64,
    pub required_in_grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityReport {
    pub product_id: i64,
    pub product_name: String,
    pub measurement: Measurement,
    pub current_stock: f64,
    pub can_produce: f64,
    pub components: Vec<ComponentCapacity>,
    pub limiting_component: Option<ComponentCapacity>,
    pub message: String,
}

// ==========================================
// 生产执行结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumedComponent {
    pub child_id: i64,
    pub child_name: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionResult {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: f64,
    pub consumed: Vec<ConsumedComponent>,
}
