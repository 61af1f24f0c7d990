// ==========================================
// 小微企业 ERP - 产品领域模型
// ==========================================
// 对齐: products 表
// 库存单位由 measurement 决定（件 / 克）
// ==========================================

use crate::domain::types::{Measurement, ProductKind};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Product - 产品主数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: Option<String>,     // 外部编码（非空时唯一）
    pub name: String,            // 名称（唯一）
    pub kind: ProductKind,

    // ===== 库存 =====
    pub stock: f64,              // 当前库存（单位取决于 measurement）
    pub min_stock: f64,          // 补货阈值
    pub measurement: Measurement,
    pub unit_weight: f64,        // 每件克重（仅 discrete 参与克重换算时有意义）

    // ===== 成本 =====
    pub unit_cost: f64,
    pub additional_cost: f64,    // 每件固定附加成本（叠加在物料成本之上）

    // ===== 采购信息 =====
    pub supplier: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub exit_date: Option<NaiveDate>,
}

impl Product {
    /// 总重量（克）
    ///
    /// - mass: 库存本身就是克数
    /// - discrete: 件数 × 单件克重
    pub fn total_weight(&self) -> f64 {
        match self.measurement {
            Measurement::Mass => self.stock,
            Measurement::Discrete => self.stock * self.unit_weight,
        }
    }

    pub fn is_below_min_stock(&self) -> bool {
        self.stock < self.min_stock
    }
}

// ==========================================
// ProductView - 带派生字段的产品（查询返回）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub total_weight: f64,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let total_weight = product.total_weight();
        Self {
            product,
            total_weight,
        }
    }
}

// ==========================================
// ProductDraft - 新增/整体覆盖的输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: Option<String>,
    pub name: String,
    pub kind: ProductKind,
    pub stock: f64,
    pub min_stock: f64,
    pub unit_cost: f64,
    pub additional_cost: f64,
    pub measurement: Measurement,
    pub unit_weight: f64,
    pub supplier: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub exit_date: Option<NaiveDate>,
}

impl ProductDraft {
    /// 最小字段构造，其余取默认值
    pub fn new(name: impl Into<String>, kind: ProductKind) -> Self {
        Self {
            sku: None,
            name: name.into(),
            kind,
            stock: 0.0,
            min_stock: 0.0,
            unit_cost: 0.0,
            additional_cost: 0.0,
            measurement: Measurement::Discrete,
            unit_weight: 0.0,
            supplier: None,
            purchase_date: None,
            exit_date: None,
        }
    }

    pub fn with_stock(mut self, stock: f64) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost = unit_cost;
        self
    }

    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// 归一化：去除首尾空白，空 SKU / 空供应商视为 NULL
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.sku = self
            .sku
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self.supplier = self
            .supplier
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }

    /// 字段校验（返回第一条违规原因）
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("产品名称不能为空".to_string());
        }
        for (field, value) in [("stock", self.stock), ("min_stock", self.min_stock)] {
            if !value.is_finite() {
                return Err(format!("{} 必须是有效数字", field));
            }
        }
        for (field, value) in [
            ("unit_cost", self.unit_cost),
            ("additional_cost", self.additional_cost),
            ("unit_weight", self.unit_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{} 必须是非负数字", field));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(measurement: Measurement, stock: f64, unit_weight: f64) -> Product {
        Product {
            id: 1,
            sku: None,
            name: "P".to_string(),
            kind: ProductKind::Component,
            stock,
            min_stock: 0.0,
            measurement,
            unit_weight,
            unit_cost: 0.0,
            additional_cost: 0.0,
            supplier: None,
            purchase_date: None,
            exit_date: None,
        }
    }

    #[test]
    fn test_total_weight_by_measurement() {
        assert_eq!(product(Measurement::Mass, 500.0, 30.0).total_weight(), 500.0);
        assert_eq!(product(Measurement::Discrete, 4.0, 30.0).total_weight(), 120.0);
        assert_eq!(product(Measurement::Discrete, 4.0, 0.0).total_weight(), 0.0);
    }

    #[test]
    fn test_draft_normalization_and_validation() {
        let mut draft = ProductDraft::new("  Widget ", ProductKind::Final).with_sku("  ");
        draft.supplier = Some(String::new());
        let draft = draft.normalized();
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.sku, None);
        assert_eq!(draft.supplier, None);
        assert!(draft.validate().is_ok());

        let bad = ProductDraft::new("X", ProductKind::Final).with_unit_cost(-1.0);
        assert!(bad.validate().is_err());

        let nan = ProductDraft::new("X", ProductKind::Final).with_stock(f64::NAN);
        assert!(nan.validate().is_err());
    }
}
